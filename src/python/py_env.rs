//! Environment bindings for Python.

use numpy::PyArray1;
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::config::GymConfig;
use crate::core::{Character, GameAction};
use crate::encoding::EncodedState;
use crate::env::{DiceAdventureEnv, ServerKind, StepInfo};
use crate::error::GymError;
use crate::state::{Level, StateProvider, Visibility};

impl From<GymError> for PyErr {
    fn from(err: GymError) -> Self {
        match err {
            GymError::Config(_) | GymError::InvalidAction { .. } => {
                PyValueError::new_err(err.to_string())
            }
            _ => PyRuntimeError::new_err(err.to_string()),
        }
    }
}

fn parse_arg<T: std::str::FromStr<Err = String>>(value: &str) -> PyResult<T> {
    value.parse().map_err(PyValueError::new_err)
}

/// Python wrapper for DiceAdventureEnv.
#[pyclass(name = "DiceAdventureEnv")]
pub struct PyDiceAdventureEnv(pub DiceAdventureEnv<Box<dyn StateProvider>>);

#[pymethods]
impl PyDiceAdventureEnv {
    /// Create an environment.
    ///
    /// # Arguments
    /// - player: Focal character, "Dwarf", "Giant" or "Human" (default: "Dwarf")
    /// - server: "local" simulator or "remote" game server (default: "local")
    /// - visibility: "full", "player" or "fow" (default: "full")
    /// - automate_players: Drive the other characters randomly (default: True)
    /// - auto_reset_on_terminal: Start a new episode when one ends (default: True)
    /// - seed: Seed for layouts and automated players (default: 0)
    /// - config_path: JSON configuration file; keyword arguments override its
    ///   `env` section
    #[new]
    #[pyo3(signature = (
        player = "Dwarf",
        server = "local",
        visibility = "full",
        automate_players = true,
        auto_reset_on_terminal = true,
        seed = 0,
        config_path = None
    ))]
    fn new(
        player: &str,
        server: &str,
        visibility: &str,
        automate_players: bool,
        auto_reset_on_terminal: bool,
        seed: u64,
        config_path: Option<&str>,
    ) -> PyResult<Self> {
        let config = match config_path {
            Some(path) => GymConfig::from_path(path)?,
            None => GymConfig::default(),
        };
        let env = config
            .env
            .clone()
            .with_player(parse_arg::<Character>(player)?)
            .with_server(parse_arg::<ServerKind>(server)?)
            .with_visibility(parse_arg::<Visibility>(visibility)?)
            .with_automate_players(automate_players)
            .with_auto_reset(auto_reset_on_terminal)
            .with_seed(seed);
        Ok(Self(config.with_env(env).build_env()?))
    }

    /// Start a new episode.
    ///
    /// Returns (observation, info).
    fn reset<'py>(
        &mut self,
        py: Python<'py>,
    ) -> PyResult<(Bound<'py, PyArray1<f32>>, Bound<'py, PyDict>)> {
        let (observation, info) = self.0.reset()?;
        Ok((to_numpy(py, &observation), info_dict(py, &info)?))
    }

    /// Apply an action index for the focal player.
    ///
    /// Returns (observation, reward, terminated, truncated, info).
    #[allow(clippy::type_complexity)]
    fn step<'py>(
        &mut self,
        py: Python<'py>,
        action: usize,
    ) -> PyResult<(
        Bound<'py, PyArray1<f32>>,
        f64,
        bool,
        bool,
        Bound<'py, PyDict>,
    )> {
        let result = self.0.step(action)?;
        Ok((
            to_numpy(py, &result.observation),
            result.reward,
            result.terminated,
            result.truncated,
            info_dict(py, &result.info)?,
        ))
    }

    #[getter]
    fn observation_size(&self) -> usize {
        self.0.observation_size()
    }

    #[getter]
    fn action_count(&self) -> usize {
        self.0.action_count()
    }

    #[getter]
    fn player(&self) -> &'static str {
        self.0.player().as_str()
    }

    /// Wire names of the actions, in index order.
    #[staticmethod]
    fn action_names() -> Vec<&'static str> {
        GameAction::ALL.iter().map(|a| a.wire_name()).collect()
    }

    fn __repr__(&self) -> String {
        format!(
            "DiceAdventureEnv(player={}, server={}, provider={}, reward={})",
            self.0.player(),
            self.0.config().server,
            self.0.provider().name(),
            self.0.policy().name()
        )
    }
}

fn to_numpy<'py>(py: Python<'py>, observation: &EncodedState) -> Bound<'py, PyArray1<f32>> {
    PyArray1::from_slice_bound(py, observation.as_slice())
}

fn info_dict<'py>(py: Python<'py>, info: &StepInfo) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new_bound(py);
    match &info.level {
        Level::Number(n) => dict.set_item("level", *n)?,
        Level::Name(name) => dict.set_item("level", name)?,
    }
    dict.set_item("phase", &info.phase)?;
    dict.set_item("episode", info.episode)?;
    dict.set_item("step", info.step)?;
    dict.set_item("auto_reset", info.auto_reset)?;
    let fired: Vec<String> = info.reward.fired.iter().map(ToString::to_string).collect();
    dict.set_item("reward_terms", fired)?;
    if let Some(reset_info) = &info.reset_info {
        dict.set_item("reset_info", info_dict(py, reset_info)?)?;
    }
    Ok(dict)
}
