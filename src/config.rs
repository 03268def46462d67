//! Configuration file loading.
//!
//! One JSON document configures everything; every section is optional.
//!
//! ```json
//! {
//!   "observation": { "variant_count": 4, "sight_radii": { "Dwarf": 2, "Giant": 3, "Human": 4 } },
//!   "reward": "aggressive",
//!   "env": { "player": "Dwarf", "visibility": "full", "server": "local", "seed": 0 },
//!   "server": { "url": "http://localhost:4649/{}", "timeout_ms": null },
//!   "game": { "width": 9, "height": 9, "max_levels": 3 }
//! }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::encoding::{GridEncoder, ObservationConfig};
use crate::env::{DiceAdventureEnv, EnvConfig, ServerKind};
use crate::error::{GymError, Result};
use crate::games::grid::GridGameBuilder;
use crate::reward::RewardPolicy;
use crate::state::{LocalProvider, RemoteProvider, StateProvider, DEFAULT_URL_TEMPLATE};

/// Remote server settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// URL template; `{}` becomes the lowercase player name.
    pub url: String,
    /// Per-request timeout. `None` waits indefinitely.
    pub timeout_ms: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL_TEMPLATE.to_string(),
            timeout_ms: None,
        }
    }
}

/// Complete configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GymConfig {
    pub observation: ObservationConfig,
    pub reward: RewardPolicy,
    pub env: EnvConfig,
    pub server: ServerConfig,
    pub game: GridGameBuilder,
}

impl GymConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| GymError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| GymError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&json)
    }

    /// Check every section.
    pub fn validate(&self) -> Result<()> {
        self.observation.validate()?;
        self.game.validate()?;
        if self.env.server == ServerKind::Remote && !self.server.url.contains("{}") {
            tracing::warn!(url = %self.server.url, "server url has no `{{}}` placeholder; every player shares one endpoint");
        }
        Ok(())
    }

    #[must_use]
    pub fn with_observation(mut self, observation: ObservationConfig) -> Self {
        self.observation = observation;
        self
    }

    #[must_use]
    pub fn with_reward(mut self, reward: RewardPolicy) -> Self {
        self.reward = reward;
        self
    }

    #[must_use]
    pub fn with_env(mut self, env: EnvConfig) -> Self {
        self.env = env;
        self
    }

    #[must_use]
    pub fn with_server(mut self, server: ServerConfig) -> Self {
        self.server = server;
        self
    }

    #[must_use]
    pub fn with_game(mut self, game: GridGameBuilder) -> Self {
        self.game = game;
        self
    }

    /// The provider selected by `env.server`.
    pub fn build_provider(&self) -> Result<Box<dyn StateProvider>> {
        match self.env.server {
            ServerKind::Local => {
                let game = self
                    .game
                    .clone()
                    .sight_radii(self.observation.sight_radii.clone());
                let provider = LocalProvider::new(game, self.env.seed)?
                    .with_visibility(self.env.visibility);
                Ok(Box::new(provider))
            }
            ServerKind::Remote => {
                let timeout = self.server.timeout_ms.map(Duration::from_millis);
                let provider = RemoteProvider::with_timeout(self.server.url.clone(), timeout)?;
                Ok(Box::new(provider))
            }
        }
    }

    /// Assemble a ready-to-reset environment.
    pub fn build_env(&self) -> Result<DiceAdventureEnv<Box<dyn StateProvider>>> {
        let provider = self.build_provider()?;
        let encoder = GridEncoder::new(self.observation.clone())?;
        Ok(DiceAdventureEnv::new(
            provider,
            Box::new(encoder),
            self.reward.clone(),
            self.env.clone(),
        ))
    }
}
