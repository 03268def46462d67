//! Python bindings for the Dice Adventure environment.
//!
//! # Quick Start
//!
//! ```python
//! import dice_gym
//!
//! env = dice_gym.DiceAdventureEnv(player="Giant", seed=7)
//! obs, info = env.reset()
//!
//! for _ in range(100):
//!     obs, reward, terminated, truncated, info = env.step(4)  # wait
//! ```

use pyo3::prelude::*;

mod py_env;

pub use py_env::*;

/// dice_gym: Gym-style environment for Dice Adventure.
#[pymodule]
fn dice_gym(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyDiceAdventureEnv>()?;
    Ok(())
}
