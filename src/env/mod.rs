//! The step/reset environment.

pub mod config;
pub mod environment;

pub use config::{EnvConfig, ServerKind};
pub use environment::{DiceAdventureEnv, EnvPhase, StepInfo, StepResult};
