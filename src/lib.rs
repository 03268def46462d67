//! # dice-gym
//!
//! Reinforcement-learning environment for Dice Adventure, a cooperative
//! three-character grid dungeon game.
//!
//! ## Architecture
//!
//! - **State Query Interface**: Game state arrives as a JSON document from a
//!   [`StateProvider`], either a remote game server or the in-process
//!   simulator. Documents are validated once and queried by type or name.
//!
//! - **Observation Encoder**: A fixed-length tensor centred on the focal
//!   player: a one-hot grid of entity channels and variants plus a small
//!   player-information vector.
//!
//! - **Reward Engine**: Named predicates over (previous, next) snapshots,
//!   weighted by a configurable [`RewardPolicy`].
//!
//! - **Turn Coordinator**: [`DiceAdventureEnv`] applies the focal action,
//!   scores it, drives the other players and handles terminal episodes.
//!
//! ## Modules
//!
//! - `core`: Characters, scene entities, actions, RNG
//! - `state`: State documents and providers
//! - `encoding`: Observation configuration and encoder
//! - `reward`: Reward predicates and policies
//! - `env`: The step/reset environment
//! - `config`: JSON configuration for the whole stack
//! - `games`: Local simulator

pub mod config;
pub mod core;
pub mod encoding;
pub mod env;
pub mod error;
pub mod games;
pub mod reward;
pub mod state;

#[cfg(feature = "python")]
pub mod python;

// Re-export commonly used types
pub use crate::core::{
    Character, CharacterMap, Entity, EntityKind, GameAction, GameRng, PinColor, PlayerStats,
    Position,
};

pub use crate::error::{GymError, ProviderError, Result};

pub use crate::state::{
    GameStateDocument, Level, LocalProvider, RemoteProvider, StateProvider, Status, Visibility,
};

pub use crate::encoding::{EncodedState, GridEncoder, ObservationConfig, StateEncoder};

pub use crate::reward::{RewardBreakdown, RewardPolicy, RewardTerm, WeightedTerm};

pub use crate::env::{DiceAdventureEnv, EnvConfig, EnvPhase, ServerKind, StepInfo, StepResult};

pub use crate::config::{GymConfig, ServerConfig};

pub use crate::games::grid::{GridGame, GridGameBuilder};
