//! Core vocabulary: characters, scene entities, actions, RNG.
//!
//! These types are shared by the state documents, the observation encoder,
//! the reward engine and the local simulator.

pub mod action;
pub mod entity;
pub mod player;
pub mod rng;

pub use action::GameAction;
pub use entity::{Entity, EntityKind, PinColor, PlayerStats, Position};
pub use player::{Character, CharacterMap};
pub use rng::GameRng;
