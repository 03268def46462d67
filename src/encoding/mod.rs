//! Observation encoding.
//!
//! ## Overview
//!
//! - **Tensor**: [`EncodedState`], a flat `f32` buffer plus its shape
//! - **Trait**: [`StateEncoder`], implemented by anything that can turn a
//!   state document into a tensor for a focal player
//! - **Grid**: [`GridEncoder`], the egocentric multi-channel projection,
//!   configured by [`ObservationConfig`]
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dice_gym::encoding::{GridEncoder, ObservationConfig, StateEncoder};
//!
//! let encoder = GridEncoder::new(ObservationConfig::default())?;
//! let obs = encoder.encode(&state, Character::Dwarf, None)?;
//! assert_eq!(obs.len(), encoder.observation_size(Character::Dwarf));
//! ```

pub mod config;
pub mod encoder;
pub mod tensor;

pub use config::{ObservationConfig, MAX_SIGHT_RADIUS};
pub use encoder::{GridEncoder, StateEncoder, PLAYER_INFO_LEN};
pub use tensor::EncodedState;
