//! Reward engine.
//!
//! Rewards are computed from the focal player's entity and the full
//! snapshot before and after the focal action. [`predicates`] holds the
//! individually testable conditions; [`RewardPolicy`] weights and sums
//! them.

pub mod policy;
pub mod predicates;

pub use policy::{
    RewardBreakdown, RewardPolicy, RewardTerm, Transition, WeightedTerm,
    PROXIMITY_REGRESSION_WEIGHT,
};
