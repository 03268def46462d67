//! The state query interface.
//!
//! A [`StateProvider`] is the only way the environment talks to the game. The
//! environment treats local and remote providers identically; which one is
//! used is decided at construction.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::{Character, GameAction};
use crate::error::Result;

use super::document::GameStateDocument;

/// How much of the scene a state query reveals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Every object.
    #[default]
    Full,
    /// Objects within the player's sight window, plus the player and their
    /// own shrine.
    Player,
    /// Fog of war: `Player` plus static objects on previously seen cells.
    Fow,
}

impl Visibility {
    /// Name sent to the game server.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Visibility::Full => "full",
            Visibility::Player => "player",
            Visibility::Fow => "fow",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "full" => Ok(Visibility::Full),
            "player" => Ok(Visibility::Player),
            "fow" => Ok(Visibility::Fow),
            _ => Err(format!("unknown visibility `{s}`")),
        }
    }
}

/// Source of game-state documents.
///
/// Faults are returned as [`crate::GymError::StateUnavailable`]; providers do
/// not retry.
pub trait StateProvider: Send {
    /// Current state as seen by `player`.
    fn get_state(&mut self, player: Character, visibility: Visibility) -> Result<GameStateDocument>;

    /// Apply `action` for `player` and return the resulting state from that
    /// player's perspective.
    fn execute_action(&mut self, player: Character, action: GameAction) -> Result<GameStateDocument>;

    /// Start a new game.
    fn reset(&mut self) -> Result<()>;

    /// Human-readable name for logs.
    fn name(&self) -> &str;
}

impl<P: StateProvider + ?Sized> StateProvider for Box<P> {
    fn get_state(&mut self, player: Character, visibility: Visibility) -> Result<GameStateDocument> {
        (**self).get_state(player, visibility)
    }

    fn execute_action(&mut self, player: Character, action: GameAction) -> Result<GameStateDocument> {
        (**self).execute_action(player, action)
    }

    fn reset(&mut self) -> Result<()> {
        (**self).reset()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
