//! The fixed action vocabulary.
//!
//! Agents pick actions by integer index; providers receive the wire name.
//! Index order is part of the external interface and must not change:
//!
//! | index | action  | wire name |
//! |-------|---------|-----------|
//! | 0     | Left    | `left`    |
//! | 1     | Right   | `right`   |
//! | 2     | Up      | `up`      |
//! | 3     | Down    | `down`    |
//! | 4     | Wait    | `wait`    |
//! | 5     | Submit  | `submit`  |
//! | 6..=9 | Ping A-D| `pinga`.. |
//! | 10    | Undo    | `undo`    |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::entity::PinColor;

/// A single player action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameAction {
    Left,
    Right,
    Up,
    Down,
    Wait,
    Submit,
    PingA,
    PingB,
    PingC,
    PingD,
    Undo,
}

impl GameAction {
    /// Every action in index order.
    pub const ALL: [GameAction; 11] = [
        GameAction::Left,
        GameAction::Right,
        GameAction::Up,
        GameAction::Down,
        GameAction::Wait,
        GameAction::Submit,
        GameAction::PingA,
        GameAction::PingB,
        GameAction::PingC,
        GameAction::PingD,
        GameAction::Undo,
    ];

    /// Size of the action space.
    pub const COUNT: usize = Self::ALL.len();

    /// Look up an action by its index.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Index of this action in the vocabulary.
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Name sent to the game.
    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            GameAction::Left => "left",
            GameAction::Right => "right",
            GameAction::Up => "up",
            GameAction::Down => "down",
            GameAction::Wait => "wait",
            GameAction::Submit => "submit",
            GameAction::PingA => "pinga",
            GameAction::PingB => "pingb",
            GameAction::PingC => "pingc",
            GameAction::PingD => "pingd",
            GameAction::Undo => "undo",
        }
    }

    /// Grid offset for directional actions.
    ///
    /// `up` increases `y`.
    #[must_use]
    pub const fn direction(self) -> Option<(i32, i32)> {
        match self {
            GameAction::Left => Some((-1, 0)),
            GameAction::Right => Some((1, 0)),
            GameAction::Up => Some((0, 1)),
            GameAction::Down => Some((0, -1)),
            _ => None,
        }
    }

    /// Pin colour placed by a ping action.
    #[must_use]
    pub const fn ping_color(self) -> Option<PinColor> {
        match self {
            GameAction::PingA => Some(PinColor::A),
            GameAction::PingB => Some(PinColor::B),
            GameAction::PingC => Some(PinColor::C),
            GameAction::PingD => Some(PinColor::D),
            _ => None,
        }
    }
}

impl fmt::Display for GameAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for GameAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.wire_name() == s)
            .ok_or_else(|| format!("unknown action `{s}`"))
    }
}
