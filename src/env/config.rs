//! Environment configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::Character;
use crate::state::Visibility;

/// Which provider backs the environment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerKind {
    /// In-process grid simulator.
    #[default]
    Local,
    /// Remote game server over HTTP.
    Remote,
}

impl fmt::Display for ServerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerKind::Local => f.write_str("local"),
            ServerKind::Remote => f.write_str("remote"),
        }
    }
}

impl FromStr for ServerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "local" => Ok(ServerKind::Local),
            // Alias used by older launch scripts.
            "remote" | "unity" => Ok(ServerKind::Remote),
            _ => Err(format!("unknown server `{s}` (expected local or remote)")),
        }
    }
}

/// Turn coordinator settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    /// Focal player.
    pub player: Character,
    /// Visibility of state queries.
    pub visibility: Visibility,
    /// Drive the other players after each focal action.
    pub automate_players: bool,
    /// Start a new episode automatically when one ends.
    pub auto_reset_on_terminal: bool,
    /// Seed for automated players and local game layouts.
    pub seed: u64,
    pub server: ServerKind,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            player: Character::Dwarf,
            visibility: Visibility::Full,
            automate_players: true,
            auto_reset_on_terminal: true,
            seed: 0,
            server: ServerKind::Local,
        }
    }
}

impl EnvConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_player(mut self, player: Character) -> Self {
        self.player = player;
        self
    }

    #[must_use]
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    #[must_use]
    pub fn with_automate_players(mut self, automate: bool) -> Self {
        self.automate_players = automate;
        self
    }

    #[must_use]
    pub fn with_auto_reset(mut self, auto_reset: bool) -> Self {
        self.auto_reset_on_terminal = auto_reset;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_server(mut self, server: ServerKind) -> Self {
        self.server = server;
        self
    }
}
