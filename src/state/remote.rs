//! Remote game server provider.
//!
//! Each player has its own endpoint, derived from a URL template whose `{}`
//! is replaced by the lowercase character name
//! (`http://localhost:4649/{}` → `http://localhost:4649/dwarf`). Requests are
//! blocking JSON `POST`s:
//!
//! - `{"command": "get_state", "version": "<visibility>"}`
//! - `{"command": "execute_action", "action": "<wire name>"}`
//!
//! and every response body is a state document.

use std::time::Duration;

use serde::Serialize;

use crate::core::{Character, GameAction};
use crate::error::{ProviderError, Result};

use super::document::GameStateDocument;
use super::provider::{StateProvider, Visibility};

/// Default server URL template.
pub const DEFAULT_URL_TEMPLATE: &str = "http://localhost:4649/{}";

#[derive(Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
enum Request {
    GetState { version: Visibility },
    ExecuteAction { action: GameAction },
}

/// Provider backed by a remote game server.
pub struct RemoteProvider {
    client: reqwest::blocking::Client,
    url_template: String,
}

impl RemoteProvider {
    /// Connect to `url_template` with no request timeout.
    pub fn new(url_template: impl Into<String>) -> Result<Self> {
        Self::with_timeout(url_template, None)
    }

    /// Connect with an optional per-request timeout.
    pub fn with_timeout(url_template: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        // `None` disables reqwest's default 30s limit.
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ProviderError::from)?;
        Ok(Self {
            client,
            url_template: url_template.into(),
        })
    }

    /// Endpoint for one player.
    #[must_use]
    pub fn endpoint(&self, player: Character) -> String {
        self.url_template
            .replace("{}", &player.as_str().to_lowercase())
    }

    fn post(&self, player: Character, request: &Request) -> Result<GameStateDocument> {
        let url = self.endpoint(player);
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .map_err(ProviderError::from)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            tracing::warn!(%url, status = status.as_u16(), "game server returned an error status");
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let bytes = response.bytes().map_err(ProviderError::from)?;
        let value: serde_json::Value = serde_json::from_slice(&bytes).map_err(ProviderError::from)?;
        GameStateDocument::from_value(value)
    }
}

impl StateProvider for RemoteProvider {
    fn get_state(&mut self, player: Character, visibility: Visibility) -> Result<GameStateDocument> {
        self.post(player, &Request::GetState { version: visibility })
    }

    fn execute_action(&mut self, player: Character, action: GameAction) -> Result<GameStateDocument> {
        self.post(player, &Request::ExecuteAction { action })
    }

    /// The server owns the game lifecycle; nothing to do.
    fn reset(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "remote"
    }
}
