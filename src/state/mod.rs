//! The state query interface and the documents it returns.
//!
//! - [`GameStateDocument`]: one parsed snapshot of the game
//! - [`StateProvider`]: `get_state` / `execute_action` / `reset`
//! - [`LocalProvider`]: runs [`crate::games::grid::GridGame`] in process
//! - [`RemoteProvider`]: talks to a game server over HTTP

pub mod document;
pub mod local;
pub mod provider;
pub mod remote;

pub use document::{GameStateDocument, Level, Status};
pub use local::LocalProvider;
pub use provider::{StateProvider, Visibility};
pub use remote::{RemoteProvider, DEFAULT_URL_TEMPLATE};
