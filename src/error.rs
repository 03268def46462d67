//! Error types shared across the crate.
//!
//! Every fallible operation returns [`Result`]. Provider faults are wrapped
//! once as [`GymError::StateUnavailable`] and never retried here; the caller
//! decides whether to abort the episode.

use thiserror::Error;

/// Result type alias for environment operations.
pub type Result<T> = std::result::Result<T, GymError>;

/// Errors surfaced by the environment core.
#[derive(Debug, Error)]
pub enum GymError {
    /// A state document is missing a required entity or field.
    #[error("malformed state: {0}")]
    MalformedState(String),

    /// A tracked entity has no configured variant index.
    #[error("no variant mapping for key `{key}` (entity type `{entity_type}`)")]
    UnmappedVariant {
        /// Full entity type tag.
        entity_type: String,
        /// Lookup key that failed (pin colour or base type name).
        key: String,
    },

    /// The state provider failed to produce a document.
    #[error("state unavailable: {0}")]
    StateUnavailable(#[from] ProviderError),

    /// Action index outside the action vocabulary.
    #[error("invalid action index {index} (vocabulary has {count} actions)")]
    InvalidAction {
        /// Index received.
        index: usize,
        /// Vocabulary size.
        count: usize,
    },

    /// `step` called before the first `reset`.
    #[error("environment must be reset before stepping")]
    NotReset,

    /// `step` called after a terminal step with auto-reset disabled.
    #[error("episode has terminated; call reset")]
    EpisodeTerminated,

    /// Configuration could not be loaded or failed validation.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Faults raised by a state provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The local simulator rejected the request.
    #[error("simulator fault: {0}")]
    Simulator(String),

    /// The remote server could not be reached.
    #[error("transport fault: {0}")]
    Transport(#[from] reqwest::Error),

    /// The remote server answered with a non-success status.
    #[error("server returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// The response body was not a valid document.
    #[error("undecodable response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl GymError {
    /// Shorthand for a malformed-state error.
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        GymError::MalformedState(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_fault_wraps_as_state_unavailable() {
        let err: GymError = ProviderError::Simulator("boom".into()).into();
        assert!(matches!(err, GymError::StateUnavailable(_)));
        assert_eq!(err.to_string(), "state unavailable: simulator fault: boom");
    }

    #[test]
    fn test_unmapped_variant_message() {
        let err = GymError::UnmappedVariant {
            entity_type: "monster_big".into(),
            key: "monster".into(),
        };
        assert_eq!(
            err.to_string(),
            "no variant mapping for key `monster` (entity type `monster_big`)"
        );
    }

    #[test]
    fn test_decode_error_converts() {
        let bad = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: GymError = ProviderError::from(bad).into();
        assert!(err.to_string().starts_with("state unavailable: undecodable response"));
    }
}
