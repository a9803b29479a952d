//! Failures reported by command handlers.

use thiserror::Error;

use crate::studio::StudioError;

/// Error surfaced to the client as the `error` field of a failure response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// A required parameter is absent.
    #[error("missing request parameters")]
    MissingParameter { name: String },

    /// A parameter is present but has the wrong shape or an invalid value.
    #[error("invalid request parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error(transparent)]
    Studio(#[from] StudioError),

    /// The command is known but this backend cannot provide it.
    #[error("{command} is not supported by this studio backend")]
    Unsupported { command: String },

    /// A session-level refusal such as a failed authentication.
    #[error("{0}")]
    Rejected(&'static str),
}

impl CommandError {
    pub fn missing(name: &str) -> Self {
        Self::MissingParameter {
            name: name.to_owned(),
        }
    }

    pub fn invalid(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.to_owned(),
            reason: reason.into(),
        }
    }
}
