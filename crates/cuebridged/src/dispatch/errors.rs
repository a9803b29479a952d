//! Error types for framing and dispatch-core construction failures.
//!
//! Framing errors describe a request line that could not be turned into a
//! [`Request`](super::Request); they are reported to the client as an error
//! response and never reach the dispatcher. Construction errors are raised
//! while the registry and exempt set are assembled at startup.

use std::io;

use thiserror::Error;

/// Errors surfaced while reading, parsing or answering a request line.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Request line could not be parsed as valid JSON.
    #[error("malformed request: {message}")]
    MalformedJson {
        /// Parser diagnostic.
        message: String,
        /// Underlying parser error, if any.
        #[source]
        source: Option<serde_json::Error>,
    },

    /// Request JSON parsed but does not have the request envelope shape.
    #[error("invalid request: {message}")]
    InvalidStructure {
        /// Description of the violated envelope rule.
        message: String,
    },

    /// Request exceeds the maximum allowed size.
    #[error("request too large: more than {max_size} bytes")]
    RequestTooLarge {
        /// Configured limit in bytes.
        max_size: usize,
    },

    /// IO error during read or write.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Response serialisation failed.
    #[error("failed to serialise response: {0}")]
    SerializeResponse(#[from] serde_json::Error),
}

impl DispatchError {
    /// Creates a malformed request error from a serde error.
    pub fn from_json_error(source: serde_json::Error) -> Self {
        Self::MalformedJson {
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Creates a malformed request error with a custom message.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedJson {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an invalid structure error.
    pub fn invalid_structure(message: impl Into<String>) -> Self {
        Self::InvalidStructure {
            message: message.into(),
        }
    }

    /// Creates a request too large error.
    pub fn request_too_large(max_size: usize) -> Self {
        Self::RequestTooLarge { max_size }
    }

    /// Whether the connection must be closed after reporting this error.
    ///
    /// An oversized line leaves the stream positioned mid-request, so the
    /// remaining bytes cannot be reframed.
    pub fn closes_connection(&self) -> bool {
        matches!(self, Self::RequestTooLarge { .. } | Self::Io(_))
    }
}

/// Errors raised while assembling the command registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Two entries share a command name.
    #[error("command '{name}' is registered more than once")]
    DuplicateCommand {
        /// Offending command name.
        name: String,
    },
    /// An alias names a command that is not registered.
    #[error("alias '{alias}' targets unregistered command '{target}'")]
    UnknownAliasTarget {
        /// Alias being declared.
        alias: String,
        /// Missing target command.
        target: String,
    },
}

/// Errors raised while assembling the auth-exempt set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExemptSetError {
    /// An exempt name has no registered handler.
    #[error("auth-exempt command '{name}' is not registered")]
    UnregisteredCommand {
        /// Offending command name.
        name: String,
    },
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(DispatchError::request_too_large(8), true)]
    #[case(DispatchError::malformed("bad"), false)]
    #[case(DispatchError::invalid_structure("bad"), false)]
    fn only_unrecoverable_errors_close_the_connection(
        #[case] error: DispatchError,
        #[case] closes: bool,
    ) {
        assert_eq!(error.closes_connection(), closes);
    }

    #[test]
    fn registry_errors_name_the_command() {
        let error = RegistryError::UnknownAliasTarget {
            alias: String::from("SetSourceRender"),
            target: String::from("Missing"),
        };
        let message = error.to_string();
        assert!(message.contains("SetSourceRender"));
        assert!(message.contains("Missing"));
    }
}
