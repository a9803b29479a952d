//! Response contract and JSONL serialisation.
//!
//! Every request yields exactly one [`Response`], echoing the request's
//! correlation token. On the wire the variants become:
//!
//! ```json
//! {"status":"ok","message-id":"42","current-scene":"Live"}
//! {"status":"error","message-id":"42","error":"Not Authenticated"}
//! ```

use std::io::Write;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::errors::DispatchError;

/// Result fields carried by a successful response.
pub type Fields = Map<String, Value>;

/// Outcome of a single request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum Response {
    /// The command completed.
    #[serde(rename = "ok")]
    Success {
        /// Token copied from the request.
        #[serde(rename = "message-id")]
        token: String,
        /// Command-specific result fields; opaque to the dispatcher.
        #[serde(flatten)]
        fields: Fields,
    },
    /// The command was rejected or failed.
    #[serde(rename = "error")]
    Failure {
        /// Token copied from the request.
        #[serde(rename = "message-id")]
        token: String,
        /// Human-readable failure reason.
        error: String,
    },
}

impl Response {
    /// Creates a success response carrying `fields`.
    pub fn success(token: impl Into<String>, fields: Fields) -> Self {
        Self::Success {
            token: token.into(),
            fields,
        }
    }

    /// Creates a success response with no fields.
    pub fn ok(token: impl Into<String>) -> Self {
        Self::success(token, Fields::new())
    }

    /// Creates a failure response.
    pub fn failure(token: impl Into<String>, error: impl Into<String>) -> Self {
        Self::Failure {
            token: token.into(),
            error: error.into(),
        }
    }

    /// Correlation token echoed from the request.
    pub fn token(&self) -> &str {
        match self {
            Self::Success { token, .. } | Self::Failure { token, .. } => token,
        }
    }

    /// Whether this is a success response.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Failure message, if any.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error, .. } => Some(error),
        }
    }

    /// Success fields, if any.
    pub fn fields(&self) -> Option<&Fields> {
        match self {
            Self::Success { fields, .. } => Some(fields),
            Self::Failure { .. } => None,
        }
    }
}

/// Writer that serialises responses as JSONL.
pub struct ResponseWriter<W> {
    writer: W,
}

impl<W: Write> ResponseWriter<W> {
    /// Creates a new response writer wrapping the given output stream.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Writes one response line and flushes the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation, writing or flushing fails.
    pub fn write_response(&mut self, response: &Response) -> Result<(), DispatchError> {
        serde_json::to_writer(&mut self.writer, response)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }

    /// Reports a framing error as a failure response.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_error(&mut self, token: &str, error: &DispatchError) -> Result<(), DispatchError> {
        self.write_response(&Response::failure(token, error.to_string()))
    }
}
