//! Request envelope parsing.
//!
//! A request line is a JSON object carrying the command name under
//! `request-type`, the correlation token under `message-id`, and any number
//! of command parameters alongside them:
//!
//! ```json
//! {"request-type":"SetCurrentScene","message-id":"42","scene-name":"Live"}
//! ```
//!
//! Parameters are kept as loosely typed JSON; each handler validates its own.

use serde_json::{Map, Value};

use super::errors::DispatchError;

/// Wire key holding the command name.
pub const REQUEST_TYPE_KEY: &str = "request-type";
/// Wire key holding the correlation token.
pub const MESSAGE_ID_KEY: &str = "message-id";

/// Parsed, immutable request from a client.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    command: String,
    token: String,
    params: Map<String, Value>,
}

impl Request {
    /// Builds a request directly, bypassing the wire envelope.
    pub fn new(
        command: impl Into<String>,
        token: impl Into<String>,
        params: Map<String, Value>,
    ) -> Self {
        Self {
            command: command.into(),
            token: token.into(),
            params,
        }
    }

    /// Builds a request with no parameters.
    pub fn bare(command: impl Into<String>, token: impl Into<String>) -> Self {
        Self::new(command, token, Map::new())
    }

    /// Parses a request line.
    ///
    /// Trailing whitespace (including the newline delimiter) is trimmed
    /// before parsing.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::MalformedJson`] when the line is not JSON and
    /// [`DispatchError::InvalidStructure`] when the envelope keys are absent
    /// or mistyped.
    pub fn parse(line: &[u8]) -> Result<Self, DispatchError> {
        let trimmed = trim_trailing_whitespace(line);
        if trimmed.is_empty() {
            return Err(DispatchError::malformed("empty request line"));
        }

        let value: Value = serde_json::from_slice(trimmed).map_err(DispatchError::from_json_error)?;
        let Value::Object(mut params) = value else {
            return Err(DispatchError::invalid_structure(
                "request must be a JSON object",
            ));
        };

        let token = take_string(&mut params, MESSAGE_ID_KEY)?;
        let command = take_string(&mut params, REQUEST_TYPE_KEY)?;
        if command.is_empty() {
            return Err(DispatchError::invalid_structure(format!(
                "'{REQUEST_TYPE_KEY}' must not be empty"
            )));
        }

        Ok(Self {
            command,
            token,
            params,
        })
    }

    /// Command name, matched case-sensitively against the registry.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Caller-supplied correlation token.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Command parameters, excluding the envelope keys.
    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    /// Looks up a single parameter.
    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }
}

/// Best-effort extraction of the correlation token from a rejected line.
///
/// Returns an empty string when the line is not a JSON object or carries no
/// string `message-id`.
pub fn recover_message_id(line: &[u8]) -> String {
    serde_json::from_slice::<Value>(trim_trailing_whitespace(line))
        .ok()
        .and_then(|value| {
            value
                .get(MESSAGE_ID_KEY)
                .and_then(Value::as_str)
                .map(str::to_owned)
        })
        .unwrap_or_default()
}

/// Whether a line carries nothing but whitespace.
pub fn is_blank(line: &[u8]) -> bool {
    trim_trailing_whitespace(line).is_empty()
}

fn take_string(params: &mut Map<String, Value>, key: &str) -> Result<String, DispatchError> {
    match params.remove(key) {
        Some(Value::String(value)) => Ok(value),
        Some(_) => Err(DispatchError::invalid_structure(format!(
            "'{key}' must be a string"
        ))),
        None => Err(DispatchError::invalid_structure(format!(
            "missing '{key}'"
        ))),
    }
}

/// Trims trailing ASCII whitespace from a byte slice.
fn trim_trailing_whitespace(bytes: &[u8]) -> &[u8] {
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(0, |pos| pos + 1);
    bytes.get(..end).unwrap_or_default()
}
