//! Shared configuration for the cuebridge remote-control gateway.
//!
//! Configuration is layered by [`ortho_config`]: built-in defaults, then a
//! configuration file (`--config-path` or `CUEBRIDGE_CONFIG_PATH`), then
//! `CUEBRIDGE_*` environment variables, then command-line flags.
//!
//! The daemon loads this once at startup and again on `SIGHUP`. A reload
//! only applies the authentication settings.

mod defaults;
mod logging;
mod socket;

use std::borrow::Cow;
use std::ffi::OsString;
use std::sync::Arc;

use ortho_config::declarative::LayerComposition;
use ortho_config::serde_json::Value;
use ortho_config::{MergeLayer, MergeProvenance, OrthoConfig, OrthoError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_TCP_HOST, DEFAULT_TCP_PORT, default_log_filter,
    default_log_filter_string, default_log_format, default_socket_endpoint,
};
pub use logging::{LogFormat, LogFormatParseError};
pub use socket::{SocketEndpoint, SocketParseError, SocketPreparationError};

/// Resolved gateway configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "CUEBRIDGE")]
pub struct Config {
    /// Endpoint accepting remote-control connections.
    #[ortho_config(default = default_socket_endpoint())]
    pub listen_socket: SocketEndpoint,
    /// Whether clients must authenticate before issuing most commands.
    #[ortho_config(default = false)]
    pub auth_required: bool,
    /// Shared secret clients present to `Authenticate`.
    pub auth_secret: Option<String>,
    /// `tracing` filter expression.
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Output format for telemetry.
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_socket: default_socket_endpoint(),
            auth_required: false,
            auth_secret: None,
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

/// Switches whose command-line flag can only turn them on.
///
/// clap reports an absent `SetTrue` flag as `false`, which would otherwise
/// clobber a `true` from the configuration file or environment.
const CLI_SWITCHES: &[&str] = &["auth_required"];

impl Config {
    /// Loads configuration from the process arguments, environment and any
    /// configuration file.
    ///
    /// # Errors
    ///
    /// Returns the loader error when a layer is malformed.
    pub fn load() -> Result<Self, Arc<OrthoError>> {
        Self::load_from_iter(std::env::args_os())
    }

    /// Loads configuration using `args` in place of the process arguments.
    ///
    /// # Errors
    ///
    /// Returns the loader error when a layer is malformed.
    pub fn load_from_iter<I, T>(args: I) -> Result<Self, Arc<OrthoError>>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let (layers, errors) = Self::compose_layers_from_iter(args).into_parts();
        let layers = layers.into_iter().map(drop_unset_switches).collect();
        LayerComposition::new(layers, errors)
            .into_merge_result(|layers| Self::merge_from_layers(layers))
    }

    /// Endpoint accepting remote-control connections.
    #[must_use]
    pub fn listen_socket(&self) -> &SocketEndpoint {
        &self.listen_socket
    }

    /// Whether authentication is required at startup.
    #[must_use]
    pub fn auth_required(&self) -> bool {
        self.auth_required
    }

    /// Configured shared secret, ignoring blank values.
    #[must_use]
    pub fn auth_secret(&self) -> Option<&str> {
        self.auth_secret
            .as_deref()
            .filter(|secret| !secret.trim().is_empty())
    }

    /// `tracing` filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Output format for telemetry.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Checks invariants that the layered loader cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigValidationError::MissingAuthSecret`] when
    /// authentication is required but no secret is configured, since no
    /// client could ever authenticate.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.auth_required && self.auth_secret().is_none() {
            return Err(ConfigValidationError::MissingAuthSecret);
        }
        Ok(())
    }
}

fn drop_unset_switches(layer: MergeLayer<'static>) -> MergeLayer<'static> {
    if layer.provenance() != MergeProvenance::Cli {
        return layer;
    }
    let mut value = layer.into_value();
    if let Value::Object(fields) = &mut value {
        for switch in CLI_SWITCHES {
            if fields.get(*switch) == Some(&Value::Bool(false)) {
                fields.remove(*switch);
            }
        }
    }
    MergeLayer::cli(Cow::Owned(value))
}

/// Semantic errors in an otherwise well-formed configuration.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigValidationError {
    /// `auth_required` is set without an `auth_secret`.
    #[error("authentication is required but no auth_secret is configured")]
    MissingAuthSecret,
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn defaults_listen_on_loopback() {
        let config = Config::default();
        assert_eq!(config.listen_socket(), &default_socket_endpoint());
        assert!(!config.auth_required());
        assert_eq!(config.log_filter(), DEFAULT_LOG_FILTER);
        assert_eq!(config.log_format(), LogFormat::Json);
    }

    #[rstest]
    #[case(None)]
    #[case(Some("   "))]
    fn required_auth_needs_a_secret(#[case] secret: Option<&str>) {
        let config = Config {
            auth_required: true,
            auth_secret: secret.map(str::to_owned),
            ..Config::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::MissingAuthSecret)
        );
    }

    #[test]
    fn required_auth_with_secret_is_valid() {
        let config = Config {
            auth_required: true,
            auth_secret: Some(String::from("hunter2")),
            ..Config::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn optional_auth_without_secret_is_valid() {
        assert!(Config::default().validate().is_ok());
    }
}
