//! Defines the unified error surface for gateway launch and supervision.

use thiserror::Error;

use crate::bootstrap::BootstrapError;
use crate::transport::ListenerError;

use super::signals::SignalError;

/// Errors surfaced while launching or supervising the gateway process.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Bootstrapping the gateway failed.
    #[error("gateway bootstrap failed: {source}")]
    Bootstrap {
        /// Underlying bootstrap error.
        #[source]
        source: BootstrapError,
    },
    /// Socket listener startup or teardown failed.
    #[error("gateway socket listener failed: {source}")]
    Listener {
        /// Underlying listener error.
        #[source]
        source: ListenerError,
    },
    /// Process signals could not be received.
    #[error("failed to receive process signals: {source}")]
    Signals {
        /// Underlying signal error.
        #[source]
        source: SignalError,
    },
}

impl From<BootstrapError> for LaunchError {
    fn from(source: BootstrapError) -> Self {
        Self::Bootstrap { source }
    }
}

impl From<ListenerError> for LaunchError {
    fn from(source: ListenerError) -> Self {
        Self::Listener { source }
    }
}

impl From<SignalError> for LaunchError {
    fn from(source: SignalError) -> Self {
        Self::Signals { source }
    }
}
