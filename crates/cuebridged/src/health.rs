//! Structured health reporting for gateway lifecycle events.

use std::net::SocketAddr;
use std::sync::Arc;

use cuebridge_config::{Config, SocketEndpoint};

use crate::bootstrap::{BootstrapError, ReloadError};

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait HealthReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn bootstrap_starting(&self);

    /// Invoked after bootstrap completes successfully.
    fn bootstrap_succeeded(&self, config: &Config);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked once the listener accepts connections.
    ///
    /// `address` is the bound TCP address, absent for Unix sockets.
    fn listener_ready(&self, endpoint: &SocketEndpoint, address: Option<SocketAddr>);

    /// Invoked after the listener has stopped and been joined.
    ///
    /// `open_connections` counts clients still being served at that point.
    fn listener_stopped(&self, endpoint: &SocketEndpoint, open_connections: usize);

    /// Invoked when connection `id` is accepted; `open` includes it.
    fn connection_opened(&self, id: u64, open: usize);

    /// Invoked once connection `id` has been fully served.
    fn connection_closed(&self, id: u64, open: usize);

    /// Invoked after a reload applied new authentication settings.
    fn configuration_reloaded(&self, config: &Config);

    /// Invoked when a reload was refused and the previous settings remain.
    fn reload_rejected(&self, error: &ReloadError);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        (**self).bootstrap_succeeded(config);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn listener_ready(&self, endpoint: &SocketEndpoint, address: Option<SocketAddr>) {
        (**self).listener_ready(endpoint, address);
    }

    fn listener_stopped(&self, endpoint: &SocketEndpoint, open_connections: usize) {
        (**self).listener_stopped(endpoint, open_connections);
    }

    fn connection_opened(&self, id: u64, open: usize) {
        (**self).connection_opened(id, open);
    }

    fn connection_closed(&self, id: u64, open: usize) {
        (**self).connection_closed(id, open);
    }

    fn configuration_reloaded(&self, config: &Config) {
        (**self).configuration_reloaded(config);
    }

    fn reload_rejected(&self, error: &ReloadError) {
        (**self).reload_rejected(error);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_starting",
            "starting gateway bootstrap"
        );
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_succeeded",
            socket = %config.listen_socket(),
            auth_required = config.auth_required(),
            log_filter = %config.log_filter(),
            log_format = ?config.log_format(),
            "gateway bootstrap completed"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "bootstrap_failed",
            error = %error,
            "gateway bootstrap failed"
        );
    }

    fn listener_ready(&self, endpoint: &SocketEndpoint, address: Option<SocketAddr>) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "listener_ready",
            endpoint = %endpoint,
            address = ?address,
            "gateway accepting connections"
        );
    }

    fn listener_stopped(&self, endpoint: &SocketEndpoint, open_connections: usize) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "listener_stopped",
            endpoint = %endpoint,
            open_connections,
            "gateway stopped accepting connections"
        );
    }

    fn connection_opened(&self, id: u64, open: usize) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "connection_opened",
            connection = id,
            open,
            "client connected"
        );
    }

    fn connection_closed(&self, id: u64, open: usize) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "connection_closed",
            connection = id,
            open,
            "client disconnected"
        );
    }

    fn configuration_reloaded(&self, config: &Config) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "configuration_reloaded",
            auth_required = config.auth_required(),
            auth_secret_configured = config.auth_secret().is_some(),
            "authentication settings reloaded"
        );
    }

    fn reload_rejected(&self, error: &ReloadError) {
        tracing::warn!(
            target: HEALTH_TARGET,
            event = "reload_rejected",
            error = %error,
            "reload refused, keeping previous settings"
        );
    }
}
