//! Test double for [`HealthReporter`] that records structured events for assertions.

use std::net::SocketAddr;
use std::sync::Mutex;

use cuebridge_config::{Config, SocketEndpoint};

use crate::bootstrap::{BootstrapError, ReloadError};
use crate::health::HealthReporter;

/// Structured health events tracked during scenarios.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HealthEvent {
    /// Bootstrap started.
    BootstrapStarting,
    /// Bootstrap completed successfully.
    BootstrapSucceeded,
    /// Bootstrap failed with an error description.
    BootstrapFailed(String),
    /// The listener began accepting connections.
    ListenerReady,
    /// The listener stopped.
    ListenerStopped,
    /// A client connection was accepted.
    ConnectionOpened(u64),
    /// A client connection finished.
    ConnectionClosed(u64),
    /// A reload applied new authentication settings.
    ConfigurationReloaded,
    /// A reload was refused with an error description.
    ReloadRejected(String),
}

/// Records health events for assertions.
#[derive(Debug, Default)]
pub struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    /// Captures a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .clone()
    }

    fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn bootstrap_starting(&self) {
        self.record(HealthEvent::BootstrapStarting);
    }

    fn bootstrap_succeeded(&self, _config: &Config) {
        self.record(HealthEvent::BootstrapSucceeded);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.record(HealthEvent::BootstrapFailed(error.to_string()));
    }

    fn listener_ready(&self, _endpoint: &SocketEndpoint, _address: Option<SocketAddr>) {
        self.record(HealthEvent::ListenerReady);
    }

    fn listener_stopped(&self, _endpoint: &SocketEndpoint, _open_connections: usize) {
        self.record(HealthEvent::ListenerStopped);
    }

    fn connection_opened(&self, id: u64, _open: usize) {
        self.record(HealthEvent::ConnectionOpened(id));
    }

    fn connection_closed(&self, id: u64, _open: usize) {
        self.record(HealthEvent::ConnectionClosed(id));
    }

    fn configuration_reloaded(&self, _config: &Config) {
        self.record(HealthEvent::ConfigurationReloaded);
    }

    fn reload_rejected(&self, error: &ReloadError) {
        self.record(HealthEvent::ReloadRejected(error.to_string()));
    }
}
