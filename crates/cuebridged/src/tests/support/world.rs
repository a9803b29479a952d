//! BDD test world: owns the loader, reporter, bootstrapped gateway and any
//! served listener and client connection for step functions.

use std::cell::RefCell;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use serde_json::Value;

use crate::bootstrap::{BootstrapError, ConfigLoader, Gateway, bootstrap_with};
use crate::dispatch::RegistryOptions;
use crate::transport::ListenerHandle;

use super::client::GatewayClient;
use super::config_loader::{FailingConfigLoader, TestConfigLoader};
use super::reporter::RecordingHealthReporter;

/// Scenario world shared across BDD steps.
pub struct TestWorld {
    loader: Box<dyn ConfigLoader>,
    pub reporter: Arc<RecordingHealthReporter>,
    gateway: Option<Gateway>,
    bootstrap_error: Option<BootstrapError>,
    listener: Option<ListenerHandle>,
    address: Option<SocketAddr>,
    client: Option<GatewayClient>,
    responses: HashMap<String, Value>,
    raw: Option<Value>,
}

impl TestWorld {
    /// Builds a world with a successful configuration loader.
    #[must_use]
    pub fn new() -> Self {
        Self {
            loader: Box::new(TestConfigLoader::new()),
            reporter: Arc::new(RecordingHealthReporter::default()),
            gateway: None,
            bootstrap_error: None,
            listener: None,
            address: None,
            client: None,
            responses: HashMap::new(),
            raw: None,
        }
    }

    /// Installs `loader` for the next bootstrap.
    pub fn use_loader(&mut self, loader: impl ConfigLoader + 'static) {
        self.loader = Box::new(loader);
        self.reset_results();
    }

    /// Installs a loader that always fails.
    pub fn use_failing_loader(&mut self) {
        self.use_loader(FailingConfigLoader);
    }

    /// Runs the bootstrap sequence once.
    pub fn bootstrap(&mut self) {
        if self.gateway.is_some() || self.bootstrap_error.is_some() {
            return;
        }

        let reporter = Arc::clone(&self.reporter);
        match bootstrap_with(&*self.loader, reporter, RegistryOptions { captions: true }) {
            Ok(gateway) => self.gateway = Some(gateway),
            Err(error) => self.bootstrap_error = Some(error),
        }
    }

    /// Returns whether bootstrap produced an error.
    #[must_use]
    pub fn bootstrap_error(&self) -> Option<&BootstrapError> {
        self.bootstrap_error.as_ref()
    }

    /// The bootstrapped gateway; panics when bootstrap has not succeeded.
    #[must_use]
    pub fn gateway(&self) -> &Gateway {
        self.gateway.as_ref().expect("gateway was not bootstrapped")
    }

    /// Bootstraps if needed, then binds and serves the listener.
    pub fn serve(&mut self) {
        self.bootstrap();
        let gateway = self.gateway();
        let listener = gateway.bind().expect("bind gateway listener");
        let address = listener.local_addr();
        let handle = gateway.serve(listener).expect("serve gateway");
        self.address = address;
        self.listener = Some(handle);
    }

    /// The served loopback address.
    #[must_use]
    pub fn address(&self) -> SocketAddr {
        self.address.expect("gateway is not served over TCP")
    }

    /// Opens the scenario's client connection.
    pub fn connect(&mut self) {
        self.client = Some(GatewayClient::connect(self.address()));
    }

    /// Sends a request on the scenario's connection and keeps the response
    /// under its message id.
    pub fn send(&mut self, command: &str, message_id: &str, params: Value) -> Value {
        let client = self.client.as_mut().expect("client is not connected");
        let response = client.call(command, message_id, params);
        self.responses
            .insert(message_id.to_owned(), response.clone());
        response
    }

    /// Sends an unframed line and keeps the response as the latest raw reply.
    pub fn send_raw(&mut self, line: &str) {
        let client = self.client.as_mut().expect("client is not connected");
        self.raw = Some(client.send_line(line));
    }

    /// The reply to the last raw line.
    #[must_use]
    pub fn raw_response(&self) -> &Value {
        self.raw.as_ref().expect("no raw line was sent")
    }

    /// The response recorded for `message_id`.
    #[must_use]
    pub fn response(&self, message_id: &str) -> &Value {
        self.responses
            .get(message_id)
            .unwrap_or_else(|| panic!("no response recorded for '{message_id}'"))
    }

    /// Stops a served listener.
    pub fn stop(&mut self) {
        if let Some(handle) = self.listener.take() {
            self.gateway()
                .stop(handle)
                .expect("stop gateway listener");
        }
    }

    fn reset_results(&mut self) {
        self.stop();
        self.gateway = None;
        self.bootstrap_error = None;
        self.client = None;
        self.responses.clear();
        self.raw = None;
    }
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TestWorld {
    fn drop(&mut self) {
        self.client = None;
        if let Some(handle) = self.listener.take() {
            handle.shutdown();
            let _ = handle.join();
        }
    }
}

/// Default test world fixture.
#[must_use]
pub fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::new())
}
