//! Drives command handlers directly, without a dispatcher or socket.

use serde_json::Value;

use crate::auth::SharedSecretAuthenticator;
use crate::dispatch::{
    AtomicAuthPolicy, CommandContext, CommandRegistry, ConnectionContext, Fields, RegistryOptions,
    Request, Response,
};
use crate::studio::{Studio, StudioHandle};

use super::build_registry;

pub(crate) const SECRET: &str = "hunter2";

/// One connection's view of a fresh demo studio.
pub(crate) struct Session {
    pub connection: ConnectionContext,
    pub studio: StudioHandle,
    pub policy: AtomicAuthPolicy,
    authenticator: SharedSecretAuthenticator,
    registry: CommandRegistry,
}

impl Session {
    pub fn new() -> Self {
        Self {
            connection: ConnectionContext::new(1),
            studio: StudioHandle::default(),
            policy: AtomicAuthPolicy::new(false),
            authenticator: SharedSecretAuthenticator::new(Some(SECRET)),
            registry: build_registry(RegistryOptions { captions: true }).expect("registry"),
        }
    }

    pub fn call(&mut self, command: &str, params: Value) -> Response {
        let Value::Object(params) = params else {
            panic!("params must be a JSON object");
        };
        let request = Request::new(command, "test", params);
        let handler = self
            .registry
            .resolve(command)
            .unwrap_or_else(|| panic!("{command} is not registered"))
            .clone();
        let mut context = CommandContext {
            connection: &mut self.connection,
            studio: &self.studio,
            policy: &self.policy,
            authenticator: &self.authenticator,
            registry: &self.registry,
        };
        handler.handle(&mut context, &request)
    }

    /// Calls `command` and returns its fields, failing the test on an error.
    pub fn ok(&mut self, command: &str, params: Value) -> Fields {
        let response = self.call(command, params);
        match response.fields() {
            Some(fields) => fields.clone(),
            None => panic!("{command} failed: {:?}", response.error()),
        }
    }

    /// Calls `command` and returns its error text, failing the test on success.
    pub fn err(&mut self, command: &str, params: Value) -> String {
        let response = self.call(command, params);
        match response.error() {
            Some(error) => error.to_owned(),
            None => panic!("{command} unexpectedly succeeded"),
        }
    }

    pub fn studio<R>(&self, f: impl FnOnce(&mut Studio) -> R) -> R {
        self.studio.with_studio(f)
    }
}
