//! Gateway bootstrap orchestration.

use std::fmt;
use std::sync::Arc;

use ortho_config::OrthoError;
use thiserror::Error;
use tracing::warn;

use cuebridge_config::{Config, ConfigValidationError, SocketPreparationError};

use crate::auth::{Authenticator, SharedSecretAuthenticator};
use crate::commands;
use crate::dispatch::{
    AtomicAuthPolicy, AuthExemptSet, AuthPolicy, Dispatcher, ExemptSetError,
    GatewayConnectionHandler, RegistryError, RegistryOptions,
};
use crate::health::HealthReporter;
use crate::studio::StudioHandle;
use crate::telemetry::{self, TelemetryError, TelemetryHandle};
use crate::transport::{ListenerError, ListenerHandle, SocketListener};

const BOOTSTRAP_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::bootstrap");

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the gateway configuration.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that delegates to [`Config::load`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load()
    }
}

/// Loader that always yields the configuration it was built with.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps an already resolved configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// Configuration loaded but is not usable.
    #[error("invalid configuration: {source}")]
    Validation {
        /// The violated constraint.
        #[source]
        source: ConfigValidationError,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// Socket preparation failed.
    #[error("failed to prepare gateway socket: {source}")]
    Socket {
        /// Filesystem error reported while preparing the socket directory.
        #[source]
        source: SocketPreparationError,
    },
    /// The command table could not be registered.
    #[error("failed to build command registry: {source}")]
    Registry {
        /// Duplicate or dangling registration.
        #[source]
        source: RegistryError,
    },
    /// The auth-exempt set named an unregistered command.
    #[error("failed to build auth-exempt set: {source}")]
    ExemptSet {
        /// Underlying exempt-set error.
        #[source]
        source: ExemptSetError,
    },
}

/// Reasons a configuration reload is refused.
#[derive(Debug, Error)]
pub enum ReloadError {
    /// The configuration could not be loaded.
    #[error("failed to reload configuration: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// The reloaded configuration is not usable.
    #[error("reloaded configuration is invalid: {source}")]
    Validation {
        /// The violated constraint.
        #[source]
        source: ConfigValidationError,
    },
}

/// A fully assembled gateway, ready to bind its listener.
pub struct Gateway {
    config: Config,
    policy: Arc<AtomicAuthPolicy>,
    authenticator: Arc<SharedSecretAuthenticator>,
    dispatcher: Arc<Dispatcher>,
    telemetry: TelemetryHandle,
    reporter: Arc<dyn HealthReporter>,
}

impl Gateway {
    /// The configuration resolved at startup.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Accessor for the telemetry handle, primarily useful for testing.
    #[must_use]
    pub fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }

    /// The live authentication policy shared with every connection.
    #[must_use]
    pub fn policy(&self) -> &AtomicAuthPolicy {
        &self.policy
    }

    /// The dispatcher serving every connection.
    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// The studio shared by all handlers.
    #[must_use]
    pub fn studio(&self) -> &StudioHandle {
        self.dispatcher.studio()
    }

    /// Binds the configured endpoint without accepting yet.
    pub(crate) fn bind(&self) -> Result<SocketListener, ListenerError> {
        SocketListener::bind(self.config.listen_socket())
    }

    /// Starts accepting connections on `listener`.
    pub(crate) fn serve(&self, listener: SocketListener) -> Result<ListenerHandle, ListenerError> {
        let endpoint = listener.endpoint().clone();
        let address = listener.local_addr();
        let handler = Arc::new(GatewayConnectionHandler::new(Arc::clone(&self.dispatcher)));
        let handle = listener.start(handler, Arc::clone(&self.reporter))?;
        self.reporter.listener_ready(&endpoint, address);
        Ok(handle)
    }

    /// Stops the listener and waits for its accept loop to finish.
    ///
    /// Connections still open keep being served until their clients leave.
    pub(crate) fn stop(&self, handle: ListenerHandle) -> Result<(), ListenerError> {
        handle.shutdown();
        let open_connections = handle.open_connections();
        handle.join()?;
        self.reporter
            .listener_stopped(self.config.listen_socket(), open_connections);
        Ok(())
    }

    /// Reloads configuration and applies the authentication settings.
    ///
    /// Nothing changes unless the new configuration validates. Other
    /// settings need a restart and are only compared.
    ///
    /// # Errors
    ///
    /// Returns [`ReloadError`] when loading or validation fails.
    pub fn reload(&self, loader: &dyn ConfigLoader) -> Result<(), ReloadError> {
        let outcome = self.apply_reload(loader);
        match &outcome {
            Ok(config) => self.reporter.configuration_reloaded(config),
            Err(error) => self.reporter.reload_rejected(error),
        }
        outcome.map(drop)
    }

    fn apply_reload(&self, loader: &dyn ConfigLoader) -> Result<Config, ReloadError> {
        let config = loader
            .load()
            .map_err(|source| ReloadError::Configuration { source })?;
        config
            .validate()
            .map_err(|source| ReloadError::Validation { source })?;

        if config.listen_socket() != self.config.listen_socket()
            || config.log_filter() != self.config.log_filter()
            || config.log_format() != self.config.log_format()
        {
            warn!(
                target: BOOTSTRAP_TARGET,
                "listener and logging settings changed; they apply after a restart"
            );
        }

        self.authenticator.replace_secret(config.auth_secret());
        self.policy.set_required(config.auth_required());
        Ok(config)
    }
}

impl fmt::Debug for Gateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gateway")
            .field("config", &self.config)
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}

/// Bootstraps the gateway using the supplied collaborators.
///
/// Each failure is reported to `reporter` before it is returned.
pub fn bootstrap_with(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
    options: RegistryOptions,
) -> Result<Gateway, BootstrapError> {
    reporter.bootstrap_starting();
    match assemble(loader, &reporter, options) {
        Ok(gateway) => {
            reporter.bootstrap_succeeded(&gateway.config);
            Ok(gateway)
        }
        Err(error) => {
            reporter.bootstrap_failed(&error);
            Err(error)
        }
    }
}

fn assemble(
    loader: &dyn ConfigLoader,
    reporter: &Arc<dyn HealthReporter>,
    options: RegistryOptions,
) -> Result<Gateway, BootstrapError> {
    let config = loader
        .load()
        .map_err(|source| BootstrapError::Configuration { source })?;
    config
        .validate()
        .map_err(|source| BootstrapError::Validation { source })?;
    let telemetry =
        telemetry::initialise(&config).map_err(|source| BootstrapError::Telemetry { source })?;
    if !config.auth_required() && !config.listen_socket().is_local() {
        warn!(
            target: BOOTSTRAP_TARGET,
            endpoint = %config.listen_socket(),
            "listening beyond this machine without authentication"
        );
    }
    config
        .listen_socket()
        .prepare_filesystem()
        .map_err(|source| BootstrapError::Socket { source })?;

    let registry =
        commands::build_registry(options).map_err(|source| BootstrapError::Registry { source })?;
    let exempt =
        AuthExemptSet::standard(&registry).map_err(|source| BootstrapError::ExemptSet { source })?;
    let policy = Arc::new(AtomicAuthPolicy::new(config.auth_required()));
    let authenticator = Arc::new(SharedSecretAuthenticator::from_config(&config));
    let dispatcher = Dispatcher::new(
        Arc::new(registry),
        Arc::new(exempt),
        Arc::clone(&policy) as Arc<dyn AuthPolicy>,
        Arc::clone(&authenticator) as Arc<dyn Authenticator>,
        StudioHandle::default(),
    );

    Ok(Gateway {
        config,
        policy,
        authenticator,
        dispatcher: Arc::new(dispatcher),
        telemetry,
        reporter: Arc::clone(reporter),
    })
}
