//! Dispatch core and daemon for the cuebridge remote-control gateway.
//!
//! Clients connect over TCP or a Unix socket and send one JSON request per
//! line. Each request names a command and carries a `message-id` that is
//! echoed in its single response. The [`Dispatcher`] decides, per request,
//! whether the calling connection may invoke the command, resolves the name
//! through an immutable [`CommandRegistry`] and runs the bound handler
//! against the shared in-memory [`Studio`].
//!
//! ## Authentication
//!
//! When the live [`AuthPolicy`] requires it, only the commands in the
//! [`AuthExemptSet`] (`GetVersion`, `GetAuthRequired` and `Authenticate`)
//! run on an unauthenticated connection. A successful `Authenticate` marks
//! the [`ConnectionContext`] for the rest of that connection.
//!
//! ## Bootstrap
//!
//! [`bootstrap_with`] loads configuration through a [`ConfigLoader`],
//! validates it, starts structured telemetry, prepares the socket and
//! assembles a [`Gateway`]. [`run_daemon`] serves it until a termination
//! signal arrives; `SIGHUP` reloads the authentication settings instead.
//! Lifecycle events flow through a [`HealthReporter`].

mod auth;
mod bootstrap;
mod commands;
mod dispatch;
mod health;
mod process;
pub mod studio;
pub mod telemetry;
mod transport;

pub use auth::{Authenticator, SharedSecretAuthenticator};
pub use bootstrap::{
    BootstrapError, ConfigLoader, Gateway, ReloadError, StaticConfigLoader, SystemConfigLoader,
    bootstrap_with,
};
pub use commands::{CommandError, CommandResult, ReplyFn, build_registry, respond};
pub use dispatch::{
    AtomicAuthPolicy, AuthExemptSet, AuthPolicy, CommandContext, CommandHandler, CommandRegistry,
    ConnectionContext, DispatchError, Dispatcher, ExemptSetError, Fields, GatewayConnectionHandler,
    MESSAGE_ID_KEY, NOT_AUTHENTICATED, REQUEST_TYPE_KEY, RegistryBuilder, RegistryError,
    RegistryOptions, Request, Response, ResponseWriter, STANDARD_EXEMPT_COMMANDS, UNKNOWN_COMMAND,
};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use process::{LaunchError, SignalError, run_daemon};
pub use studio::{Studio, StudioHandle};
pub use telemetry::{TelemetryError, TelemetryHandle};

#[cfg(test)]
mod tests;
