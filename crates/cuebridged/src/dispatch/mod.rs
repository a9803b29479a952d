//! Request dispatch for the gateway.
//!
//! The dispatch core resolves each decoded request to exactly one handler
//! out of an immutable [`CommandRegistry`], after an authorisation gate
//! consults the live [`AuthPolicy`], the [`AuthExemptSet`] and the calling
//! connection's [`ConnectionContext`].
//!
//! ## Protocol
//!
//! Clients send one JSON object per line. The envelope keys select the
//! command and carry the correlation token; every other key is a parameter:
//!
//! ```json
//! {"request-type":"SetCurrentScene","message-id":"42","scene-name":"Live"}
//! ```
//!
//! Every request line is answered with exactly one response line echoing
//! the token:
//!
//! ```json
//! {"status":"ok","message-id":"42"}
//! {"status":"error","message-id":"43","error":"Not Authenticated"}
//! ```
//!
//! ## Outcomes
//!
//! Unauthenticated calls to protected commands fail with
//! `"Not Authenticated"` and unregistered names fail with
//! `"invalid request type"`. Anything else is the handler's own response,
//! including a synthesised failure when the handler panics.

mod command;
mod context;
mod dispatcher;
mod errors;
mod exempt;
mod handler;
mod policy;
mod registry;
mod request;
mod response;

pub use self::command::{CommandContext, CommandHandler};
pub use self::context::ConnectionContext;
pub use self::dispatcher::{Dispatcher, NOT_AUTHENTICATED, UNKNOWN_COMMAND};
pub use self::errors::{DispatchError, ExemptSetError, RegistryError};
pub use self::exempt::{AuthExemptSet, STANDARD_EXEMPT_COMMANDS};
pub use self::handler::GatewayConnectionHandler;
pub use self::policy::{AtomicAuthPolicy, AuthPolicy};
pub use self::registry::{CommandRegistry, RegistryBuilder, RegistryOptions};
pub use self::request::{MESSAGE_ID_KEY, REQUEST_TYPE_KEY, Request};
pub use self::response::{Fields, Response, ResponseWriter};

pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");
