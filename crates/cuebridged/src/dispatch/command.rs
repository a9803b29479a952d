//! The seam between the dispatcher and command implementations.

use crate::auth::Authenticator;
use crate::studio::StudioHandle;

use super::context::ConnectionContext;
use super::policy::AuthPolicy;
use super::registry::CommandRegistry;
use super::request::Request;
use super::response::Response;

/// Everything a handler may touch while serving one request.
pub struct CommandContext<'a> {
    /// Session state for the calling connection.
    pub connection: &'a mut ConnectionContext,
    /// Shared application model.
    pub studio: &'a StudioHandle,
    /// Live authentication policy.
    pub policy: &'a dyn AuthPolicy,
    /// Credential verifier used by `Authenticate`.
    pub authenticator: &'a dyn Authenticator,
    /// The registry this request was resolved from.
    pub registry: &'a CommandRegistry,
}

/// A named, externally invocable operation.
///
/// Implemented for any `Fn(&mut CommandContext<'_>, &Request) -> Response`,
/// so plain functions can be registered directly.
pub trait CommandHandler: Send + Sync {
    /// Serves a single request, returning exactly one response.
    fn handle(&self, context: &mut CommandContext<'_>, request: &Request) -> Response;
}

impl<F> CommandHandler for F
where
    F: Fn(&mut CommandContext<'_>, &Request) -> Response + Send + Sync,
{
    fn handle(&self, context: &mut CommandContext<'_>, request: &Request) -> Response {
        self(context, request)
    }
}
