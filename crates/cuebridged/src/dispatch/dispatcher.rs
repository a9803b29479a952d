//! The per-request authorisation gate, lookup and handler invocation.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{debug, error};

use crate::auth::Authenticator;
use crate::studio::StudioHandle;

use super::DISPATCH_TARGET;
use super::command::CommandContext;
use super::context::ConnectionContext;
use super::exempt::AuthExemptSet;
use super::policy::AuthPolicy;
use super::registry::CommandRegistry;
use super::request::Request;
use super::response::Response;

/// Error text returned when a protected command arrives before `Authenticate`.
pub const NOT_AUTHENTICATED: &str = "Not Authenticated";

/// Error text returned for names missing from the registry.
pub const UNKNOWN_COMMAND: &str = "invalid request type";

/// Routes decoded requests to their handlers.
///
/// Every collaborator is shared, so a single dispatcher serves all
/// connections concurrently. `handle` performs no I/O.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<CommandRegistry>,
    exempt: Arc<AuthExemptSet>,
    policy: Arc<dyn AuthPolicy>,
    authenticator: Arc<dyn Authenticator>,
    studio: StudioHandle,
}

impl Dispatcher {
    /// Assembles a dispatcher from its shared collaborators.
    pub fn new(
        registry: Arc<CommandRegistry>,
        exempt: Arc<AuthExemptSet>,
        policy: Arc<dyn AuthPolicy>,
        authenticator: Arc<dyn Authenticator>,
        studio: StudioHandle,
    ) -> Self {
        Self {
            registry,
            exempt,
            policy,
            authenticator,
            studio,
        }
    }

    /// The registry requests are resolved against.
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// The studio handlers operate on.
    pub fn studio(&self) -> &StudioHandle {
        &self.studio
    }

    /// Produces exactly one response for `request`.
    ///
    /// The gate is evaluated before lookup, so a protected name is rejected
    /// as unauthenticated even when it is not registered. Unregistered names
    /// that are exempt or reached after authentication are rejected as
    /// unknown.
    pub fn handle(&self, connection: &mut ConnectionContext, request: &Request) -> Response {
        let command = request.command();

        if self.rejects_unauthenticated(connection, command) {
            debug!(
                target: DISPATCH_TARGET,
                connection = connection.id(),
                command,
                "rejected unauthenticated request"
            );
            return Response::failure(request.token(), NOT_AUTHENTICATED);
        }

        let Some(handler) = self.registry.resolve(command) else {
            debug!(
                target: DISPATCH_TARGET,
                connection = connection.id(),
                command,
                "rejected unknown command"
            );
            return Response::failure(request.token(), UNKNOWN_COMMAND);
        };

        let connection_id = connection.id();
        let mut context = CommandContext {
            connection,
            studio: &self.studio,
            policy: self.policy.as_ref(),
            authenticator: self.authenticator.as_ref(),
            registry: &self.registry,
        };
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| handler.handle(&mut context, request)));

        match outcome {
            Ok(response) => {
                debug!(
                    target: DISPATCH_TARGET,
                    connection = connection_id,
                    command,
                    success = response.is_success(),
                    "handled request"
                );
                response
            }
            Err(payload) => {
                error!(
                    target: DISPATCH_TARGET,
                    connection = connection_id,
                    command,
                    panic = panic_message(payload.as_ref()),
                    "command handler panicked"
                );
                Response::failure(
                    request.token(),
                    format!("internal error while handling {command}"),
                )
            }
        }
    }

    fn rejects_unauthenticated(&self, connection: &ConnectionContext, command: &str) -> bool {
        self.policy.authentication_required()
            && !self.exempt.is_exempt(command)
            && !connection.is_authenticated()
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("registry", &self.registry)
            .field("exempt", &self.exempt)
            .field("auth_required", &self.policy.authentication_required())
            .finish_non_exhaustive()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use mockall::mock;
    use rstest::{fixture, rstest};

    use super::*;
    use crate::dispatch::policy::AtomicAuthPolicy;

    mock! {
        Policy {}
        impl AuthPolicy for Policy {
            fn authentication_required(&self) -> bool;
        }
    }

    mock! {
        Verifier {}
        impl Authenticator for Verifier {
            fn verify(&self, offered: &str) -> bool;
        }
    }

    struct Counting {
        calls: Arc<AtomicUsize>,
    }

    impl crate::dispatch::CommandHandler for Counting {
        fn handle(&self, _context: &mut CommandContext<'_>, request: &Request) -> Response {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut fields = crate::dispatch::Fields::new();
            fields.insert(String::from("command"), request.command().into());
            Response::success(request.token(), fields)
        }
    }

    fn exploding(_context: &mut CommandContext<'_>, _request: &Request) -> Response {
        panic!("boom");
    }

    fn authenticate(context: &mut CommandContext<'_>, request: &Request) -> Response {
        context.connection.mark_authenticated();
        Response::ok(request.token())
    }

    struct Fixture {
        dispatcher: Dispatcher,
        calls: Arc<AtomicUsize>,
    }

    fn build(policy: Arc<dyn AuthPolicy>) -> Fixture {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut builder = CommandRegistry::builder();
        for name in ["GetVersion", "GetAuthRequired", "SetCurrentScene", "SetSceneItemRender"] {
            builder
                .register(
                    name,
                    Counting {
                        calls: Arc::clone(&calls),
                    },
                )
                .expect("register");
        }
        builder.register("Authenticate", authenticate).expect("register");
        builder.register("Explode", exploding).expect("register");
        builder
            .alias("SetSourceRender", "SetSceneItemRender")
            .expect("alias");
        let registry = builder.build();
        let exempt = AuthExemptSet::standard(&registry).expect("exempt set");

        let mut verifier = MockVerifier::new();
        verifier.expect_verify().never();

        Fixture {
            dispatcher: Dispatcher::new(
                Arc::new(registry),
                Arc::new(exempt),
                policy,
                Arc::new(verifier),
                StudioHandle::default(),
            ),
            calls,
        }
    }

    #[fixture]
    fn locked() -> Fixture {
        let mut policy = MockPolicy::new();
        policy.expect_authentication_required().return_const(true);
        build(Arc::new(policy))
    }

    #[fixture]
    fn open() -> Fixture {
        let mut policy = MockPolicy::new();
        policy.expect_authentication_required().return_const(false);
        build(Arc::new(policy))
    }

    #[rstest]
    fn protected_commands_need_authentication(locked: Fixture) {
        let mut connection = ConnectionContext::new(1);
        let response = locked
            .dispatcher
            .handle(&mut connection, &Request::bare("SetCurrentScene", "7"));

        assert_eq!(response, Response::failure("7", NOT_AUTHENTICATED));
        assert_eq!(locked.calls.load(Ordering::SeqCst), 0);
    }

    #[rstest]
    #[case("GetVersion")]
    #[case("GetAuthRequired")]
    fn exempt_commands_run_unauthenticated(locked: Fixture, #[case] command: &str) {
        let mut connection = ConnectionContext::new(1);
        let response = locked
            .dispatcher
            .handle(&mut connection, &Request::bare(command, "a"));

        assert!(response.is_success());
        assert_eq!(response.token(), "a");
        assert_eq!(locked.calls.load(Ordering::SeqCst), 1);
    }

    #[rstest]
    fn unknown_commands_are_rejected_once_authenticated(locked: Fixture) {
        let mut connection = ConnectionContext::new(1);
        connection.mark_authenticated();
        let response = locked
            .dispatcher
            .handle(&mut connection, &Request::bare("DoesNotExist", "x"));

        assert_eq!(response, Response::failure("x", UNKNOWN_COMMAND));
    }

    #[rstest]
    fn unknown_commands_are_rejected_without_auth(open: Fixture) {
        let mut connection = ConnectionContext::new(1);
        let response = open
            .dispatcher
            .handle(&mut connection, &Request::bare("getversion", "x"));

        assert_eq!(response, Response::failure("x", UNKNOWN_COMMAND));
        assert_eq!(open.calls.load(Ordering::SeqCst), 0);
    }

    #[rstest]
    fn handlers_may_authenticate_the_connection(locked: Fixture) {
        let mut connection = ConnectionContext::new(1);
        let first = locked
            .dispatcher
            .handle(&mut connection, &Request::bare("Authenticate", "1"));
        assert!(first.is_success());

        let second = locked
            .dispatcher
            .handle(&mut connection, &Request::bare("SetCurrentScene", "2"));
        assert!(second.is_success());
        assert_eq!(locked.calls.load(Ordering::SeqCst), 1);
    }

    #[rstest]
    fn aliases_answer_like_their_target(open: Fixture) {
        let mut connection = ConnectionContext::new(1);
        let via_alias = open
            .dispatcher
            .handle(&mut connection, &Request::bare("SetSourceRender", "t"));
        let via_target = open
            .dispatcher
            .handle(&mut connection, &Request::bare("SetSceneItemRender", "t"));

        assert_eq!(via_alias.token(), via_target.token());
        assert_eq!(via_alias.is_success(), via_target.is_success());
        assert_eq!(open.calls.load(Ordering::SeqCst), 2);
    }

    #[rstest]
    fn panicking_handlers_become_failures(open: Fixture) {
        let mut connection = ConnectionContext::new(1);
        let response = open
            .dispatcher
            .handle(&mut connection, &Request::bare("Explode", "p"));

        assert_eq!(
            response,
            Response::failure("p", "internal error while handling Explode")
        );

        let after = open
            .dispatcher
            .handle(&mut connection, &Request::bare("GetVersion", "q"));
        assert!(after.is_success());
    }

    #[test]
    fn policy_changes_apply_to_the_next_request() {
        let policy = Arc::new(AtomicAuthPolicy::new(false));
        let fixture = build(Arc::clone(&policy) as Arc<dyn AuthPolicy>);
        let mut connection = ConnectionContext::new(1);
        let request = Request::bare("SetCurrentScene", "1");

        assert!(fixture.dispatcher.handle(&mut connection, &request).is_success());
        policy.set_required(true);
        assert_eq!(
            fixture.dispatcher.handle(&mut connection, &request),
            Response::failure("1", NOT_AUTHENTICATED)
        );
    }
}
