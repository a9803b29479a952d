//! Tests that exercise the crate's public re-exports.

use std::sync::Arc;

use rstest::rstest;

use crate::{
    CommandRegistry, ConnectionContext, Dispatcher, Request, Response, StudioHandle,
    bootstrap_with, build_registry,
};
use crate::{AtomicAuthPolicy, AuthExemptSet, RegistryOptions, SharedSecretAuthenticator};

use super::support::{RecordingHealthReporter, TestConfigLoader};

#[rstest]
fn bootstrap_with_reexport_prepares_the_socket() {
    let loader = TestConfigLoader::new();
    let reporter = Arc::new(RecordingHealthReporter::default());

    let gateway = bootstrap_with(&loader, reporter, RegistryOptions::default())
        .expect("bootstrap should succeed");

    assert!(gateway.config().listen_socket().prepare_filesystem().is_ok());
}

#[rstest]
fn dispatch_core_can_be_assembled_from_reexports() {
    let registry: CommandRegistry =
        build_registry(RegistryOptions::default()).expect("registry builds");
    let exempt = AuthExemptSet::standard(&registry).expect("exempt set");
    let dispatcher = Dispatcher::new(
        Arc::new(registry),
        Arc::new(exempt),
        Arc::new(AtomicAuthPolicy::new(true)),
        Arc::new(SharedSecretAuthenticator::new(Some("hunter2"))),
        StudioHandle::default(),
    );
    let mut connection = ConnectionContext::new(7);

    let response = dispatcher.handle(&mut connection, &Request::bare("GetAuthRequired", "q"));

    assert!(response.is_success());
    assert_eq!(
        dispatcher.handle(&mut connection, &Request::bare("GetSceneList", "r")),
        Response::failure("r", "Not Authenticated")
    );
}
