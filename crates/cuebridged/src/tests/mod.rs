//! Test suites for the gateway bootstrap, dispatch and process lifecycle.

mod lib_api;
pub(crate) mod support;
