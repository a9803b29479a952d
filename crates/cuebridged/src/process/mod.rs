//! Process lifecycle for the `cuebridged` binary.
//!
//! The gateway runs in the foreground: it bootstraps, serves until a stop
//! signal arrives, then stops the listener and exits. Hangups reload the
//! authentication settings in between.

mod errors;
pub(crate) mod launch;
pub(crate) mod signals;

pub use errors::LaunchError;
pub use launch::run_daemon;
pub use signals::SignalError;

pub(crate) const PROCESS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::process");
