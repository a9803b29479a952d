//! Process signals that drive the running gateway.
//!
//! `SIGHUP` asks for a configuration reload; `SIGTERM`, `SIGINT` and
//! `SIGQUIT` stop the gateway.

use std::io;

use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
use signal_hook::iterator::Signals;
use thiserror::Error;

/// What the supervisor should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcessSignal {
    /// Re-read configuration and apply the authentication settings.
    Reload,
    /// Stop serving and exit.
    Stop { signal: i32 },
}

impl ProcessSignal {
    fn from_raw(signal: i32) -> Self {
        if signal == SIGHUP {
            Self::Reload
        } else {
            Self::Stop { signal }
        }
    }
}

/// Source of process signals, blocking until the next one.
pub(crate) trait SignalSource: Send {
    fn next_signal(&mut self) -> Result<ProcessSignal, SignalError>;
}

/// Errors from the signal source.
#[derive(Debug, Error)]
pub enum SignalError {
    /// Installing signal handlers failed.
    #[error("failed to install signal handlers: {source}")]
    Install {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The handle delivering signals was closed.
    #[error("signal delivery stopped unexpectedly")]
    Closed,
}

/// Signal source backed by `signal-hook`.
///
/// Handlers are installed on construction, so signals arriving during
/// bootstrap are queued rather than killing the process.
pub(crate) struct SystemSignals {
    signals: Signals,
}

impl SystemSignals {
    pub(crate) fn install() -> Result<Self, SignalError> {
        let signals = Signals::new([SIGHUP, SIGTERM, SIGINT, SIGQUIT])
            .map_err(|source| SignalError::Install { source })?;
        Ok(Self { signals })
    }
}

impl SignalSource for SystemSignals {
    fn next_signal(&mut self) -> Result<ProcessSignal, SignalError> {
        self.signals
            .forever()
            .next()
            .map(ProcessSignal::from_raw)
            .ok_or(SignalError::Closed)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(SIGHUP, ProcessSignal::Reload)]
    #[case(SIGTERM, ProcessSignal::Stop { signal: SIGTERM })]
    #[case(SIGINT, ProcessSignal::Stop { signal: SIGINT })]
    #[case(SIGQUIT, ProcessSignal::Stop { signal: SIGQUIT })]
    fn hangup_reloads_and_the_rest_stop(#[case] raw: i32, #[case] expected: ProcessSignal) {
        assert_eq!(ProcessSignal::from_raw(raw), expected);
    }
}
