//! Supervises gateway launch sequencing and runtime orchestration.

use std::sync::Arc;

use tracing::{info, warn};

use crate::StructuredHealthReporter;
use crate::bootstrap::{ConfigLoader, Gateway, SystemConfigLoader, bootstrap_with};
use crate::dispatch::RegistryOptions;
use crate::health::HealthReporter;

use super::PROCESS_TARGET;
use super::errors::LaunchError;
use super::signals::{ProcessSignal, SignalError, SignalSource, SystemSignals};

/// Collaborators required to launch the gateway runtime.
pub(crate) struct LaunchPlan<L, S> {
    pub(crate) loader: L,
    pub(crate) reporter: Arc<dyn HealthReporter>,
    pub(crate) signals: S,
    pub(crate) options: RegistryOptions,
}

/// Runs the gateway using the production collaborators.
///
/// Blocks until a stop signal arrives. `SIGHUP` reloads the
/// authentication settings without dropping connections.
pub fn run_daemon() -> Result<(), LaunchError> {
    run_daemon_with(LaunchPlan {
        loader: SystemConfigLoader,
        reporter: Arc::new(StructuredHealthReporter::new()),
        signals: SystemSignals::install()?,
        options: RegistryOptions::default(),
    })
}

/// Runs the gateway with injected collaborators.
pub(crate) fn run_daemon_with<L, S>(plan: LaunchPlan<L, S>) -> Result<(), LaunchError>
where
    L: ConfigLoader,
    S: SignalSource,
{
    let LaunchPlan {
        loader,
        reporter,
        mut signals,
        options,
    } = plan;

    info!(
        target: PROCESS_TARGET,
        pid = std::process::id(),
        captions = options.captions,
        "starting gateway runtime"
    );
    let gateway = bootstrap_with(&loader, reporter, options)?;
    let listener = gateway.bind()?;
    let handle = gateway.serve(listener)?;

    let supervised = supervise(&gateway, &loader, &mut signals);
    if let Err(error) = &supervised {
        warn!(
            target: PROCESS_TARGET,
            error = %error,
            "signal delivery failed, stopping gateway"
        );
    }
    gateway.stop(handle)?;
    supervised?;

    info!(
        target: PROCESS_TARGET,
        "shutdown sequence completed"
    );
    Ok(())
}

/// Handles signals until one asks the gateway to stop.
///
/// A refused reload is reported and the gateway keeps serving with its
/// previous settings.
fn supervise<S: SignalSource>(
    gateway: &Gateway,
    loader: &dyn ConfigLoader,
    signals: &mut S,
) -> Result<(), SignalError> {
    loop {
        match signals.next_signal()? {
            ProcessSignal::Reload => {
                info!(target: PROCESS_TARGET, "reload requested");
                if let Err(error) = gateway.reload(loader) {
                    warn!(target: PROCESS_TARGET, error = %error, "reload refused");
                }
            }
            ProcessSignal::Stop { signal } => {
                info!(
                    target: PROCESS_TARGET,
                    signal,
                    "stop signal received, stopping gateway"
                );
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use rstest::{fixture, rstest};
    use signal_hook::consts::signal::SIGTERM;

    use cuebridge_config::{Config, SocketEndpoint};

    use super::*;
    use crate::bootstrap::StaticConfigLoader;
    use crate::tests::support::{HealthEvent, RecordingHealthReporter, ScriptedConfigLoader};

    /// Replays a fixed list of signals, then reports delivery as closed.
    struct ScriptedSignals(VecDeque<ProcessSignal>);

    impl ScriptedSignals {
        fn new(signals: &[ProcessSignal]) -> Self {
            Self(signals.iter().copied().collect())
        }
    }

    impl SignalSource for ScriptedSignals {
        fn next_signal(&mut self) -> Result<ProcessSignal, SignalError> {
            self.0.pop_front().ok_or(SignalError::Closed)
        }
    }

    const STOP: ProcessSignal = ProcessSignal::Stop { signal: SIGTERM };

    fn loopback_config() -> Config {
        Config {
            listen_socket: SocketEndpoint::tcp("127.0.0.1", 0),
            ..Config::default()
        }
    }

    #[fixture]
    fn loopback() -> StaticConfigLoader {
        StaticConfigLoader::new(loopback_config())
    }

    fn plan<L, S>(
        loader: L,
        reporter: &Arc<RecordingHealthReporter>,
        signals: S,
    ) -> LaunchPlan<L, S> {
        LaunchPlan {
            loader,
            reporter: Arc::clone(reporter) as Arc<dyn HealthReporter>,
            signals,
            options: RegistryOptions::default(),
        }
    }

    #[rstest]
    fn serves_until_stopped(loopback: StaticConfigLoader) {
        let reporter = Arc::new(RecordingHealthReporter::default());

        run_daemon_with(plan(loopback, &reporter, ScriptedSignals::new(&[STOP])))
            .expect("clean run");

        assert_eq!(
            reporter.events(),
            vec![
                HealthEvent::BootstrapStarting,
                HealthEvent::BootstrapSucceeded,
                HealthEvent::ListenerReady,
                HealthEvent::ListenerStopped,
            ]
        );
    }

    #[rstest]
    fn signal_failures_still_stop_the_listener(loopback: StaticConfigLoader) {
        let reporter = Arc::new(RecordingHealthReporter::default());

        let error = run_daemon_with(plan(loopback, &reporter, ScriptedSignals::new(&[])))
            .expect_err("signal delivery fails");

        assert!(matches!(error, LaunchError::Signals { .. }));
        assert!(reporter.events().contains(&HealthEvent::ListenerStopped));
    }

    #[test]
    fn hangup_reloads_before_stopping() {
        let reporter = Arc::new(RecordingHealthReporter::default());
        let reloaded = Config {
            auth_required: true,
            auth_secret: Some(String::from("hunter2")),
            ..loopback_config()
        };
        let loader = ScriptedConfigLoader::new(vec![loopback_config(), reloaded]);
        let signals = ScriptedSignals::new(&[ProcessSignal::Reload, STOP]);

        run_daemon_with(plan(loader, &reporter, signals)).expect("clean run");

        let events = reporter.events();
        assert_eq!(
            events.get(3..),
            Some(&[HealthEvent::ConfigurationReloaded, HealthEvent::ListenerStopped][..])
        );
    }

    #[test]
    fn refused_reload_keeps_serving() {
        let reporter = Arc::new(RecordingHealthReporter::default());
        let unusable = Config {
            auth_required: true,
            ..loopback_config()
        };
        let loader = ScriptedConfigLoader::new(vec![loopback_config(), unusable]);
        let signals = ScriptedSignals::new(&[ProcessSignal::Reload, STOP]);

        run_daemon_with(plan(loader, &reporter, signals)).expect("clean run");

        let events = reporter.events();
        assert!(
            events
                .iter()
                .any(|event| matches!(event, HealthEvent::ReloadRejected(_)))
        );
        assert_eq!(events.last(), Some(&HealthEvent::ListenerStopped));
    }

    #[test]
    fn invalid_configuration_aborts_before_binding() {
        let reporter = Arc::new(RecordingHealthReporter::default());
        let loader = StaticConfigLoader::new(Config {
            auth_required: true,
            ..Config::default()
        });

        let error = run_daemon_with(plan(loader, &reporter, ScriptedSignals::new(&[STOP])))
            .expect_err("invalid");

        assert!(matches!(error, LaunchError::Bootstrap { .. }));
        assert!(!reporter.events().contains(&HealthEvent::ListenerReady));
    }
}
