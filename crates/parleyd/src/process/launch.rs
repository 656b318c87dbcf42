//! Wires the production collaborators together and runs the daemon.

use std::sync::Arc;

use tracing::info;

use crate::bootstrap::{ConfigLoader, SystemConfigLoader, bootstrap_with};
use crate::console::ConsoleConnector;
use crate::health::{HealthReporter, StructuredHealthReporter};
use crate::protocol::Connector;
use crate::supervisor::SupervisorExit;

use super::PROCESS_TARGET;
use super::errors::LaunchError;
use super::shutdown::{ShutdownToken, SignalListener};

/// Runs the daemon against the console connector until shutdown or a
/// terminal close.
///
/// # Errors
///
/// Returns [`LaunchError`] when bootstrap fails or signal handlers cannot be
/// installed.
pub fn run_daemon() -> Result<SupervisorExit, LaunchError> {
    let reporter: Arc<dyn HealthReporter> = Arc::new(StructuredHealthReporter::new());
    let token = ShutdownToken::new();
    let listener = SignalListener::install(token.clone())?;
    let exit = run_daemon_with(&SystemConfigLoader, reporter, &token, |session_dir| {
        ConsoleConnector::stdio(session_dir)
    });
    listener.close();
    exit
}

/// Runs the daemon with injected collaborators.
///
/// `connector` receives the prepared session directory and builds the
/// protocol connector.
pub(crate) fn run_daemon_with<C, F>(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
    shutdown: &ShutdownToken,
    connector: F,
) -> Result<SupervisorExit, LaunchError>
where
    C: Connector,
    F: FnOnce(&std::path::Path) -> C,
{
    info!(target: PROCESS_TARGET, "starting daemon runtime");
    let daemon = bootstrap_with(loader, reporter)?;
    let connector = connector(daemon.store().dir());
    let exit = daemon.run(&connector, shutdown);
    info!(
        target: PROCESS_TARGET,
        exit = %exit,
        "shutdown sequence completed"
    );
    Ok(exit)
}
