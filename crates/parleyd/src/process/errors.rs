//! Defines the unified error surface for daemon launch.

use thiserror::Error;

use crate::bootstrap::BootstrapError;

use super::shutdown::ShutdownError;

/// Errors surfaced while launching the daemon process.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Bootstrap failed.
    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),
    /// Installing the shutdown listener failed.
    #[error(transparent)]
    Shutdown(#[from] ShutdownError),
}
