//! Errors surfaced while running the `hawk` process.

use thiserror::Error;

use crate::bootstrap::BootstrapError;
use crate::engine::LifecycleError;

/// Failure to bring the process up.
#[derive(Debug, Error)]
pub enum RunError {
    /// Bootstrap failed.
    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),

    /// The engine could not be started.
    #[error("failed to start engine: {0}")]
    Lifecycle(#[from] LifecycleError),
}
