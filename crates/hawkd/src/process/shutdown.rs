//! Termination signal handling.

use std::io;

use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
use signal_hook::iterator::Signals;
use thiserror::Error;
use tracing::info;

use super::PROCESS_TARGET;

/// Abstraction over shutdown notification mechanisms.
pub trait ShutdownSignal: Send + Sync {
    /// Blocks until shutdown should proceed.
    ///
    /// # Errors
    ///
    /// Returns [`ShutdownError`] when the listener cannot be installed.
    fn wait(&self) -> Result<(), ShutdownError>;
}

/// Errors reported by shutdown signal listeners.
#[derive(Debug, Error)]
pub enum ShutdownError {
    /// Installing signal handlers failed.
    #[error("failed to install signal handlers: {source}")]
    Install {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Shutdown listener that waits for SIGTERM, SIGINT, SIGQUIT or SIGHUP.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemShutdownSignal;

impl ShutdownSignal for SystemShutdownSignal {
    fn wait(&self) -> Result<(), ShutdownError> {
        let mut signals = Signals::new([SIGTERM, SIGINT, SIGQUIT, SIGHUP])
            .map_err(|source| ShutdownError::Install { source })?;
        if let Some(signal) = signals.forever().next() {
            info!(target: PROCESS_TARGET, signal, "shutdown signal received");
        }
        Ok(())
    }
}
