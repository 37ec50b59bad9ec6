//! Lifecycle errors.

use thiserror::Error;

use crate::transport::TransportError;

/// Misuse of the engine lifecycle or failure to bring it up.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// `start` was called on an engine that is running or draining.
    #[error("engine already started")]
    AlreadyStarted,

    /// `start` was called after `stop`.
    #[error("engine already stopped")]
    AlreadyStopped,

    /// The reader or ingestion thread could not be spawned.
    #[error("failed to start ingestion: {source}")]
    Spawn {
        /// Underlying transport error.
        #[source]
        source: TransportError,
    },
}
