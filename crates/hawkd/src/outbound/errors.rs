//! Errors raised while writing to the producer.

use std::io;

use thiserror::Error;

/// Failure to deliver an outbound message.
#[derive(Debug, Error)]
pub enum OutboundError {
    /// The message could not be serialised.
    #[error("failed to serialise outbound message: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Writing or flushing the output failed.
    #[error("failed to write outbound message: {0}")]
    Io(#[from] io::Error),
}
