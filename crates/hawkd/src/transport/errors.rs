//! Error types for the input transport.

use std::io;

use thiserror::Error;

/// A framed unit that could not be turned into a JSON value.
///
/// Framing errors are recoverable: the reader resynchronises and keeps going.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FramingError {
    /// Input that cannot begin a JSON object or array.
    #[error("unexpected byte {byte:#04x} outside a JSON value")]
    Garbage {
        /// First offending byte.
        byte: u8,
    },
    /// A unit grew beyond the configured size limit.
    #[error("message exceeds {limit} byte limit")]
    Oversized {
        /// Configured maximum message size.
        limit: usize,
    },
    /// Input ended in the middle of a unit.
    #[error("input ended inside a JSON value ({pending} bytes pending)")]
    Truncated {
        /// Bytes buffered when the stream ended.
        pending: usize,
    },
    /// A complete unit was not valid JSON.
    #[error("malformed JSON: {message}")]
    Malformed {
        /// Parser message.
        message: String,
    },
}

impl FramingError {
    /// Creates a malformed unit error from a parser failure.
    #[must_use]
    pub fn malformed(source: &serde_json::Error) -> Self {
        Self::Malformed {
            message: source.to_string(),
        }
    }
}

/// Unrecoverable failures of the input stream.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Reading from the stream failed.
    #[error("failed to read input: {source}")]
    Read {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The reader thread could not be spawned.
    #[error("failed to spawn reader thread: {source}")]
    Spawn {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}
