//! Per-message failures surfaced by the dispatcher.

use thiserror::Error;

use hawk_protocol::{CommandKind, RpcError};

use super::handler::HandlerError;
use crate::decode::DecodeError;
use crate::rate_limit::RateLimited;

/// Why a decoded message was not applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The envelope was rejected by the decoder.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The rate limiter refused admission.
    #[error("rate limited; retry after {retry_after_ms} ms")]
    RateLimited {
        /// Milliseconds until a token becomes available.
        retry_after_ms: u64,
    },

    /// The registered handler rejected the command.
    #[error("{kind} handler failed: {source}")]
    Handler {
        /// Kind of the rejected command.
        kind: CommandKind,
        /// Handler-supplied cause.
        #[source]
        source: HandlerError,
    },
}

impl From<RateLimited> for DispatchError {
    fn from(limited: RateLimited) -> Self {
        Self::RateLimited {
            retry_after_ms: limited.retry_after_ms,
        }
    }
}

impl DispatchError {
    /// Creates a handler failure.
    pub fn handler(kind: CommandKind, source: HandlerError) -> Self {
        Self::Handler { kind, source }
    }

    /// Label used for per-error-kind metrics.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Decode(error) => error.label(),
            Self::RateLimited { .. } => "rate_limited",
            Self::Handler { .. } => "handler",
        }
    }

    /// Converts the error into its wire representation.
    #[must_use]
    pub fn to_rpc(&self) -> RpcError {
        match self {
            Self::Decode(error) => error.to_rpc(),
            Self::RateLimited { retry_after_ms } => RpcError::rate_limited(*retry_after_ms),
            Self::Handler { source, .. } => RpcError::internal(source.message()),
        }
    }
}
