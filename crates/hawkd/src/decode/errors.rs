//! Error types for envelope decoding.

use thiserror::Error;

use hawk_protocol::{CommandKind, RpcError, ValidationError};

/// Why an envelope could not be turned into a command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// `jsonrpc` is absent or not exactly `"2.0"`.
    #[error("bad version: expected \"2.0\", found {}", found.as_deref().unwrap_or("nothing"))]
    BadVersion {
        /// Raw JSON of the version member, if present.
        found: Option<String>,
    },
    /// `method` is outside the recognised set.
    #[error("unknown method `{method}`")]
    UnknownMethod {
        /// Method name as received.
        method: String,
    },
    /// The envelope or batch is structurally invalid.
    #[error("invalid request: {detail}")]
    InvalidRequest {
        /// What was wrong.
        detail: String,
    },
    /// The params of a known method failed validation.
    #[error("invalid params for {kind}: {source}")]
    InvalidParams {
        /// Method kind whose params were rejected.
        kind: CommandKind,
        /// Field-level cause.
        #[source]
        source: ValidationError,
    },
}

impl DecodeError {
    /// Creates an invalid request error.
    pub fn invalid_request(detail: impl Into<String>) -> Self {
        Self::InvalidRequest {
            detail: detail.into(),
        }
    }

    /// Creates an unknown method error.
    pub fn unknown_method(method: impl Into<String>) -> Self {
        Self::UnknownMethod {
            method: method.into(),
        }
    }

    /// Creates an invalid params error.
    pub fn invalid_params(kind: CommandKind, source: ValidationError) -> Self {
        Self::InvalidParams { kind, source }
    }

    /// Label used for per-error-kind metrics.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::BadVersion { .. } => "bad_version",
            Self::UnknownMethod { .. } => "unknown_method",
            Self::InvalidRequest { .. } => "invalid_request",
            Self::InvalidParams { .. } => "validation",
        }
    }

    /// Converts the error into its wire representation.
    #[must_use]
    pub fn to_rpc(&self) -> RpcError {
        match self {
            Self::BadVersion { .. } => RpcError::invalid_request("bad version"),
            Self::UnknownMethod { method } => RpcError::method_not_found(method),
            Self::InvalidRequest { detail } => RpcError::invalid_request(detail.as_str()),
            Self::InvalidParams { source, .. } => {
                RpcError::invalid_params(source.to_string(), source.field())
            }
        }
    }
}
