//! JSON-RPC 2.0 envelopes exchanged with the producer.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::CommandKind;

/// Protocol version literal every envelope must carry.
pub const JSONRPC_VERSION: &str = "2.0";

/// Standard JSON-RPC and Hawk-specific error codes.
pub mod codes {
    /// The unit could not be parsed as JSON.
    pub const PARSE_ERROR: i64 = -32700;
    /// The envelope is not a valid request object.
    pub const INVALID_REQUEST: i64 = -32600;
    /// The method is not recognised.
    pub const METHOD_NOT_FOUND: i64 = -32601;
    /// The params failed validation.
    pub const INVALID_PARAMS: i64 = -32602;
    /// A registered handler failed.
    pub const INTERNAL_ERROR: i64 = -32603;
    /// Admission was denied by the rate limiter.
    pub const RATE_LIMITED: i64 = -32002;
}

/// Request identifier supplied by the producer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    /// Integer identifier.
    Number(i64),
    /// Integer identifier above `i64::MAX`.
    Unsigned(u64),
    /// String identifier.
    Text(String),
}

/// Raised when an `id` member is neither an integer nor a string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("request id must be an integer or a string, got {found}")]
pub struct InvalidRequestId {
    /// JSON type name of the offending value.
    pub found: &'static str,
}

impl RequestId {
    /// Interprets the `id` member of an envelope.
    ///
    /// An absent or `null` id marks a notification and yields `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidRequestId`] for booleans, floats, arrays and objects.
    pub fn from_member(member: Option<&Value>) -> Result<Option<Self>, InvalidRequestId> {
        match member {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(text)) => Ok(Some(Self::Text(text.clone()))),
            Some(Value::Number(number)) => number
                .as_i64()
                .map(Self::Number)
                .or_else(|| number.as_u64().map(Self::Unsigned))
                .map(Some)
                .ok_or(InvalidRequestId { found: "float" }),
            Some(Value::Bool(_)) => Err(InvalidRequestId { found: "boolean" }),
            Some(Value::Array(_)) => Err(InvalidRequestId { found: "array" }),
            Some(Value::Object(_)) => Err(InvalidRequestId { found: "object" }),
        }
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(id) => write!(f, "{id}"),
            Self::Unsigned(id) => write!(f, "{id}"),
            Self::Text(id) => write!(f, "{id:?}"),
        }
    }
}

impl From<i64> for RequestId {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for RequestId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

/// One inbound unit of the wire protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Protocol version, always [`JSONRPC_VERSION`] for valid envelopes.
    pub jsonrpc: String,
    /// Method name, for example `hawk.log`.
    pub method: String,
    /// Method parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    /// Request identifier; absent for notifications.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,
}

impl Envelope {
    /// Creates an envelope for the given method.
    #[must_use]
    pub fn new(method: impl Into<String>, params: Value, id: Option<RequestId>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_owned(),
            method: method.into(),
            params: Some(params),
            id,
        }
    }

    /// Returns whether the envelope expects no reply.
    #[must_use]
    pub const fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// JSON-RPC error object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    /// Error code, see [`codes`].
    pub code: i64,
    /// Short human-readable message.
    pub message: String,
    /// Optional structured detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcError {
    /// Creates an error object.
    #[must_use]
    pub fn new(code: i64, message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            code,
            message: message.into(),
            data,
        }
    }

    /// Unit could not be parsed as JSON.
    #[must_use]
    pub fn parse_error(detail: impl Into<String>) -> Self {
        Self::new(
            codes::PARSE_ERROR,
            "parse error",
            Some(Value::String(detail.into())),
        )
    }

    /// Envelope is structurally invalid (bad version, bad batch, bad id).
    #[must_use]
    pub fn invalid_request(detail: impl Into<String>) -> Self {
        Self::new(
            codes::INVALID_REQUEST,
            "invalid request",
            Some(Value::String(detail.into())),
        )
    }

    /// Method is outside the recognised set.
    #[must_use]
    pub fn method_not_found(method: &str) -> Self {
        Self::new(
            codes::METHOD_NOT_FOUND,
            "method not recognized",
            Some(serde_json::json!({ "method": method })),
        )
    }

    /// Params failed validation.
    #[must_use]
    pub fn invalid_params(detail: impl Into<String>, field: Option<&str>) -> Self {
        let detail = detail.into();
        let data = field.map_or_else(
            || serde_json::json!({ "detail": detail }),
            |field| serde_json::json!({ "field": field, "detail": detail }),
        );
        Self::new(codes::INVALID_PARAMS, "invalid params", Some(data))
    }

    /// A registered handler failed.
    #[must_use]
    pub fn internal(detail: impl Into<String>) -> Self {
        Self::new(
            codes::INTERNAL_ERROR,
            "internal error",
            Some(Value::String(detail.into())),
        )
    }

    /// Admission was denied by the rate limiter.
    #[must_use]
    pub fn rate_limited(retry_after_ms: u64) -> Self {
        Self::new(
            codes::RATE_LIMITED,
            "rate limited",
            Some(serde_json::json!({ "retry_after_ms": retry_after_ms })),
        )
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RPC error {}: {}", self.code, self.message)
    }
}

/// Successful reply to a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Protocol version.
    pub jsonrpc: String,
    /// Echoed request identifier.
    pub id: RequestId,
    /// Result payload.
    pub result: Value,
}

impl Response {
    /// Creates a response for the given request.
    #[must_use]
    pub fn new(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_owned(),
            id,
            result,
        }
    }
}

/// Failed reply to a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Protocol version.
    pub jsonrpc: String,
    /// Echoed request identifier.
    pub id: RequestId,
    /// Error detail.
    pub error: RpcError,
}

impl ErrorResponse {
    /// Creates an error reply for the given request.
    #[must_use]
    pub fn new(id: RequestId, error: RpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_owned(),
            id,
            error,
        }
    }
}

/// Server-initiated message; never answered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Protocol version.
    pub jsonrpc: String,
    /// Method name, for example `hawk.config_update`.
    pub method: String,
    /// Method parameters.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub params: Value,
}

impl Notification {
    /// Creates a notification.
    #[must_use]
    pub fn new(method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_owned(),
            method: method.into(),
            params,
        }
    }
}

/// Result payload sent for every successfully processed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgement {
    /// Always `ok`.
    pub status: String,
    /// Method that was processed.
    pub method: String,
}

impl Acknowledgement {
    /// Acknowledges a processed command of the given kind.
    #[must_use]
    pub fn processed(kind: CommandKind) -> Self {
        Self {
            status: "ok".to_owned(),
            method: kind.method().to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[rstest]
    #[case(None, None)]
    #[case(Some(json!(null)), None)]
    #[case(Some(json!(5)), Some(RequestId::Number(5)))]
    #[case(Some(json!(u64::MAX)), Some(RequestId::Unsigned(u64::MAX)))]
    #[case(Some(json!("abc")), Some(RequestId::Text("abc".to_owned())))]
    fn reads_valid_ids(#[case] member: Option<Value>, #[case] expected: Option<RequestId>) {
        let id = RequestId::from_member(member.as_ref()).expect("id should parse");
        assert_eq!(id, expected);
    }

    #[rstest]
    #[case(json!(1.5), "float")]
    #[case(json!(true), "boolean")]
    #[case(json!([1]), "array")]
    #[case(json!({"a": 1}), "object")]
    fn rejects_unusable_ids(#[case] member: Value, #[case] found: &str) {
        let error = RequestId::from_member(Some(&member)).expect_err("id should be rejected");
        assert_eq!(error.found, found);
    }

    #[rstest]
    fn echoes_large_integer_ids_unchanged() {
        let id = RequestId::from_member(Some(&json!(u64::MAX)))
            .expect("id should parse")
            .expect("id present");
        let response = Response::new(id, json!({"status": "ok"}));
        assert_eq!(
            serde_json::to_value(&response).expect("serialise")["id"],
            json!(u64::MAX)
        );
    }

    #[rstest]
    fn serialises_error_response_with_id() {
        let reply = ErrorResponse::new(RequestId::Number(5), RpcError::method_not_found("x"));
        let json = serde_json::to_string(&reply).expect("serialise");

        assert!(json.contains(r#""jsonrpc":"2.0""#));
        assert!(json.contains(r#""id":5"#));
        assert!(json.contains(r#""code":-32601"#));
        assert!(json.contains("method not recognized"));
    }

    #[rstest]
    fn serialises_notification_without_id() {
        let notification = Notification::new("hawk.execute", json!({"command": "restart"}));
        let json = serde_json::to_string(&notification).expect("serialise");

        assert!(json.contains(r#""method":"hawk.execute""#));
        assert!(!json.contains("\"id\""));
    }

    #[rstest]
    fn envelope_without_id_is_notification() {
        let envelope = Envelope::new("hawk.log", json!({"message": "hi"}), None);
        assert!(envelope.is_notification());
        let json = serde_json::to_value(&envelope).expect("serialise");
        assert!(json.get("id").is_none());
    }
}
