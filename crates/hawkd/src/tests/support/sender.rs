//! Outbound channel double that keeps every message as JSON.

use std::sync::Mutex;

use serde_json::Value;

use hawk_protocol::{ErrorResponse, Notification, RequestId, Response, RpcError};

use crate::outbound::{OutboundError, ResponseSender};

/// Records outbound messages in send order.
#[derive(Debug, Default)]
pub struct RecordingSender {
    messages: Mutex<Vec<Value>>,
}

impl RecordingSender {
    /// Copies the recorded messages.
    pub fn messages(&self) -> Vec<Value> {
        self.messages
            .lock()
            .expect("sender mutex poisoned")
            .clone()
    }

    /// Returns the message answering `id`, if any.
    pub fn reply_to(&self, id: &Value) -> Option<Value> {
        self.messages()
            .into_iter()
            .find(|message| message.get("id") == Some(id))
    }

    fn record(&self, message: Value) {
        self.messages
            .lock()
            .expect("sender mutex poisoned")
            .push(message);
    }
}

impl ResponseSender for RecordingSender {
    fn send_response(&self, id: RequestId, result: Value) -> Result<(), OutboundError> {
        self.record(serde_json::to_value(Response::new(id, result))?);
        Ok(())
    }

    fn send_error(&self, id: RequestId, error: RpcError) -> Result<(), OutboundError> {
        self.record(serde_json::to_value(ErrorResponse::new(id, error))?);
        Ok(())
    }

    fn send_notification(&self, method: &str, params: Value) -> Result<(), OutboundError> {
        self.record(serde_json::to_value(Notification::new(method, params))?);
        Ok(())
    }
}
