//! Messages Hawk sends back to the producer.
//!
//! Responses, error responses and server-initiated notifications all travel
//! through a [`ResponseSender`]. The production sender writes JSON Lines to
//! the producer's input, one value per line, flushing after each message.

mod errors;

use std::io::Write;
use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use serde_json::{Map, Value};

use hawk_protocol::{
    CONFIG_UPDATE_METHOD, ConfigUpdateParams, ConfigValue, DATA_REQUEST_METHOD,
    DataRequestParams, EXECUTE_METHOD, ErrorResponse, ExecuteParams, Notification, RequestId,
    Response, RpcError,
};

pub use self::errors::OutboundError;

/// Sink for everything Hawk sends to the producer.
#[cfg_attr(test, mockall::automock)]
pub trait ResponseSender: Send + Sync {
    /// Answers a request successfully.
    ///
    /// # Errors
    ///
    /// Returns an error when the message cannot be delivered.
    fn send_response(&self, id: RequestId, result: Value) -> Result<(), OutboundError>;

    /// Answers a request with an error.
    ///
    /// # Errors
    ///
    /// Returns an error when the message cannot be delivered.
    fn send_error(&self, id: RequestId, error: RpcError) -> Result<(), OutboundError>;

    /// Sends a notification that expects no answer.
    ///
    /// # Errors
    ///
    /// Returns an error when the message cannot be delivered.
    fn send_notification(&self, method: &str, params: Value) -> Result<(), OutboundError>;
}

impl<T> ResponseSender for std::sync::Arc<T>
where
    T: ResponseSender + ?Sized,
{
    fn send_response(&self, id: RequestId, result: Value) -> Result<(), OutboundError> {
        (**self).send_response(id, result)
    }

    fn send_error(&self, id: RequestId, error: RpcError) -> Result<(), OutboundError> {
        (**self).send_error(id, error)
    }

    fn send_notification(&self, method: &str, params: Value) -> Result<(), OutboundError> {
        (**self).send_notification(method, params)
    }
}

/// Writes outbound messages as JSON Lines.
///
/// One lock is held across serialisation, the trailing newline and the flush
/// so concurrent senders never interleave partial lines.
#[derive(Debug)]
pub struct JsonlSender<W> {
    writer: Mutex<W>,
}

impl<W: Write> JsonlSender<W> {
    /// Wraps an output stream.
    pub const fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Returns the wrapped stream.
    pub fn into_inner(self) -> W {
        self.writer.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_line<M: Serialize>(&self, message: &M) -> Result<(), OutboundError> {
        let line = serde_json::to_vec(message)?;
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writer.write_all(&line)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

impl<W: Write + Send> ResponseSender for JsonlSender<W> {
    fn send_response(&self, id: RequestId, result: Value) -> Result<(), OutboundError> {
        self.write_line(&Response::new(id, result))
    }

    fn send_error(&self, id: RequestId, error: RpcError) -> Result<(), OutboundError> {
        self.write_line(&ErrorResponse::new(id, error))
    }

    fn send_notification(&self, method: &str, params: Value) -> Result<(), OutboundError> {
        self.write_line(&Notification::new(method, params))
    }
}

/// Tells the producer a config value was changed from the dashboard.
///
/// # Errors
///
/// Returns an error when the notification cannot be delivered.
pub fn send_config_update<S>(
    sender: &S,
    key: impl Into<String>,
    value: ConfigValue,
) -> Result<(), OutboundError>
where
    S: ResponseSender + ?Sized,
{
    let params = ConfigUpdateParams {
        key: key.into(),
        value,
    };
    sender.send_notification(CONFIG_UPDATE_METHOD, serde_json::to_value(params)?)
}

/// Asks the producer to run a command.
///
/// # Errors
///
/// Returns an error when the notification cannot be delivered.
pub fn send_execute<S>(
    sender: &S,
    command: impl Into<String>,
    args: Map<String, Value>,
) -> Result<(), OutboundError>
where
    S: ResponseSender + ?Sized,
{
    let params = ExecuteParams {
        command: command.into(),
        args,
    };
    sender.send_notification(EXECUTE_METHOD, serde_json::to_value(params)?)
}

/// Asks the producer for a data set.
///
/// # Errors
///
/// Returns an error when the notification cannot be delivered.
pub fn send_data_request<S>(sender: &S, request: &DataRequestParams) -> Result<(), OutboundError>
where
    S: ResponseSender + ?Sized,
{
    sender.send_notification(DATA_REQUEST_METHOD, serde_json::to_value(request)?)
}
