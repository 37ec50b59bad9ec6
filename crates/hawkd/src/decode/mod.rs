//! Turns raw JSON values into typed commands.
//!
//! A unit is either a single envelope object or a batch array. Batch
//! elements are decoded independently so one bad element never spoils its
//! neighbours. Every decoded message keeps the request id it carried, when
//! that id was usable, so errors can be correlated with the request.

mod errors;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use hawk_protocol::{
    Command, CommandKind, ConfigItem, ConfigParams, DashboardParams, DashboardWidget, Event,
    JSONRPC_VERSION, LogEntry, Metric, ProgressTracker, RequestId, ValidationError,
};

pub use self::errors::DecodeError;

/// Limits applied while decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLimits {
    /// Largest accepted batch.
    pub max_batch_size: usize,
}

/// One envelope after decoding.
#[derive(Debug)]
pub struct DecodedMessage {
    /// Request id, when the envelope carried a usable one.
    pub id: Option<RequestId>,
    /// The command, or why the envelope was rejected.
    pub outcome: Result<Command, DecodeError>,
}

impl DecodedMessage {
    fn rejected(id: Option<RequestId>, error: DecodeError) -> Self {
        Self {
            id,
            outcome: Err(error),
        }
    }
}

/// A decoded unit.
#[derive(Debug)]
pub enum DecodedUnit {
    /// A single envelope.
    Single(DecodedMessage),
    /// A batch, in array order.
    Batch(Vec<DecodedMessage>),
}

impl DecodedUnit {
    /// Returns the messages in processing order.
    #[must_use]
    pub fn into_messages(self) -> Vec<DecodedMessage> {
        match self {
            Self::Single(message) => vec![message],
            Self::Batch(messages) => messages,
        }
    }
}

/// Decodes one framed value.
#[must_use]
pub fn decode_unit(value: Value, limits: DecodeLimits) -> DecodedUnit {
    match value {
        Value::Array(elements) => decode_batch(elements, limits),
        other => DecodedUnit::Single(decode_envelope(other)),
    }
}

fn decode_batch(elements: Vec<Value>, limits: DecodeLimits) -> DecodedUnit {
    if elements.is_empty() {
        return DecodedUnit::Single(DecodedMessage::rejected(
            None,
            DecodeError::invalid_request("empty batch"),
        ));
    }
    if elements.len() > limits.max_batch_size {
        return DecodedUnit::Single(DecodedMessage::rejected(
            None,
            DecodeError::invalid_request(format!(
                "batch of {} exceeds limit of {}",
                elements.len(),
                limits.max_batch_size
            )),
        ));
    }
    DecodedUnit::Batch(elements.into_iter().map(decode_envelope).collect())
}

/// Decodes a single envelope value.
#[must_use]
pub fn decode_envelope(value: Value) -> DecodedMessage {
    let Value::Object(mut envelope) = value else {
        return DecodedMessage::rejected(
            None,
            DecodeError::invalid_request("envelope must be an object"),
        );
    };

    let id = match RequestId::from_member(envelope.get("id")) {
        Ok(id) => id,
        Err(error) => {
            return DecodedMessage::rejected(None, DecodeError::invalid_request(error.to_string()));
        }
    };

    DecodedMessage {
        outcome: decode_command(&mut envelope),
        id,
    }
}

fn decode_command(envelope: &mut Map<String, Value>) -> Result<Command, DecodeError> {
    match envelope.get("jsonrpc") {
        Some(Value::String(version)) if version == JSONRPC_VERSION => {}
        other => {
            return Err(DecodeError::BadVersion {
                found: other.map(ToString::to_string),
            });
        }
    }

    let method = match envelope.get("method") {
        Some(Value::String(method)) => method.as_str(),
        _ => return Err(DecodeError::invalid_request("method must be a string")),
    };
    let kind = CommandKind::from_method(method)
        .ok_or_else(|| DecodeError::unknown_method(method))?;

    let params = match envelope.remove("params") {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(params)) => params,
        Some(_) => {
            return Err(DecodeError::invalid_params(
                kind,
                ValidationError::invalid("params", "params must be an object"),
            ));
        }
    };

    decode_params(kind, params).map_err(|source| DecodeError::invalid_params(kind, source))
}

/// Decodes the params object of a known method into its command.
///
/// # Errors
///
/// Returns the first [`ValidationError`] found.
pub fn decode_params(kind: CommandKind, params: Map<String, Value>) -> Result<Command, ValidationError> {
    if let Some(field) = kind
        .required_fields()
        .iter()
        .find(|field| params.get(**field).is_none_or(Value::is_null))
    {
        return Err(ValidationError::missing(*field));
    }

    let params = Value::Object(params);
    match kind {
        CommandKind::Log => typed::<LogEntry>(params)
            .and_then(|entry| entry.validate().map(|()| Command::Log(entry))),
        CommandKind::Metric => typed::<Metric>(params)
            .and_then(|metric| metric.validate().map(|()| Command::Metric(metric))),
        CommandKind::Config => typed::<ConfigParams>(params)
            .and_then(ConfigItem::try_from)
            .map(Command::Config),
        CommandKind::Progress => typed::<ProgressTracker>(params)
            .and_then(|tracker| tracker.validate().map(|()| Command::Progress(tracker))),
        CommandKind::Dashboard => typed::<DashboardParams>(params)
            .and_then(DashboardWidget::try_from)
            .map(Command::Dashboard),
        CommandKind::Event => typed::<Event>(params)
            .and_then(|event| event.validate().map(|()| Command::Event(event))),
    }
}

fn typed<T: DeserializeOwned>(params: Value) -> Result<T, ValidationError> {
    serde_json::from_value(params).map_err(|error| ValidationError::malformed(&error))
}
