//! `hawk.event` notices.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};
use time::OffsetDateTime;

use crate::validation::{ValidationError, require_non_blank};

/// Event importance.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EventSeverity {
    /// Informational.
    #[default]
    Info,
    /// Completed successfully.
    Success,
    /// Needs attention.
    Warning,
    /// Something failed.
    Error,
    /// Needs immediate attention.
    Critical,
}

/// A discrete occurrence reported by the producer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Producer-defined category, for example `deploy`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Short headline.
    pub title: String,
    /// Longer description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Importance; defaults to [`EventSeverity::Info`].
    #[serde(default)]
    pub severity: EventSeverity,
    /// Structured payload.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub data: Map<String, Value>,
    /// Producer-side timestamp; filled in on receipt when absent.
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<OffsetDateTime>,
}

impl Event {
    /// Creates an event with no message, data or timestamp.
    #[must_use]
    pub fn new(kind: impl Into<String>, title: impl Into<String>, severity: EventSeverity) -> Self {
        Self {
            kind: kind.into(),
            title: title.into(),
            message: None,
            severity,
            data: Map::new(),
            timestamp: None,
        }
    }

    /// Checks field constraints not expressed by the schema.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Missing`] when `type` or `title` is blank.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("type", &self.kind)?;
        require_non_blank("title", &self.title)
    }
}
