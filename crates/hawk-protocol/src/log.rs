//! `hawk.log` entries.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};
use time::OffsetDateTime;

use crate::validation::{ValidationError, require_non_blank};

/// Log severity. Variants are ordered from least to most severe.
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
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum LogLevel {
    /// Diagnostic detail.
    #[serde(alias = "debug")]
    Debug,
    /// Routine information.
    #[default]
    #[serde(alias = "info")]
    Info,
    /// A completed operation.
    #[serde(alias = "success")]
    Success,
    /// Something unexpected that did not fail.
    #[serde(alias = "warn", alias = "WARNING", alias = "warning")]
    Warn,
    /// A failure.
    #[serde(alias = "error")]
    Error,
}

/// A single log line sent by the producer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Log text.
    pub message: String,
    /// Severity; defaults to [`LogLevel::Info`].
    #[serde(default)]
    pub level: LogLevel,
    /// Producer-side timestamp; filled in on receipt when absent.
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<OffsetDateTime>,
    /// Structured context attached to the line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Map<String, Value>>,
    /// Free-form labels.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Producer component that emitted the line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
}

impl LogEntry {
    /// Creates an entry with no timestamp, context, tags or component.
    #[must_use]
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level,
            timestamp: None,
            context: None,
            tags: Vec::new(),
            component: None,
        }
    }

    /// Sets the emitting component.
    #[must_use]
    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }

    /// Checks field constraints not expressed by the schema.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Missing`] when the message is blank.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("message", &self.message)
    }
}
