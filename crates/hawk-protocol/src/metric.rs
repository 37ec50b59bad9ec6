//! `hawk.metric` samples.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};
use time::OffsetDateTime;

use crate::validation::{ValidationError, require_finite, require_non_blank};

/// How a metric value should be interpreted.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MetricType {
    /// Monotonic count.
    Counter,
    /// Point-in-time value.
    #[default]
    Gauge,
    /// Observation feeding a distribution.
    Histogram,
}

/// A named numeric sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    /// Metric name; the key of its series.
    pub name: String,
    /// Sample value.
    pub value: f64,
    /// Interpretation; defaults to [`MetricType::Gauge`].
    #[serde(default, rename = "type")]
    pub kind: MetricType,
    /// Display unit, for example `%` or `ms`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Dimension labels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Map<String, Value>>,
    /// Producer-side timestamp; filled in on receipt when absent.
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<OffsetDateTime>,
}

impl Metric {
    /// Creates a gauge sample.
    #[must_use]
    pub fn gauge(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
            kind: MetricType::Gauge,
            unit: None,
            tags: None,
            timestamp: None,
        }
    }

    /// Checks field constraints not expressed by the schema.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for a blank name or a non-finite value.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("name", &self.name)?;
        require_finite("value", self.value)
    }
}
