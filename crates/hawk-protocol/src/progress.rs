//! `hawk.progress` trackers.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use time::OffsetDateTime;

use crate::validation::{ValidationError, require_finite, require_non_blank};

/// Lifecycle of a tracked task.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProgressStatus {
    /// Not started yet.
    Pending,
    /// Running.
    #[default]
    InProgress,
    /// Finished successfully.
    Completed,
    /// Finished unsuccessfully. `error` is accepted on the wire.
    #[serde(alias = "error")]
    #[strum(serialize = "failed", serialize = "error")]
    Failed,
}

impl ProgressStatus {
    /// Returns whether no further updates are expected.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Progress of a long-running producer task, keyed by `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressTracker {
    /// Unique tracker key.
    pub id: String,
    /// Display label.
    pub label: String,
    /// Completed units of work.
    #[serde(default)]
    pub current: f64,
    /// Total units of work; `0` when unknown.
    #[serde(default)]
    pub total: f64,
    /// Unit of work, for example `files`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Lifecycle status; defaults to [`ProgressStatus::InProgress`].
    #[serde(default)]
    pub status: ProgressStatus,
    /// Free-form detail line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Producer estimate of the completion time.
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub estimated_completion: Option<OffsetDateTime>,
}

impl ProgressTracker {
    /// Creates an in-progress tracker.
    #[must_use]
    pub fn new(id: impl Into<String>, label: impl Into<String>, current: f64, total: f64) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            current,
            total,
            unit: None,
            status: ProgressStatus::InProgress,
            details: None,
            estimated_completion: None,
        }
    }

    /// Completed fraction in `0.0..=1.0`, or `None` when the total is unknown.
    #[must_use]
    pub fn fraction(&self) -> Option<f64> {
        (self.total > 0.0).then(|| (self.current / self.total).clamp(0.0, 1.0))
    }

    /// Checks field constraints not expressed by the schema.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for a blank id or label, or for a
    /// negative or non-finite `current`/`total`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("id", &self.id)?;
        require_non_blank("label", &self.label)?;
        for (field, value) in [("current", self.current), ("total", self.total)] {
            require_finite(field, value)?;
            if value < 0.0 {
                return Err(ValidationError::invalid(field, "value must not be negative"));
            }
        }
        Ok(())
    }
}
