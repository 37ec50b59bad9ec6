//! Per-kind hooks invoked for every admitted command.

use std::sync::Arc;

use thiserror::Error;

use hawk_protocol::{ConfigItem, DashboardWidget, Event, LogEntry, Metric, ProgressTracker};

/// Failure reported by a [`MessageHandler`].
///
/// The command is answered with an internal error and is not applied to the
/// live state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
}

impl HandlerError {
    /// Creates a handler error with the given description.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Human-readable description.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Receives each admitted command before it reaches the live state.
///
/// Handlers run synchronously on the ingestion thread and must return
/// quickly. Every method defaults to accepting the command, so an
/// implementation only overrides the kinds it cares about.
#[cfg_attr(test, mockall::automock)]
pub trait MessageHandler: Send + Sync {
    /// Called for `hawk.log`.
    ///
    /// # Errors
    ///
    /// A returned error rejects the command.
    fn handle_log(&self, _entry: &LogEntry) -> Result<(), HandlerError> {
        Ok(())
    }

    /// Called for `hawk.metric`.
    ///
    /// # Errors
    ///
    /// A returned error rejects the command.
    fn handle_metric(&self, _metric: &Metric) -> Result<(), HandlerError> {
        Ok(())
    }

    /// Called for `hawk.config`.
    ///
    /// # Errors
    ///
    /// A returned error rejects the command.
    fn handle_config(&self, _item: &ConfigItem) -> Result<(), HandlerError> {
        Ok(())
    }

    /// Called for `hawk.progress`.
    ///
    /// # Errors
    ///
    /// A returned error rejects the command.
    fn handle_progress(&self, _tracker: &ProgressTracker) -> Result<(), HandlerError> {
        Ok(())
    }

    /// Called for `hawk.dashboard`.
    ///
    /// # Errors
    ///
    /// A returned error rejects the command.
    fn handle_dashboard(&self, _widget: &DashboardWidget) -> Result<(), HandlerError> {
        Ok(())
    }

    /// Called for `hawk.event`.
    ///
    /// # Errors
    ///
    /// A returned error rejects the command.
    fn handle_event(&self, _event: &Event) -> Result<(), HandlerError> {
        Ok(())
    }
}

impl<T> MessageHandler for Arc<T>
where
    T: MessageHandler + ?Sized,
{
    fn handle_log(&self, entry: &LogEntry) -> Result<(), HandlerError> {
        (**self).handle_log(entry)
    }

    fn handle_metric(&self, metric: &Metric) -> Result<(), HandlerError> {
        (**self).handle_metric(metric)
    }

    fn handle_config(&self, item: &ConfigItem) -> Result<(), HandlerError> {
        (**self).handle_config(item)
    }

    fn handle_progress(&self, tracker: &ProgressTracker) -> Result<(), HandlerError> {
        (**self).handle_progress(tracker)
    }

    fn handle_dashboard(&self, widget: &DashboardWidget) -> Result<(), HandlerError> {
        (**self).handle_dashboard(widget)
    }

    fn handle_event(&self, event: &Event) -> Result<(), HandlerError> {
        (**self).handle_event(event)
    }
}

/// Handler that accepts everything; used for headless runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMessageHandler;

impl MessageHandler for NoopMessageHandler {}
