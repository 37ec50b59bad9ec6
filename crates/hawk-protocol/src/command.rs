//! The closed union of telemetry commands.

use serde_json::Value;
use time::OffsetDateTime;

use crate::{
    CommandKind, ConfigItem, DashboardWidget, Envelope, Event, LogEntry, Metric, ProgressTracker,
    RequestId,
};

/// A decoded, validated telemetry command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `hawk.log`
    Log(LogEntry),
    /// `hawk.metric`
    Metric(Metric),
    /// `hawk.config`
    Config(ConfigItem),
    /// `hawk.progress`
    Progress(ProgressTracker),
    /// `hawk.dashboard`
    Dashboard(DashboardWidget),
    /// `hawk.event`
    Event(Event),
}

impl Command {
    /// Returns the kind of this command.
    #[must_use]
    pub const fn kind(&self) -> CommandKind {
        match self {
            Self::Log(_) => CommandKind::Log,
            Self::Metric(_) => CommandKind::Metric,
            Self::Config(_) => CommandKind::Config,
            Self::Progress(_) => CommandKind::Progress,
            Self::Dashboard(_) => CommandKind::Dashboard,
            Self::Event(_) => CommandKind::Event,
        }
    }

    /// Returns the wire method name.
    #[must_use]
    pub const fn method(&self) -> &'static str {
        self.kind().method()
    }

    /// Serialises the payload as a params object.
    ///
    /// # Errors
    ///
    /// Returns the serializer error; this only happens for payloads holding
    /// timestamps outside the RFC 3339 range.
    pub fn params(&self) -> Result<Value, serde_json::Error> {
        match self {
            Self::Log(entry) => serde_json::to_value(entry),
            Self::Metric(metric) => serde_json::to_value(metric),
            Self::Config(item) => serde_json::to_value(item),
            Self::Progress(tracker) => serde_json::to_value(tracker),
            Self::Dashboard(widget) => serde_json::to_value(widget),
            Self::Event(event) => serde_json::to_value(event),
        }
    }

    /// Wraps the command in an envelope, as a producer would send it.
    ///
    /// # Errors
    ///
    /// Propagates [`Command::params`] failures.
    pub fn to_envelope(&self, id: Option<RequestId>) -> Result<Envelope, serde_json::Error> {
        Ok(Envelope::new(self.method(), self.params()?, id))
    }

    /// Fills a missing timestamp on logs, metrics and events.
    pub fn stamp(&mut self, now: OffsetDateTime) {
        let slot = match self {
            Self::Log(entry) => &mut entry.timestamp,
            Self::Metric(metric) => &mut metric.timestamp,
            Self::Event(event) => &mut event.timestamp,
            Self::Config(_) | Self::Progress(_) | Self::Dashboard(_) => return,
        };
        slot.get_or_insert(now);
    }
}
