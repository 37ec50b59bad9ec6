//! Log selection for viewers.

use hawk_protocol::{LogEntry, LogLevel};

/// Criteria a log entry must meet to be shown. Empty criteria match all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogFilter {
    /// Lowest severity to include.
    pub min_level: Option<LogLevel>,
    /// Exact component name.
    pub component: Option<String>,
    /// Case-insensitive substring of the message.
    pub text: Option<String>,
}

impl LogFilter {
    /// Matches entries at or above `level`.
    #[must_use]
    pub fn at_least(level: LogLevel) -> Self {
        Self {
            min_level: Some(level),
            ..Self::default()
        }
    }

    /// Returns whether `entry` satisfies every criterion.
    #[must_use]
    pub fn matches(&self, entry: &LogEntry) -> bool {
        self.min_level.is_none_or(|level| entry.level >= level)
            && self
                .component
                .as_deref()
                .is_none_or(|component| entry.component.as_deref() == Some(component))
            && self.text.as_deref().is_none_or(|text| {
                entry
                    .message
                    .to_lowercase()
                    .contains(&text.to_lowercase())
            })
    }
}
