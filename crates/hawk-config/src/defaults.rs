use crate::logging::LogFormat;

/// Default log filter expression used by the binary.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default sustained admission rate, in messages per second.
pub const DEFAULT_RATE_LIMIT: f64 = 1000.0;

/// Default number of messages admitted back-to-back before throttling.
pub const DEFAULT_BURST_CAPACITY: u32 = 200;

/// Default number of log entries retained by the live state.
pub const DEFAULT_LOG_BUFFER_CAPACITY: usize = 1000;

/// Default number of samples retained per metric name.
pub const DEFAULT_METRIC_HISTORY_CAPACITY: usize = 120;

/// Default number of events retained by the live state.
pub const DEFAULT_EVENT_BUFFER_CAPACITY: usize = 500;

/// Default upper bound on one framed unit, in bytes (1 MiB).
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 1024 * 1024;

/// Default upper bound on the number of envelopes in one batch.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 100;

/// Default interval between periodic summaries, in milliseconds.
pub const DEFAULT_REPORT_INTERVAL_MS: u64 = 30_000;

/// Default log filter expression used by the binary.
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

/// Default logging format for the binary.
pub fn default_log_format() -> LogFormat {
    LogFormat::Compact
}
