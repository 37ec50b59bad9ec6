//! Shared configuration for the Hawk binary and engine.
//!
//! Values are layered by `ortho_config`: built-in defaults, then a
//! configuration file (`--config-path` or `HAWK_CONFIG_PATH`), then `HAWK_*`
//! environment variables, then command-line flags. The engine never reads
//! this type directly; `hawkd` converts it into its own validated
//! `EngineConfig` once at start-up.

mod defaults;
mod logging;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_BURST_CAPACITY, DEFAULT_EVENT_BUFFER_CAPACITY, DEFAULT_LOG_BUFFER_CAPACITY,
    DEFAULT_LOG_FILTER, DEFAULT_MAX_BATCH_SIZE, DEFAULT_MAX_MESSAGE_SIZE,
    DEFAULT_METRIC_HISTORY_CAPACITY, DEFAULT_RATE_LIMIT, DEFAULT_REPORT_INTERVAL_MS,
    default_log_filter, default_log_filter_string, default_log_format,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Layered configuration consumed by the `hawk` binary.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "HAWK")]
pub struct Config {
    /// `tracing` filter expression for diagnostics on stderr.
    #[ortho_config(default = defaults::default_log_filter_string())]
    pub log_filter: String,
    /// Diagnostic output format.
    #[ortho_config(default = defaults::default_log_format())]
    pub log_format: LogFormat,
    /// Whether operational counters are collected.
    #[ortho_config(default = true)]
    pub enable_metrics: bool,
    /// Sustained admission rate, in messages per second.
    #[ortho_config(default = defaults::DEFAULT_RATE_LIMIT)]
    pub rate_limit: f64,
    /// Messages admitted back-to-back before throttling starts.
    #[ortho_config(default = defaults::DEFAULT_BURST_CAPACITY)]
    pub burst_capacity: u32,
    /// Log entries retained for display.
    #[ortho_config(default = defaults::DEFAULT_LOG_BUFFER_CAPACITY)]
    pub log_buffer_capacity: usize,
    /// Samples retained per metric name.
    #[ortho_config(default = defaults::DEFAULT_METRIC_HISTORY_CAPACITY)]
    pub metric_history_capacity: usize,
    /// Events retained for display.
    #[ortho_config(default = defaults::DEFAULT_EVENT_BUFFER_CAPACITY)]
    pub event_buffer_capacity: usize,
    /// Largest accepted framed unit, in bytes.
    #[ortho_config(default = defaults::DEFAULT_MAX_MESSAGE_SIZE)]
    pub max_message_size: usize,
    /// Largest accepted batch, in envelopes.
    #[ortho_config(default = defaults::DEFAULT_MAX_BATCH_SIZE)]
    pub max_batch_size: usize,
    /// Interval between periodic summaries, in milliseconds; `0` disables them.
    #[ortho_config(default = defaults::DEFAULT_REPORT_INTERVAL_MS)]
    pub report_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: defaults::default_log_filter_string(),
            log_format: defaults::default_log_format(),
            enable_metrics: true,
            rate_limit: DEFAULT_RATE_LIMIT,
            burst_capacity: DEFAULT_BURST_CAPACITY,
            log_buffer_capacity: DEFAULT_LOG_BUFFER_CAPACITY,
            metric_history_capacity: DEFAULT_METRIC_HISTORY_CAPACITY,
            event_buffer_capacity: DEFAULT_EVENT_BUFFER_CAPACITY,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            report_interval_ms: DEFAULT_REPORT_INTERVAL_MS,
        }
    }
}

impl Config {
    /// Returns the configured log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Returns the configured log format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Returns the summary interval, or `None` when summaries are disabled.
    #[must_use]
    pub const fn report_interval(&self) -> Option<std::time::Duration> {
        if self.report_interval_ms == 0 {
            None
        } else {
            Some(std::time::Duration::from_millis(self.report_interval_ms))
        }
    }
}
