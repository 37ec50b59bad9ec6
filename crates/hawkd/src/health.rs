//! Structured health reporting for bootstrap and engine lifecycle events.

use std::sync::Arc;

use hawk_config::Config;

use crate::bootstrap::BootstrapError;
use crate::dispatch::MetricsSnapshot;
use crate::engine::{EngineConfig, StopReason};

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait HealthReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn bootstrap_starting(&self);

    /// Invoked after bootstrap completes successfully.
    fn bootstrap_succeeded(&self, config: &Config);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked once the reader and ingestion threads are running.
    fn engine_started(&self, config: &EngineConfig);

    /// Invoked when the ingestion loop exits.
    fn ingestion_ended(&self, reason: StopReason);

    /// Invoked when `stop` completes, with the final counters.
    fn engine_stopped(&self, metrics: &MetricsSnapshot);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter + ?Sized,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        (**self).bootstrap_succeeded(config);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn engine_started(&self, config: &EngineConfig) {
        (**self).engine_started(config);
    }

    fn ingestion_ended(&self, reason: StopReason) {
        (**self).ingestion_ended(reason);
    }

    fn engine_stopped(&self, metrics: &MetricsSnapshot) {
        (**self).engine_stopped(metrics);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_starting",
            "starting hawk bootstrap"
        );
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_succeeded",
            log_filter = %config.log_filter(),
            log_format = ?config.log_format(),
            rate_limit = config.rate_limit,
            "hawk bootstrap completed"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "bootstrap_failed",
            error = %error,
            "hawk bootstrap failed"
        );
    }

    fn engine_started(&self, config: &EngineConfig) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "engine_started",
            rate_limit = config.rate_limit,
            burst_capacity = config.burst_capacity,
            max_message_size = config.max_message_size,
            "ingestion engine running"
        );
    }

    fn ingestion_ended(&self, reason: StopReason) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "ingestion_ended",
            reason = %reason,
            "ingestion loop exited"
        );
    }

    fn engine_stopped(&self, metrics: &MetricsSnapshot) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "engine_stopped",
            received = metrics.received,
            processed = metrics.processed,
            failed = metrics.failed,
            dropped = metrics.dropped,
            batches = metrics.batches,
            mean_latency_us = u64::try_from(metrics.mean_latency.as_micros()).unwrap_or(u64::MAX),
            "ingestion engine stopped"
        );
    }
}
