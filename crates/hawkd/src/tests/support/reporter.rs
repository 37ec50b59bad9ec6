//! Test double for [`HealthReporter`] that records structured events.

use std::sync::Mutex;

use hawk_config::Config;

use crate::bootstrap::BootstrapError;
use crate::dispatch::MetricsSnapshot;
use crate::engine::{EngineConfig, StopReason};
use crate::health::HealthReporter;

/// Health events tracked during scenarios.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthEvent {
    /// Bootstrap started.
    BootstrapStarting,
    /// Bootstrap completed.
    BootstrapSucceeded,
    /// Bootstrap failed with an error description.
    BootstrapFailed(String),
    /// Engine threads started.
    EngineStarted,
    /// Ingestion loop exited.
    IngestionEnded(StopReason),
    /// Engine stopped after processing this many commands.
    EngineStopped { processed: u64 },
}

impl HealthEvent {
    /// Short label used in feature files.
    pub fn label(&self) -> &'static str {
        match self {
            Self::BootstrapStarting => "starting",
            Self::BootstrapSucceeded => "succeeded",
            Self::BootstrapFailed(_) => "failed",
            Self::EngineStarted => "engine_started",
            Self::IngestionEnded(_) => "ingestion_ended",
            Self::EngineStopped { .. } => "engine_stopped",
        }
    }
}

/// Records health events for assertions.
#[derive(Debug, Default)]
pub struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    /// Captures a copy of the recorded events.
    pub fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .clone()
    }

    fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn bootstrap_starting(&self) {
        self.record(HealthEvent::BootstrapStarting);
    }

    fn bootstrap_succeeded(&self, _config: &Config) {
        self.record(HealthEvent::BootstrapSucceeded);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.record(HealthEvent::BootstrapFailed(error.to_string()));
    }

    fn engine_started(&self, _config: &EngineConfig) {
        self.record(HealthEvent::EngineStarted);
    }

    fn ingestion_ended(&self, reason: StopReason) {
        self.record(HealthEvent::IngestionEnded(reason));
    }

    fn engine_stopped(&self, metrics: &MetricsSnapshot) {
        self.record(HealthEvent::EngineStopped {
            processed: metrics.processed,
        });
    }
}
