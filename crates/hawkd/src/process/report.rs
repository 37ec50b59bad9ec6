//! Periodic summary of ingestion activity.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::info;

use super::PROCESS_TARGET;
use crate::engine::Engine;
use crate::rate_limit::Clock;

/// Logs a metrics and state summary every `interval` until ingestion ends.
pub(crate) fn spawn_reporter<C>(
    engine: Arc<Engine<C>>,
    interval: Duration,
) -> io::Result<JoinHandle<()>>
where
    C: Clock + 'static,
{
    thread::Builder::new()
        .name("hawk-report".to_owned())
        .spawn(move || {
            while !engine.wait_timeout(interval) {
                let metrics = engine.metrics();
                let state = engine.state().summary();
                info!(
                    target: PROCESS_TARGET,
                    received = metrics.received,
                    processed = metrics.processed,
                    failed = metrics.failed,
                    dropped = metrics.dropped,
                    revision = state.revision,
                    logs = state.logs,
                    metrics = state.metrics,
                    widgets = state.widgets,
                    "ingestion summary"
                );
            }
        })
}
