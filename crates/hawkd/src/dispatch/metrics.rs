//! Operational counters for the ingestion path.
//!
//! Plain counters are atomics; the keyed breakdowns, latency aggregate and
//! last-message time share one mutex. The ingestion thread is the only
//! writer, but snapshots may be taken from any thread.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use serde::Serialize;
use time::OffsetDateTime;

use hawk_protocol::CommandKind;

#[derive(Debug, Default)]
struct Breakdown {
    per_kind: BTreeMap<CommandKind, u64>,
    per_error: BTreeMap<&'static str, u64>,
    latency_total_nanos: u128,
    latency_samples: u64,
    last_message: Option<OffsetDateTime>,
}

/// Counters describing everything the engine has ingested.
#[derive(Debug)]
pub struct Metrics {
    enabled: bool,
    received: AtomicU64,
    processed: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
    batches: AtomicU64,
    breakdown: Mutex<Breakdown>,
}

/// Point-in-time copy of [`Metrics`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    /// Envelopes and framing units seen, before validation.
    pub received: u64,
    /// Commands applied to the live state.
    pub processed: u64,
    /// Messages rejected at any stage.
    pub failed: u64,
    /// Notifications refused by the rate limiter.
    pub dropped: u64,
    /// Batches seen.
    pub batches: u64,
    /// Processed commands by kind.
    pub per_kind: BTreeMap<CommandKind, u64>,
    /// Failures by error kind.
    pub per_error: BTreeMap<String, u64>,
    /// Mean time from decode to state update over processed commands.
    #[serde(rename = "mean_latency_us", serialize_with = "serialize_micros")]
    pub mean_latency: Duration,
    /// When the last message was received.
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_message: Option<OffsetDateTime>,
}

fn serialize_micros<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_u64(u64::try_from(value.as_micros()).unwrap_or(u64::MAX))
}

impl Metrics {
    /// Creates zeroed counters. Disabled counters ignore every update.
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            received: AtomicU64::new(0),
            processed: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            batches: AtomicU64::new(0),
            breakdown: Mutex::new(Breakdown::default()),
        }
    }

    /// Whether updates are recorded.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub(crate) fn record_received(&self, count: u64) {
        if !self.enabled {
            return;
        }
        self.received.fetch_add(count, Ordering::Relaxed);
        self.breakdown().last_message = Some(OffsetDateTime::now_utc());
    }

    pub(crate) fn record_batch(&self) {
        if self.enabled {
            self.batches.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_processed(&self, kind: CommandKind, elapsed: Duration) {
        if !self.enabled {
            return;
        }
        self.processed.fetch_add(1, Ordering::Relaxed);
        let mut breakdown = self.breakdown();
        *breakdown.per_kind.entry(kind).or_default() += 1;
        breakdown.latency_total_nanos = breakdown
            .latency_total_nanos
            .saturating_add(elapsed.as_nanos());
        breakdown.latency_samples += 1;
    }

    pub(crate) fn record_failed(&self, error_kind: &'static str) {
        if !self.enabled {
            return;
        }
        self.failed.fetch_add(1, Ordering::Relaxed);
        *self.breakdown().per_error.entry(error_kind).or_default() += 1;
    }

    pub(crate) fn record_dropped(&self) {
        if self.enabled {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Copies the current counters.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        let breakdown = self.breakdown();
        let mean_nanos = breakdown
            .latency_total_nanos
            .checked_div(u128::from(breakdown.latency_samples))
            .unwrap_or_default();
        MetricsSnapshot {
            received: self.received.load(Ordering::Relaxed),
            processed: self.processed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            batches: self.batches.load(Ordering::Relaxed),
            per_kind: breakdown.per_kind.clone(),
            per_error: breakdown
                .per_error
                .iter()
                .map(|(kind, count)| ((*kind).to_owned(), *count))
                .collect(),
            mean_latency: Duration::from_nanos(u64::try_from(mean_nanos).unwrap_or(u64::MAX)),
            last_message: breakdown.last_message,
        }
    }

    fn breakdown(&self) -> std::sync::MutexGuard<'_, Breakdown> {
        self.breakdown.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
