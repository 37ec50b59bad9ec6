//! Bounded in-memory model of everything the producer has reported.
//!
//! Each store sits behind its own lock so a slow reader of one store never
//! blocks ingestion into another. Only the dispatcher mutates the model, via
//! [`LiveState::apply`]; readers get owned snapshots. A revision counter is
//! bumped on every mutation so a render loop can skip redraws when nothing
//! changed.

mod filter;
mod ring;

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;
use time::OffsetDateTime;

use hawk_protocol::{
    Command, ConfigItem, DashboardWidget, Event, LogEntry, Metric, ProgressTracker,
};

pub use self::filter::LogFilter;
use self::ring::RingBuffer;

/// Retention limits for the bounded stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateCapacities {
    /// Log entries kept.
    pub logs: usize,
    /// Samples kept per metric name.
    pub metric_history: usize,
    /// Events kept.
    pub events: usize,
}

/// One retained metric sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricSample {
    /// Sample value.
    pub value: f64,
    /// When the sample was taken.
    #[serde(with = "time::serde::rfc3339::option")]
    pub timestamp: Option<OffsetDateTime>,
}

/// Latest value and bounded history of one metric name.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSeries {
    /// Most recent sample, with its metadata.
    pub latest: Metric,
    history: RingBuffer<MetricSample>,
}

impl MetricSeries {
    fn new(metric: Metric, capacity: usize) -> Self {
        let mut history = RingBuffer::new(capacity);
        history.push(sample_of(&metric));
        Self {
            latest: metric,
            history,
        }
    }

    fn record(&mut self, metric: Metric) {
        self.history.push(sample_of(&metric));
        self.latest = metric;
    }

    /// Retained samples, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<MetricSample> {
        self.history.iter().copied().collect()
    }
}

const fn sample_of(metric: &Metric) -> MetricSample {
    MetricSample {
        value: metric.value,
        timestamp: metric.timestamp,
    }
}

/// Counts of retained entities, used for periodic summaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StateSummary {
    /// Current revision.
    pub revision: u64,
    /// Retained log entries.
    pub logs: usize,
    /// Distinct metric names.
    pub metrics: usize,
    /// Config items.
    pub config: usize,
    /// Progress trackers.
    pub progress: usize,
    /// Dashboard widgets.
    pub widgets: usize,
    /// Retained events.
    pub events: usize,
}

/// The live state model.
#[derive(Debug)]
pub struct LiveState {
    capacities: StateCapacities,
    revision: AtomicU64,
    logs: RwLock<RingBuffer<LogEntry>>,
    metrics: RwLock<BTreeMap<String, MetricSeries>>,
    config: RwLock<BTreeMap<String, ConfigItem>>,
    progress: RwLock<BTreeMap<String, ProgressTracker>>,
    dashboard: RwLock<BTreeMap<String, DashboardWidget>>,
    events: RwLock<RingBuffer<Event>>,
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

impl LiveState {
    /// Creates an empty model.
    #[must_use]
    pub fn new(capacities: StateCapacities) -> Self {
        Self {
            capacities,
            revision: AtomicU64::new(0),
            logs: RwLock::new(RingBuffer::new(capacities.logs)),
            metrics: RwLock::new(BTreeMap::new()),
            config: RwLock::new(BTreeMap::new()),
            progress: RwLock::new(BTreeMap::new()),
            dashboard: RwLock::new(BTreeMap::new()),
            events: RwLock::new(RingBuffer::new(capacities.events)),
        }
    }

    /// Applies a dispatched command.
    pub(crate) fn apply(&self, command: Command) {
        match command {
            Command::Log(entry) => {
                write(&self.logs).push(entry);
            }
            Command::Metric(metric) => {
                let mut metrics = write(&self.metrics);
                if let Some(series) = metrics.get_mut(&metric.name) {
                    series.record(metric);
                } else {
                    let name = metric.name.clone();
                    let series = MetricSeries::new(metric, self.capacities.metric_history);
                    metrics.insert(name, series);
                }
            }
            Command::Config(item) => {
                write(&self.config).insert(item.key.clone(), item);
            }
            Command::Progress(tracker) => {
                write(&self.progress).insert(tracker.id.clone(), tracker);
            }
            Command::Dashboard(widget) => {
                write(&self.dashboard).insert(widget.widget_id.clone(), widget);
            }
            Command::Event(event) => {
                write(&self.events).push(event);
            }
        }
        self.revision.fetch_add(1, Ordering::SeqCst);
    }

    /// Returns the mutation counter.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }

    /// Retained log entries, oldest first.
    #[must_use]
    pub fn logs(&self) -> Vec<LogEntry> {
        read(&self.logs).iter().cloned().collect()
    }

    /// Retained log entries matching `filter`, oldest first.
    #[must_use]
    pub fn filtered_logs(&self, filter: &LogFilter) -> Vec<LogEntry> {
        read(&self.logs)
            .iter()
            .filter(|entry| filter.matches(entry))
            .cloned()
            .collect()
    }

    /// Series for one metric name.
    #[must_use]
    pub fn metric(&self, name: &str) -> Option<MetricSeries> {
        read(&self.metrics).get(name).cloned()
    }

    /// Every metric series, ordered by name.
    #[must_use]
    pub fn metrics(&self) -> Vec<MetricSeries> {
        read(&self.metrics).values().cloned().collect()
    }

    /// One config item.
    #[must_use]
    pub fn config_item(&self, key: &str) -> Option<ConfigItem> {
        read(&self.config).get(key).cloned()
    }

    /// Every config item, ordered by key.
    #[must_use]
    pub fn config(&self) -> Vec<ConfigItem> {
        read(&self.config).values().cloned().collect()
    }

    /// Every progress tracker, ordered by id.
    #[must_use]
    pub fn progress(&self) -> Vec<ProgressTracker> {
        read(&self.progress).values().cloned().collect()
    }

    /// Every dashboard widget, ordered by id.
    #[must_use]
    pub fn dashboard(&self) -> Vec<DashboardWidget> {
        read(&self.dashboard).values().cloned().collect()
    }

    /// Retained events, newest first.
    #[must_use]
    pub fn events(&self) -> Vec<Event> {
        read(&self.events).iter().rev().cloned().collect()
    }

    /// Entity counts at the current revision.
    #[must_use]
    pub fn summary(&self) -> StateSummary {
        StateSummary {
            revision: self.revision(),
            logs: read(&self.logs).len(),
            metrics: read(&self.metrics).len(),
            config: read(&self.config).len(),
            progress: read(&self.progress).len(),
            widgets: read(&self.dashboard).len(),
            events: read(&self.events).len(),
        }
    }
}
