//! Lifecycle controller for the ingestion engine.
//!
//! An [`Engine`] owns the live state, metrics and outbound channel and runs
//! two threads once started: a reader that frames the input stream and an
//! ingestion loop that decodes and dispatches units in arrival order. The
//! engine moves through [`Phase::Idle`], [`Phase::Running`] and
//! [`Phase::Draining`] to the terminal [`Phase::Stopped`].

mod config;
mod errors;
mod ingest;

use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, error, info};

pub use self::config::{EngineConfig, EngineConfigError};
pub use self::errors::LifecycleError;
pub use self::ingest::StopReason;

use crate::dispatch::{Dispatcher, MessageHandler, Metrics, MetricsSnapshot};
use crate::health::{HealthReporter, StructuredHealthReporter};
use crate::outbound::ResponseSender;
use crate::rate_limit::{Clock, RateLimiter, RealClock};
use crate::state::LiveState;
use crate::transport::{TransportError, spawn_reader};

pub(crate) const ENGINE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::engine");

/// Units buffered between the reader and the ingestion loop.
const INBOUND_QUEUE_DEPTH: usize = 64;

/// Lifecycle phase of an [`Engine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Built but not started.
    Idle,
    /// Reader and ingestion loop are running.
    Running,
    /// `stop` is waiting for the ingestion loop to exit.
    Draining,
    /// Terminal.
    Stopped,
}

#[derive(Debug)]
struct Control {
    phase: Phase,
    reader: Option<JoinHandle<()>>,
    ingest: Option<JoinHandle<()>>,
}

/// One-shot latch released when the ingestion loop has exited.
#[derive(Debug, Default)]
struct ExitLatch {
    released: Mutex<bool>,
    signal: Condvar,
}

impl ExitLatch {
    fn release(&self) {
        *self.released.lock().unwrap_or_else(PoisonError::into_inner) = true;
        self.signal.notify_all();
    }

    fn wait_until(&self, deadline: Option<Instant>) -> bool {
        let mut released = self.released.lock().unwrap_or_else(PoisonError::into_inner);
        while !*released {
            released = match deadline {
                None => self
                    .signal
                    .wait(released)
                    .unwrap_or_else(PoisonError::into_inner),
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        return false;
                    }
                    self.signal
                        .wait_timeout(released, remaining)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
            };
        }
        true
    }
}

/// Releases the latch when the ingestion thread exits, including by unwinding.
struct ReleaseOnExit(Arc<ExitLatch>);

impl Drop for ReleaseOnExit {
    fn drop(&mut self) {
        self.0.release();
    }
}

/// The ingestion engine.
pub struct Engine<C: Clock = RealClock> {
    config: EngineConfig,
    state: Arc<LiveState>,
    metrics: Arc<Metrics>,
    sender: Arc<dyn ResponseSender>,
    health: Arc<dyn HealthReporter>,
    dispatcher: Arc<Dispatcher<C>>,
    cancel: Arc<AtomicBool>,
    control: Mutex<Control>,
    stopping: Mutex<()>,
    exited: Arc<ExitLatch>,
}

impl Engine<RealClock> {
    /// Builds an idle engine using the system clock for rate limiting.
    ///
    /// # Errors
    ///
    /// Returns [`EngineConfigError`] when `config` fails validation.
    pub fn new(
        config: EngineConfig,
        handler: Arc<dyn MessageHandler>,
        sender: Arc<dyn ResponseSender>,
    ) -> Result<Self, EngineConfigError> {
        Self::with_clock(config, handler, sender, RealClock)
    }
}

impl<C: Clock + 'static> Engine<C> {
    /// Builds an idle engine with an explicit rate limiter clock.
    ///
    /// # Errors
    ///
    /// Returns [`EngineConfigError`] when `config` fails validation.
    pub fn with_clock(
        config: EngineConfig,
        handler: Arc<dyn MessageHandler>,
        sender: Arc<dyn ResponseSender>,
        clock: C,
    ) -> Result<Self, EngineConfigError> {
        config.validate()?;
        let state = Arc::new(LiveState::new(config.capacities()));
        let metrics = Arc::new(Metrics::new(config.enable_metrics));
        let limiter = RateLimiter::with_clock(config.rate_limit, config.burst_capacity, clock);
        let dispatcher = Arc::new(Dispatcher::new(
            handler,
            Arc::clone(&sender),
            Arc::clone(&state),
            Arc::clone(&metrics),
            limiter,
            config.decode_limits(),
        ));
        Ok(Self {
            config,
            state,
            metrics,
            sender,
            health: Arc::new(StructuredHealthReporter::new()),
            dispatcher,
            cancel: Arc::new(AtomicBool::new(false)),
            control: Mutex::new(Control {
                phase: Phase::Idle,
                reader: None,
                ingest: None,
            }),
            stopping: Mutex::new(()),
            exited: Arc::new(ExitLatch::default()),
        })
    }

    /// Replaces the health reporter.
    #[must_use]
    pub fn with_health_reporter(mut self, health: Arc<dyn HealthReporter>) -> Self {
        self.health = health;
        self
    }

    /// Starts reading `input` and dispatching what arrives.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::AlreadyStarted`] or
    /// [`LifecycleError::AlreadyStopped`] unless the engine is idle, and
    /// [`LifecycleError::Spawn`] when a thread cannot be created.
    pub fn start<R>(&self, input: R) -> Result<(), LifecycleError>
    where
        R: Read + Send + 'static,
    {
        let mut control = self.control();
        match control.phase {
            Phase::Idle => {}
            Phase::Running | Phase::Draining => return Err(LifecycleError::AlreadyStarted),
            Phase::Stopped => return Err(LifecycleError::AlreadyStopped),
        }

        let (inbound_tx, inbound_rx) = mpsc::sync_channel(INBOUND_QUEUE_DEPTH);
        let reader = spawn_reader(
            input,
            self.config.max_message_size,
            Arc::clone(&self.cancel),
            inbound_tx,
        )
        .map_err(|source| LifecycleError::Spawn { source })?;

        let dispatcher = Arc::clone(&self.dispatcher);
        let cancel = Arc::clone(&self.cancel);
        let health = Arc::clone(&self.health);
        let exited = Arc::clone(&self.exited);
        let ingest = thread::Builder::new()
            .name("hawk-ingest".to_owned())
            .spawn(move || {
                let _release = ReleaseOnExit(exited);
                let reason = ingest::run(&dispatcher, &inbound_rx, &cancel);
                health.ingestion_ended(reason);
            })
            .map_err(|source| {
                self.cancel.store(true, Ordering::SeqCst);
                LifecycleError::Spawn {
                    source: TransportError::Spawn { source },
                }
            })?;

        control.reader = Some(reader);
        control.ingest = Some(ingest);
        control.phase = Phase::Running;
        drop(control);
        self.health.engine_started(&self.config);
        Ok(())
    }

    /// Cancels ingestion and waits for the loop to exit.
    ///
    /// Idempotent. Concurrent callers serialise: a second caller returns only
    /// once the first has finished. No handler runs after `stop` returns.
    pub fn stop(&self) {
        let _serial = self.stopping.lock().unwrap_or_else(PoisonError::into_inner);

        let (reader, ingest) = {
            let mut control = self.control();
            match control.phase {
                Phase::Stopped => return,
                Phase::Idle => {
                    control.phase = Phase::Stopped;
                    drop(control);
                    self.exited.release();
                    return;
                }
                Phase::Running | Phase::Draining => {}
            }
            control.phase = Phase::Draining;
            (control.reader.take(), control.ingest.take())
        };

        self.cancel.store(true, Ordering::SeqCst);
        if let Some(handle) = ingest
            && handle.join().is_err()
        {
            error!(target: ENGINE_TARGET, "ingestion thread panicked");
        }
        self.exited.release();

        match reader {
            Some(handle) if handle.is_finished() => {
                if handle.join().is_err() {
                    error!(target: ENGINE_TARGET, "reader thread panicked");
                }
            }
            Some(_) => debug!(target: ENGINE_TARGET, "reader blocked on input; detaching"),
            None => {}
        }

        let snapshot = self.metrics.snapshot();
        info!(
            target: ENGINE_TARGET,
            summary = ?self.state.summary(),
            metrics = ?snapshot,
            "final snapshot"
        );
        self.health.engine_stopped(&snapshot);
        self.control().phase = Phase::Stopped;
    }

    /// Blocks until the ingestion loop has exited.
    ///
    /// Returns immediately for an engine that was never started.
    pub fn wait(&self) {
        if self.phase() != Phase::Idle {
            self.exited.wait_until(None);
        }
    }

    /// Like [`Engine::wait`] with an upper bound.
    ///
    /// Returns whether the ingestion loop has exited.
    #[must_use]
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        if self.phase() == Phase::Idle {
            return false;
        }
        self.exited.wait_until(Instant::now().checked_add(timeout))
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.control().phase
    }

    /// The live state model, for readers such as a render loop.
    #[must_use]
    pub fn state(&self) -> Arc<LiveState> {
        Arc::clone(&self.state)
    }

    /// Current operational counters.
    #[must_use]
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// The outbound channel, for server-initiated notifications.
    #[must_use]
    pub fn sender(&self) -> Arc<dyn ResponseSender> {
        Arc::clone(&self.sender)
    }

    /// The validated settings.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn control(&self) -> MutexGuard<'_, Control> {
        self.control.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
