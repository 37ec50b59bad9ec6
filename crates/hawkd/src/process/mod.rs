//! Process-level wiring for the `hawk` binary.
//!
//! [`run`] bootstraps, starts the engine on stdin and stdout, stops it on a
//! termination signal or at end of input, and logs a summary periodically
//! while it runs.

mod errors;
mod report;
mod shutdown;

use std::io::{self, Read, Write};
use std::sync::Arc;
use std::thread;

use tracing::{debug, warn};

pub use self::errors::RunError;
pub use self::shutdown::{ShutdownError, ShutdownSignal, SystemShutdownSignal};

use crate::bootstrap::{BootstrapError, ConfigLoader, SystemConfigLoader, bootstrap_with};
use crate::dispatch::{MessageHandler, MetricsSnapshot, NoopMessageHandler};
use crate::engine::Engine;
use crate::health::{HealthReporter, StructuredHealthReporter};
use crate::outbound::JsonlSender;

pub(crate) const PROCESS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::process");

/// Collaborators for one run of the process.
pub struct RunContext<'a, R, W> {
    /// Configuration source.
    pub loader: &'a dyn ConfigLoader,
    /// Lifecycle observer.
    pub reporter: Arc<dyn HealthReporter>,
    /// Receives every admitted command.
    pub handler: Arc<dyn MessageHandler>,
    /// Termination trigger.
    pub shutdown: Arc<dyn ShutdownSignal>,
    /// Producer stream.
    pub input: R,
    /// Reply stream.
    pub output: W,
}

/// Runs headless on the process's standard streams until end of input or a
/// termination signal.
///
/// # Errors
///
/// Returns [`RunError`] when bootstrap or engine start-up fails.
pub fn run() -> Result<MetricsSnapshot, RunError> {
    run_with(RunContext {
        loader: &SystemConfigLoader,
        reporter: Arc::new(StructuredHealthReporter::new()),
        handler: Arc::new(NoopMessageHandler),
        shutdown: Arc::new(SystemShutdownSignal),
        input: io::stdin(),
        output: io::stdout(),
    })
}

/// Runs with explicit collaborators and returns the final counters.
///
/// # Errors
///
/// Returns [`RunError`] when bootstrap or engine start-up fails.
pub fn run_with<R, W>(context: RunContext<'_, R, W>) -> Result<MetricsSnapshot, RunError>
where
    R: Read + Send + 'static,
    W: Write + Send + 'static,
{
    let RunContext {
        loader,
        reporter,
        handler,
        shutdown,
        input,
        output,
    } = context;

    let bootstrapped = bootstrap_with(loader, reporter.as_ref())?;
    let engine = Engine::new(
        bootstrapped.engine_config().clone(),
        handler,
        Arc::new(JsonlSender::new(output)),
    )
    .map_err(|source| BootstrapError::Engine { source })?
    .with_health_reporter(reporter);
    let engine = Arc::new(engine);
    engine.start(input)?;

    watch_for_shutdown(&engine, shutdown);
    let reporter_thread = bootstrapped
        .config()
        .report_interval()
        .and_then(|interval| match report::spawn_reporter(Arc::clone(&engine), interval) {
            Ok(handle) => Some(handle),
            Err(error) => {
                warn!(target: PROCESS_TARGET, %error, "periodic summary disabled");
                None
            }
        });

    engine.wait();
    engine.stop();
    if let Some(handle) = reporter_thread
        && handle.join().is_err()
    {
        warn!(target: PROCESS_TARGET, "summary thread panicked");
    }
    Ok(engine.metrics())
}

fn watch_for_shutdown(engine: &Arc<Engine>, shutdown: Arc<dyn ShutdownSignal>) {
    let engine = Arc::clone(engine);
    let spawned = thread::Builder::new()
        .name("hawk-signals".to_owned())
        .spawn(move || match shutdown.wait() {
            Ok(()) => engine.stop(),
            Err(error) => warn!(target: PROCESS_TARGET, %error, "signal handling unavailable"),
        });
    if let Err(error) = spawned {
        warn!(target: PROCESS_TARGET, %error, "failed to spawn signal thread");
    } else {
        debug!(target: PROCESS_TARGET, "listening for termination signals");
    }
}
