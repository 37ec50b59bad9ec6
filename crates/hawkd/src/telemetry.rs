//! Diagnostics for the engine itself, as opposed to the telemetry it ingests.
//!
//! Standard output is the reply channel to the producer, so every diagnostic
//! line is written to standard error. The subscriber is installed once per
//! process; the first configuration wins.

use std::env;
use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use tracing::{Subscriber, subscriber::SetGlobalDefaultError};
use tracing_subscriber::{EnvFilter, fmt};

use hawk_config::{Config, LogFormat};

static INSTALLED: OnceCell<LogFormat> = OnceCell::new();

/// Evidence that diagnostics are routed to standard error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryHandle {
    format: LogFormat,
}

impl TelemetryHandle {
    /// Output format of the installed subscriber.
    #[must_use]
    pub const fn format(self) -> LogFormat {
        self.format
    }
}

/// Errors encountered while routing diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The configured filter directive does not parse.
    #[error("invalid log filter {expression:?}: {message}")]
    Filter {
        /// Directive as configured.
        expression: String,
        /// Parser message.
        message: String,
    },
    /// Another subscriber already owns the process.
    #[error("failed to install diagnostics subscriber: {0}")]
    Subscriber(#[from] SetGlobalDefaultError),
}

/// Installs the diagnostics subscriber on first use.
///
/// Later calls leave global state alone and report the format chosen by the
/// first call.
///
/// # Errors
///
/// Returns [`TelemetryError`] when the filter does not parse or a foreign
/// subscriber is already installed.
pub fn initialise(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    INSTALLED
        .get_or_try_init(|| install(config))
        .map(|&format| TelemetryHandle { format })
}

fn parse_filter(expression: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(expression).map_err(|error| TelemetryError::Filter {
        expression: expression.to_owned(),
        message: error.to_string(),
    })
}

/// Colour only for an interactive stderr, and never under `NO_COLOR`.
fn colour_enabled() -> bool {
    io::stderr().is_terminal() && env::var_os("NO_COLOR").is_none()
}

fn install(config: &Config) -> Result<LogFormat, TelemetryError> {
    let format = config.log_format();
    let builder = fmt::Subscriber::builder()
        .with_env_filter(parse_filter(config.log_filter())?)
        .with_writer(io::stderr)
        .with_target(true)
        .with_thread_names(true)
        .with_timer(fmt::time::UtcTime::rfc_3339());

    let subscriber: Box<dyn Subscriber + Send + Sync> = match format {
        LogFormat::Json => Box::new(
            builder
                .json()
                .flatten_event(true)
                .with_ansi(false)
                .finish(),
        ),
        LogFormat::Compact => Box::new(builder.compact().with_ansi(colour_enabled()).finish()),
    };

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(format)
}
