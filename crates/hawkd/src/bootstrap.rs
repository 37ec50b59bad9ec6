//! Start-up orchestration: configuration, telemetry and engine settings.

use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};
use thiserror::Error;

use hawk_config::Config;

use crate::engine::{EngineConfig, EngineConfigError};
use crate::health::HealthReporter;
use crate::telemetry::{self, TelemetryError, TelemetryHandle};

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the layered configuration.
    ///
    /// # Errors
    ///
    /// Returns the loader error when any layer is unreadable or invalid.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that delegates to [`Config::load`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load()
    }
}

/// Loader that returns a fixed configuration.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps a ready-made configuration.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// The loaded settings are out of range for the engine.
    #[error("invalid engine settings: {source}")]
    Engine {
        /// Validation failure.
        #[source]
        source: EngineConfigError,
    },
}

/// Everything needed to build and run an engine.
#[derive(Debug)]
pub struct Bootstrapped {
    config: Config,
    engine: EngineConfig,
    telemetry: TelemetryHandle,
}

impl Bootstrapped {
    /// The resolved configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// The validated engine settings.
    #[must_use]
    pub const fn engine_config(&self) -> &EngineConfig {
        &self.engine
    }

    /// The telemetry handle, primarily useful for testing.
    #[must_use]
    pub const fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }
}

/// Runs the bootstrap sequence using the supplied collaborators.
///
/// # Errors
///
/// Returns [`BootstrapError`] for the first step that fails; the reporter
/// has been told about it already.
pub fn bootstrap_with(
    loader: &dyn ConfigLoader,
    reporter: &dyn HealthReporter,
) -> Result<Bootstrapped, BootstrapError> {
    reporter.bootstrap_starting();

    let result = load_and_initialise(loader);
    match &result {
        Ok(bootstrapped) => reporter.bootstrap_succeeded(&bootstrapped.config),
        Err(error) => reporter.bootstrap_failed(error),
    }
    result
}

fn load_and_initialise(loader: &dyn ConfigLoader) -> Result<Bootstrapped, BootstrapError> {
    let config = loader
        .load()
        .map_err(|source| BootstrapError::Configuration { source })?;
    let engine =
        EngineConfig::from_config(&config).map_err(|source| BootstrapError::Engine { source })?;
    let telemetry =
        telemetry::initialise(&config).map_err(|source| BootstrapError::Telemetry { source })?;
    Ok(Bootstrapped {
        config,
        engine,
        telemetry,
    })
}
