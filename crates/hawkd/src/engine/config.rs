//! Explicit engine settings, validated once before the engine is built.

use thiserror::Error;

use hawk_config::{
    Config, DEFAULT_BURST_CAPACITY, DEFAULT_EVENT_BUFFER_CAPACITY, DEFAULT_LOG_BUFFER_CAPACITY,
    DEFAULT_MAX_BATCH_SIZE, DEFAULT_MAX_MESSAGE_SIZE, DEFAULT_METRIC_HISTORY_CAPACITY,
    DEFAULT_RATE_LIMIT,
};

use crate::decode::DecodeLimits;
use crate::state::StateCapacities;

/// Settings consumed by [`crate::Engine`].
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Whether operational counters are recorded.
    pub enable_metrics: bool,
    /// Sustained admission rate in commands per second.
    pub rate_limit: f64,
    /// Commands admitted back to back before the rate applies.
    pub burst_capacity: u32,
    /// Log entries retained.
    pub log_buffer_capacity: usize,
    /// Samples retained per metric name.
    pub metric_history_capacity: usize,
    /// Events retained.
    pub event_buffer_capacity: usize,
    /// Largest accepted unit in bytes.
    pub max_message_size: usize,
    /// Largest accepted batch.
    pub max_batch_size: usize,
}

/// Rejected engine settings.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineConfigError {
    /// The rate limit is zero, negative or not finite.
    #[error("rate limit must be a positive finite number, got {rate}")]
    InvalidRate {
        /// Rejected value.
        rate: f64,
    },
    /// A size or capacity setting is zero.
    #[error("{setting} must be at least 1")]
    Zero {
        /// Name of the offending setting.
        setting: &'static str,
    },
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            enable_metrics: true,
            rate_limit: DEFAULT_RATE_LIMIT,
            burst_capacity: DEFAULT_BURST_CAPACITY,
            log_buffer_capacity: DEFAULT_LOG_BUFFER_CAPACITY,
            metric_history_capacity: DEFAULT_METRIC_HISTORY_CAPACITY,
            event_buffer_capacity: DEFAULT_EVENT_BUFFER_CAPACITY,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
        }
    }
}

impl EngineConfig {
    /// Extracts and validates the engine settings from a loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns [`EngineConfigError`] when a setting is out of range.
    pub fn from_config(config: &Config) -> Result<Self, EngineConfigError> {
        let engine = Self {
            enable_metrics: config.enable_metrics,
            rate_limit: config.rate_limit,
            burst_capacity: config.burst_capacity,
            log_buffer_capacity: config.log_buffer_capacity,
            metric_history_capacity: config.metric_history_capacity,
            event_buffer_capacity: config.event_buffer_capacity,
            max_message_size: config.max_message_size,
            max_batch_size: config.max_batch_size,
        };
        engine.validate()?;
        Ok(engine)
    }

    /// Checks every setting.
    ///
    /// # Errors
    ///
    /// Returns the first out-of-range setting.
    pub fn validate(&self) -> Result<(), EngineConfigError> {
        if !(self.rate_limit.is_finite() && self.rate_limit > 0.0) {
            return Err(EngineConfigError::InvalidRate {
                rate: self.rate_limit,
            });
        }
        let sizes = [
            ("burst_capacity", self.burst_capacity as usize),
            ("log_buffer_capacity", self.log_buffer_capacity),
            ("metric_history_capacity", self.metric_history_capacity),
            ("event_buffer_capacity", self.event_buffer_capacity),
            ("max_message_size", self.max_message_size),
            ("max_batch_size", self.max_batch_size),
        ];
        match sizes.into_iter().find(|(_, value)| *value == 0) {
            Some((setting, _)) => Err(EngineConfigError::Zero { setting }),
            None => Ok(()),
        }
    }

    pub(crate) const fn capacities(&self) -> StateCapacities {
        StateCapacities {
            logs: self.log_buffer_capacity,
            metric_history: self.metric_history_capacity,
            events: self.event_buffer_capacity,
        }
    }

    pub(crate) const fn decode_limits(&self) -> DecodeLimits {
        DecodeLimits {
            max_batch_size: self.max_batch_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn defaults_are_valid() {
        assert_eq!(EngineConfig::default().validate(), Ok(()));
    }

    #[rstest]
    fn copies_settings_from_loaded_config() {
        let config = Config {
            rate_limit: 5.0,
            burst_capacity: 2,
            max_batch_size: 4,
            ..Config::default()
        };
        let engine = EngineConfig::from_config(&config).expect("valid settings");
        assert!((engine.rate_limit - 5.0).abs() < f64::EPSILON);
        assert_eq!(engine.burst_capacity, 2);
        assert_eq!(engine.decode_limits().max_batch_size, 4);
    }

    #[rstest]
    #[case(0.0)]
    #[case(-1.0)]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    fn rejects_unusable_rates(#[case] rate: f64) {
        let config = EngineConfig {
            rate_limit: rate,
            ..EngineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(EngineConfigError::InvalidRate { .. })
        ));
    }

    #[rstest]
    fn rejects_zero_capacities() {
        let config = EngineConfig {
            log_buffer_capacity: 0,
            ..EngineConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(EngineConfigError::Zero {
                setting: "log_buffer_capacity"
            })
        );
    }
}
