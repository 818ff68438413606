use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading or validating a `RelayConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
    #[error("invalid json config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("min hold {min:?} exceeds max hold {max:?}")]
    HoldOrder { min: Duration, max: Duration },
    #[error("tick interval must be non-zero")]
    ZeroTickInterval,
}

/// Tunables for the retry scheduler and its lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// Delay between retry ticks of one job.
    pub tick_interval: Duration,
    /// Delay before the first tick after the job starts.
    pub initial_delay: Duration,
    /// Minimum age of a pending record before it is resubmitted.
    pub staleness_threshold: Duration,
    /// Lock shared by every job in the retry group.
    pub lock_name: String,
    pub min_hold: Duration,
    pub max_hold: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(5),
            initial_delay: Duration::from_secs(2),
            staleness_threshold: Duration::from_secs(5),
            lock_name: "republishEvents".to_string(),
            min_hold: Duration::from_secs(5),
            max_hold: Duration::from_secs(300),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRelayConfig {
    tick_interval_ms: Option<u64>,
    initial_delay_ms: Option<u64>,
    staleness_ms: Option<u64>,
    lock_name: Option<String>,
    lock_min_hold_ms: Option<u64>,
    lock_max_hold_ms: Option<u64>,
}

impl RelayConfig {
    /// Load from `RELAY_*` environment variables, falling back to defaults
    /// for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let millis = |key: &'static str| -> Result<Option<u64>, ConfigError> {
            match lookup(key) {
                None => Ok(None),
                Some(value) => value
                    .trim()
                    .parse::<u64>()
                    .map(Some)
                    .map_err(|_| ConfigError::InvalidValue { key, value }),
            }
        };

        let raw = RawRelayConfig {
            tick_interval_ms: millis("RELAY_TICK_INTERVAL_MS")?,
            initial_delay_ms: millis("RELAY_INITIAL_DELAY_MS")?,
            staleness_ms: millis("RELAY_STALENESS_MS")?,
            lock_name: lookup("RELAY_LOCK_NAME").filter(|name| !name.trim().is_empty()),
            lock_min_hold_ms: millis("RELAY_LOCK_MIN_HOLD_MS")?,
            lock_max_hold_ms: millis("RELAY_LOCK_MAX_HOLD_MS")?,
        };

        Self::from_raw(raw)
    }

    /// Load from a JSON object with snake_case millisecond keys.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let raw: RawRelayConfig = serde_json::from_str(json)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawRelayConfig) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let ms = Duration::from_millis;

        let config = Self {
            tick_interval: raw.tick_interval_ms.map(ms).unwrap_or(defaults.tick_interval),
            initial_delay: raw.initial_delay_ms.map(ms).unwrap_or(defaults.initial_delay),
            staleness_threshold: raw.staleness_ms.map(ms).unwrap_or(defaults.staleness_threshold),
            lock_name: raw.lock_name.unwrap_or(defaults.lock_name),
            min_hold: raw.lock_min_hold_ms.map(ms).unwrap_or(defaults.min_hold),
            max_hold: raw.lock_max_hold_ms.map(ms).unwrap_or(defaults.max_hold),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval.is_zero() {
            return Err(ConfigError::ZeroTickInterval);
        }
        if self.min_hold > self.max_hold {
            return Err(ConfigError::HoldOrder {
                min: self.min_hold,
                max: self.max_hold,
            });
        }
        Ok(())
    }
}
