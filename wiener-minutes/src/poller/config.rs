//! Polling configuration.

use std::time::Duration;

/// Polling interval used when none is configured.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Shortest interval the data provider's terms allow.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(15);

/// Errors from building configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Requested interval is below the provider's floor
    #[error("poll interval {requested:?} is below the {floor:?} minimum")]
    IntervalTooShort { requested: Duration, floor: Duration },

    /// A configuration value could not be parsed
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

/// Configuration for the poller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    interval: Duration,
}

impl PollConfig {
    /// Create a config with the given refresh interval.
    ///
    /// Intervals shorter than [`MIN_POLL_INTERVAL`] are rejected.
    pub fn new(interval: Duration) -> Result<Self, ConfigError> {
        if interval < MIN_POLL_INTERVAL {
            return Err(ConfigError::IntervalTooShort {
                requested: interval,
                floor: MIN_POLL_INTERVAL,
            });
        }
        Ok(Self { interval })
    }

    /// Parse an interval in whole seconds, e.g. from an environment variable.
    pub fn from_secs_str(key: &'static str, value: &str) -> Result<Self, ConfigError> {
        let secs: u64 = value.trim().parse().map_err(|_| ConfigError::InvalidValue {
            key,
            value: value.to_string(),
        })?;
        Self::new(Duration::from_secs(secs))
    }

    /// The refresh interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        assert_eq!(PollConfig::default().interval(), Duration::from_secs(30));
    }

    #[test]
    fn floor_is_accepted() {
        let config = PollConfig::new(Duration::from_secs(15)).unwrap();
        assert_eq!(config.interval(), MIN_POLL_INTERVAL);
    }

    #[test]
    fn below_floor_is_rejected() {
        let err = PollConfig::new(Duration::from_millis(14_999)).unwrap_err();
        assert_eq!(
            err,
            ConfigError::IntervalTooShort {
                requested: Duration::from_millis(14_999),
                floor: MIN_POLL_INTERVAL,
            }
        );
        assert_eq!(err.to_string(), "poll interval 14.999s is below the 15s minimum");
    }

    #[test]
    fn from_secs_str() {
        assert_eq!(
            PollConfig::from_secs_str("WM_REFRESH_SECS", " 60 ").unwrap().interval(),
            Duration::from_secs(60)
        );
        assert!(matches!(
            PollConfig::from_secs_str("WM_REFRESH_SECS", "5"),
            Err(ConfigError::IntervalTooShort { .. })
        ));
        assert_eq!(
            PollConfig::from_secs_str("WM_REFRESH_SECS", "soon").unwrap_err(),
            ConfigError::InvalidValue {
                key: "WM_REFRESH_SECS",
                value: "soon".to_string(),
            }
        );
    }
}
