// Configuration for timer logging and automatic reports
//
// Thresholds decide which start/stop lines are worth printing; the
// autodisplay interval throttles full report dumps.

use crate::error::{FlopwatchError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Environment override for [`TimerConfig::min_autodisplay_interval`]
pub const ENV_AUTODISPLAY_INTERVAL: &str = "FLOPWATCH_AUTODISPLAY_INTERVAL";
/// Environment override for [`TimerConfig::min_stop_log_duration`]
pub const ENV_MIN_STOP_LOG: &str = "FLOPWATCH_MIN_STOP_LOG";
/// Environment override for [`TimerConfig::min_start_log_duration`]
pub const ENV_MIN_START_LOG: &str = "FLOPWATCH_MIN_START_LOG";

/// Process-wide timer configuration
///
/// # Example
/// ```
/// use flopwatch::config::TimerConfig;
///
/// let config = TimerConfig::default();
/// assert_eq!(config.min_autodisplay_interval, 60.0);
/// assert_eq!(config.min_stop_log_duration, 0.1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerConfig {
    /// Minimum seconds between two automatic report dumps
    ///
    /// Checked on every stop, so this is a lower bound on the spacing, not a
    /// precise period.
    pub min_autodisplay_interval: f64,

    /// A stop whose duration is at least this many seconds prints a line
    pub min_stop_log_duration: f64,

    /// A start prints a line when the previous duration was at least this long
    pub min_start_log_duration: f64,

    /// Disable to never dump automatically
    pub autodisplay_enabled: bool,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            min_autodisplay_interval: 60.0,
            min_stop_log_duration: 0.1,
            min_start_log_duration: 0.1,
            autodisplay_enabled: true,
        }
    }
}

impl TimerConfig {
    /// Never log start/stop lines except for first calls, never dump automatically
    pub fn quiet() -> Self {
        Self {
            min_autodisplay_interval: f64::INFINITY,
            min_stop_log_duration: f64::INFINITY,
            min_start_log_duration: f64::INFINITY,
            autodisplay_enabled: false,
        }
    }

    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let input = std::fs::read_to_string(path)?;
        Self::from_toml_str(&input)
    }

    /// Apply `FLOPWATCH_*` environment overrides
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides_from(|var| env::var(var).ok())
    }

    fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let parse = |var: &'static str| -> Result<Option<f64>> {
            match lookup(var) {
                None => Ok(None),
                Some(value) => value
                    .trim()
                    .parse::<f64>()
                    .map(Some)
                    .map_err(|_| FlopwatchError::EnvOverride { var, value }),
            }
        };

        if let Some(v) = parse(ENV_AUTODISPLAY_INTERVAL)? {
            self.min_autodisplay_interval = v;
        }
        if let Some(v) = parse(ENV_MIN_STOP_LOG)? {
            self.min_stop_log_duration = v;
        }
        if let Some(v) = parse(ENV_MIN_START_LOG)? {
            self.min_start_log_duration = v;
        }

        self.validate()?;
        Ok(self)
    }

    /// Reject negative or NaN thresholds (infinity means "never")
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("min_autodisplay_interval", self.min_autodisplay_interval),
            ("min_stop_log_duration", self.min_stop_log_duration),
            ("min_start_log_duration", self.min_start_log_duration),
        ];
        for (field, value) in fields {
            if value.is_nan() || value < 0.0 {
                return Err(FlopwatchError::InvalidConfig {
                    field,
                    reason: format!("must be a non-negative number of seconds, got {}", value),
                });
            }
        }
        Ok(())
    }
}
