//! Error types for flopwatch
//!
//! Only recoverable failures live here (configuration loading and
//! validation). Calling `stop()` on a timer that is not running is a
//! programming error in the instrumented code and panics instead.

use thiserror::Error;

/// Errors produced while configuring a profiler
#[derive(Debug, Error)]
pub enum FlopwatchError {
    #[error("Invalid config value for {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Malformed environment override {var}={value}")]
    EnvOverride { var: &'static str, value: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FlopwatchError>;
