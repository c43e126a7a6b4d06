//! Strategy configuration
//!
//! JSON-backed parameter set with the validated ranges the strategy accepts.
//! Every field has a source default; `validate()` rejects anything outside
//! its declared range before an engine is built from it.

use anyhow::{Context, Result};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Configuration range violations
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("momentum_period ({0}) must be between 10 and 50")]
    MomentumPeriodOutOfRange(usize),

    #[error("rsi_period ({0}) must be between 2 and 30")]
    RsiPeriodOutOfRange(usize),

    #[error("rsi_smooth ({0}) must be between 1 and 10")]
    RsiSmoothOutOfRange(usize),

    #[error("min_strength ({0}) must be between 0.1 and 1.0")]
    MinStrengthOutOfRange(f64),

    #[error("force_exit_minutes ({0}) must be positive")]
    NonPositiveForceExitMinutes(i64),

    #[error("warmup_bars ({0}) must be positive")]
    NonPositiveWarmupBars(usize),
}

/// Engine parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Window length for trend-strength statistics (range 10-50)
    #[serde(default = "default_momentum_period")]
    pub momentum_period: usize,

    /// Oscillator period (range 2-30)
    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,

    /// Oscillator smoothing length (range 1-10)
    #[serde(default = "default_rsi_smooth")]
    pub rsi_smooth: usize,

    /// Minimum trend strength required for entry when the strength gate is
    /// enabled (range 0.1-1.0). Ignored while `use_min_strength` is false.
    #[serde(default = "default_min_strength")]
    pub min_strength: f64,

    /// Opt-in entry gate on `strength >= min_strength`. Off by default:
    /// entries then depend only on direction, alignment, and the oscillator.
    #[serde(default)]
    pub use_min_strength: bool,

    /// Time of day the session closes
    #[serde(default = "default_session_close")]
    pub session_close: NaiveTime,

    /// Force-exit any open position when this close (minutes) is left
    #[serde(default = "default_force_exit_minutes")]
    pub force_exit_minutes: i64,

    /// Bars observed before any signal is emitted
    #[serde(default = "default_warmup_bars")]
    pub warmup_bars: usize,
}

fn default_momentum_period() -> usize {
    20
}
fn default_rsi_period() -> usize {
    14
}
fn default_rsi_smooth() -> usize {
    3
}
fn default_min_strength() -> f64 {
    0.3
}
fn default_session_close() -> NaiveTime {
    NaiveTime::from_hms_opt(16, 0, 0).unwrap()
}
fn default_force_exit_minutes() -> i64 {
    15
}
fn default_warmup_bars() -> usize {
    30
}

impl Default for Config {
    fn default() -> Self {
        Config {
            momentum_period: default_momentum_period(),
            rsi_period: default_rsi_period(),
            rsi_smooth: default_rsi_smooth(),
            min_strength: default_min_strength(),
            use_min_strength: false,
            session_close: default_session_close(),
            force_exit_minutes: default_force_exit_minutes(),
            warmup_bars: default_warmup_bars(),
        }
    }
}

impl Config {
    /// Load and validate configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref()).context("Failed to read config file")?;
        let config: Config =
            serde_json::from_str(&contents).context("Failed to parse config JSON")?;
        config.validate().context("Invalid configuration")?;
        Ok(config)
    }

    /// Check every parameter against its declared range
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(10..=50).contains(&self.momentum_period) {
            return Err(ConfigError::MomentumPeriodOutOfRange(self.momentum_period));
        }
        if !(2..=30).contains(&self.rsi_period) {
            return Err(ConfigError::RsiPeriodOutOfRange(self.rsi_period));
        }
        if !(1..=10).contains(&self.rsi_smooth) {
            return Err(ConfigError::RsiSmoothOutOfRange(self.rsi_smooth));
        }
        if !(0.1..=1.0).contains(&self.min_strength) {
            return Err(ConfigError::MinStrengthOutOfRange(self.min_strength));
        }
        if self.force_exit_minutes <= 0 {
            return Err(ConfigError::NonPositiveForceExitMinutes(
                self.force_exit_minutes,
            ));
        }
        if self.warmup_bars == 0 {
            return Err(ConfigError::NonPositiveWarmupBars(self.warmup_bars));
        }
        Ok(())
    }
}
