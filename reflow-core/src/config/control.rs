//! Control loop configuration

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default control tick (ms)
pub const DEFAULT_TICK_INTERVAL_MS: u32 = 1000;

/// Default intensity at zero error (%)
pub const DEFAULT_BASE_INTENSITY: f32 = 50.0;

/// Default proportional gain (% per °C)
pub const DEFAULT_GAIN: f32 = 1.0;

/// Default proportional gain during reflow phases (% per °C)
pub const DEFAULT_REFLOW_GAIN: f32 = 0.9;

/// Default absolute temperature limit (°C)
pub const DEFAULT_SAFETY_CEILING_C: f32 = 260.0;

/// Default age after which a reading is considered stale (ms)
pub const DEFAULT_STALE_READING_MS: u32 = 3000;

/// Default number of consecutive bad reads before faulting
pub const DEFAULT_MAX_MISSED_READS: u8 = 2;

/// Default intensity factor while a phase's slope limit is exceeded
pub const DEFAULT_SLOPE_DAMPEN: f32 = 0.75;

/// Hottest ceiling accepted by validation (°C)
pub const MAX_SAFETY_CEILING_C: f32 = 400.0;

/// Configuration validation errors
///
/// Carries the name of the offending field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Field value outside its allowed range
    OutOfRange(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::OutOfRange(field) => write!(f, "`{}` is out of range", field),
        }
    }
}

impl core::error::Error for ConfigError {}

/// Control loop configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct ControlConfig {
    /// Control tick period (ms)
    pub tick_interval_ms: u32,
    /// Intensity commanded when measured equals target (%)
    pub base_intensity: f32,
    /// Proportional gain for heating phases (% per °C)
    pub gain: f32,
    /// Proportional gain for reflow phases (% per °C)
    pub reflow_gain: f32,
    /// Measured temperature at or above which the run faults (°C)
    pub safety_ceiling_c: f32,
    /// Readings older than this count as missed (ms)
    pub stale_reading_ms: u32,
    /// Consecutive missed reads tolerated before faulting
    pub max_missed_reads: u8,
    /// Intensity multiplier while the phase slope limit is exceeded
    pub slope_dampen: f32,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            base_intensity: DEFAULT_BASE_INTENSITY,
            gain: DEFAULT_GAIN,
            reflow_gain: DEFAULT_REFLOW_GAIN,
            safety_ceiling_c: DEFAULT_SAFETY_CEILING_C,
            stale_reading_ms: DEFAULT_STALE_READING_MS,
            max_missed_reads: DEFAULT_MAX_MISSED_READS,
            slope_dampen: DEFAULT_SLOPE_DAMPEN,
        }
    }
}

impl ControlConfig {
    /// Check every field against its allowed range
    ///
    /// Gains must be non-negative so intensity stays monotonic in the
    /// temperature error.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 || self.tick_interval_ms > 60_000 {
            return Err(ConfigError::OutOfRange("tick_interval_ms"));
        }
        if !in_range(self.base_intensity, 0.0, 100.0) {
            return Err(ConfigError::OutOfRange("base_intensity"));
        }
        if !in_range(self.gain, 0.0, 100.0) {
            return Err(ConfigError::OutOfRange("gain"));
        }
        if !in_range(self.reflow_gain, 0.0, 100.0) {
            return Err(ConfigError::OutOfRange("reflow_gain"));
        }
        if !in_range(self.safety_ceiling_c, 1.0, MAX_SAFETY_CEILING_C) {
            return Err(ConfigError::OutOfRange("safety_ceiling_c"));
        }
        if self.stale_reading_ms == 0 {
            return Err(ConfigError::OutOfRange("stale_reading_ms"));
        }
        if self.max_missed_reads == 0 {
            return Err(ConfigError::OutOfRange("max_missed_reads"));
        }
        if !in_range(self.slope_dampen, 0.0, 1.0) {
            return Err(ConfigError::OutOfRange("slope_dampen"));
        }
        Ok(())
    }
}

/// Finite and within `[min, max]`
fn in_range(value: f32, min: f32, max: f32) -> bool {
    value.is_finite() && value >= min && value <= max
}
