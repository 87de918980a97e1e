//! Proportional intensity regulator

use super::intensity::Intensity;
use crate::config::ControlConfig;
use crate::profile::PhaseKind;

/// Proportional regulator around a base intensity
///
/// `intensity = clamp(base + gain * (target - measured), 0, 100)`, with the
/// gain chosen by phase kind. Non-decreasing in the error for every phase.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Regulator {
    base: f32,
    gain: f32,
    reflow_gain: f32,
    slope_dampen: f32,
}

impl Regulator {
    /// Build from validated control configuration
    pub fn from_config(config: &ControlConfig) -> Self {
        Self {
            base: config.base_intensity,
            gain: config.gain,
            reflow_gain: config.reflow_gain,
            slope_dampen: config.slope_dampen,
        }
    }

    /// Compute the heater intensity
    ///
    /// # Arguments
    /// - `target_c`: Profile target at the current elapsed time
    /// - `measured_c`: Latest oven reading
    /// - `kind`: Kind of the current phase
    /// - `slope_exceeded`: Measured rise rate is above the phase limit
    pub fn compute(
        &self,
        target_c: f32,
        measured_c: f32,
        kind: PhaseKind,
        slope_exceeded: bool,
    ) -> Intensity {
        let gain = match kind {
            PhaseKind::Cooling => return Intensity::OFF,
            PhaseKind::Heating => self.gain,
            PhaseKind::Reflow => self.reflow_gain,
        };

        let error = target_c - measured_c;
        if error.is_nan() {
            return Intensity::OFF;
        }

        // 0 * inf
        let correction = gain * error;
        let correction = if correction.is_nan() { 0.0 } else { correction };

        let mut raw = self.base + correction;
        if slope_exceeded {
            raw *= self.slope_dampen;
        }
        Intensity::new(raw)
    }
}
