//! Heater intensity

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Heater intensity in percent, always within `[0, 100]`
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Intensity(f32);

impl Intensity {
    /// Heater off
    pub const OFF: Self = Self(0.0);

    /// Full power
    pub const FULL: Self = Self(100.0);

    /// Clamp `percent` into range; NaN maps to off
    pub fn new(percent: f32) -> Self {
        if percent.is_nan() {
            return Self::OFF;
        }
        Self(percent.clamp(0.0, 100.0))
    }

    /// Intensity in percent
    pub fn percent(self) -> f32 {
        self.0
    }

    /// Intensity rounded to whole percent, for devices with integer input
    pub fn as_percent_u8(self) -> u8 {
        (self.0 + 0.5) as u8
    }

    /// The lower of `self` and `limit`
    pub fn capped(self, limit: Intensity) -> Self {
        if self > limit {
            limit
        } else {
            self
        }
    }

    /// Check if the heater is off
    pub fn is_off(self) -> bool {
        self.0 == 0.0
    }
}
