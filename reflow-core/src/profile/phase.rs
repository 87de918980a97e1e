//! Profile phases

use heapless::String;

use super::{ProfileError, MAX_LABEL_LEN};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What the heater is expected to do during a phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PhaseKind {
    /// Preheat and soak: follow the curve with the normal gain
    #[default]
    Heating,
    /// Peak: follow the curve with the reflow gain
    Reflow,
    /// Heater off regardless of error
    Cooling,
}

/// Named sub-range of a profile's elapsed time
///
/// Covers `start_s..end_s`, end exclusive except for the final phase.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Phase {
    /// Display name ("preheat", "soak", ...)
    pub name: String<MAX_LABEL_LEN>,
    /// Heater behavior
    pub kind: PhaseKind,
    /// Phase start (seconds since run start)
    pub start_s: f32,
    /// Phase end (seconds since run start)
    pub end_s: f32,
    /// Rise rate above which intensity is dampened (°C/s)
    pub max_slope: Option<f32>,
}

impl Phase {
    /// Create a phase, truncating over-long names
    pub fn new(name: &str, kind: PhaseKind, start_s: f32, end_s: f32) -> Self {
        let mut label = String::new();
        for c in name.chars() {
            if label.push(c).is_err() {
                break;
            }
        }
        Self {
            name: label,
            kind,
            start_s,
            end_s,
            max_slope: None,
        }
    }

    /// Create a phase, rejecting over-long names
    pub fn try_new(
        name: &str,
        kind: PhaseKind,
        start_s: f32,
        end_s: f32,
    ) -> Result<Self, ProfileError> {
        if name.len() > MAX_LABEL_LEN {
            return Err(ProfileError::NameTooLong);
        }
        Ok(Self::new(name, kind, start_s, end_s))
    }

    /// Set the slope limit
    pub fn with_max_slope(mut self, max_slope: f32) -> Self {
        self.max_slope = Some(max_slope);
        self
    }

    /// Length of the phase in seconds
    pub fn duration_s(&self) -> f32 {
        self.end_s - self.start_s
    }
}
