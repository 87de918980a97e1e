//! Operator intents
//!
//! Requests from the presentation layer. Queued by the controller and
//! drained once per tick in arrival order.

use heapless::String;

use crate::control::Intensity;
use crate::profile::MAX_LABEL_LEN;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum port name length
pub const MAX_PORT_LEN: usize = 64;

/// Temperature held without a profile
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ManualSetpoint {
    /// Temperature to hold (°C)
    pub target_c: f32,
    /// Highest intensity the regulator may command
    pub max_intensity: Intensity,
}

/// A request from the operator
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Intent {
    /// Open the device link on the named port
    Connect(String<MAX_PORT_LEN>),
    /// Choose the profile for the next run
    SelectProfile(String<MAX_LABEL_LEN>),
    /// Start a run with the selected profile
    Start,
    /// Stop the current run
    Stop,
    /// Clear a fault
    AcknowledgeFault,
    /// Hold a temperature without a profile, or move the held setpoint
    SetManual(ManualSetpoint),
}

impl Intent {
    /// Connect intent, or `None` if the port name is too long
    pub fn connect(port: &str) -> Option<Self> {
        let mut name = String::new();
        name.push_str(port).ok()?;
        Some(Intent::Connect(name))
    }

    /// Profile selection intent, or `None` if the name is too long
    pub fn select_profile(profile: &str) -> Option<Self> {
        let mut name = String::new();
        name.push_str(profile).ok()?;
        Some(Intent::SelectProfile(name))
    }

    /// Manual setpoint intent; `max_percent` is clamped to `[0, 100]`
    pub fn manual(target_c: f32, max_percent: f32) -> Self {
        Intent::SetManual(ManualSetpoint {
            target_c,
            max_intensity: Intensity::new(max_percent),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        assert_eq!(
            Intent::connect("/dev/ttyUSB0"),
            Some(Intent::Connect(String::try_from("/dev/ttyUSB0").unwrap()))
        );
        assert!(Intent::select_profile("lead-free").is_some());
        assert!(Intent::select_profile("a-very-long-profile-name").is_none());
    }

    #[test]
    fn test_manual_cap_clamped() {
        let Intent::SetManual(setpoint) = Intent::manual(150.0, 140.0) else {
            panic!("expected a manual intent");
        };
        assert_eq!(setpoint.target_c, 150.0);
        assert_eq!(setpoint.max_intensity, Intensity::FULL);
    }
}
