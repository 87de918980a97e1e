//! Run status definition
//!
//! Heater behavior is a function of the current status and an event.

use core::fmt;

use super::events::Event;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Controller run status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RunStatus {
    /// No run; link may or may not be open
    #[default]
    Idle,
    /// Link open, waiting for the first good reading
    Connecting,
    /// Following the profile
    Running,
    /// Heater being switched off (transient)
    Stopping,
    /// Run aborted; heater commands suppressed until acknowledged
    Faulted(FaultReason),
}

/// Why a run was aborted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FaultReason {
    /// Readings missing or stale for too many ticks
    DeviceTimeout,
    /// Readings arriving but unusable
    ReadFailure,
    /// Heater command rejected twice
    CommandFailed,
    /// Measured temperature reached the safety ceiling
    OverTemperature,
    /// Device disconnected mid-run
    DeviceLost,
}

impl fmt::Display for FaultReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FaultReason::DeviceTimeout => "device timeout",
            FaultReason::ReadFailure => "temperature read failure",
            FaultReason::CommandFailed => "heater command failed",
            FaultReason::OverTemperature => "over temperature",
            FaultReason::DeviceLost => "device lost",
        };
        f.write_str(text)
    }
}

impl RunStatus {
    /// Check if heater commands other than "off" may be sent
    pub fn heater_allowed(&self) -> bool {
        matches!(self, RunStatus::Running)
    }

    /// Check if this is a fault state
    pub fn is_faulted(&self) -> bool {
        matches!(self, RunStatus::Faulted(_))
    }

    /// Check if a run is under way or being set up
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            RunStatus::Connecting | RunStatus::Running | RunStatus::Stopping
        )
    }

    /// Process an event and return the next status
    pub fn transition(self, event: Event) -> Self {
        use Event::*;
        use RunStatus::*;

        match (self, event) {
            // A fault never overrides an earlier fault
            (Faulted(_), FaultDetected(_)) => self,
            (_, FaultDetected(reason)) => Faulted(reason),

            // Idle transitions
            (Idle, LinkOpened) => Connecting,

            // Connecting transitions
            (Connecting, HandshakeComplete) => Running,
            (Connecting, StopRequested) => Stopping,

            // Running transitions
            (Running, StopRequested) => Stopping,
            (Running, ProfileFinished) => Stopping,

            // Stopping transitions
            (Stopping, HeaterOff) => Idle,

            // Faulted transitions
            (Faulted(_), AcknowledgeFault) => Idle,

            // Default: stay in current status
            _ => self,
        }
    }
}
