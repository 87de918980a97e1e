//! Observable run state

use heapless::String;

use crate::control::Intensity;
use crate::profile::MAX_LABEL_LEN;
use crate::recorder::Sample;
use crate::state::{ManualSetpoint, RunStatus};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Last heater command issued
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Command {
    /// Commanded intensity
    pub intensity: Intensity,
    /// Controller clock time the command was acknowledged (ms)
    pub issued_at_ms: u64,
}

/// Snapshot of the controller's run
///
/// Owned and mutated only by the controller; everything else sees copies.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RunState {
    /// Current status
    pub status: RunStatus,
    /// Selected profile
    pub active_profile: Option<String<MAX_LABEL_LEN>>,
    /// Run time since entering `Running` (ms)
    pub elapsed_ms: u64,
    /// Index of the current phase
    pub phase_index: Option<usize>,
    /// Time left in the current phase (ms)
    pub phase_remaining_ms: u64,
    /// Most recent recorded sample
    pub last_sample: Option<Sample>,
    /// Most recent acknowledged heater command
    pub last_command: Option<Command>,
    /// Measured temperature slope (°C/s)
    pub slope_c_per_s: f32,
    /// Time at or above the profile's liquidus (ms)
    pub time_above_liquidus_ms: u64,
    /// Setpoint of a manual run; `None` while following a profile
    pub manual: Option<ManualSetpoint>,
}

impl RunState {
    /// Clear everything that belongs to a single run
    ///
    /// Status and profile selection are kept.
    pub(crate) fn reset_run(&mut self) {
        self.elapsed_ms = 0;
        self.phase_index = None;
        self.phase_remaining_ms = 0;
        self.last_sample = None;
        self.last_command = None;
        self.slope_c_per_s = 0.0;
        self.time_above_liquidus_ms = 0;
        self.manual = None;
    }
}
