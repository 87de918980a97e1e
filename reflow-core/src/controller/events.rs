//! Status events emitted by the controller

use core::fmt;

use heapless::String;

use super::run::RunState;
use crate::profile::{PhaseKind, ProfileError, MAX_LABEL_LEN};
use crate::state::{FaultReason, ManualSetpoint};
use crate::traits::LinkError;

/// Why an intent was ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RejectReason {
    /// Only allowed while idle
    NotIdle,
    /// No device link open
    NotConnected,
    /// Start requested before selecting a profile
    NoProfileSelected,
    /// No loaded profile has that name
    UnknownProfile,
    /// Not allowed while a run is in progress
    RunInProgress,
    /// A fault must be acknowledged first
    FaultNotAcknowledged,
    /// Stop requested with no run in progress
    NothingToStop,
    /// Acknowledge requested with no fault
    NoFault,
    /// Manual setpoint not finite or at the safety ceiling
    SetpointOutOfRange,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RejectReason::NotIdle => "controller is not idle",
            RejectReason::NotConnected => "device is not connected",
            RejectReason::NoProfileSelected => "no profile selected",
            RejectReason::UnknownProfile => "unknown profile",
            RejectReason::RunInProgress => "a run is in progress",
            RejectReason::FaultNotAcknowledged => "fault not acknowledged",
            RejectReason::NothingToStop => "no run to stop",
            RejectReason::NoFault => "no fault to acknowledge",
            RejectReason::SetpointOutOfRange => "manual setpoint out of range",
        };
        f.write_str(text)
    }
}

/// Events for the presentation layer and telemetry
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StatusEvent {
    /// Run status changed
    StateChanged(RunState),
    /// Running tick completed (carries the latest sample)
    Progress(RunState),
    /// Run entered a new phase
    PhaseChanged {
        index: usize,
        name: String<MAX_LABEL_LEN>,
        kind: PhaseKind,
    },
    /// Run aborted
    Faulted { reason: FaultReason, state: RunState },
    /// Device link could not be opened
    ConnectFailed(LinkError),
    /// Profile selected for the next run
    ProfileSelected(String<MAX_LABEL_LEN>),
    /// Profile refused at selection
    ProfileRejected(ProfileError),
    /// Intent ignored
    IntentRejected(RejectReason),
    /// Profile completed and heater switched off
    RunFinished { samples: usize },
    /// Manual setpoint accepted
    ManualSetpoint(ManualSetpoint),
}
