//! Events that trigger status transitions

use super::machine::FaultReason;

/// Events that can trigger status transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    // Link events
    /// Device link opened for a run
    LinkOpened,
    /// First good reading received with a profile armed
    HandshakeComplete,

    // Operator events
    /// Operator asked to stop
    StopRequested,
    /// Operator acknowledged a fault
    AcknowledgeFault,

    // Run events
    /// Elapsed time passed the final profile point
    ProfileFinished,
    /// Zero intensity issued (or attempted) while stopping
    HeaterOff,

    // Safety events
    /// Fault detected by the controller or safety monitor
    FaultDetected(FaultReason),
}
