//! Oven device link trait

use core::fmt;

use crate::control::Intensity;

/// Errors reported by a device link
///
/// Every call is bounded by the link's own timeout; links report
/// [`LinkError::Timeout`] and never retry on their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// Port missing, busy, or not open
    Unavailable,
    /// No response within the call's timeout
    Timeout,
    /// Device refused or garbled the command
    Rejected,
    /// Device answered with something that is not a temperature
    ReadFailure,
    /// Device went away while open
    Disconnected,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            LinkError::Unavailable => "device unavailable",
            LinkError::Timeout => "device timeout",
            LinkError::Rejected => "command rejected",
            LinkError::ReadFailure => "temperature read failure",
            LinkError::Disconnected => "device disconnected",
        };
        f.write_str(text)
    }
}

impl core::error::Error for LinkError {}

/// A temperature sample as reported by the link
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reading {
    /// Oven temperature (°C)
    pub temperature_c: f32,
    /// When the sample was taken, on the controller's clock (ms)
    pub sampled_at_ms: u64,
}

/// Trait for oven links
///
/// Implementations own the transport (serial port, simulation) and the
/// device's command vocabulary. All methods block for at most the link's
/// configured timeout.
pub trait DeviceLink {
    /// Open the link on `port` and put the device in host-driven mode
    fn connect(&mut self, port: &str) -> Result<(), LinkError>;

    /// Command the heater intensity
    fn send_command(&mut self, intensity: Intensity) -> Result<(), LinkError>;

    /// Fetch the latest temperature
    fn read_temperature(&mut self) -> Result<Reading, LinkError>;

    /// Close the link; the heater is left off
    fn disconnect(&mut self);

    /// Check if the link is open
    fn is_connected(&self) -> bool;
}
