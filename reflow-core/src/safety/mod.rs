//! Safety monitoring
//!
//! Detects fault conditions from temperature readings.

pub mod monitor;

pub use monitor::{SafetyMonitor, SafetyStatus};
