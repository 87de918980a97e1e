//! Oven links

pub mod serial;
pub mod simulated;

pub use serial::{SerialOven, SerialOvenConfig, DEFAULT_READ_TIMEOUT_MS};
pub use simulated::{SimulatedOven, SimulationConfig, SIMULATED_PORT};
