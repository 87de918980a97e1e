//! Control law
//!
//! Turns the gap between target and measured temperature into a heater
//! intensity. Proportional around a base intensity, clamped to 0-100 %.

pub mod intensity;
pub mod regulator;
pub mod slope;

pub use intensity::Intensity;
pub use regulator::Regulator;
pub use slope::SlopeTracker;
