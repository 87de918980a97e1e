//! Async tasks
//!
//! - Tick: fixed-period control tick
//! - Controller: owns the controller core and the oven link
//! - Telemetry: logs status events
//! - Console: operator commands from stdin (OS thread)

pub mod console;
pub mod controller;
pub mod telemetry;
pub mod tick;

pub use controller::controller_task;
pub use telemetry::telemetry_task;
pub use tick::tick_task;
