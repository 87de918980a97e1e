//! Run state machine
//!
//! Defines the lifecycle of a reflow run. The state machine is explicit,
//! finite and deterministic; the controller feeds it events and acts on
//! the resulting status.

pub mod events;
pub mod intent;
pub mod machine;

pub use events::Event;
pub use intent::{Intent, ManualSetpoint, MAX_PORT_LEN};
pub use machine::{FaultReason, RunStatus};
