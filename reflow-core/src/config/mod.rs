//! Configuration types
//!
//! Board-agnostic tuning for the control loop. Hosts load these from their
//! machine file; everything has a usable default.

pub mod control;

pub use control::*;
