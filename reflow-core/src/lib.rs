//! Board-agnostic core logic for the reflow oven controller
//!
//! This crate contains all application logic that does not depend on a
//! specific oven, serial port or operating system:
//!
//! - Device link trait (the oven as seen by the controller)
//! - Reflow profiles (target curve and named phases)
//! - Control law (temperature error to heater intensity)
//! - Safety monitoring logic
//! - Run state machine and operator intents
//! - Session recorder
//! - The controller core that ties them together on a fixed tick

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

pub mod config;
pub mod control;
pub mod controller;
pub mod profile;
pub mod recorder;
pub mod safety;
pub mod state;
pub mod traits;

pub use controller::{Controller, RunState, StatusEvent};
