//! Device abstraction traits
//!
//! These traits define the interface between the controller and the
//! oven-specific link implementations.

pub mod device;

pub use device::{DeviceLink, LinkError, Reading};
