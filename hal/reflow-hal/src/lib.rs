//! Reflow Hardware Abstraction Layer
//!
//! This crate defines the abstraction traits the controller needs from its
//! platform: a serial line to the oven and a monotonic millisecond clock.
//! The same driver code runs against a host tty, a microcontroller UART or
//! an in-memory test double.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (reflow-host, firmware)    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  reflow-drivers (serial / simulated)    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  reflow-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`uart::UartTx`], [`uart::UartRx`] - Serial communication with bounded reads
//! - [`uart::UartOpen`] - Opening a named serial port
//! - [`clock::Clock`] - Monotonic time source

#![no_std]
#![deny(unsafe_code)]

pub mod clock;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use clock::{Clock, ManualClock};
pub use uart::{DataBits, Parity, StopBits, Uart, UartConfig, UartError, UartOpen, UartRx, UartTx};
