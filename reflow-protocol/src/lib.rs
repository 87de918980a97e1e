//! Oven Controller Line Protocol
//!
//! This crate defines the ASCII protocol spoken by the reflow oven's
//! controller board over its 9600 baud serial port. The host sends short
//! commands and the board answers with temperature reports.
//!
//! # Protocol Overview
//!
//! ```text
//! host  → oven   manual 1\n        enter manual (host-driven) mode
//! host  → oven   tempshow\n        request one temperature report
//! host  → oven   tempshow 1\n      report every second
//! host  → oven   shot 42\n         fire the heater at 42 % for one pulse
//!
//! oven  → host   +183.25C\r\n      temperature report
//! oven  → host   Oven 1,17,+183.25,C\r\n   long-form temperature report
//! oven  → host   shot\r\n          heater pulse finished
//! ```
//!
//! Lines end at `\r` or `\n`; blank lines are ignored. Spaces inside a
//! reply carry no meaning and are stripped before matching.

#![no_std]
#![deny(unsafe_code)]

pub mod line;
pub mod messages;

pub use line::{Line, LineError, LineParser, MAX_LINE_LEN};
pub use messages::{OvenCommand, OvenReply, MAX_COMMAND_LEN};
