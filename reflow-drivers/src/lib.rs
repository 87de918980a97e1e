//! Oven link implementations
//!
//! This crate provides concrete implementations of the
//! [`DeviceLink`](reflow_core::traits::DeviceLink) trait:
//!
//! - Serial oven (controller board speaking the line protocol over a UART)
//! - Simulated oven (first-order thermal model, no hardware)

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod oven;
