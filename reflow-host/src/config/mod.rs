//! Machine configuration
//!
//! Loaded from a TOML machine file, falling back to the built-in defaults
//! when the file does not exist.

pub mod loader;

pub use loader::{load_config, LinkSettings};
