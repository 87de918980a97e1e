//! Reflow profiles
//!
//! A profile is the target temperature curve for one run: an ordered set of
//! (elapsed, target) points joined by straight lines, partitioned into named
//! phases. Profiles are validated on construction and immutable afterwards.

pub mod curve;
pub mod phase;

pub use curve::{Profile, ProfileError, ProfilePoint};
pub use phase::{Phase, PhaseKind};

/// Maximum label length (profile and phase names)
pub const MAX_LABEL_LEN: usize = 16;

/// Maximum points per profile
pub const MAX_POINTS: usize = 32;

/// Maximum phases per profile
pub const MAX_PHASES: usize = 8;
