//! Session recorder
//!
//! In-memory log of one run's samples, in the order they were taken.
//! Cleared when a new run starts.

use alloc::vec::Vec;
use core::fmt;

use heapless::String;

use crate::control::Intensity;
use crate::profile::MAX_LABEL_LEN;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One control tick's worth of data
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Sample {
    /// Run elapsed time when the sample was taken (ms)
    pub timestamp_ms: u64,
    /// Oven temperature (°C)
    pub measured_c: f32,
    /// Profile target (°C)
    pub target_c: f32,
    /// Intensity commanded for this tick
    pub intensity: Intensity,
    /// Phase name
    pub phase: String<MAX_LABEL_LEN>,
}

/// Recorder errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RecordError {
    /// Sample timestamp not after the previous one
    OutOfOrder,
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordError::OutOfOrder => f.write_str("sample timestamp not increasing"),
        }
    }
}

impl core::error::Error for RecordError {}

/// Append-only sample log for the current run
#[derive(Debug, Clone, Default)]
pub struct SessionRecorder {
    samples: Vec<Sample>,
}

impl SessionRecorder {
    pub const fn new() -> Self {
        Self {
            samples: Vec::new(),
        }
    }

    /// Append a sample
    ///
    /// Timestamps must be strictly increasing.
    pub fn record(&mut self, sample: Sample) -> Result<(), RecordError> {
        if let Some(last) = self.samples.last() {
            if sample.timestamp_ms <= last.timestamp_ms {
                return Err(RecordError::OutOfOrder);
            }
        }
        self.samples.push(sample);
        Ok(())
    }

    /// Iterate over every sample, oldest first
    ///
    /// Each call starts a fresh pass.
    pub fn all_samples(&self) -> core::slice::Iter<'_, Sample> {
        self.samples.iter()
    }

    /// Most recent sample
    pub fn latest(&self) -> Option<&Sample> {
        self.samples.last()
    }

    /// Number of samples recorded
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Drop all samples
    pub fn clear(&mut self) {
        self.samples.clear();
    }
}
