//! Safety monitor implementation
//!
//! Monitors oven temperature against the ceiling and the health of the
//! reading stream.

use crate::config::ControlConfig;
use crate::state::FaultReason;
use crate::traits::Reading;

/// Safety condition status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SafetyStatus {
    /// All conditions normal
    Ok,
    /// Safety condition violated
    Fault(FaultReason),
}

/// Safety monitor for fault detection
///
/// Tracks the last good reading and consecutive missed reads, and decides
/// when a run must be aborted.
#[derive(Debug, Clone)]
pub struct SafetyMonitor {
    /// Temperature at or above which the oven is over temperature (°C)
    ceiling_c: f32,
    /// Maximum reading age (ms)
    stale_reading_ms: u32,
    /// Missed reads tolerated before faulting
    max_missed_reads: u8,
    /// Last accepted temperature
    last_temperature_c: Option<f32>,
    /// Consecutive missed reads
    missed_reads: u8,
    /// Reason of the most recent miss
    last_miss: FaultReason,
}

impl SafetyMonitor {
    /// Create a new safety monitor
    pub fn new(config: &ControlConfig) -> Self {
        Self {
            ceiling_c: config.safety_ceiling_c,
            stale_reading_ms: config.stale_reading_ms,
            max_missed_reads: config.max_missed_reads,
            last_temperature_c: None,
            missed_reads: 0,
            last_miss: FaultReason::DeviceTimeout,
        }
    }

    /// Offer a reading taken from the link
    ///
    /// Returns `true` if the reading was accepted. Anything at or above the
    /// ceiling (including `+inf`) is always accepted so `check` reports it.
    /// NaN, `-inf` and readings older than the stale limit count as missed
    /// reads.
    pub fn update_reading(&mut self, reading: Reading, now_ms: u64) -> bool {
        if reading.temperature_c >= self.ceiling_c {
            self.last_temperature_c = Some(reading.temperature_c);
            self.missed_reads = 0;
            return true;
        }

        if !reading.temperature_c.is_finite() {
            self.reading_missed(FaultReason::ReadFailure);
            return false;
        }

        let age_ms = now_ms.saturating_sub(reading.sampled_at_ms);
        if age_ms > u64::from(self.stale_reading_ms) {
            self.reading_missed(FaultReason::DeviceTimeout);
            return false;
        }

        self.last_temperature_c = Some(reading.temperature_c);
        self.missed_reads = 0;
        true
    }

    /// Record a read that failed or produced nothing usable
    pub fn reading_missed(&mut self, reason: FaultReason) {
        self.missed_reads = self.missed_reads.saturating_add(1);
        self.last_miss = reason;
    }

    /// Check all safety conditions
    ///
    /// Over-temperature takes precedence over reading health.
    pub fn check(&self) -> SafetyStatus {
        if self.last_temperature_c.is_some_and(|t| t >= self.ceiling_c) {
            return SafetyStatus::Fault(FaultReason::OverTemperature);
        }

        if self.missed_reads >= self.max_missed_reads {
            return SafetyStatus::Fault(self.last_miss);
        }

        SafetyStatus::Ok
    }

    /// Forget all history, e.g. at the start of a run
    pub fn reset(&mut self) {
        self.last_temperature_c = None;
        self.missed_reads = 0;
        self.last_miss = FaultReason::DeviceTimeout;
    }

    /// Last accepted temperature
    pub fn temperature(&self) -> Option<f32> {
        self.last_temperature_c
    }

    /// Number of consecutive missed reads
    pub fn missed_reads(&self) -> u8 {
        self.missed_reads
    }
}
