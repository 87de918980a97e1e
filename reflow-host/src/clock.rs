//! Host monotonic clock

use embassy_time::Instant;
use reflow_hal::Clock;

/// Milliseconds since the embassy time driver started
///
/// Shared by the tick task and both oven links so reading timestamps and
/// tick times are on the same base.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostClock;

impl Clock for HostClock {
    fn now_ms(&self) -> u64 {
        Instant::now().as_millis()
    }
}
