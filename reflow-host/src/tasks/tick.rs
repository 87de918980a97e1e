//! Tick task for the control loop
//!
//! Signals the controller once per tick period with the current clock
//! time. If the controller is still busy with the previous tick (a slow
//! serial reply) the signal keeps only the latest time.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Ticker};
use log::info;

use reflow_hal::Clock;

use crate::clock::HostClock;

/// Signal to notify controller of tick
pub static TICK_SIGNAL: Signal<CriticalSectionRawMutex, u64> = Signal::new();

/// Tick task - sends periodic tick signals with timestamp
pub async fn tick_task(interval_ms: u32) {
    info!("Tick task started ({} ms)", interval_ms);

    let mut ticker = Ticker::every(Duration::from_millis(u64::from(interval_ms)));
    let clock = HostClock;

    loop {
        ticker.next().await;
        TICK_SIGNAL.signal(clock.now_ms());
    }
}
