//! Inter-task communication channels
//!
//! Static channels connecting the console thread, the controller task and
//! the telemetry task. The console runs on its own OS thread, so everything
//! here is guarded by a critical section rather than a task-local mutex.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use reflow_core::state::Intent;
use reflow_core::StatusEvent;

/// Channel capacity for operator intents
const INTENT_CHANNEL_SIZE: usize = 8;

/// Channel capacity for status events
const STATUS_CHANNEL_SIZE: usize = 32;

/// Operator intents (console, command line)
pub static INTENT_CHANNEL: Channel<CriticalSectionRawMutex, Intent, INTENT_CHANNEL_SIZE> =
    Channel::new();

/// Controller status events for telemetry
pub static STATUS_CHANNEL: Channel<CriticalSectionRawMutex, StatusEvent, STATUS_CHANNEL_SIZE> =
    Channel::new();

/// Signal that the operator asked to quit
pub static SHUTDOWN: Signal<CriticalSectionRawMutex, ()> = Signal::new();
