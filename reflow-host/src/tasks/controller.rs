//! Controller task
//!
//! Owns the controller core. Intents from the console are queued as they
//! arrive and applied on the next tick; status events are forwarded to the
//! telemetry task after every tick.

use embassy_futures::select::{select3, Either3};
use log::{debug, info, warn};

use reflow_core::{Controller, StatusEvent};
use reflow_hal::Clock;

use crate::channels::{INTENT_CHANNEL, SHUTDOWN, STATUS_CHANNEL};
use crate::clock::HostClock;
use crate::link::HostLink;
use crate::tasks::tick::TICK_SIGNAL;

/// Controller task - main coordination loop
///
/// With `exit_after_run` set the task returns once a run finishes or
/// faults; otherwise it runs until [`SHUTDOWN`] is signalled.
pub async fn controller_task(mut controller: Controller<HostLink>, exit_after_run: bool) {
    info!("Controller task started");
    let clock = HostClock;

    loop {
        match select3(INTENT_CHANNEL.receive(), TICK_SIGNAL.wait(), SHUTDOWN.wait()).await {
            Either3::First(intent) => {
                debug!("Intent queued: {:?}", intent);
                if let Err(intent) = controller.submit(intent) {
                    warn!("Intent queue full, dropping {:?}", intent);
                }
            }
            Either3::Second(now_ms) => {
                controller.tick(now_ms);
                let run_over = publish(controller.take_events());
                if exit_after_run && run_over {
                    info!("Run over, shutting down");
                    break;
                }
            }
            Either3::Third(()) => {
                info!("Shutdown requested");
                break;
            }
        }
    }

    controller.shutdown(clock.now_ms());
    publish(controller.take_events());
    info!("Controller stopped");
}

/// Forward events to telemetry
///
/// Returns true if any event ended a run.
fn publish(events: Vec<StatusEvent>) -> bool {
    let mut run_over = false;
    for event in events {
        run_over |= ends_run(&event);
        if STATUS_CHANNEL.try_send(event).is_err() {
            warn!("Status channel full, dropping event");
        }
    }
    run_over
}

fn ends_run(event: &StatusEvent) -> bool {
    matches!(
        event,
        StatusEvent::RunFinished { .. } | StatusEvent::Faulted { .. }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use reflow_core::state::FaultReason;
    use reflow_core::RunState;

    #[test]
    fn test_run_ending_events() {
        assert!(ends_run(&StatusEvent::RunFinished { samples: 3 }));
        assert!(ends_run(&StatusEvent::Faulted {
            reason: FaultReason::OverTemperature,
            state: RunState::default(),
        }));
        assert!(!ends_run(&StatusEvent::Progress(RunState::default())));
    }
}
