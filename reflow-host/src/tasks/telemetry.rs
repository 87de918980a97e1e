//! Telemetry task
//!
//! Turns controller status events into log lines. This is the host's only
//! presentation layer; run it with `RUST_LOG=debug` for per-tick detail.

use log::{info, log, Level};

use reflow_core::state::RunStatus;
use reflow_core::{RunState, StatusEvent};

use crate::channels::STATUS_CHANNEL;

/// Telemetry task - logs every status event
pub async fn telemetry_task() {
    info!("Telemetry task started");
    loop {
        let event = STATUS_CHANNEL.receive().await;
        report(&event);
    }
}

/// Log whatever is still queued (used after the controller stops)
pub fn flush() {
    while let Ok(event) = STATUS_CHANNEL.try_receive() {
        report(&event);
    }
}

fn report(event: &StatusEvent) {
    let (level, line) = describe(event);
    log!(level, "{}", line);
}

/// Log level and message for an event
pub fn describe(event: &StatusEvent) -> (Level, String) {
    match event {
        StatusEvent::StateChanged(state) => (Level::Info, status_line(state)),
        StatusEvent::Progress(state) => (Level::Info, progress_line(state)),
        StatusEvent::PhaseChanged { index, name, kind } => (
            Level::Info,
            format!("Phase {}: {} ({:?})", index + 1, name, kind),
        ),
        StatusEvent::Faulted { reason, state } => (
            Level::Error,
            format!(
                "FAULT: {} at {:.1} s, heater commands stopped; acknowledge with `ack`",
                reason,
                state.elapsed_ms as f32 / 1000.0
            ),
        ),
        StatusEvent::ConnectFailed(e) => (Level::Warn, format!("Connect failed: {}", e)),
        StatusEvent::ProfileSelected(name) => (Level::Info, format!("Profile selected: {}", name)),
        StatusEvent::ProfileRejected(e) => (Level::Warn, format!("Profile rejected: {}", e)),
        StatusEvent::IntentRejected(reason) => (Level::Warn, format!("Ignored: {}", reason)),
        StatusEvent::RunFinished { samples } => (
            Level::Info,
            format!("Run finished, {} samples recorded", samples),
        ),
        StatusEvent::ManualSetpoint(setpoint) => (
            Level::Info,
            format!(
                "Manual setpoint: {:.1} °C, heater at most {}%",
                setpoint.target_c,
                setpoint.max_intensity.as_percent_u8()
            ),
        ),
    }
}

fn status_line(state: &RunState) -> String {
    let status = match state.status {
        RunStatus::Idle => "idle".to_string(),
        RunStatus::Connecting => "connecting".to_string(),
        RunStatus::Running => "running".to_string(),
        RunStatus::Stopping => "stopping".to_string(),
        RunStatus::Faulted(reason) => format!("faulted ({})", reason),
    };
    match (&state.manual, &state.active_profile) {
        (Some(setpoint), _) => format!("Status: {} [manual {:.1} °C]", status, setpoint.target_c),
        (None, Some(profile)) => format!("Status: {} [{}]", status, profile),
        (None, None) => format!("Status: {}", status),
    }
}

fn progress_line(state: &RunState) -> String {
    let elapsed_s = state.elapsed_ms as f32 / 1000.0;
    match &state.last_sample {
        Some(sample) => format!(
            "{:>6.1} s  {:<8} target {:>5.1} °C  measured {:>5.1} °C  heater {:>3}%  slope {:+.2} °C/s  above liquidus {} s  phase left {} s",
            elapsed_s,
            sample.phase,
            sample.target_c,
            sample.measured_c,
            sample.intensity.as_percent_u8(),
            state.slope_c_per_s,
            state.time_above_liquidus_ms / 1000,
            state.phase_remaining_ms / 1000,
        ),
        None => format!("{:>6.1} s  no reading", elapsed_s),
    }
}
