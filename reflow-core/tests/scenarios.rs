//! End-to-end controller scenarios against a scripted oven link

use std::collections::VecDeque;

use reflow_core::config::ControlConfig;
use reflow_core::control::Intensity;
use reflow_core::profile::{Phase, PhaseKind, Profile, ProfilePoint};
use reflow_core::state::{FaultReason, Intent, RunStatus};
use reflow_core::traits::{DeviceLink, LinkError, Reading};
use reflow_core::{Controller, StatusEvent};

/// Oven link driven by a script of readings and send results
#[derive(Default)]
struct MockOven {
    connected: bool,
    now_ms: u64,
    readings: VecDeque<Result<f32, LinkError>>,
    send_results: VecDeque<Result<(), LinkError>>,
    sent: Vec<Intensity>,
}

impl DeviceLink for MockOven {
    fn connect(&mut self, _port: &str) -> Result<(), LinkError> {
        self.connected = true;
        Ok(())
    }

    fn send_command(&mut self, intensity: Intensity) -> Result<(), LinkError> {
        self.sent.push(intensity);
        self.send_results.pop_front().unwrap_or(Ok(()))
    }

    fn read_temperature(&mut self) -> Result<Reading, LinkError> {
        let temperature_c = self.readings.pop_front().unwrap_or(Ok(25.0))?;
        Ok(Reading {
            temperature_c,
            sampled_at_ms: self.now_ms,
        })
    }

    fn disconnect(&mut self) {
        self.connected = false;
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

/// Controller plus a clock that moves one tick per step
struct Rig {
    controller: Controller<MockOven>,
    now_ms: u64,
}

impl Rig {
    /// Connected, profile selected, run started and in `Running`
    fn running(profile: Profile) -> Self {
        let mut rig = Self::idle(profile);
        rig.submit(Intent::connect("sim").unwrap());
        rig.submit(Intent::select_profile("lead-free").unwrap());
        rig.submit(Intent::Start);
        rig.step();
        assert_eq!(rig.controller.status(), RunStatus::Running);
        rig.controller.take_events();
        rig
    }

    fn idle(profile: Profile) -> Self {
        let mut controller = Controller::new(MockOven::default(), ControlConfig::default()).unwrap();
        controller.load_profiles(vec![profile]);
        Self {
            controller,
            now_ms: 0,
        }
    }

    fn submit(&mut self, intent: Intent) {
        self.controller.submit(intent).unwrap();
    }

    fn script_reading(&mut self, reading: Result<f32, LinkError>) {
        self.controller.link_mut().readings.push_back(reading);
    }

    /// Run one tick at the current time, then move the clock on
    fn step(&mut self) {
        self.controller.link_mut().now_ms = self.now_ms;
        self.controller.tick(self.now_ms);
        self.now_ms += 1000;
    }

    fn sent(&self) -> &[Intensity] {
        &self.controller.link().sent
    }
}

fn reference_profile() -> Profile {
    Profile::new(
        "lead-free",
        &[
            ProfilePoint::new(0.0, 25.0),
            ProfilePoint::new(60.0, 150.0),
            ProfilePoint::new(120.0, 150.0),
            ProfilePoint::new(180.0, 25.0),
        ],
        &[
            Phase::new("preheat", PhaseKind::Heating, 0.0, 60.0),
            Phase::new("soak", PhaseKind::Heating, 60.0, 120.0),
            Phase::new("cooling", PhaseKind::Cooling, 120.0, 180.0),
        ],
        Some(217.0),
    )
    .unwrap()
}

#[test]
fn test_reference_profile_targets() {
    let profile = reference_profile();
    assert_eq!(profile.interpolate(30.0), 87.5);
    assert_eq!(profile.interpolate(90.0), 150.0);
    assert_eq!(profile.interpolate(200.0), 25.0);
}

#[test]
fn test_successful_ticks_record_one_sample_each() {
    let mut rig = Rig::running(reference_profile());
    for _ in 0..10 {
        rig.step();
    }

    let timestamps: Vec<u64> = rig
        .controller
        .recorder()
        .all_samples()
        .map(|s| s.timestamp_ms)
        .collect();
    assert_eq!(timestamps.len(), 10);
    assert!(timestamps.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(rig.sent().len(), 10);
}

#[test]
fn test_intensity_follows_error() {
    let mut rig = Rig::running(reference_profile());
    // elapsed 0: target 25, measured 20 -> 50 + 5
    rig.script_reading(Ok(20.0));
    rig.step();
    assert_eq!(rig.sent(), [Intensity::new(55.0)]);

    let sample = rig.controller.recorder().latest().unwrap().clone();
    assert_eq!(sample.target_c, 25.0);
    assert_eq!(sample.measured_c, 20.0);
    assert_eq!(sample.phase.as_str(), "preheat");
}

#[test]
fn test_two_read_timeouts_fault_and_silence_heater() {
    let mut rig = Rig::running(reference_profile());
    rig.step();
    let sent_before = rig.sent().len();

    rig.script_reading(Err(LinkError::Timeout));
    rig.step();
    assert_eq!(rig.controller.status(), RunStatus::Running);

    rig.script_reading(Err(LinkError::Timeout));
    rig.step();
    assert_eq!(
        rig.controller.status(),
        RunStatus::Faulted(FaultReason::DeviceTimeout)
    );

    // No commands while faulted, even if the operator asks to start
    rig.submit(Intent::Start);
    for _ in 0..3 {
        rig.step();
    }
    assert_eq!(rig.sent().len(), sent_before);
    assert_eq!(
        rig.controller.status(),
        RunStatus::Faulted(FaultReason::DeviceTimeout)
    );

    // Acknowledge + start resumes control
    rig.submit(Intent::AcknowledgeFault);
    rig.submit(Intent::Start);
    rig.step();
    assert_eq!(rig.controller.status(), RunStatus::Running);
    rig.step();
    assert_eq!(rig.sent().len(), sent_before + 1);
}

#[test]
fn test_stale_readings_fault() {
    let mut rig = Rig::running(reference_profile());
    // Link keeps reporting a sample taken at t=0
    rig.controller.link_mut().now_ms = 0;
    for _ in 0..6 {
        let now = rig.now_ms;
        rig.controller.tick(now);
        rig.now_ms += 1000;
    }
    assert_eq!(
        rig.controller.status(),
        RunStatus::Faulted(FaultReason::DeviceTimeout)
    );
}

#[test]
fn test_stop_mid_run_sends_zero_and_idles() {
    let mut rig = Rig::running(reference_profile());
    rig.script_reading(Ok(20.0));
    rig.step();
    rig.step();

    rig.submit(Intent::Stop);
    rig.step();

    assert_eq!(rig.sent().last(), Some(&Intensity::OFF));
    assert_eq!(rig.controller.status(), RunStatus::Idle);

    let statuses: Vec<RunStatus> = rig
        .controller
        .take_events()
        .into_iter()
        .filter_map(|e| match e {
            StatusEvent::StateChanged(state) => Some(state.status),
            _ => None,
        })
        .collect();
    assert_eq!(statuses, [RunStatus::Stopping, RunStatus::Idle]);
}

#[test]
fn test_over_temperature_forces_zero_same_tick() {
    let mut rig = Rig::running(reference_profile());
    rig.step();

    rig.script_reading(Ok(265.0));
    rig.step();

    assert_eq!(rig.sent().last(), Some(&Intensity::OFF));
    assert_eq!(
        rig.controller.status(),
        RunStatus::Faulted(FaultReason::OverTemperature)
    );
    let events = rig.controller.take_events();
    assert!(events.iter().any(|e| matches!(
        e,
        StatusEvent::Faulted {
            reason: FaultReason::OverTemperature,
            ..
        }
    )));

    // Reset requires acknowledgment
    rig.submit(Intent::Stop);
    rig.step();
    assert!(rig.controller.status().is_faulted());
}

#[test]
fn test_infinite_reading_forces_zero_same_tick() {
    let mut rig = Rig::running(reference_profile());
    rig.step();
    let sent_before = rig.sent().len();

    rig.script_reading(Ok(f32::INFINITY));
    rig.step();

    assert_eq!(rig.sent().len(), sent_before + 1);
    assert_eq!(rig.sent().last(), Some(&Intensity::OFF));
    assert_eq!(
        rig.controller.status(),
        RunStatus::Faulted(FaultReason::OverTemperature)
    );
}

#[test]
fn test_rejected_command_retried_once() {
    let mut rig = Rig::running(reference_profile());
    rig.controller
        .link_mut()
        .send_results
        .push_back(Err(LinkError::Rejected));
    rig.step();

    assert_eq!(rig.controller.status(), RunStatus::Running);
    assert_eq!(rig.sent().len(), 2);
    assert_eq!(rig.controller.recorder().len(), 1);
}

#[test]
fn test_command_failing_twice_faults() {
    let mut rig = Rig::running(reference_profile());
    let link = rig.controller.link_mut();
    link.send_results.push_back(Err(LinkError::Rejected));
    link.send_results.push_back(Err(LinkError::Timeout));
    rig.step();

    assert_eq!(
        rig.controller.status(),
        RunStatus::Faulted(FaultReason::CommandFailed)
    );
    assert_eq!(rig.sent().len(), 2);
    assert!(rig.controller.recorder().is_empty());
}

#[test]
fn test_run_finishes_after_final_point() {
    let mut rig = Rig::running(reference_profile());
    for _ in 0..181 {
        rig.step();
    }
    assert_eq!(rig.controller.status(), RunStatus::Idle);
    assert_eq!(rig.controller.recorder().len(), 181);
    assert_eq!(rig.sent().last(), Some(&Intensity::OFF));

    let events = rig.controller.take_events();
    assert!(events.contains(&StatusEvent::RunFinished { samples: 181 }));
}

#[test]
fn test_cooling_phase_keeps_heater_off() {
    let mut rig = Rig::running(reference_profile());
    for _ in 0..130 {
        rig.script_reading(Ok(20.0));
        rig.step();
    }
    // Ticks at elapsed 120..=129 are in the cooling phase
    let cooling = &rig.sent()[120..];
    assert!(cooling.iter().all(|i| i.is_off()));
}

#[test]
fn test_new_run_clears_recorder() {
    let mut rig = Rig::running(reference_profile());
    for _ in 0..5 {
        rig.step();
    }
    rig.submit(Intent::Stop);
    rig.step();
    assert_eq!(rig.controller.recorder().len(), 5);

    rig.submit(Intent::Start);
    rig.step();
    assert_eq!(rig.controller.status(), RunStatus::Running);
    assert!(rig.controller.recorder().is_empty());
}
