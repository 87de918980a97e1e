//! Profile execution engine
//!
//! The controller owns the run state, the device link and the recorder.
//! The runtime calls [`Controller::tick`] on a fixed period; each tick
//! drains queued intents in arrival order, then advances the run by one
//! step. Everything observable leaves through [`Controller::take_events`]
//! as copied snapshots.
//!
//! A run either follows the selected profile until its last point or, in
//! manual mode, holds an operator setpoint until stopped. Both paths go
//! through the same regulator and safety monitor.

pub mod events;
pub mod run;

pub use events::{RejectReason, StatusEvent};
pub use run::{Command, RunState};

use alloc::vec::Vec;

use heapless::{Deque, String};

use crate::config::{ConfigError, ControlConfig};
use crate::control::{Intensity, Regulator, SlopeTracker};
use crate::profile::{PhaseKind, Profile, MAX_LABEL_LEN};
use crate::recorder::{Sample, SessionRecorder};
use crate::safety::{SafetyMonitor, SafetyStatus};
use crate::state::{Event, FaultReason, Intent, ManualSetpoint, RunStatus};
use crate::traits::{DeviceLink, LinkError, Reading};

/// Maximum intents queued between ticks
pub const MAX_PENDING_INTENTS: usize = 16;

/// Send attempts per heater command (one retry)
const COMMAND_ATTEMPTS: u8 = 2;

/// Phase label recorded for manual samples
const MANUAL_LABEL: &str = "manual";

/// Closed-loop reflow controller
pub struct Controller<L: DeviceLink> {
    link: L,
    config: ControlConfig,
    regulator: Regulator,
    safety: SafetyMonitor,
    slope: SlopeTracker,
    profiles: Vec<Profile>,
    selected: Option<usize>,
    /// Profile of the run in progress, fixed at run start
    active: Option<Profile>,
    /// Start requested; run begins on the next good reading
    armed: bool,
    /// Setpoint of an armed manual run
    pending_manual: Option<ManualSetpoint>,
    state: RunState,
    recorder: SessionRecorder,
    intents: Deque<Intent, MAX_PENDING_INTENTS>,
    events: Vec<StatusEvent>,
}

impl<L: DeviceLink> Controller<L> {
    /// Create a controller
    ///
    /// Fails if `config` does not validate.
    pub fn new(link: L, config: ControlConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            link,
            config,
            regulator: Regulator::from_config(&config),
            safety: SafetyMonitor::new(&config),
            slope: SlopeTracker::new(),
            profiles: Vec::new(),
            selected: None,
            active: None,
            armed: false,
            pending_manual: None,
            state: RunState::default(),
            recorder: SessionRecorder::new(),
            intents: Deque::new(),
            events: Vec::new(),
        })
    }

    /// Replace the selectable profiles
    ///
    /// Clears the current selection unless a run is in progress; during a
    /// run the selection follows its name into the new set, or is cleared
    /// if the new set no longer has it.
    pub fn load_profiles(&mut self, profiles: Vec<Profile>) {
        self.profiles = profiles;
        self.selected = match (&self.state.active_profile, self.state.status.is_active()) {
            (Some(name), true) => self.profiles.iter().position(|p| p.name() == name.as_str()),
            _ => None,
        };
        if self.selected.is_none() {
            self.state.active_profile = None;
        }
    }

    /// Names of the selectable profiles
    pub fn profile_names(&self) -> impl Iterator<Item = &str> {
        self.profiles.iter().map(Profile::name)
    }

    /// Queue an intent for the next tick
    ///
    /// Returns the intent back if the queue is full.
    pub fn submit(&mut self, intent: Intent) -> Result<(), Intent> {
        self.intents.push_back(intent)
    }

    /// Advance the controller by one tick
    ///
    /// `now_ms` is the controller clock, the same clock the link stamps
    /// readings with.
    pub fn tick(&mut self, now_ms: u64) {
        while let Some(intent) = self.intents.pop_front() {
            self.handle_intent(intent, now_ms);
        }

        match self.state.status {
            RunStatus::Connecting => self.tick_connecting(now_ms),
            RunStatus::Running => self.tick_running(now_ms),
            _ => {}
        }
    }

    /// Take all events emitted since the last call
    pub fn take_events(&mut self) -> Vec<StatusEvent> {
        core::mem::take(&mut self.events)
    }

    /// Copy of the current run state
    pub fn snapshot(&self) -> RunState {
        self.state.clone()
    }

    /// Current run status
    pub fn status(&self) -> RunStatus {
        self.state.status
    }

    /// Samples of the current (or last) run
    pub fn recorder(&self) -> &SessionRecorder {
        &self.recorder
    }

    /// Control configuration in use
    pub fn config(&self) -> &ControlConfig {
        &self.config
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    /// Stop any run and close the link
    pub fn shutdown(&mut self, now_ms: u64) {
        if matches!(
            self.state.status,
            RunStatus::Connecting | RunStatus::Running
        ) {
            self.stop_run(now_ms);
        }
        if self.link.is_connected() {
            self.link.disconnect();
        }
    }

    fn handle_intent(&mut self, intent: Intent, now_ms: u64) {
        match intent {
            Intent::Connect(port) => self.connect(&port),
            Intent::SelectProfile(name) => self.select_profile(name),
            Intent::Start => self.start(),
            Intent::Stop => match self.state.status {
                RunStatus::Connecting | RunStatus::Running => self.stop_run(now_ms),
                _ => self.reject(RejectReason::NothingToStop),
            },
            Intent::AcknowledgeFault => {
                if self.state.status.is_faulted() {
                    self.safety.reset();
                    self.apply(Event::AcknowledgeFault);
                } else {
                    self.reject(RejectReason::NoFault);
                }
            }
            Intent::SetManual(setpoint) => self.set_manual(setpoint),
        }
    }

    fn connect(&mut self, port: &str) {
        match self.state.status {
            RunStatus::Idle => {}
            RunStatus::Faulted(_) => return self.reject(RejectReason::FaultNotAcknowledged),
            _ => return self.reject(RejectReason::NotIdle),
        }

        if self.link.is_connected() {
            self.link.disconnect();
        }

        match self.link.connect(port) {
            Ok(()) => self.apply(Event::LinkOpened),
            Err(e) => self.events.push(StatusEvent::ConnectFailed(e)),
        }
    }

    fn select_profile(&mut self, name: String<MAX_LABEL_LEN>) {
        if matches!(
            self.state.status,
            RunStatus::Running | RunStatus::Stopping
        ) {
            return self.reject(RejectReason::RunInProgress);
        }

        let Some(index) = self.profiles.iter().position(|p| p.name() == name.as_str()) else {
            return self.reject(RejectReason::UnknownProfile);
        };

        if let Err(e) = self.profiles[index].check_against(self.config.safety_ceiling_c) {
            self.events.push(StatusEvent::ProfileRejected(e));
            return;
        }

        self.selected = Some(index);
        self.state.active_profile = Some(name.clone());
        self.events.push(StatusEvent::ProfileSelected(name));
    }

    fn start(&mut self) {
        match self.state.status {
            RunStatus::Idle | RunStatus::Connecting if self.selected.is_none() => {
                self.reject(RejectReason::NoProfileSelected)
            }
            RunStatus::Idle => {
                if self.link.is_connected() {
                    self.pending_manual = None;
                    self.armed = true;
                    self.apply(Event::LinkOpened);
                } else {
                    self.reject(RejectReason::NotConnected);
                }
            }
            RunStatus::Connecting => {
                self.pending_manual = None;
                self.armed = true;
            }
            RunStatus::Running | RunStatus::Stopping => {
                self.reject(RejectReason::RunInProgress)
            }
            RunStatus::Faulted(_) => self.reject(RejectReason::FaultNotAcknowledged),
        }
    }

    /// Arm a manual run, or move the setpoint of the one in progress
    fn set_manual(&mut self, setpoint: ManualSetpoint) {
        if !setpoint.target_c.is_finite() || setpoint.target_c >= self.config.safety_ceiling_c {
            return self.reject(RejectReason::SetpointOutOfRange);
        }

        match self.state.status {
            RunStatus::Running if self.state.manual.is_some() => {
                self.state.manual = Some(setpoint);
            }
            RunStatus::Running | RunStatus::Stopping => {
                return self.reject(RejectReason::RunInProgress);
            }
            RunStatus::Faulted(_) => return self.reject(RejectReason::FaultNotAcknowledged),
            RunStatus::Idle => {
                if !self.link.is_connected() {
                    return self.reject(RejectReason::NotConnected);
                }
                self.pending_manual = Some(setpoint);
                self.armed = true;
                self.apply(Event::LinkOpened);
            }
            RunStatus::Connecting => {
                self.pending_manual = Some(setpoint);
                self.armed = true;
            }
        }
        self.events.push(StatusEvent::ManualSetpoint(setpoint));
    }

    /// Wait for a good reading, then begin the run if one is armed
    fn tick_connecting(&mut self, now_ms: u64) {
        let reading = match self.link.read_temperature() {
            Ok(reading) => reading,
            Err(LinkError::Disconnected | LinkError::Unavailable) => {
                return self.fault(FaultReason::DeviceLost);
            }
            // Keep waiting; no heater commands are sent while connecting
            Err(_) => return,
        };

        if !self.safety.update_reading(reading, now_ms) {
            return;
        }
        if let SafetyStatus::Fault(reason) = self.safety.check() {
            self.send_off(now_ms);
            return self.fault(reason);
        }

        if self.armed {
            self.begin_run();
        }
    }

    fn begin_run(&mut self) {
        let manual = self.pending_manual.take();
        if manual.is_some() {
            self.active = None;
        } else {
            let Some(profile) = self.selected.and_then(|i| self.profiles.get(i)) else {
                self.armed = false;
                return self.reject(RejectReason::NoProfileSelected);
            };
            self.active = Some(profile.clone());
        }

        self.armed = false;
        self.recorder.clear();
        self.slope.reset();
        self.state.reset_run();
        self.state.manual = manual;
        self.apply(Event::HandshakeComplete);
    }

    /// One step of profile execution
    fn tick_running(&mut self, now_ms: u64) {
        let reading = match self.read_for_run(now_ms) {
            Ok(Some(reading)) => reading,
            Ok(None) => {
                if let SafetyStatus::Fault(reason) = self.safety.check() {
                    return self.fault(reason);
                }
                // Missed tick: nothing sent, nothing recorded, time still passes
                return self.advance(now_ms);
            }
            Err(reason) => return self.fault(reason),
        };

        if let Some(setpoint) = self.state.manual {
            return self.tick_manual(reading, setpoint, now_ms);
        }

        let Some(profile) = self.active.as_ref() else {
            return self.stop_run(now_ms);
        };

        let elapsed_s = self.state.elapsed_ms as f32 / 1000.0;
        let target_c = profile.interpolate(elapsed_s);
        let phase_index = profile.phase_index_at(elapsed_s);
        let phase = profile.phase_at(elapsed_s).clone();
        let liquidus_c = profile.liquidus_c();

        if self.state.phase_index != Some(phase_index) {
            self.state.phase_index = Some(phase_index);
            self.events.push(StatusEvent::PhaseChanged {
                index: phase_index,
                name: phase.name.clone(),
                kind: phase.kind,
            });
        }
        self.state.phase_remaining_ms = ((phase.end_s - elapsed_s).max(0.0) * 1000.0) as u64;

        let slope = self
            .slope
            .sample(reading.temperature_c, reading.sampled_at_ms);
        self.state.slope_c_per_s = slope;

        let mut sample = Sample {
            timestamp_ms: self.state.elapsed_ms,
            measured_c: reading.temperature_c,
            target_c,
            intensity: Intensity::OFF,
            phase: phase.name,
        };

        if let SafetyStatus::Fault(reason) = self.safety.check() {
            self.send_off(now_ms);
            self.record(sample);
            return self.fault(reason);
        }

        let slope_exceeded = phase.max_slope.is_some_and(|limit| slope > limit);
        let intensity = self.regulator.compute(
            target_c,
            reading.temperature_c,
            phase.kind,
            slope_exceeded,
        );

        if let Err(reason) = self.send_with_retry(intensity, now_ms) {
            return self.fault(reason);
        }

        sample.intensity = intensity;
        self.record(sample);

        if liquidus_c.is_some_and(|liquidus| reading.temperature_c >= liquidus) {
            self.state.time_above_liquidus_ms += u64::from(self.config.tick_interval_ms);
        }

        self.events.push(StatusEvent::Progress(self.state.clone()));
        self.advance(now_ms);
    }

    /// One step of holding a manual setpoint
    fn tick_manual(&mut self, reading: Reading, setpoint: ManualSetpoint, now_ms: u64) {
        let slope = self
            .slope
            .sample(reading.temperature_c, reading.sampled_at_ms);
        self.state.slope_c_per_s = slope;

        let mut sample = Sample {
            timestamp_ms: self.state.elapsed_ms,
            measured_c: reading.temperature_c,
            target_c: setpoint.target_c,
            intensity: Intensity::OFF,
            phase: String::try_from(MANUAL_LABEL).unwrap_or_default(),
        };

        if let SafetyStatus::Fault(reason) = self.safety.check() {
            self.send_off(now_ms);
            self.record(sample);
            return self.fault(reason);
        }

        let intensity = self
            .regulator
            .compute(
                setpoint.target_c,
                reading.temperature_c,
                PhaseKind::Heating,
                false,
            )
            .capped(setpoint.max_intensity);

        if let Err(reason) = self.send_with_retry(intensity, now_ms) {
            return self.fault(reason);
        }

        sample.intensity = intensity;
        self.record(sample);

        self.events.push(StatusEvent::Progress(self.state.clone()));
        self.advance(now_ms);
    }

    /// Read and vet a temperature
    ///
    /// `Ok(None)` is a missed read, `Err` a fault that cannot wait for the
    /// miss budget.
    fn read_for_run(&mut self, now_ms: u64) -> Result<Option<Reading>, FaultReason> {
        let reason = match self.link.read_temperature() {
            Ok(reading) => {
                return Ok(self
                    .safety
                    .update_reading(reading, now_ms)
                    .then_some(reading));
            }
            Err(LinkError::Disconnected | LinkError::Unavailable) => {
                return Err(FaultReason::DeviceLost);
            }
            Err(LinkError::Timeout) => FaultReason::DeviceTimeout,
            Err(LinkError::ReadFailure | LinkError::Rejected) => FaultReason::ReadFailure,
        };
        self.safety.reading_missed(reason);
        Ok(None)
    }

    fn advance(&mut self, now_ms: u64) {
        self.state.elapsed_ms += u64::from(self.config.tick_interval_ms);

        // Manual runs end only on stop or fault
        if self.state.manual.is_some() {
            return;
        }

        let duration_ms = self
            .active
            .as_ref()
            .map_or(0, |p| (p.duration_s() * 1000.0) as u64);

        if self.state.elapsed_ms > duration_ms {
            self.apply(Event::ProfileFinished);
            self.send_off(now_ms);
            let samples = self.recorder.len();
            self.finish_stopping();
            self.events.push(StatusEvent::RunFinished { samples });
        }
    }

    /// `Running`/`Connecting` → `Stopping` → `Idle` with one best-effort off
    fn stop_run(&mut self, now_ms: u64) {
        self.apply(Event::StopRequested);
        self.send_off(now_ms);
        self.finish_stopping();
    }

    fn finish_stopping(&mut self) {
        self.armed = false;
        self.pending_manual = None;
        self.active = None;
        self.apply(Event::HeaterOff);
    }

    /// Send a heater command, retrying once
    ///
    /// Anything but off is only sent while running.
    fn send_with_retry(&mut self, intensity: Intensity, now_ms: u64) -> Result<(), FaultReason> {
        let intensity = if self.state.status.heater_allowed() {
            intensity
        } else {
            Intensity::OFF
        };

        for _ in 0..COMMAND_ATTEMPTS {
            match self.link.send_command(intensity) {
                Ok(()) => {
                    self.state.last_command = Some(Command {
                        intensity,
                        issued_at_ms: now_ms,
                    });
                    return Ok(());
                }
                Err(LinkError::Disconnected | LinkError::Unavailable) => {
                    return Err(FaultReason::DeviceLost);
                }
                Err(_) => {}
            }
        }
        Err(FaultReason::CommandFailed)
    }

    /// Single attempt at switching the heater off
    fn send_off(&mut self, now_ms: u64) {
        if !self.link.is_connected() {
            return;
        }
        if self.link.send_command(Intensity::OFF).is_ok() {
            self.state.last_command = Some(Command {
                intensity: Intensity::OFF,
                issued_at_ms: now_ms,
            });
        }
    }

    fn record(&mut self, sample: Sample) {
        // Timestamps are run elapsed time, which only grows within a run
        if self.recorder.record(sample.clone()).is_ok() {
            self.state.last_sample = Some(sample);
        }
    }

    fn fault(&mut self, reason: FaultReason) {
        if self.state.status.is_faulted() {
            return;
        }
        self.armed = false;
        self.pending_manual = None;
        self.active = None;
        if reason == FaultReason::DeviceLost {
            self.link.disconnect();
        }
        self.apply(Event::FaultDetected(reason));
        self.events.push(StatusEvent::Faulted {
            reason,
            state: self.state.clone(),
        });
    }

    fn reject(&mut self, reason: RejectReason) {
        self.events.push(StatusEvent::IntentRejected(reason));
    }

    /// Feed the state machine and publish any status change
    fn apply(&mut self, event: Event) {
        let next = self.state.status.transition(event);
        if next == self.state.status {
            return;
        }
        self.state.status = next;
        if next == RunStatus::Idle {
            self.state.reset_run();
        }
        self.events.push(StatusEvent::StateChanged(self.state.clone()));
    }
}
