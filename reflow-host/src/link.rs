//! Oven link used by the host
//!
//! The port name picks the backend at connect time: `fake` drives the
//! simulated oven, anything else is treated as a tty device path.

use log::{debug, info};

use reflow_core::control::Intensity;
use reflow_core::traits::{DeviceLink, LinkError, Reading};
use reflow_drivers::oven::{
    SerialOven, SerialOvenConfig, SimulatedOven, SimulationConfig, SIMULATED_PORT,
};
use reflow_hal::UartConfig;

use crate::clock::HostClock;
use crate::config::LinkSettings;
use crate::transport::TtyOpener;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Backend {
    Serial,
    Simulated,
}

/// Serial or simulated oven, chosen by port name
pub struct HostLink {
    serial: SerialOven<TtyOpener, HostClock>,
    simulated: SimulatedOven<HostClock>,
    backend: Backend,
}

impl HostLink {
    pub fn new(clock: HostClock, settings: &LinkSettings) -> Self {
        let serial_config = SerialOvenConfig {
            uart: UartConfig {
                baudrate: settings.baud,
                ..UartConfig::default()
            },
            read_timeout_ms: settings.read_timeout_ms,
        };
        Self {
            serial: SerialOven::new(TtyOpener, clock, serial_config),
            simulated: SimulatedOven::new(clock, SimulationConfig::default()),
            backend: Backend::Serial,
        }
    }

    fn active(&mut self) -> &mut dyn DeviceLink {
        match self.backend {
            Backend::Serial => &mut self.serial,
            Backend::Simulated => &mut self.simulated,
        }
    }
}

impl DeviceLink for HostLink {
    fn connect(&mut self, port: &str) -> Result<(), LinkError> {
        if self.is_connected() {
            self.disconnect();
        }

        self.backend = if port == SIMULATED_PORT {
            Backend::Simulated
        } else {
            Backend::Serial
        };
        debug!("Connecting to {} via {:?} backend", port, self.backend);

        self.active().connect(port)?;
        info!("Connected to {}", port);
        Ok(())
    }

    fn send_command(&mut self, intensity: Intensity) -> Result<(), LinkError> {
        self.active().send_command(intensity)
    }

    fn read_temperature(&mut self) -> Result<Reading, LinkError> {
        self.active().read_temperature()
    }

    fn disconnect(&mut self) {
        self.active().disconnect();
    }

    fn is_connected(&self) -> bool {
        match self.backend {
            Backend::Serial => self.serial.is_connected(),
            Backend::Simulated => self.simulated.is_connected(),
        }
    }
}
