//! Serial oven link
//!
//! Drives an oven controller board over a UART using the line protocol:
//! `manual 1` on connect, `tempshow` to poll a reading, `shot N` to pulse
//! the heater at N percent. The board only heats while it keeps receiving
//! shots, so silence leaves the heater off.

use reflow_core::control::Intensity;
use reflow_core::traits::{DeviceLink, LinkError, Reading};
use reflow_hal::{Clock, UartConfig, UartError, UartOpen, UartRx, UartTx};
use reflow_protocol::{LineParser, OvenCommand, OvenReply};

/// Receive chunk size
const RX_CHUNK: usize = 32;

/// Default wait for a temperature reply (ms)
pub const DEFAULT_READ_TIMEOUT_MS: u32 = 1500;

/// Serial oven configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SerialOvenConfig {
    /// Line settings
    pub uart: UartConfig,
    /// Wait for a temperature reply (ms)
    pub read_timeout_ms: u32,
}

impl Default for SerialOvenConfig {
    fn default() -> Self {
        Self {
            uart: UartConfig::default(),
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
        }
    }
}

/// Oven controller board on a serial port
pub struct SerialOven<O: UartOpen, C: Clock> {
    opener: O,
    clock: C,
    config: SerialOvenConfig,
    port: Option<O::Port>,
    parser: LineParser,
}

impl<O: UartOpen, C: Clock> SerialOven<O, C> {
    /// Create a disconnected serial oven
    pub fn new(opener: O, clock: C, config: SerialOvenConfig) -> Self {
        Self {
            opener,
            clock,
            config,
            port: None,
            parser: LineParser::new(),
        }
    }

    /// Get access to the port opener
    pub fn opener(&self) -> &O {
        &self.opener
    }

    /// Drop the port if the last operation found it gone
    fn track<T>(&mut self, result: Result<T, LinkError>) -> Result<T, LinkError> {
        if let Err(LinkError::Disconnected) = result {
            self.port = None;
            self.parser.reset();
        }
        result
    }

    fn send(&mut self, command: OvenCommand) -> Result<(), LinkError> {
        let port = self.port.as_mut().ok_or(LinkError::Unavailable)?;
        let line = command.encode().map_err(|_| LinkError::Rejected)?;
        port.write_blocking(line.as_bytes())
            .and_then(|()| port.flush())
            .map_err(|e| link_error(e, LinkError::Rejected))
    }

    /// Discard anything the board sent before our request
    fn drain_input(&mut self) -> Result<(), LinkError> {
        let port = self.port.as_mut().ok_or(LinkError::Unavailable)?;
        let mut buf = [0u8; RX_CHUNK];
        loop {
            match port.read_timeout(&mut buf, 0) {
                Ok(_) => continue,
                Err(UartError::Timeout) => break,
                Err(e) => return Err(link_error(e, LinkError::ReadFailure)),
            }
        }
        self.parser.reset();
        Ok(())
    }

    /// Wait for the next temperature line
    fn await_temperature(&mut self) -> Result<f32, LinkError> {
        let port = self.port.as_mut().ok_or(LinkError::Unavailable)?;
        let deadline = self.clock.now_ms() + u64::from(self.config.read_timeout_ms);
        let mut buf = [0u8; RX_CHUNK];

        loop {
            let now = self.clock.now_ms();
            if now >= deadline {
                return Err(LinkError::Timeout);
            }
            let remaining = (deadline - now).min(u64::from(u32::MAX)) as u32;

            let n = port
                .read_timeout(&mut buf, remaining)
                .map_err(|e| link_error(e, LinkError::ReadFailure))?;

            let mut offset = 0;
            while offset < n {
                let (used, line) = self.parser.feed_bytes(&buf[offset..n]);
                offset += used;
                match line {
                    Ok(Some(line)) => match OvenReply::parse(&line) {
                        Ok(OvenReply::Temperature(celsius)) => return Ok(celsius),
                        // Pulse-complete notices and banners
                        Ok(_) => {}
                        Err(_) => return Err(LinkError::ReadFailure),
                    },
                    Ok(None) => {}
                    // Over-long or binary noise line
                    Err(_) => {}
                }
            }
        }
    }

    fn poll_temperature(&mut self) -> Result<Reading, LinkError> {
        self.drain_input()?;
        self.send(OvenCommand::TempShow)?;
        let temperature_c = self.await_temperature()?;
        Ok(Reading {
            temperature_c,
            sampled_at_ms: self.clock.now_ms(),
        })
    }
}

impl<O: UartOpen, C: Clock> DeviceLink for SerialOven<O, C> {
    fn connect(&mut self, port: &str) -> Result<(), LinkError> {
        self.disconnect();

        let opened = self
            .opener
            .open(port, &self.config.uart)
            .map_err(|_| LinkError::Unavailable)?;
        self.port = Some(opened);
        self.parser.reset();

        if self.send(OvenCommand::Manual(true)).is_err() {
            self.port = None;
            return Err(LinkError::Unavailable);
        }
        Ok(())
    }

    fn send_command(&mut self, intensity: Intensity) -> Result<(), LinkError> {
        let result = self.send(OvenCommand::Shot(intensity.as_percent_u8()));
        self.track(result)
    }

    fn read_temperature(&mut self) -> Result<Reading, LinkError> {
        let result = self.poll_temperature();
        self.track(result)
    }

    fn disconnect(&mut self) {
        if self.port.is_some() {
            // Hand control back to the board; the port may already be gone
            let _ = self.send(OvenCommand::Manual(false));
        }
        self.port = None;
        self.parser.reset();
    }

    fn is_connected(&self) -> bool {
        self.port.is_some()
    }
}

/// Map a UART failure, using `io` for generic I/O errors
fn link_error(error: UartError, io: LinkError) -> LinkError {
    match error {
        UartError::Unavailable => LinkError::Unavailable,
        UartError::Timeout => LinkError::Timeout,
        UartError::Disconnected => LinkError::Disconnected,
        UartError::Io => io,
    }
}
