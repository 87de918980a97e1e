//! Serial port on the host
//!
//! Opens the oven's serial adapter with the configured line settings and
//! maps its per-call read timeout onto [`UartRx::read_timeout`]. Each port
//! owns exactly one file descriptor, released when the port is dropped.

use std::io::{self, ErrorKind, Read, Write};
use std::time::Duration;

use log::debug;
use reflow_hal::{DataBits, Parity, StopBits, UartConfig, UartError, UartOpen, UartRx, UartTx};
use serialport::{FlowControl, SerialPort};

/// `EIO`, reported by USB serial adapters after they are unplugged
const EIO: i32 = 5;

/// `ENXIO`, reported when the device node no longer has a device behind it
const ENXIO: i32 = 6;

/// Map an I/O error onto the serial error set
pub fn uart_error(err: &io::Error) -> UartError {
    match err.kind() {
        ErrorKind::NotFound | ErrorKind::PermissionDenied => UartError::Unavailable,
        ErrorKind::BrokenPipe | ErrorKind::NotConnected | ErrorKind::UnexpectedEof => {
            UartError::Disconnected
        }
        ErrorKind::TimedOut | ErrorKind::WouldBlock => UartError::Timeout,
        _ => match err.raw_os_error() {
            Some(EIO) | Some(ENXIO) => UartError::Disconnected,
            _ => UartError::Io,
        },
    }
}

fn data_bits(bits: DataBits) -> serialport::DataBits {
    match bits {
        DataBits::Seven => serialport::DataBits::Seven,
        DataBits::Eight => serialport::DataBits::Eight,
    }
}

fn parity(parity: Parity) -> serialport::Parity {
    match parity {
        Parity::None => serialport::Parity::None,
        Parity::Even => serialport::Parity::Even,
        Parity::Odd => serialport::Parity::Odd,
    }
}

fn stop_bits(bits: StopBits) -> serialport::StopBits {
    match bits {
        StopBits::One => serialport::StopBits::One,
        StopBits::Two => serialport::StopBits::Two,
    }
}

/// Opens serial device nodes by path (`/dev/ttyUSB0`, `COM3`)
#[derive(Debug, Default)]
pub struct TtyOpener;

impl UartOpen for TtyOpener {
    type Port = TtyPort;

    fn open(&mut self, name: &str, config: &UartConfig) -> Result<Self::Port, UartError> {
        let port = serialport::new(name, config.baudrate)
            .data_bits(data_bits(config.data_bits))
            .parity(parity(config.parity))
            .stop_bits(stop_bits(config.stop_bits))
            .flow_control(FlowControl::None)
            .timeout(Duration::ZERO)
            .open()
            .map_err(|e| {
                debug!("Failed to open {}: {}", name, e);
                UartError::Unavailable
            })?;

        debug!(
            "Opened {} at {} baud ({:?} data bits, {:?} parity, {:?} stop bits)",
            name, config.baudrate, config.data_bits, config.parity, config.stop_bits
        );
        Ok(TtyPort::new(port))
    }
}

/// Open serial port
pub struct TtyPort {
    port: Box<dyn SerialPort>,
    timeout_ms: u32,
}

impl TtyPort {
    pub fn new(port: Box<dyn SerialPort>) -> Self {
        let timeout_ms = u32::try_from(port.timeout().as_millis()).unwrap_or(u32::MAX);
        Self { port, timeout_ms }
    }

    fn set_timeout(&mut self, timeout_ms: u32) -> Result<(), UartError> {
        if timeout_ms != self.timeout_ms {
            self.port
                .set_timeout(Duration::from_millis(u64::from(timeout_ms)))
                .map_err(|e| {
                    debug!("Failed to set serial timeout: {}", e);
                    UartError::Io
                })?;
            self.timeout_ms = timeout_ms;
        }
        Ok(())
    }
}

impl UartTx for TtyPort {
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), UartError> {
        self.port.write_all(data).map_err(|e| uart_error(&e))
    }

    fn flush(&mut self) -> Result<(), UartError> {
        self.port.flush().map_err(|e| uart_error(&e))
    }
}

impl UartRx for TtyPort {
    fn read_timeout(&mut self, buf: &mut [u8], timeout_ms: u32) -> Result<usize, UartError> {
        if buf.is_empty() {
            return Ok(0);
        }
        self.set_timeout(timeout_ms)?;

        loop {
            match self.port.read(buf) {
                // A tty reads 0 only once the other end has gone
                Ok(0) => return Err(UartError::Disconnected),
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(uart_error(&e)),
            }
        }
    }
}
