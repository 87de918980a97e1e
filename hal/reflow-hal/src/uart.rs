//! UART serial communication abstractions
//!
//! Provides blocking serial traits with bounded reads. Every receive call
//! takes a timeout so a silent device can never stall the caller past it.

use core::fmt;

/// Errors from serial operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UartError {
    /// Port could not be opened (missing, busy, permission)
    Unavailable,
    /// No data arrived (or could be written) within the timeout
    Timeout,
    /// The port went away underneath us
    Disconnected,
    /// Any other I/O failure
    Io,
}

impl fmt::Display for UartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UartError::Unavailable => f.write_str("serial port unavailable"),
            UartError::Timeout => f.write_str("serial operation timed out"),
            UartError::Disconnected => f.write_str("serial port disconnected"),
            UartError::Io => f.write_str("serial I/O error"),
        }
    }
}

impl core::error::Error for UartError {}

/// UART transmitter
pub trait UartTx {
    /// Write data to the UART
    ///
    /// Blocks until all data has been written or an error occurs.
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), UartError>;

    /// Flush any buffered data
    fn flush(&mut self) -> Result<(), UartError>;
}

/// UART receiver
pub trait UartRx {
    /// Read whatever is available into `buf`
    ///
    /// Waits at most `timeout_ms` for the first byte. Returns the number of
    /// bytes read (at least one), or [`UartError::Timeout`] if nothing
    /// arrived in time.
    fn read_timeout(&mut self, buf: &mut [u8], timeout_ms: u32) -> Result<usize, UartError>;
}

/// Combined UART interface
///
/// For UARTs that provide both TX and RX on a single peripheral.
pub trait Uart: UartTx + UartRx {}

// Blanket implementation
impl<T: UartTx + UartRx> Uart for T {}

/// Opens named serial ports
///
/// On a host the name is a device path (`/dev/ttyUSB0`, `COM3`); on a
/// microcontroller it selects one of the board's UART peripherals.
pub trait UartOpen {
    /// Port type produced by this opener
    type Port: Uart;

    /// Open `name` with the given line settings
    fn open(&mut self, name: &str, config: &UartConfig) -> Result<Self::Port, UartError>;
}

/// UART configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Number of data bits (typically 8)
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
}

impl Default for UartConfig {
    /// 9600 8N1, what the oven's controller board speaks out of the box
    fn default() -> Self {
        Self {
            baudrate: 9600,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }
}

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    Seven,
    Eight,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    One,
    Two,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_9600_8n1() {
        let config = UartConfig::default();
        assert_eq!(config.baudrate, 9600);
        assert_eq!(config.data_bits, DataBits::Eight);
        assert_eq!(config.parity, Parity::None);
        assert_eq!(config.stop_bits, StopBits::One);
    }
}
