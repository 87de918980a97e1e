//! Line framing for the oven protocol.
//!
//! Line format:
//! - Printable ASCII payload (at most `MAX_LINE_LEN` bytes)
//! - Terminated by CR, LF, or CRLF
//!
//! Empty lines (the LF of a CRLF pair, keep-alive newlines) are skipped.

use core::fmt;

use heapless::{String, Vec};

/// Maximum payload length of a single line
pub const MAX_LINE_LEN: usize = 64;

/// A complete received line, terminator stripped
pub type Line = String<MAX_LINE_LEN>;

const CR: u8 = b'\r';
const LF: u8 = b'\n';

/// Errors that can occur while framing or decoding lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineError {
    /// Line exceeded `MAX_LINE_LEN` before its terminator
    LineTooLong,
    /// Line contained bytes that are not valid UTF-8
    InvalidUtf8,
    /// Line looked like a known reply but its value did not parse
    Malformed,
    /// Command argument outside its allowed range
    ValueOutOfRange,
    /// Output buffer too small for encoding
    BufferTooSmall,
}

impl fmt::Display for LineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineError::LineTooLong => f.write_str("line too long"),
            LineError::InvalidUtf8 => f.write_str("line is not valid UTF-8"),
            LineError::Malformed => f.write_str("malformed reply"),
            LineError::ValueOutOfRange => f.write_str("command value out of range"),
            LineError::BufferTooSmall => f.write_str("buffer too small"),
        }
    }
}

impl core::error::Error for LineError {}

/// Incremental line splitter
///
/// Bytes are fed one at a time as they come off the serial port. An
/// over-long line is discarded up to its terminator and reported once.
#[derive(Debug, Clone, Default)]
pub struct LineParser {
    buffer: Vec<u8, MAX_LINE_LEN>,
    overflowed: bool,
}

impl LineParser {
    /// Create a new line parser
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            overflowed: false,
        }
    }

    /// Drop any partially received line
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.overflowed = false;
    }

    /// Feed a single byte to the parser
    ///
    /// Returns `Ok(Some(line))` when a terminator completes a non-empty line,
    /// `Ok(None)` when more bytes are needed, or `Err` for a line that had
    /// to be discarded.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Line>, LineError> {
        match byte {
            CR | LF => self.finish(),
            _ if self.overflowed => Ok(None),
            _ => {
                if self.buffer.push(byte).is_err() {
                    self.overflowed = true;
                }
                Ok(None)
            }
        }
    }

    /// Feed multiple bytes to the parser
    ///
    /// Returns the first complete line found together with the number of
    /// bytes consumed. Bytes after that line are left for the next call.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> (usize, Result<Option<Line>, LineError>) {
        for (index, &byte) in bytes.iter().enumerate() {
            match self.feed(byte) {
                Ok(None) => {}
                other => return (index + 1, other),
            }
        }
        (bytes.len(), Ok(None))
    }

    fn finish(&mut self) -> Result<Option<Line>, LineError> {
        if self.overflowed {
            self.reset();
            return Err(LineError::LineTooLong);
        }
        if self.buffer.is_empty() {
            return Ok(None);
        }

        let result = core::str::from_utf8(&self.buffer)
            .map_err(|_| LineError::InvalidUtf8)
            .and_then(|text| {
                let mut line = Line::new();
                line.push_str(text).map_err(|_| LineError::LineTooLong)?;
                Ok(Some(line))
            });

        self.reset();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crlf_yields_single_line() {
        let mut parser = LineParser::new();
        let (used, line) = parser.feed_bytes(b"+25.00C\r\n");
        assert_eq!(used, 8);
        assert_eq!(line.unwrap().unwrap().as_str(), "+25.00C");

        // The trailing LF is an empty line and is skipped
        let (used, line) = parser.feed_bytes(b"\n");
        assert_eq!(used, 1);
        assert_eq!(line, Ok(None));
    }

    #[test]
    fn test_partial_line_waits_for_terminator() {
        let mut parser = LineParser::new();
        assert_eq!(parser.feed_bytes(b"sh").1, Ok(None));
        let (_, line) = parser.feed_bytes(b"ot\n");
        assert_eq!(line.unwrap().unwrap().as_str(), "shot");
    }

    #[test]
    fn test_leaves_remaining_bytes() {
        let mut parser = LineParser::new();
        let data = b"shot\n+30.5C\n";
        let (used, first) = parser.feed_bytes(data);
        assert_eq!(first.unwrap().unwrap().as_str(), "shot");

        let (_, second) = parser.feed_bytes(&data[used..]);
        assert_eq!(second.unwrap().unwrap().as_str(), "+30.5C");
    }

    #[test]
    fn test_overlong_line_is_discarded_once() {
        let mut parser = LineParser::new();
        for _ in 0..(MAX_LINE_LEN + 10) {
            assert_eq!(parser.feed(b'x'), Ok(None));
        }
        assert_eq!(parser.feed(b'\n'), Err(LineError::LineTooLong));

        // Parser recovers for the next line
        let (_, line) = parser.feed_bytes(b"+20.0C\n");
        assert_eq!(line.unwrap().unwrap().as_str(), "+20.0C");
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        let mut parser = LineParser::new();
        let (_, line) = parser.feed_bytes(&[0xFF, 0xFE, b'\n']);
        assert_eq!(line, Err(LineError::InvalidUtf8));
    }
}
