//! Message types for the oven protocol
//!
//! Message types are divided into two categories:
//! - Host → Oven: mode, reporting and heater commands
//! - Oven → Host: temperature reports and pulse completion

use core::fmt::Write;

use heapless::String;

use crate::line::{LineError, MAX_LINE_LEN};

/// Longest encoded command including its newline
pub const MAX_COMMAND_LEN: usize = 16;

/// Highest heater intensity the board accepts (percent)
pub const MAX_SHOT_PERCENT: u8 = 100;

const CMD_MANUAL: &str = "manual";
const CMD_TEMP_SHOW: &str = "tempshow";
const CMD_SHOT: &str = "shot";

/// Commands from the host to the oven
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OvenCommand {
    /// Enable or disable manual (host-driven) heating
    Manual(bool),
    /// Request a single temperature report
    TempShow,
    /// Report temperature every N seconds (0 stops periodic reports)
    TempShowEvery(u8),
    /// Fire the heater at the given percentage for one pulse
    Shot(u8),
}

impl OvenCommand {
    /// Encode this command as a newline-terminated ASCII line
    pub fn encode(&self) -> Result<String<MAX_COMMAND_LEN>, LineError> {
        let mut out = String::new();
        let written = match self {
            OvenCommand::Manual(enable) => {
                write!(out, "{} {}\n", CMD_MANUAL, if *enable { 1 } else { 0 })
            }
            OvenCommand::TempShow => write!(out, "{}\n", CMD_TEMP_SHOW),
            OvenCommand::TempShowEvery(seconds) => write!(out, "{} {}\n", CMD_TEMP_SHOW, seconds),
            OvenCommand::Shot(percent) => {
                if *percent > MAX_SHOT_PERCENT {
                    return Err(LineError::ValueOutOfRange);
                }
                write!(out, "{} {}\n", CMD_SHOT, percent)
            }
        };
        written.map_err(|_| LineError::BufferTooSmall)?;
        Ok(out)
    }
}

/// Replies parsed from oven-originated lines
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OvenReply {
    /// Temperature report in degrees Celsius
    Temperature(f32),
    /// The heater pulse requested by the last `shot` has ended
    ShotComplete,
    /// Anything else the board prints (banners, echoes)
    Unknown,
}

impl OvenReply {
    /// Parse a reply from a received line
    ///
    /// Lines that match no known reply are `Unknown`, not an error. A line
    /// shaped like a temperature report whose number does not parse is
    /// [`LineError::Malformed`].
    pub fn parse(line: &str) -> Result<Self, LineError> {
        let mut compact: String<MAX_LINE_LEN> = String::new();
        for c in line.chars().filter(|c| *c != ' ') {
            compact.push(c).map_err(|_| LineError::LineTooLong)?;
        }
        let text = compact.as_str();

        if text == CMD_SHOT {
            return Ok(OvenReply::ShotComplete);
        }

        if text.contains(',') {
            return Self::parse_long_form(text);
        }

        match text.strip_suffix('C') {
            Some(value) if is_signed(value) => parse_celsius(value),
            _ => Ok(OvenReply::Unknown),
        }
    }

    /// `name,counter,+183.25,C`
    fn parse_long_form(text: &str) -> Result<Self, LineError> {
        let mut fields = text.split(',');
        let (Some(name), Some(counter), Some(value), Some(unit), None) = (
            fields.next(),
            fields.next(),
            fields.next(),
            fields.next(),
            fields.next(),
        ) else {
            return Ok(OvenReply::Unknown);
        };

        let shaped = !name.is_empty()
            && name.chars().all(|c| c.is_ascii_alphanumeric())
            && !counter.is_empty()
            && counter.chars().all(|c| c.is_ascii_digit())
            && unit == "C"
            && is_signed(value);

        if shaped {
            parse_celsius(value)
        } else {
            Ok(OvenReply::Unknown)
        }
    }
}

fn is_signed(value: &str) -> bool {
    value.starts_with('+') || value.starts_with('-')
}

fn parse_celsius(value: &str) -> Result<OvenReply, LineError> {
    value
        .parse::<f32>()
        .ok()
        .filter(|celsius| celsius.is_finite())
        .map(OvenReply::Temperature)
        .ok_or(LineError::Malformed)
}
