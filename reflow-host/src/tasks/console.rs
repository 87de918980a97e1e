//! Operator console
//!
//! Reads commands from stdin on a dedicated OS thread (stdin has no async
//! interface on the std executor) and forwards them as intents.
//!
//! ```text
//! connect <port>    open the oven link (`fake` for the simulator)
//! select <profile>  choose the profile for the next run
//! start             begin the run
//! manual <°C> <%>   hold a temperature with the heater capped at <%>
//! stop              abort the run, heater off
//! ack               acknowledge a fault
//! quit              stop and exit
//! ```

use std::io::{self, BufRead};
use std::thread;

use log::{debug, info, warn};
use thiserror::Error;

use reflow_core::state::Intent;

use crate::channels::{INTENT_CHANNEL, SHUTDOWN};

const HELP: &str =
    "commands: connect <port> | select <profile> | start | manual <°C> <%> | stop | ack | quit | help";

/// A parsed console line
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    Intent(Intent),
    Help,
    Quit,
}

/// Why a console line was not understood
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command `{0}`")]
    Unknown(String),
    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),
    #[error("`{0}` takes no argument")]
    UnexpectedArgument(&'static str),
    #[error("argument to `{0}` is too long")]
    TooLong(&'static str),
    #[error("`{0}` needs numbers")]
    NotANumber(&'static str),
}

/// Parse one console line
pub fn parse_command(line: &str) -> Result<ConsoleCommand, CommandError> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match word.to_ascii_lowercase().as_str() {
        "" => Err(CommandError::Empty),
        "connect" => {
            let port = argument("connect", rest)?;
            Intent::connect(port)
                .map(ConsoleCommand::Intent)
                .ok_or(CommandError::TooLong("connect"))
        }
        "select" => {
            let name = argument("select", rest)?;
            Intent::select_profile(name)
                .map(ConsoleCommand::Intent)
                .ok_or(CommandError::TooLong("select"))
        }
        "start" => bare("start", rest, ConsoleCommand::Intent(Intent::Start)),
        "manual" => {
            let (target, cap) = argument("manual", rest)?
                .split_once(char::is_whitespace)
                .ok_or(CommandError::MissingArgument("manual"))?;
            let target_c = number("manual", target)?;
            let max_percent = number("manual", cap.trim())?;
            Ok(ConsoleCommand::Intent(Intent::manual(target_c, max_percent)))
        }
        "stop" => bare("stop", rest, ConsoleCommand::Intent(Intent::Stop)),
        "ack" => bare("ack", rest, ConsoleCommand::Intent(Intent::AcknowledgeFault)),
        "help" | "?" => Ok(ConsoleCommand::Help),
        "quit" | "exit" => Ok(ConsoleCommand::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

fn argument<'a>(command: &'static str, rest: &'a str) -> Result<&'a str, CommandError> {
    if rest.is_empty() {
        Err(CommandError::MissingArgument(command))
    } else {
        Ok(rest)
    }
}

fn number(command: &'static str, text: &str) -> Result<f32, CommandError> {
    text.parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or(CommandError::NotANumber(command))
}

fn bare(
    command: &'static str,
    rest: &str,
    parsed: ConsoleCommand,
) -> Result<ConsoleCommand, CommandError> {
    if rest.is_empty() {
        Ok(parsed)
    } else {
        Err(CommandError::UnexpectedArgument(command))
    }
}

/// Start the stdin reader thread
pub fn spawn() -> io::Result<()> {
    thread::Builder::new()
        .name("console".into())
        .spawn(console_loop)?;
    Ok(())
}

fn console_loop() {
    info!("Console ready ({})", HELP);
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("Console read failed: {}", e);
                break;
            }
        };

        match parse_command(&line) {
            Ok(ConsoleCommand::Intent(intent)) => {
                if let Err(e) = INTENT_CHANNEL.try_send(intent) {
                    warn!("Intent channel full, dropping {:?}", e);
                }
            }
            Ok(ConsoleCommand::Help) => info!("{}", HELP),
            Ok(ConsoleCommand::Quit) => {
                SHUTDOWN.signal(());
                return;
            }
            Err(CommandError::Empty) => {}
            Err(e) => warn!("{} ({})", e, HELP),
        }
    }
    debug!("Console input closed");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_intents() {
        assert_eq!(
            parse_command("connect /dev/ttyUSB0"),
            Ok(ConsoleCommand::Intent(Intent::connect("/dev/ttyUSB0").unwrap()))
        );
        assert_eq!(
            parse_command("  select   lead-free "),
            Ok(ConsoleCommand::Intent(Intent::select_profile("lead-free").unwrap()))
        );
        assert_eq!(
            parse_command("START"),
            Ok(ConsoleCommand::Intent(Intent::Start))
        );
        assert_eq!(parse_command("stop"), Ok(ConsoleCommand::Intent(Intent::Stop)));
        assert_eq!(
            parse_command("ack"),
            Ok(ConsoleCommand::Intent(Intent::AcknowledgeFault))
        );
        assert_eq!(parse_command("quit"), Ok(ConsoleCommand::Quit));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_command("   "), Err(CommandError::Empty));
        assert_eq!(
            parse_command("connect"),
            Err(CommandError::MissingArgument("connect"))
        );
        assert_eq!(
            parse_command("start now"),
            Err(CommandError::UnexpectedArgument("start"))
        );
        assert_eq!(
            parse_command("heat 100"),
            Err(CommandError::Unknown("heat".to_string()))
        );
    }

    #[test]
    fn test_parse_manual() {
        assert_eq!(
            parse_command("manual 150 60"),
            Ok(ConsoleCommand::Intent(Intent::manual(150.0, 60.0)))
        );
        assert_eq!(
            parse_command("manual 150"),
            Err(CommandError::MissingArgument("manual"))
        );
        assert_eq!(
            parse_command("manual hot 60"),
            Err(CommandError::NotANumber("manual"))
        );
        assert_eq!(
            parse_command("manual 150 inf"),
            Err(CommandError::NotANumber("manual"))
        );
    }

    #[test]
    fn test_over_long_profile_name() {
        let long = "x".repeat(40);
        assert_eq!(
            parse_command(&format!("select {}", long)),
            Err(CommandError::TooLong("select"))
        );
    }
}
