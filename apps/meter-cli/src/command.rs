//! Keyboard commands read from stdin.

use std::str::FromStr;

use crate::error::CliError;

/// One line of operator input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliCommand {
    /// Start or stop the meter.
    Toggle,

    /// End the trip and zero the counters.
    Reset,

    /// Leave the program.
    Quit,
}

impl FromStr for CliCommand {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "t" | "s" | "toggle" | "start" | "stop" => Ok(CliCommand::Toggle),
            "r" | "reset" => Ok(CliCommand::Reset),
            "q" | "quit" | "exit" => Ok(CliCommand::Quit),
            other => Err(CliError::UnknownCommand(other.to_string())),
        }
    }
}

/// Help text printed at startup and on unknown input.
pub const HELP: &str = "Commands: [t]oggle (start/stop), [r]eset, [q]uit";
