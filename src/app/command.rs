//! Console command parsing.
//!
//! Lines starting with `/` are commands; anything else is text for the brain.

use bionet_data::ReinforcementKind;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Plain text fed to the encoders.
    Say(String),
    Teach(String),
    Stop,
    Delegate(bool),
    Reinforce(ReinforcementKind),
    Learn,
    Freeze,
    Sleep,
    Think,
    /// Row-major retina frame, one brightness byte per cell.
    See(Vec<u8>),
    Save(Option<PathBuf>),
    Load(PathBuf),
    Stats,
    Health,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command: /{0} (try /help)")]
    Unknown(String),

    #[error("/{command} needs {what}")]
    MissingArgument {
        command: &'static str,
        what: &'static str,
    },

    #[error("invalid argument for /{command}: {value}")]
    InvalidArgument {
        command: &'static str,
        value: String,
    },
}

pub const HELP: &str = "\
/teach <topic>     start a curriculum
/stop              abandon the current curriculum
/delegate on|off   route curricula through the text generator
/reward /punish    reinforce what just fired
/learn             toggle learning mode
/freeze            pause or resume the simulation
/sleep             consolidate and rest
/think             toggle spontaneous activity
/see <cells>       show a retina frame ('#' or '1' lit, anything else dark)
/save [path]       write a snapshot (.gz compresses)
/load <path>       restore a snapshot
/stats /health     readouts
/quit              exit";

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let Some(rest) = line.strip_prefix('/') else {
            return Ok(Self::Say(line.to_string()));
        };
        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };

        match name.to_lowercase().as_str() {
            "teach" => required("teach", "a topic", arg).map(|a| Self::Teach(a.to_string())),
            "stop" => Ok(Self::Stop),
            "delegate" => match arg.to_lowercase().as_str() {
                "on" | "true" | "1" => Ok(Self::Delegate(true)),
                "off" | "false" | "0" => Ok(Self::Delegate(false)),
                "" => Err(CommandError::MissingArgument {
                    command: "delegate",
                    what: "on or off",
                }),
                _ => Err(CommandError::InvalidArgument {
                    command: "delegate",
                    value: arg.to_string(),
                }),
            },
            "reward" | "good" => Ok(Self::Reinforce(ReinforcementKind::Reward)),
            "punish" | "bad" => Ok(Self::Reinforce(ReinforcementKind::Punish)),
            "learn" => Ok(Self::Learn),
            "freeze" => Ok(Self::Freeze),
            "sleep" => Ok(Self::Sleep),
            "think" => Ok(Self::Think),
            "see" => required("see", "a frame", arg).map(|a| Self::See(parse_frame(a))),
            "save" => Ok(Self::Save((!arg.is_empty()).then(|| PathBuf::from(arg)))),
            "load" => required("load", "a path", arg).map(|a| Self::Load(PathBuf::from(a))),
            "stats" => Ok(Self::Stats),
            "health" => Ok(Self::Health),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

fn required<'a>(
    command: &'static str,
    what: &'static str,
    arg: &'a str,
) -> Result<&'a str, CommandError> {
    if arg.is_empty() {
        Err(CommandError::MissingArgument { command, what })
    } else {
        Ok(arg)
    }
}

/// `#` and `1` are lit cells; whitespace is ignored so rows can be spaced out.
fn parse_frame(cells: &str) -> Vec<u8> {
    cells
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if matches!(c, '#' | '1') { 255 } else { 0 })
        .collect()
}
