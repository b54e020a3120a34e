//! Editor-facing commands built on the analysis engine.
//!
//! Hosts resolve a command id to a `Command`, then `dispatch` it against a
//! `Session`. Everything below the dispatcher is also public so a host with its
//! own buffer model can call `plan_insert` directly.

use std::{fmt, str::FromStr};
use thiserror::Error;

pub mod dispatcher;
pub mod session;
pub mod status;

pub use dispatcher::insert::{
    CursorAction, CursorStep, InsertOutcome, InsertPlan, insert_terminator, plan_insert,
};
pub use dispatcher::toggle::{toggle_auto_newline, toggle_enable};
pub use dispatcher::{DispatchResult, dispatch};
pub use session::Session;
pub use status::{STATUS_LABEL, status_text};

/// Commands exposed to the host under stable ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Insert,
    Toggle,
    ToggleAutoNewline,
}

impl Command {
    pub const ALL: [Command; 3] = [Command::Insert, Command::Toggle, Command::ToggleAutoNewline];

    pub fn id(self) -> &'static str {
        match self {
            Command::Insert => "smartsemicolon.insert",
            Command::Toggle => "smartsemicolon.toggle",
            Command::ToggleAutoNewline => "smartsemicolon.toggleAutoNewline",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown command id: {0}")]
pub struct UnknownCommand(pub String);

impl FromStr for Command {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Command::ALL
            .into_iter()
            .find(|c| c.id() == s)
            .ok_or_else(|| UnknownCommand(s.to_string()))
    }
}
