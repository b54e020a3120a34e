//! Dispatcher applying a `Command` to a `Session`.
//!
//! Sub-modules:
//! * `insert` - terminator placement, empty-line deletion, newline step
//! * `toggle` - enable / auto-newline flags

use anyhow::Result;
use tracing::debug;

use crate::{Command, Session};

pub mod insert;
pub mod toggle;

/// Result of dispatching a single `Command`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchResult {
    /// Buffer text or cursors changed.
    pub dirty: bool,
    /// A setting flipped; the host should persist it and refresh the status item.
    pub settings_changed: bool,
}

impl DispatchResult {
    pub fn dirty() -> Self {
        Self {
            dirty: true,
            settings_changed: false,
        }
    }
    pub fn clean() -> Self {
        Self {
            dirty: false,
            settings_changed: false,
        }
    }
    pub fn settings_changed() -> Self {
        Self {
            dirty: false,
            settings_changed: true,
        }
    }
}

/// Apply `command` to `session`.
///
/// An insert that cannot be applied (read-only buffer) returns the error and
/// leaves the session untouched.
pub fn dispatch(command: Command, session: &mut Session) -> Result<DispatchResult> {
    debug!(target: "actions", command = command.id(), "dispatch");
    match command {
        Command::Insert => {
            let rule = session.rule();
            let outcome = insert::insert_terminator(
                &mut session.buffer,
                &session.cursors,
                rule.as_deref(),
                &session.settings,
            )?;
            session.cursors = outcome.cursors;
            Ok(DispatchResult::dirty())
        }
        Command::Toggle => {
            toggle::toggle_enable(&mut session.settings);
            Ok(DispatchResult::settings_changed())
        }
        Command::ToggleAutoNewline => {
            toggle::toggle_auto_newline(&mut session.settings);
            Ok(DispatchResult::settings_changed())
        }
    }
}
