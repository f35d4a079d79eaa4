use std::ffi::OsString;

use crate::builtin::{self, Builtin};

/// How a segment gets dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// No tokens; nothing runs and the exit status stays as it was.
    Empty,
    Builtin(Builtin),
    External,
}

/// Decide from the first token alone.
pub fn classify(argv: &[OsString]) -> CommandKind {
    match argv.first() {
        None => CommandKind::Empty,
        Some(name) => match builtin::lookup(name) {
            Some(b) => CommandKind::Builtin(b),
            None => CommandKind::External,
        },
    }
}
