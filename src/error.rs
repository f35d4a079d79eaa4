use std::fmt;
use std::io::{self, Write};

/// Prefix of every diagnostic line the shell writes itself.
pub const DIAG_PREFIX: &str = "error: ";

/// OS-level failures that end the whole invocation.
#[derive(Debug)]
pub enum FatalError {
    Pipe(nix::Error),
    Fork(nix::Error),
    Dup(nix::Error),
    Close(nix::Error),
    Wait(nix::Error),
}

impl fmt::Display for FatalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FatalError::Pipe(e) => write!(f, "pipe: {}", e),
            FatalError::Fork(e) => write!(f, "fork: {}", e),
            FatalError::Dup(e) => write!(f, "dup2: {}", e),
            FatalError::Close(e) => write!(f, "close: {}", e),
            FatalError::Wait(e) => write!(f, "waitpid: {}", e),
        }
    }
}

impl std::error::Error for FatalError {}

/// Write one `error: <message>` line to stderr.
///
/// The line goes out in a single write so concurrent stages don't interleave
/// inside it.
pub fn report(message: &str) {
    let line = format!("{}{}\n", DIAG_PREFIX, message);
    let _ = io::stderr().write_all(line.as_bytes());
}

pub fn report_fatal() {
    report("fatal");
}
