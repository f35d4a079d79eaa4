//! Commands that must run in the shell process itself.

use std::ffi::{OsStr, OsString};
use std::path::Path;

use crate::error::report;
use crate::{EXIT_FAILURE, EXIT_SUCCESS};

pub const CHANGE_DIRECTORY: &str = "cd";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    ChangeDirectory,
}

pub fn lookup(name: &OsStr) -> Option<Builtin> {
    if name == CHANGE_DIRECTORY {
        Some(Builtin::ChangeDirectory)
    } else {
        None
    }
}

/// Run a builtin inline and return its exit status.
pub fn execute(builtin: Builtin, argv: &[OsString]) -> i32 {
    match builtin {
        Builtin::ChangeDirectory => change_directory(argv),
    }
}

/// `cd <path>`: exactly one argument after the command name.
pub fn change_directory(argv: &[OsString]) -> i32 {
    let [_, target] = argv else {
        report("cd: bad arguments");
        return EXIT_FAILURE;
    };

    match nix::unistd::chdir(target.as_os_str()) {
        Ok(()) => EXIT_SUCCESS,
        Err(_) => {
            report(&format!(
                "cd: cannot change directory to {}",
                Path::new(target).display()
            ));
            EXIT_FAILURE
        }
    }
}
