//! Launching one external stage: fork, wire fds 0/1 in the child, execve.

use std::ffi::{CString, OsStr, OsString};
use std::os::fd::{AsRawFd, IntoRawFd, OwnedFd, RawFd};
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use nix::sys::signal::{signal, SigHandler, Signal};
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::{dup2, execve, fork, ForkResult, Pid};

use crate::error::{report, report_fatal, FatalError};
use crate::pipeline::link::{close_fd, syscall};
use crate::pipeline::StageFds;
use crate::EXIT_FAILURE;

/// `KEY=VALUE` entries handed to every child unchanged.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    vars: Vec<CString>,
}

impl Environment {
    /// Snapshot of the current process environment.
    pub fn from_process() -> Self {
        Self::from_pairs(std::env::vars_os())
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<OsStr>,
        V: AsRef<OsStr>,
    {
        let vars = pairs
            .into_iter()
            .filter_map(|(k, v)| {
                let mut entry = k.as_ref().as_bytes().to_vec();
                entry.push(b'=');
                entry.extend_from_slice(v.as_ref().as_bytes());
                CString::new(entry).ok()
            })
            .collect();
        Self { vars }
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn as_slice(&self) -> &[CString] {
        &self.vars
    }
}

/// Convert an argument vector for execve. `None` if any argument holds a NUL
/// byte, which makes the program unloadable.
fn to_exec_args(argv: &[OsString]) -> Option<Vec<CString>> {
    argv.iter()
        .map(|a| CString::new(a.as_bytes()).ok())
        .collect()
}

/// Fork and start `argv[0]` with the given descriptors.
///
/// Returns the child's pid and the read end to carry into the next stage.
/// The child is not waited for; see [`wait_for`].
pub fn spawn(
    argv: &[OsString],
    fds: StageFds,
    env: &Environment,
) -> Result<(Pid, Option<OwnedFd>), FatalError> {
    // Built before the fork so the child only has to call execve.
    let exec_args = to_exec_args(argv);

    match syscall(|| unsafe { fork() }).map_err(FatalError::Fork)? {
        ForkResult::Child => run_in_child(argv, exec_args.as_deref(), fds, env),
        ForkResult::Parent { child } => {
            let next_link = run_in_parent(fds)?;
            Ok((child, next_link))
        }
    }
}

/// Child side of [`spawn`]. Never returns.
fn run_in_child(
    argv: &[OsString],
    exec_args: Option<&[CString]>,
    fds: StageFds,
    env: &Environment,
) -> ! {
    if wire_child(fds).is_err() {
        report_fatal();
        unsafe { libc::_exit(EXIT_FAILURE) }
    }

    // The Rust runtime ignores SIGPIPE and an ignored disposition survives
    // execve. Writers must die when their reader goes away.
    unsafe {
        let _ = signal(Signal::SIGPIPE, SigHandler::SigDfl);
    }

    if let Some(args) = exec_args {
        if let Some(program) = args.first() {
            let _ = execve(program, args, env.as_slice());
        }
    }

    let name = argv.first().map(OsString::as_os_str).unwrap_or_default();
    report(&format!("cannot execute {}", Path::new(name).display()));
    unsafe { libc::_exit(EXIT_FAILURE) }
}

/// Put the stage's pipe ends on fds 0 and 1 and close every original, so the
/// canonical numbers are the only live copies in the child.
fn wire_child(fds: StageFds) -> Result<(), FatalError> {
    let StageFds {
        stdin,
        stdout,
        next_link,
    } = fds;
    // Read end of the outgoing pipe belongs to the next stage, not this one.
    // Closing it first also keeps it from being clobbered by the dup2s below.
    if let Some(fd) = next_link {
        close_fd(fd)?;
    }
    if let Some(fd) = stdin {
        redirect(fd, libc::STDIN_FILENO)?;
    }
    if let Some(fd) = stdout {
        redirect(fd, libc::STDOUT_FILENO)?;
    }
    Ok(())
}

fn redirect(fd: OwnedFd, target: RawFd) -> Result<(), FatalError> {
    if fd.as_raw_fd() == target {
        // Already in place; closing it would undo the redirection.
        let _ = fd.into_raw_fd();
        return Ok(());
    }
    syscall(|| dup2(fd.as_raw_fd(), target)).map_err(FatalError::Dup)?;
    close_fd(fd)
}

/// Parent side of [`spawn`]: drop the previous read end and the new write end.
fn run_in_parent(fds: StageFds) -> Result<Option<OwnedFd>, FatalError> {
    fds.release_in_parent()
}

/// Block until `pid` terminates and translate how it ended.
///
/// Normal exit gives the program's own code; anything else is
/// [`EXIT_FAILURE`].
pub fn wait_for(pid: Pid) -> Result<i32, FatalError> {
    match syscall(|| waitpid(pid, None)).map_err(FatalError::Wait)? {
        WaitStatus::Exited(_, code) => Ok(code),
        _ => Ok(EXIT_FAILURE),
    }
}
