//! Descriptor hand-off between consecutive stages.
//!
//! The only state carried from one stage to the next is the read end of the
//! previous stage's pipe. Every descriptor here is an `OwnedFd` and is closed
//! explicitly through [`close_fd`] so that close failures surface as errors
//! instead of being swallowed by `Drop`.

use std::os::fd::{IntoRawFd, OwnedFd};

use crate::error::FatalError;

/// Retry a system call while it fails with `EINTR`.
pub(crate) fn syscall<F, T>(f: F) -> Result<T, nix::Error>
where
    F: Fn() -> Result<T, nix::Error>,
{
    loop {
        match f() {
            Err(nix::Error::EINTR) => (),
            result => return result,
        }
    }
}

/// Open a pipe, returning `(read, write)`.
pub fn open_pipe() -> Result<(OwnedFd, OwnedFd), FatalError> {
    syscall(nix::unistd::pipe).map_err(FatalError::Pipe)
}

/// Close a descriptor, reporting failure.
pub fn close_fd(fd: OwnedFd) -> Result<(), FatalError> {
    // EINTR is not retried: on Linux the descriptor is gone either way.
    nix::unistd::close(fd.into_raw_fd()).map_err(FatalError::Close)
}

/// Read end of the previous stage's pipe, waiting to become the next stage's
/// standard input.
#[derive(Debug, Default)]
pub struct Link(Option<OwnedFd>);

impl Link {
    pub fn none() -> Self {
        Self(None)
    }

    pub fn is_open(&self) -> bool {
        self.0.is_some()
    }

    /// Hand the carried read end to its consumer.
    pub fn take(&mut self) -> Option<OwnedFd> {
        self.0.take()
    }

    /// Carry `fd` into the next stage, closing whatever was carried before.
    pub fn replace(&mut self, fd: Option<OwnedFd>) -> Result<(), FatalError> {
        self.reset()?;
        self.0 = fd;
        Ok(())
    }

    /// Close the carried read end, if any.
    pub fn reset(&mut self) -> Result<(), FatalError> {
        match self.0.take() {
            Some(fd) => close_fd(fd),
            None => Ok(()),
        }
    }
}

/// Descriptors one stage is launched with.
#[derive(Debug, Default)]
pub struct StageFds {
    /// Becomes the child's fd 0.
    pub stdin: Option<OwnedFd>,
    /// Becomes the child's fd 1.
    pub stdout: Option<OwnedFd>,
    /// Read end of the new pipe. The child closes it; the parent keeps it as
    /// the next link.
    pub next_link: Option<OwnedFd>,
}

impl StageFds {
    /// Release everything the parent no longer needs after the fork and hand
    /// back the next link.
    pub fn release_in_parent(self) -> Result<Option<OwnedFd>, FatalError> {
        let StageFds {
            stdin,
            stdout,
            next_link,
        } = self;
        if let Some(fd) = stdin {
            close_fd(fd)?;
        }
        if let Some(fd) = stdout {
            close_fd(fd)?;
        }
        Ok(next_link)
    }
}

/// Consume the current link and, when this stage feeds another, open the pipe
/// towards it.
pub fn prepare(link: &mut Link, piped: bool) -> Result<StageFds, FatalError> {
    let stdin = link.take();
    let (next_link, stdout) = if piped {
        let (read, write) = open_pipe()?;
        (Some(read), Some(write))
    } else {
        (None, None)
    };
    Ok(StageFds {
        stdin,
        stdout,
        next_link,
    })
}

/// A read end that is already at end-of-file, for the stage after a piped
/// builtin.
pub fn exhausted_input() -> Result<OwnedFd, FatalError> {
    let (read, write) = open_pipe()?;
    close_fd(write)?;
    Ok(read)
}
