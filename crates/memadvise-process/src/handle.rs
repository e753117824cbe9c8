use std::fmt;
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, OwnedFd, RawFd};

use memadvise_memory::ProcFs;

use crate::error::ProcessError;
use crate::sys;

/// Whether `/proc/<pid>` is currently visible to the caller.
pub fn pid_exists(pid: i32) -> bool {
    pid > 0 && ProcFs::default().pid_exists(pid)
}

/// A pidfd bound to one process instance.
///
/// Unlike a bare pid, the handle keeps referring to the same process even if
/// it exits and the pid number is recycled; operations against a dead process
/// fail with `ESRCH` instead of silently hitting a stranger. The descriptor is
/// closed when the handle is dropped.
pub struct ProcessHandle {
    pid: i32,
    fd: OwnedFd,
}

impl ProcessHandle {
    /// Acquire a pidfd for `pid`.
    ///
    /// The `/proc` existence check narrows, but cannot close, the window in
    /// which the process may exit before `pidfd_open` runs; that case surfaces
    /// as [`ProcessError::Syscall`] with `ESRCH`.
    pub fn open(pid: i32) -> Result<Self, ProcessError> {
        if !pid_exists(pid) {
            return Err(ProcessError::NotFound { pid });
        }

        let fd = sys::pidfd_open(pid).map_err(|err| ProcessError::syscall("pidfd_open", pid, err))?;
        tracing::debug!(target: "memadvise.process", pid, fd = fd.as_raw_fd(), "opened pidfd");
        Ok(Self { pid, fd })
    }

    pub fn pid(&self) -> i32 {
        self.pid
    }
}

impl AsFd for ProcessHandle {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.fd.as_fd()
    }
}

impl AsRawFd for ProcessHandle {
    fn as_raw_fd(&self) -> RawFd {
        self.fd.as_raw_fd()
    }
}

impl fmt::Debug for ProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessHandle")
            .field("pid", &self.pid)
            .field("fd", &self.fd.as_raw_fd())
            .finish()
    }
}
