use std::fmt;
use std::os::fd::AsFd;
use std::str::FromStr;

use memadvise_memory::MemoryRegion;

use crate::error::ProcessError;
use crate::handle::ProcessHandle;
use crate::sys;

/// `MADV_COLD`: deactivate pages so they are reclaimed first under pressure.
pub const MADV_COLD: i32 = 20;
/// `MADV_PAGEOUT`: reclaim pages immediately, swapping dirty anonymous data.
pub const MADV_PAGEOUT: i32 = 21;

/// Advisory strength passed to `process_madvise(2)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdviceMode {
    Cold,
    Pageout,
}

impl AdviceMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cold => "cold",
            Self::Pageout => "pageout",
        }
    }

    /// Kernel `advice` argument for this mode.
    pub fn advice(self) -> i32 {
        match self {
            Self::Cold => MADV_COLD,
            Self::Pageout => MADV_PAGEOUT,
        }
    }
}

impl FromStr for AdviceMode {
    type Err = ProcessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cold" => Ok(Self::Cold),
            "pageout" => Ok(Self::Pageout),
            other => Err(ProcessError::InvalidMode {
                mode: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for AdviceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `(base, len)` entry of an advisory request, in the target's address
/// space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdviseRange {
    pub base: u64,
    pub len: u64,
}

impl From<&MemoryRegion> for AdviseRange {
    fn from(region: &MemoryRegion) -> Self {
        Self {
            base: region.start,
            len: region.end - region.start,
        }
    }
}

/// Advise every range in a single `process_madvise(2)` call.
///
/// The return value is the kernel's own count of advised bytes, passed
/// through unchanged; it may be smaller than the sum of `ranges` if the
/// target remapped memory since it was scanned.
pub fn process_madvise(
    handle: &ProcessHandle,
    ranges: &[AdviseRange],
    mode: AdviceMode,
) -> Result<u64, ProcessError> {
    if ranges.is_empty() {
        return Err(ProcessError::EmptyRequest);
    }

    let advised = sys::process_madvise(handle.as_fd(), ranges, mode.advice())
        .map_err(|err| ProcessError::syscall("process_madvise", handle.pid(), err))?;

    tracing::debug!(
        target: "memadvise.process",
        pid = handle.pid(),
        %mode,
        ranges = ranges.len(),
        advised,
        "process_madvise completed"
    );
    Ok(advised)
}

/// Open a pidfd for `pid`, advise `ranges`, and close the pidfd again.
pub fn advise_regions(
    pid: i32,
    ranges: &[AdviseRange],
    mode: AdviceMode,
) -> Result<u64, ProcessError> {
    if ranges.is_empty() {
        return Err(ProcessError::EmptyRequest);
    }

    let handle = ProcessHandle::open(pid)?;
    process_madvise(&handle, ranges, mode)
}
