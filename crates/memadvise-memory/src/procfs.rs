use std::io;
use std::path::PathBuf;

use crate::eligibility::eligible_regions;
use crate::region::{parse_maps_line, MemoryRegion};
use crate::stats::{parse_smaps_rollup, parse_status, MemoryStats};

/// Errors produced while reading a process's procfs entries.
#[derive(Debug, thiserror::Error)]
pub enum InspectError {
    #[error("process {pid} does not exist or is not accessible")]
    NotFound { pid: i32 },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Read-only view of a procfs mount.
///
/// Production code uses [`ProcFs::default`] (`/proc`); tests point
/// [`ProcFs::with_root`] at a directory of fixture files laid out like
/// `<root>/<pid>/maps`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcFs {
    root: PathBuf,
}

impl Default for ProcFs {
    fn default() -> Self {
        Self::with_root("/proc")
    }
}

impl ProcFs {
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn pid_dir(&self, pid: i32) -> PathBuf {
        self.root.join(pid.to_string())
    }

    /// Whether `<root>/<pid>` is currently visible to the caller.
    pub fn pid_exists(&self, pid: i32) -> bool {
        std::fs::metadata(self.pid_dir(pid)).is_ok()
    }

    fn read(&self, pid: i32, file: &str) -> Result<String, InspectError> {
        let path = self.pid_dir(pid).join(file);
        std::fs::read_to_string(&path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound && !self.pid_exists(pid) {
                InspectError::NotFound { pid }
            } else {
                InspectError::Io { path, source }
            }
        })
    }

    /// Snapshot the process's aggregate memory usage.
    ///
    /// Prefers `smaps_rollup`; when it cannot be read (older kernels, or
    /// restricted access) falls back to the coarser `status` file.
    pub fn memory_stats(&self, pid: i32) -> Result<MemoryStats, InspectError> {
        match self.read(pid, "smaps_rollup") {
            Ok(contents) => Ok(parse_smaps_rollup(&contents)),
            Err(InspectError::NotFound { pid }) => Err(InspectError::NotFound { pid }),
            Err(err) => {
                tracing::debug!(
                    target = "memadvise.memory",
                    pid,
                    error = %err,
                    "smaps_rollup unavailable; falling back to status"
                );
                let contents = self.read(pid, "status")?;
                Ok(parse_status(&contents))
            }
        }
    }

    /// Every parseable mapping of the process, in address order.
    ///
    /// Lines that fail to parse are skipped; the scan is best-effort.
    pub fn memory_regions(&self, pid: i32) -> Result<Vec<MemoryRegion>, InspectError> {
        let contents = self.read(pid, "maps")?;
        let regions = contents
            .lines()
            .filter_map(|line| match parse_maps_line(line) {
                Ok(region) => Some(region),
                Err(err) => {
                    tracing::trace!(
                        target = "memadvise.memory",
                        pid,
                        line,
                        error = %err,
                        "skipping unparseable maps line"
                    );
                    None
                }
            })
            .collect();
        Ok(regions)
    }

    /// Mappings of the process that are safe advisory targets.
    pub fn eligible_regions(&self, pid: i32) -> Result<Vec<MemoryRegion>, InspectError> {
        let regions = self.memory_regions(pid)?;
        let total = regions.len();
        let eligible = eligible_regions(regions);
        tracing::debug!(
            target = "memadvise.memory",
            pid,
            total,
            eligible = eligible.len(),
            "scanned memory map"
        );
        Ok(eligible)
    }
}
