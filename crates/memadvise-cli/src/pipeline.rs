use std::io::{self, Write};

use memadvise_memory::{calculate_budget, select_regions, InspectError, ProcFs, SelectError};
use memadvise_process::{
    advise_regions, supports_process_madvise, AdviceMode, AdviseRange, ProcessError,
};

use crate::output::OutputManager;

/// Why a single target was skipped. None of these stop the run except
/// [`ProcessError::Unsupported`] and [`TargetError::Output`].
#[derive(Debug, thiserror::Error)]
pub enum TargetError {
    #[error("process does not exist or is not accessible")]
    Missing,

    #[error("failed to inspect memory: {0}")]
    Inspect(#[from] InspectError),

    #[error("failed to select regions: {0}")]
    Select(#[from] SelectError),

    #[error("failed to execute advice: {0}")]
    Advise(#[from] ProcessError),

    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    pub percent: i64,
    pub mode: AdviceMode,
    pub max_bytes: u64,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Every target was attempted. Individual targets may still have failed.
    Completed,
    /// The kernel does not support `process_madvise`; no target was advised.
    Unsupported,
}

impl RunStatus {
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Completed => 0,
            Self::Unsupported => 1,
        }
    }
}

/// Issues the advisory call for one target.
pub type Advisor = fn(i32, &[AdviseRange], AdviceMode) -> Result<u64, ProcessError>;

/// Drives the inspect → filter → select → advise pipeline over a list of
/// targets, one at a time.
pub struct Reclaimer {
    procfs: ProcFs,
    options: RunOptions,
    probe: fn() -> bool,
    advise: Advisor,
    supported: Option<bool>,
}

impl Reclaimer {
    pub fn new(options: RunOptions) -> Self {
        Self {
            procfs: ProcFs::default(),
            options,
            probe: supports_process_madvise,
            advise: advise_regions,
            supported: None,
        }
    }

    pub fn with_procfs(mut self, procfs: ProcFs) -> Self {
        self.procfs = procfs;
        self
    }

    pub fn with_probe(mut self, probe: fn() -> bool) -> Self {
        self.probe = probe;
        self
    }

    pub fn with_advisor(mut self, advise: Advisor) -> Self {
        self.advise = advise;
        self
    }

    /// Process every pid in order. Per-target failures are reported through
    /// `output` and do not stop the run.
    pub fn run<O: Write, E: Write>(
        &mut self,
        pids: &[i32],
        output: &mut OutputManager<O, E>,
    ) -> io::Result<RunStatus> {
        for &pid in pids {
            match self.run_target(pid, output) {
                Ok(()) => {}
                Err(TargetError::Output(err)) => return Err(err),
                Err(TargetError::Advise(ProcessError::Unsupported)) => {
                    output.error(&ProcessError::Unsupported.to_string())?;
                    return Ok(RunStatus::Unsupported);
                }
                Err(err) => {
                    tracing::debug!(target: "memadvise.cli", pid, error = %err, "target skipped");
                    output.error(&format!("PID {pid}: {err}"))?;
                }
            }
        }
        Ok(RunStatus::Completed)
    }

    /// Run the full pipeline for one target.
    pub fn run_target<O: Write, E: Write>(
        &mut self,
        pid: i32,
        output: &mut OutputManager<O, E>,
    ) -> Result<(), TargetError> {
        if pid <= 0 || !self.procfs.pid_exists(pid) {
            return Err(TargetError::Missing);
        }

        let before = self.procfs.memory_stats(pid)?;
        output.memory_stats_before(pid, &before)?;

        let eligible = self.procfs.eligible_regions(pid)?;
        let options = self.options;
        let budget = calculate_budget(before.total_rss, options.percent, options.max_bytes);
        tracing::debug!(
            target: "memadvise.cli",
            pid,
            rss = before.total_rss,
            budget,
            eligible = eligible.len(),
            "computed reclaim budget"
        );

        if options.dry_run {
            output.dry_run(pid, budget, options.mode, eligible.len())?;
            return Ok(());
        }

        let selection = select_regions(&eligible, budget)?;
        if !self.supported() {
            return Err(ProcessError::Unsupported.into());
        }

        for region in &selection.regions {
            output.selected_region(pid, region)?;
        }

        let ranges: Vec<AdviseRange> = selection.regions.iter().map(AdviseRange::from).collect();
        let advised = (self.advise)(pid, &ranges, options.mode)?;
        output.summary(
            pid,
            advised,
            selection.total_bytes,
            selection.len(),
            options.mode,
        )?;

        let after = self.procfs.memory_stats(pid)?;
        output.memory_stats_after(pid, &after, &before)?;
        Ok(())
    }

    fn supported(&mut self) -> bool {
        *self.supported.get_or_insert_with(self.probe)
    }
}
