use crate::error::ProcessError;

/// Detect whether the running kernel accepts `process_madvise(2)`.
///
/// Opens a pidfd for the current process and advises a freshly mapped
/// scratch page with `MADV_COLD`. Any failure (missing syscall, missing
/// `CAP_SYS_NICE`, seccomp filtering, ...) is reported as `false`; the probe
/// never returns an error. The result is not cached.
pub fn supports_process_madvise() -> bool {
    match probe() {
        Ok(advised) => {
            tracing::debug!(target: "memadvise.process", advised, "process_madvise probe succeeded");
            true
        }
        Err(err) => {
            tracing::debug!(
                target: "memadvise.process",
                error = %err,
                "process_madvise probe failed"
            );
            false
        }
    }
}

#[cfg(target_os = "linux")]
fn probe() -> Result<u64, ProcessError> {
    use crate::advise::{process_madvise, AdviceMode};
    use crate::handle::ProcessHandle;
    use crate::sys::ScratchPage;

    let pid = i32::try_from(std::process::id()).map_err(|_| ProcessError::Unsupported)?;
    let handle = ProcessHandle::open(pid)?;
    let page = ScratchPage::new().map_err(|err| ProcessError::syscall("mmap", pid, err))?;
    process_madvise(&handle, &[page.range()], AdviceMode::Cold)
}

#[cfg(not(target_os = "linux"))]
fn probe() -> Result<u64, ProcessError> {
    Err(ProcessError::Unsupported)
}
