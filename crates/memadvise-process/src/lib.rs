//! Privileged operations against a target process: pidfd acquisition,
//! `process_madvise(2)` and a runtime capability probe.
//!
//! All raw syscalls and `iovec` marshaling live in the private `sys` module.
//! Callers only see [`ProcessHandle`], typed [`AdviseRange`]s and
//! [`ProcessError`].

mod advise;
mod error;
mod handle;
mod probe;
mod sys;

pub use advise::{
    advise_regions, process_madvise, AdviceMode, AdviseRange, MADV_COLD, MADV_PAGEOUT,
};
pub use error::ProcessError;
pub use handle::{pid_exists, ProcessHandle};
pub use probe::supports_process_madvise;
