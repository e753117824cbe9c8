use std::io;

/// Errors produced by process-handle and advisory operations.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("process {pid} does not exist or is not accessible")]
    NotFound { pid: i32 },

    /// The kernel rejected a syscall; `source` carries the raw errno.
    #[error("{op} failed for process {pid}: {source}")]
    Syscall {
        op: &'static str,
        pid: i32,
        #[source]
        source: io::Error,
    },

    #[error("invalid mode: {mode} (must be 'cold' or 'pageout')")]
    InvalidMode { mode: String },

    #[error("advisory request contains no ranges")]
    EmptyRequest,

    #[error("process_madvise syscall is not supported on this system")]
    Unsupported,
}

impl ProcessError {
    pub(crate) fn syscall(op: &'static str, pid: i32, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::Unsupported && source.raw_os_error().is_none() {
            return Self::Unsupported;
        }
        Self::Syscall { op, pid, source }
    }

    /// Raw OS error code for [`ProcessError::Syscall`] failures.
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            Self::Syscall { source, .. } => source.raw_os_error(),
            _ => None,
        }
    }
}
