//! Raw syscall wrappers. Nothing outside this module touches `libc::syscall`
//! or builds `iovec`s.

use std::io;
#[cfg(target_os = "linux")]
use std::os::fd::{AsRawFd, FromRawFd};
use std::os::fd::{BorrowedFd, OwnedFd};

use crate::advise::AdviseRange;

#[cfg(target_os = "linux")]
pub(crate) fn pidfd_open(pid: i32) -> io::Result<OwnedFd> {
    // SAFETY: `pidfd_open` takes a pid and a flags word by value and either
    // returns a new file descriptor or -1 with errno set.
    let ret = unsafe {
        libc::syscall(
            libc::SYS_pidfd_open,
            libc::c_long::from(pid),
            0 as libc::c_long,
        )
    };
    if ret < 0 {
        return Err(io::Error::last_os_error());
    }

    let fd = libc::c_int::try_from(ret)
        .map_err(|_| io::Error::other(format!("pidfd_open returned out-of-range fd {ret}")))?;
    // SAFETY: the kernel just handed us this descriptor; nothing else owns it.
    Ok(unsafe { OwnedFd::from_raw_fd(fd) })
}

#[cfg(not(target_os = "linux"))]
pub(crate) fn pidfd_open(_pid: i32) -> io::Result<OwnedFd> {
    Err(io::ErrorKind::Unsupported.into())
}

#[cfg(target_os = "linux")]
fn to_iovecs(ranges: &[AdviseRange]) -> io::Result<Vec<libc::iovec>> {
    ranges
        .iter()
        .map(|range| {
            let base = usize::try_from(range.base).map_err(|_| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("address {:#x} does not fit in a pointer", range.base),
                )
            })?;
            let len = usize::try_from(range.len).map_err(|_| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("length {} does not fit in usize", range.len),
                )
            })?;
            Ok(libc::iovec {
                iov_base: base as *mut libc::c_void,
                iov_len: len,
            })
        })
        .collect()
}

/// Issue a single `process_madvise(2)` call covering every range.
///
/// Returns the number of bytes the kernel reports as advised, which may be
/// less than the total requested.
#[cfg(target_os = "linux")]
pub(crate) fn process_madvise(
    pidfd: BorrowedFd<'_>,
    ranges: &[AdviseRange],
    advice: libc::c_int,
) -> io::Result<u64> {
    let iovecs = to_iovecs(ranges)?;

    // SAFETY: `iovecs` is a live, correctly laid out `struct iovec` array for
    // the whole call. The kernel only reads the vector itself; the addresses
    // it contains are interpreted in the *target's* address space and are
    // validated by the kernel, never dereferenced here.
    let ret = unsafe {
        libc::syscall(
            libc::SYS_process_madvise,
            libc::c_long::from(pidfd.as_raw_fd()),
            iovecs.as_ptr(),
            iovecs.len(),
            libc::c_long::from(advice),
            0 as libc::c_ulong,
        )
    };
    if ret < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(ret as u64)
}

#[cfg(not(target_os = "linux"))]
pub(crate) fn process_madvise(
    _pidfd: BorrowedFd<'_>,
    _ranges: &[AdviseRange],
    _advice: i32,
) -> io::Result<u64> {
    Err(io::ErrorKind::Unsupported.into())
}

/// A private anonymous page owned by the current process, unmapped on drop.
#[cfg(target_os = "linux")]
pub(crate) struct ScratchPage {
    addr: *mut libc::c_void,
    len: usize,
}

#[cfg(target_os = "linux")]
impl ScratchPage {
    pub(crate) fn new() -> io::Result<Self> {
        // SAFETY: `sysconf` has no preconditions.
        let page_size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
        let len = usize::try_from(page_size).unwrap_or(4096).max(1);

        // SAFETY: anonymous private mapping with no address hint; the result
        // is checked against MAP_FAILED before use.
        let addr = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                len,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
                -1,
                0,
            )
        };
        if addr == libc::MAP_FAILED {
            return Err(io::Error::last_os_error());
        }

        // Touch the page so there is something resident to advise.
        // SAFETY: `addr` points to `len` writable bytes we just mapped.
        unsafe { std::ptr::write_bytes(addr.cast::<u8>(), 0xa5, len) };

        Ok(Self { addr, len })
    }

    pub(crate) fn range(&self) -> AdviseRange {
        AdviseRange {
            base: self.addr as usize as u64,
            len: self.len as u64,
        }
    }
}

#[cfg(target_os = "linux")]
impl Drop for ScratchPage {
    fn drop(&mut self) {
        // SAFETY: `addr`/`len` describe a mapping created in `new` and not
        // unmapped elsewhere.
        unsafe {
            libc::munmap(self.addr, self.len);
        }
    }
}
