use memadvise_process::{
    advise_regions, supports_process_madvise, AdviceMode, AdviseRange, ProcessError,
};

#[test]
fn invalid_mode_fails_before_any_syscall() {
    let err = "lazy".parse::<AdviceMode>().unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid mode: lazy (must be 'cold' or 'pageout')"
    );
}

#[test]
fn advising_missing_process_is_not_found() {
    let range = AdviseRange {
        base: 0x1000,
        len: 0x1000,
    };
    assert!(matches!(
        advise_regions(i32::MAX, &[range], AdviceMode::Cold),
        Err(ProcessError::NotFound { .. })
    ));
}

#[cfg(target_os = "linux")]
mod linux {
    use super::*;

    /// Page-aligned anonymous mapping owned by the test.
    struct Page {
        addr: *mut libc::c_void,
        len: usize,
    }

    impl Page {
        fn new(pages: usize) -> Self {
            let len = unsafe { libc::sysconf(libc::_SC_PAGESIZE) } as usize * pages;
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
            assert_ne!(addr, libc::MAP_FAILED, "mmap failed");
            unsafe { std::ptr::write_bytes(addr.cast::<u8>(), 1, len) };
            Self { addr, len }
        }

        fn range(&self) -> AdviseRange {
            AdviseRange {
                base: self.addr as usize as u64,
                len: self.len as u64,
            }
        }
    }

    impl Drop for Page {
        fn drop(&mut self) {
            unsafe {
                libc::munmap(self.addr, self.len);
            }
        }
    }

    fn own_pid() -> i32 {
        i32::try_from(std::process::id()).unwrap()
    }

    #[test]
    fn advising_own_memory_matches_probe() {
        let supported = supports_process_madvise();
        let page = Page::new(4);

        match advise_regions(own_pid(), &[page.range()], AdviceMode::Cold) {
            Ok(advised) => {
                assert!(supported, "advise succeeded but probe reported unsupported");
                assert_eq!(advised, page.len as u64);
            }
            Err(err) => {
                assert!(!supported, "probe succeeded but advise failed: {err}");
                assert!(
                    matches!(err, ProcessError::Syscall { .. }),
                    "unexpected error: {err}"
                );
            }
        }
    }

    #[test]
    fn pageout_accepts_multiple_ranges() {
        if !supports_process_madvise() {
            return;
        }

        let first = Page::new(2);
        let second = Page::new(3);
        let advised = advise_regions(
            own_pid(),
            &[first.range(), second.range()],
            AdviceMode::Pageout,
        )
        .unwrap();
        assert_eq!(advised, (first.len + second.len) as u64);
    }

    #[test]
    fn kernel_rejection_carries_errno() {
        if !supports_process_madvise() {
            return;
        }

        // Unaligned start address: the kernel rejects this with EINVAL.
        let page = Page::new(1);
        let range = AdviseRange {
            base: page.range().base + 1,
            len: 16,
        };
        let err = advise_regions(own_pid(), &[range], AdviceMode::Cold).unwrap_err();
        assert_eq!(err.raw_os_error(), Some(libc::EINVAL), "{err}");
    }
}
