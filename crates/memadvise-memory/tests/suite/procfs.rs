use std::path::Path;

use memadvise_memory::{InspectError, ProcFs, StatsSource};
use tempfile::TempDir;

const MAPS: &str = "\
55d0c5e00000-55d0c5e02000 r--p 00000000 fd:01 1311234                    /usr/bin/cat
55d0c5e02000-55d0c5e07000 r-xp 00002000 fd:01 1311234                    /usr/bin/cat
55d0c5e0c000-55d0c5e0d000 rw-p 0000b000 fd:01 1311234                    /usr/bin/cat
55d0c6a3e000-55d0c6a5f000 rw-p 00000000 00:00 0                          [heap]
this line is garbage
7f1c2a000000-7f1c2a400000 rw-p 00000000 00:00 0
7f1c2a400000-7f1c2a400800 rw-p 00000000 00:00 0
7f1c2a500000-7f1c2a600000 rw-s 00000000 00:01 4242                       /dev/shm/ring
7f1c2a600000-7f1c2a601000 rwxp 00000000 00:00 0
7ffd3b5dd000-7ffd3b5fe000 rw-p 00000000 00:00 0                          [stack]
7ffd3b5fe000-7ffd3b602000 r--p 00000000 00:00 0                          [vvar]
7ffd3b602000-7ffd3b604000 r-xp 00000000 00:00 0                          [vdso]
zzzz-7ffd3b604000 r-xp 00000000 00:00 0
";

const ROLLUP: &str = "\
55d0c5e00000-7ffd3b604000 ---p 00000000 00:00 0                          [rollup]
Rss:                8192 kB
Pss:                7000 kB
Shared_Clean:       1000 kB
Shared_Dirty:         24 kB
Private_Clean:       168 kB
Private_Dirty:      7000 kB
Anonymous:          6500 kB
LazyFree:              0 kB
Swap:                128 kB
SwapPss:             100 kB
";

fn write(root: &Path, pid: i32, file: &str, contents: &str) {
    let dir = root.join(pid.to_string());
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join(file), contents).unwrap();
}

#[test]
fn reads_every_parseable_region() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), 42, "maps", MAPS);
    let procfs = ProcFs::with_root(temp.path());

    let regions = procfs.memory_regions(42).unwrap();
    // 13 lines, two of which are malformed.
    assert_eq!(regions.len(), 11);
    for region in &regions {
        assert_eq!(region.size, region.end - region.start);
    }
}

#[test]
fn eligible_regions_apply_exclusion_policy() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), 42, "maps", MAPS);
    let procfs = ProcFs::with_root(temp.path());

    let eligible = procfs.eligible_regions(42).unwrap();
    let starts: Vec<u64> = eligible.iter().map(|r| r.start).collect();
    assert_eq!(starts, vec![0x55d0c6a3e000, 0x7f1c2a000000]);
}

#[test]
fn memory_stats_prefers_smaps_rollup() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), 7, "smaps_rollup", ROLLUP);
    write(temp.path(), 7, "status", "VmRSS:\t1 kB\n");
    let procfs = ProcFs::with_root(temp.path());

    let stats = procfs.memory_stats(7).unwrap();
    assert_eq!(stats.source, StatsSource::SmapsRollup);
    assert_eq!(stats.total_rss, 8192 * 1024);
    assert_eq!(stats.shared, 1024 * 1024);
    assert_eq!(stats.private, 7168 * 1024);
    assert_eq!(stats.swap_pss, 100 * 1024);
}

#[test]
fn memory_stats_falls_back_to_status() {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        7,
        "status",
        "Name:\tworker\nVmSize:\t  20480 kB\nVmRSS:\t   4096 kB\nVmSwap:\t     12 kB\n",
    );
    let procfs = ProcFs::with_root(temp.path());

    let stats = procfs.memory_stats(7).unwrap();
    assert_eq!(stats.source, StatsSource::Status);
    assert_eq!(stats.total_rss, 4096 * 1024);
    assert_eq!(stats.total_swap, 12 * 1024);
    assert_eq!(stats.total_size, 20480 * 1024);
    assert_eq!(stats.anonymous, 0);
    assert_eq!(stats.shared, 0);
}

#[test]
fn missing_process_is_not_found() {
    let temp = TempDir::new().unwrap();
    let procfs = ProcFs::with_root(temp.path());

    assert!(!procfs.pid_exists(999));
    assert!(matches!(
        procfs.memory_stats(999),
        Err(InspectError::NotFound { pid: 999 })
    ));
    assert!(matches!(
        procfs.memory_regions(999),
        Err(InspectError::NotFound { pid: 999 })
    ));
}

#[test]
fn missing_maps_for_live_process_is_io_error() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), 5, "status", "VmRSS: 1 kB\n");
    let procfs = ProcFs::with_root(temp.path());

    assert!(procfs.pid_exists(5));
    assert!(matches!(
        procfs.memory_regions(5),
        Err(InspectError::Io { .. })
    ));
}

#[cfg(target_os = "linux")]
#[test]
fn reads_own_process() {
    let procfs = ProcFs::default();
    let pid = std::process::id() as i32;

    assert!(procfs.pid_exists(pid));
    let stats = procfs.memory_stats(pid).unwrap();
    assert!(stats.total_rss > 0);
    let regions = procfs.memory_regions(pid).unwrap();
    assert!(!regions.is_empty());
}
