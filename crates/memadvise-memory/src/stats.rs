use serde::Serialize;

use crate::units::KB;

/// Where a [`MemoryStats`] snapshot was read from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatsSource {
    /// `/proc/<pid>/smaps_rollup`; every field is populated.
    #[default]
    SmapsRollup,
    /// `/proc/<pid>/status`; only `total_rss`, `total_swap` and `total_size`
    /// are populated, everything else stays zero.
    Status,
}

/// Aggregate memory usage of one process at one instant, in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MemoryStats {
    pub total_rss: u64,
    pub total_swap: u64,
    pub total_size: u64,
    pub shared: u64,
    pub private: u64,
    pub anonymous: u64,
    pub lazy_free: u64,
    pub swap_pss: u64,
    pub hugetlb_rss: u64,
    pub source: StatsSource,
}

impl MemoryStats {
    /// Resident bytes released between `self` (before) and `after`.
    ///
    /// Negative when the process grew in the meantime.
    pub fn rss_delta(&self, after: &MemoryStats) -> i64 {
        let before = i128::from(self.total_rss);
        let after = i128::from(after.total_rss);
        (before - after).clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
    }
}

/// Split a `Key:   123 kB` line into its key and numeric value.
fn key_value(line: &str) -> Option<(&str, u64, Option<&str>)> {
    let mut parts = line.split_whitespace();
    let key = parts.next()?;
    let value = parts.next()?.parse::<u64>().ok()?;
    Some((key, value, parts.next()))
}

/// Parse the contents of `/proc/<pid>/smaps_rollup`.
///
/// The rollup reports every field in kB. `Shared_*` and `Private_*` pairs
/// are summed into [`MemoryStats::shared`] and [`MemoryStats::private`].
/// Unknown or malformed lines (including the leading address header) are
/// ignored.
pub fn parse_smaps_rollup(contents: &str) -> MemoryStats {
    let mut stats = MemoryStats {
        source: StatsSource::SmapsRollup,
        ..MemoryStats::default()
    };

    for line in contents.lines() {
        let Some((key, value, _unit)) = key_value(line) else {
            continue;
        };
        let bytes = value.saturating_mul(KB);

        match key {
            "Rss:" => stats.total_rss = bytes,
            "Swap:" => stats.total_swap = bytes,
            "Size:" => stats.total_size = bytes,
            "Shared_Clean:" | "Shared_Dirty:" => stats.shared = stats.shared.saturating_add(bytes),
            "Private_Clean:" | "Private_Dirty:" => {
                stats.private = stats.private.saturating_add(bytes)
            }
            "Anonymous:" => stats.anonymous = bytes,
            "LazyFree:" => stats.lazy_free = bytes,
            "SwapPss:" => stats.swap_pss = bytes,
            "HugetlbRss:" => stats.hugetlb_rss = bytes,
            _ => {}
        }
    }

    stats
}

/// Parse the coarse memory fields of `/proc/<pid>/status`.
///
/// Only `VmRSS`, `VmSwap` and `VmSize` are extracted. Values carrying a
/// `kB` unit are scaled to bytes; unit-less values are taken verbatim.
pub fn parse_status(contents: &str) -> MemoryStats {
    let mut stats = MemoryStats {
        source: StatsSource::Status,
        ..MemoryStats::default()
    };

    for line in contents.lines() {
        let Some((key, value, unit)) = key_value(line) else {
            continue;
        };
        let bytes = match unit {
            Some("kB" | "KB") => value.saturating_mul(KB),
            _ => value,
        };

        match key {
            "VmRSS:" => stats.total_rss = bytes,
            "VmSwap:" => stats.total_swap = bytes,
            "VmSize:" => stats.total_size = bytes,
            _ => {}
        }
    }

    stats
}
