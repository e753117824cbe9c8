use std::io::{self, Write};

use memadvise_memory::{format_bytes, format_signed_bytes, MemoryRegion, MemoryStats};
use memadvise_process::AdviceMode;
use serde::Serialize;

#[derive(Serialize)]
struct DryRunRecord<'a> {
    pid: i32,
    would_advise: u64,
    mode: &'a str,
    region_count: usize,
    dry_run: bool,
}

#[derive(Serialize)]
struct SummaryRecord<'a> {
    pid: i32,
    advised_bytes: u64,
    selected_bytes: u64,
    regions: usize,
    mode: &'a str,
}

#[derive(Serialize)]
struct ErrorRecord<'a> {
    error: &'a str,
}

/// Renders per-target results either as aligned text or as one JSON object
/// per line.
///
/// Text results go to `out` and errors to `err`. In JSON mode everything,
/// errors included, goes to `out`, and the before/after snapshots are
/// omitted.
pub struct OutputManager<O = io::Stdout, E = io::Stderr> {
    verbose: bool,
    json: bool,
    out: O,
    err: E,
}

impl OutputManager {
    pub fn new(verbose: bool, json: bool) -> Self {
        Self::with_writers(verbose, json, io::stdout(), io::stderr())
    }
}

impl<O: Write, E: Write> OutputManager<O, E> {
    pub fn with_writers(verbose: bool, json: bool, out: O, err: E) -> Self {
        Self {
            verbose,
            json,
            out,
            err,
        }
    }

    pub fn into_writers(self) -> (O, E) {
        (self.out, self.err)
    }

    pub fn memory_stats_before(&mut self, pid: i32, stats: &MemoryStats) -> io::Result<()> {
        if self.json {
            return Ok(());
        }
        writeln!(
            self.out,
            "PID {pid} Before:  RSS: {}  Anon: {}  Private: {}",
            format_bytes(stats.total_rss),
            format_bytes(stats.anonymous),
            format_bytes(stats.private),
        )
    }

    pub fn memory_stats_after(
        &mut self,
        pid: i32,
        after: &MemoryStats,
        before: &MemoryStats,
    ) -> io::Result<()> {
        if self.json {
            return Ok(());
        }
        writeln!(
            self.out,
            "PID {pid} After:  RSS: {}  Difference: {}",
            format_bytes(after.total_rss),
            format_signed_bytes(before.rss_delta(after)),
        )
    }

    pub fn selected_region(&mut self, pid: i32, region: &MemoryRegion) -> io::Result<()> {
        if self.json || !self.verbose {
            return Ok(());
        }
        writeln!(
            self.out,
            "PID {pid} Selected Region:  {:016x}-{:016x}  {}  {}",
            region.start,
            region.end,
            format_bytes(region.size),
            region.display_path(),
        )
    }

    pub fn dry_run(
        &mut self,
        pid: i32,
        budget: u64,
        mode: AdviceMode,
        region_count: usize,
    ) -> io::Result<()> {
        if self.json {
            return self.json_line(&DryRunRecord {
                pid,
                would_advise: budget,
                mode: mode.as_str(),
                region_count,
                dry_run: true,
            });
        }
        writeln!(
            self.out,
            "PID {pid} DRY RUN:  Would advise {} across {region_count} regions using mode '{mode}'",
            format_bytes(budget),
        )
    }

    pub fn summary(
        &mut self,
        pid: i32,
        advised: u64,
        selected: u64,
        region_count: usize,
        mode: AdviceMode,
    ) -> io::Result<()> {
        if self.json {
            return self.json_line(&SummaryRecord {
                pid,
                advised_bytes: advised,
                selected_bytes: selected,
                regions: region_count,
                mode: mode.as_str(),
            });
        }
        writeln!(
            self.out,
            "PID {pid} Summary:  Advised {} / {} ({}%) across {region_count} regions using mode '{mode}'",
            format_bytes(advised),
            format_bytes(selected),
            advised_percent(advised, selected),
        )
    }

    pub fn error(&mut self, message: &str) -> io::Result<()> {
        if self.json {
            return self.json_line(&ErrorRecord { error: message });
        }
        writeln!(self.err, "Error: {message}")
    }

    fn json_line<T: Serialize>(&mut self, value: &T) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, value)?;
        writeln!(self.out)
    }
}

fn advised_percent(advised: u64, selected: u64) -> u128 {
    if selected == 0 {
        return 0;
    }
    u128::from(advised) * 100 / u128::from(selected)
}
