//! Memory map inspection and reclaim-target selection for `memadvise`.
//!
//! This crate is purely observational: it reads procfs, classifies mappings
//! and decides *which* ranges are worth advising. Issuing the advisory call is
//! left to `memadvise-process`.
//!
//! - [`ProcFs`] reads `/proc/<pid>/maps`, `/proc/<pid>/smaps_rollup` and the
//!   `/proc/<pid>/status` fallback.
//! - [`eligible_regions`] applies the exclusion policy (stacks, vDSO/vvar,
//!   executable and sub-page mappings are never advised).
//! - [`calculate_budget`] and [`select_regions`] turn a resident size into a
//!   bounded, size-ordered selection.

mod budget;
mod eligibility;
mod procfs;
mod region;
mod stats;
mod units;

pub use budget::{
    calculate_budget, select_regions, Selection, SelectError, DEFAULT_RECLAIM_PERCENT,
};
pub use eligibility::{
    eligible_regions, exclusion_reason, is_candidate, is_eligible, Exclusion, MIN_REGION_BYTES,
};
pub use procfs::{InspectError, ProcFs};
pub use region::{parse_maps_line, MapsLineError, MemoryRegion};
pub use stats::{parse_smaps_rollup, parse_status, MemoryStats, StatsSource};
pub use units::{format_bytes, format_signed_bytes, parse_byte_size, GB, KB, MB};
