use serde::Serialize;

use crate::region::MemoryRegion;

/// Share of resident memory targeted when the requested percentage is out
/// of range.
pub const DEFAULT_RECLAIM_PERCENT: i64 = 30;

/// Compute the reclaim budget, in bytes, for a process.
///
/// `percent` outside `(0, 100]` falls back to [`DEFAULT_RECLAIM_PERCENT`].
/// A positive `max_bytes` caps the result; `0` means "no cap".
pub fn calculate_budget(total_rss: u64, percent: i64, max_bytes: u64) -> u64 {
    let percent = if percent <= 0 || percent > 100 {
        DEFAULT_RECLAIM_PERCENT
    } else {
        percent
    };

    // `percent` is in 1..=100 here, so the product fits in 128 bits and the
    // quotient is at most `total_rss`.
    let budget = (u128::from(total_rss) * percent as u128 / 100) as u64;

    if max_bytes > 0 {
        budget.min(max_bytes)
    } else {
        budget
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SelectError {
    #[error("no eligible memory regions found")]
    EmptyEligibleSet,

    #[error("reclaim budget is zero")]
    InvalidBudget,
}

/// Regions chosen for one advisory request, largest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub regions: Vec<MemoryRegion>,
    pub total_bytes: u64,
}

impl Selection {
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

/// Pick the largest eligible regions until `budget` bytes are covered.
///
/// Largest-first keeps the number of advisory entries low. The result is the
/// shortest size-descending prefix whose total reaches `budget`, or every
/// region when even the full set falls short. Ties keep their input order.
pub fn select_regions(eligible: &[MemoryRegion], budget: u64) -> Result<Selection, SelectError> {
    if eligible.is_empty() {
        return Err(SelectError::EmptyEligibleSet);
    }
    if budget == 0 {
        return Err(SelectError::InvalidBudget);
    }

    let mut sorted: Vec<&MemoryRegion> = eligible.iter().collect();
    sorted.sort_by(|a, b| b.size.cmp(&a.size));

    let mut regions = Vec::new();
    let mut total_bytes: u64 = 0;
    for region in sorted {
        if total_bytes >= budget {
            break;
        }
        total_bytes = total_bytes.saturating_add(region.size);
        regions.push(region.clone());
    }

    Ok(Selection {
        regions,
        total_bytes,
    })
}
