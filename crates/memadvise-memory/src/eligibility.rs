use crate::region::{MemoryRegion, STACK_LABEL_PREFIX};

/// Regions smaller than one page are not worth an advisory round-trip.
///
/// The host page size is conservatively assumed to be 4 KiB.
pub const MIN_REGION_BYTES: u64 = 4096;

/// Reason a candidate region is kept out of an advisory request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    /// Thread or main stack.
    Stack,
    /// `[vdso]` / `[vvar]`, owned by the kernel.
    KernelMapping,
    Executable,
    TooSmall,
}

/// Anonymous, private and writable: the only mappings `MADV_COLD` /
/// `MADV_PAGEOUT` can meaningfully act on.
pub fn is_candidate(region: &MemoryRegion) -> bool {
    region.anonymous && region.private && region.writable
}

/// First exclusion rule matching `region`, checked in a fixed order.
pub fn exclusion_reason(region: &MemoryRegion) -> Option<Exclusion> {
    if region.path.starts_with(STACK_LABEL_PREFIX) {
        return Some(Exclusion::Stack);
    }
    if region.path == "[vdso]" || region.path == "[vvar]" {
        return Some(Exclusion::KernelMapping);
    }
    if region.executable {
        return Some(Exclusion::Executable);
    }
    if region.size < MIN_REGION_BYTES {
        return Some(Exclusion::TooSmall);
    }
    None
}

pub fn is_eligible(region: &MemoryRegion) -> bool {
    is_candidate(region) && exclusion_reason(region).is_none()
}

/// Filter `regions` down to safe advisory targets, preserving input order.
pub fn eligible_regions(regions: impl IntoIterator<Item = MemoryRegion>) -> Vec<MemoryRegion> {
    regions
        .into_iter()
        .filter(|region| {
            if !is_candidate(region) {
                return false;
            }
            match exclusion_reason(region) {
                None => true,
                Some(reason) => {
                    tracing::trace!(
                        target = "memadvise.memory",
                        start = region.start,
                        end = region.end,
                        path = region.path.as_str(),
                        ?reason,
                        "excluding region"
                    );
                    false
                }
            }
        })
        .collect()
}
