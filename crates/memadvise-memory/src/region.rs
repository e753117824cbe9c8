use serde::Serialize;

/// One mapping from `/proc/<pid>/maps`.
///
/// Regions are point-in-time values: addresses are recorded as they were at
/// scan time and are never re-validated against the live process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemoryRegion {
    pub start: u64,
    /// Exclusive.
    pub end: u64,
    pub size: u64,
    pub perms: String,
    pub anonymous: bool,
    pub private: bool,
    pub writable: bool,
    pub executable: bool,
    /// Backing path or synthetic label (`[heap]`, `[stack]`, ...). Empty for
    /// unnamed anonymous mappings.
    pub path: String,
}

impl MemoryRegion {
    /// Build a region from its raw fields, deriving the classification flags.
    ///
    /// Returns `None` when `end <= start`.
    pub fn new(start: u64, end: u64, perms: &str, path: &str) -> Option<Self> {
        if end <= start {
            return None;
        }

        Some(Self {
            start,
            end,
            size: end - start,
            perms: perms.to_string(),
            anonymous: is_anonymous_path(path),
            private: perms.contains('p'),
            writable: perms.contains('w'),
            executable: perms.contains('x'),
            path: path.to_string(),
        })
    }

    /// Path used for display; unnamed mappings render as `[anon]`.
    pub fn display_path(&self) -> &str {
        if self.path.is_empty() {
            "[anon]"
        } else {
            &self.path
        }
    }
}

pub(crate) const STACK_LABEL_PREFIX: &str = "[stack";

fn is_anonymous_path(path: &str) -> bool {
    path.is_empty() || path == "[anon]" || path == "[heap]" || path.starts_with(STACK_LABEL_PREFIX)
}

/// Why a maps line could not be turned into a [`MemoryRegion`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MapsLineError {
    #[error("maps line has {found} fields, expected at least 5")]
    TooFewFields { found: usize },

    #[error("invalid address range `{0}`")]
    InvalidRange(String),

    #[error("invalid address `{0}`")]
    InvalidAddress(String),

    #[error("empty address range `{0}`")]
    EmptyRange(String),

    #[error("invalid permissions `{0}`")]
    InvalidPerms(String),
}

/// Split the next whitespace-delimited field off the front of `rest`.
fn next_field<'a>(rest: &mut &'a str) -> Option<&'a str> {
    let trimmed = rest.trim_start();
    if trimmed.is_empty() {
        *rest = trimmed;
        return None;
    }

    let end = trimmed
        .find(|c: char| c.is_ascii_whitespace())
        .unwrap_or(trimmed.len());
    let (field, tail) = trimmed.split_at(end);
    *rest = tail;
    Some(field)
}

/// Parse a single line of `/proc/<pid>/maps`.
///
/// ```text
/// 7f1c2a000000-7f1c2a021000 rw-p 00000000 00:00 0                          [heap]
/// ```
///
/// The offset, device and inode columns must be present but are otherwise
/// ignored. Everything after the inode is taken as the path, so paths that
/// contain spaces (or a ` (deleted)` suffix) are preserved.
pub fn parse_maps_line(line: &str) -> Result<MemoryRegion, MapsLineError> {
    let mut rest = line;
    let mut fields = [""; 5];
    for (idx, slot) in fields.iter_mut().enumerate() {
        *slot = next_field(&mut rest).ok_or(MapsLineError::TooFewFields { found: idx })?;
    }
    let [range, perms, _offset, _dev, _inode] = fields;
    let path = rest.trim();

    let mut bounds = range.split('-');
    let (Some(start), Some(end), None) = (bounds.next(), bounds.next(), bounds.next()) else {
        return Err(MapsLineError::InvalidRange(range.to_string()));
    };

    let start = u64::from_str_radix(start, 16)
        .map_err(|_| MapsLineError::InvalidAddress(start.to_string()))?;
    let end =
        u64::from_str_radix(end, 16).map_err(|_| MapsLineError::InvalidAddress(end.to_string()))?;

    if perms.len() < 4 {
        return Err(MapsLineError::InvalidPerms(perms.to_string()));
    }

    MemoryRegion::new(start, end, perms, path)
        .ok_or_else(|| MapsLineError::EmptyRange(range.to_string()))
}
