pub const KB: u64 = 1024;
pub const MB: u64 = 1024 * KB;
pub const GB: u64 = 1024 * MB;

/// Render a byte count using binary units (`512 B`, `1.5 MiB`, ...).
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [char; 6] = ['K', 'M', 'G', 'T', 'P', 'E'];

    if bytes < KB {
        return format!("{bytes} B");
    }

    let mut div = KB;
    let mut exp = 0;
    let mut n = bytes / KB;
    while n >= KB {
        div *= KB;
        exp += 1;
        n /= KB;
    }

    format!("{:.1} {}iB", bytes as f64 / div as f64, UNITS[exp])
}

/// Like [`format_bytes`], with a leading `-` for negative deltas.
pub fn format_signed_bytes(bytes: i64) -> String {
    if bytes < 0 {
        format!("-{}", format_bytes(bytes.unsigned_abs()))
    } else {
        format_bytes(bytes.unsigned_abs())
    }
}

/// Parse a human-friendly byte size such as `4096`, `512KiB`, `1.5 GiB` or
/// `2G`.
///
/// Both `K`/`KB`/`KiB` spellings are accepted and all of them are treated as
/// binary (1024-based) multiples; reclaim budgets are always page-granular,
/// so the decimal/binary distinction is not worth a separate set of units.
pub fn parse_byte_size(input: &str) -> Result<u64, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err("empty byte size".to_string());
    }

    let split = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(split);
    if number.is_empty() {
        return Err(format!("byte size `{trimmed}` is missing a number"));
    }

    let multiplier = match unit.trim().to_ascii_lowercase().as_str() {
        "" | "b" => 1,
        "k" | "kb" | "kib" => KB,
        "m" | "mb" | "mib" => MB,
        "g" | "gb" | "gib" => GB,
        "t" | "tb" | "tib" => GB * KB,
        other => return Err(format!("unknown byte size unit `{other}`")),
    };

    if let Ok(whole) = number.parse::<u64>() {
        return whole
            .checked_mul(multiplier)
            .ok_or_else(|| format!("byte size `{trimmed}` is too large"));
    }

    let value = number
        .parse::<f64>()
        .map_err(|_| format!("invalid byte size `{trimmed}`"))?;
    let bytes = value * multiplier as f64;
    if !bytes.is_finite() || bytes < 0.0 || bytes >= u64::MAX as f64 {
        return Err(format!("byte size `{trimmed}` is too large"));
    }
    Ok(bytes.round() as u64)
}
