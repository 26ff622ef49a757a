//! Display formatting for quotas, sizes and dates

use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

use crate::error::{SharedError, SharedResult};

const BYTE_UNITS: [&str; 6] = ["bytes", "KB", "MB", "GB", "TB", "PB"];

/// Format an integer with comma thousands separators: `10000` -> `"10,000"`
pub fn format_number(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Format a byte count with base-1024 units, trimming trailing zeros.
///
/// `format_bytes(15 * 1024 * 1024, 0)` is `"15 MB"`, and
/// `format_bytes(1536 * 1024 * 1024, 1)` is `"1.5 GB"`.
pub fn format_bytes(bytes: i64, decimals: usize) -> String {
    if bytes <= 0 {
        return "0 bytes".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < BYTE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let mut number = format!("{:.*}", decimals, value);
    if number.contains('.') {
        number = number.trim_end_matches('0').trim_end_matches('.').to_string();
    }
    format!("{} {}", number, BYTE_UNITS[unit])
}

/// Short UTC date such as `"Mar 4, 2025"`
pub fn format_short_date(at: OffsetDateTime) -> SharedResult<String> {
    let format = format_description!("[month repr:short] [day padding:none], [year]");
    at.to_offset(UtcOffset::UTC)
        .format(&format)
        .map_err(|e| SharedError::Format(e.to_string()))
}
