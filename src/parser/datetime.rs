//! Timestamp parsing for the export's date format.
//!
//! The export writes dates like `Friday, October 25, 2024 at 3:20:36 AM UTC`,
//! sometimes with U+202F narrow no-break spaces before the AM/PM marker.
//! Everything is normalized to UTC.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use tracing::warn;

/// Parse an export timestamp string into a UTC instant.
///
/// Accepts the export's long form, RFC 3339, and a couple of plain fallbacks.
/// Returns `None` for empty or unparseable input — the caller drops the
/// record in that case.
pub fn parse_export_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let cleaned: String = raw
        .chars()
        .map(|c| {
            if c == '\u{202f}' || c == '\u{00a0}' {
                ' '
            } else {
                c
            }
        })
        .collect();
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    // Split a trailing timezone token off: "… 3:20:36 AM UTC" → head + offset
    if let Some((head, tail)) = trimmed.rsplit_once(' ') {
        if let Some(offset) = timezone_offset(tail) {
            for fmt in NAIVE_FORMATS {
                if let Ok(ndt) = NaiveDateTime::parse_from_str(head, fmt) {
                    return resolve_local(ndt, offset);
                }
            }
        }
    }

    // No recognizable timezone token: parse the whole string and read it as UTC.
    for fmt in NAIVE_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(Utc.from_utc_datetime(&ndt));
        }
    }

    warn!(date = trimmed, "Could not parse export timestamp");
    None
}

/// Formats the export has been observed to use, tried in order.
const NAIVE_FORMATS: &[&str] = &[
    "%A, %B %d, %Y at %I:%M:%S %p",
    "%B %d, %Y at %I:%M:%S %p",
    "%Y-%m-%d %H:%M:%S",
];

fn resolve_local(ndt: NaiveDateTime, offset: FixedOffset) -> Option<DateTime<Utc>> {
    offset
        .from_local_datetime(&ndt)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Map a trailing timezone token to a fixed offset.
///
/// Handles numeric offsets (`+0100`, `-05:00`) and the abbreviations Google
/// has been seen emitting for accounts in those zones.
fn timezone_offset(token: &str) -> Option<FixedOffset> {
    // Numeric offsets
    if let Some(rest) = token.strip_prefix('+') {
        return numeric_offset(rest, 1);
    }
    if let Some(rest) = token.strip_prefix('-') {
        return numeric_offset(rest, -1);
    }

    let seconds = match token {
        "UTC" | "GMT" | "Z" => 0,
        "EST" => -5 * 3600,
        "EDT" => -4 * 3600,
        "CST" => -6 * 3600,
        "CDT" => -5 * 3600,
        "MST" => -7 * 3600,
        "MDT" => -6 * 3600,
        "PST" => -8 * 3600,
        "PDT" => -7 * 3600,
        "CET" => 3600,
        "CEST" => 2 * 3600,
        "BST" => 3600,
        "JST" => 9 * 3600,
        _ => return None,
    };
    FixedOffset::east_opt(seconds)
}

/// Parse `HHMM` or `HH:MM` into an offset with the given sign.
fn numeric_offset(digits: &str, sign: i32) -> Option<FixedOffset> {
    let digits = digits.replace(':', "");
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
