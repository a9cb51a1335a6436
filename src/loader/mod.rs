//! Input loading and normalization.
//!
//! Everything downstream of this module works on the canonical types in
//! `crate::models`; source quirks (bilingual headers, date orders, trailing
//! slashes) are resolved here once.

pub mod analytics;
pub mod classified;

pub use analytics::{load_followers, load_top_posts, AnalyticsExport};
pub use classified::load_classified;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::warn;

/// Non-blank lines of a JSONL file, trimmed, with 1-based line numbers.
///
/// A line that is not valid UTF-8 is logged and skipped like any other
/// malformed record; only read failures are errors.
pub fn read_jsonl(path: &Path) -> std::io::Result<Vec<(usize, String)>> {
    let reader = BufReader::new(std::fs::File::open(path)?);
    let mut lines = Vec::new();

    for (index, chunk) in reader.split(b'\n').enumerate() {
        let chunk = chunk?;
        match String::from_utf8(chunk) {
            Ok(line) => {
                let line = line.trim();
                if !line.is_empty() {
                    lines.push((index + 1, line.to_string()));
                }
            }
            Err(e) => warn!(line = index + 1, error = %e, "Skipping line that is not valid UTF-8"),
        }
    }

    Ok(lines)
}

/// Order of day and month in slash-separated dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrder {
    MonthFirst,
    DayFirst,
}

/// Parse a date as written by the scraper or an analytics export.
///
/// ISO dates (optionally with a time part) are always accepted. Slash dates
/// are read according to `order`.
pub fn parse_date(raw: &str, order: DateOrder) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(d);
    }

    // Slash dates may carry a trailing time ("1/5/2024 10:00").
    let date_part = raw.split_whitespace().next().unwrap_or(raw);
    let fmt = match order {
        DateOrder::MonthFirst => "%m/%d/%Y",
        DateOrder::DayFirst => "%d/%m/%Y",
    };
    NaiveDate::parse_from_str(date_part, fmt).ok()
}
