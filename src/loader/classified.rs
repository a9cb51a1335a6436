//! Classified post store.
//!
//! Reads the line-delimited JSON written by `prisma classify`. Each line is
//! a scraped record plus a `classification` object; missing categories,
//! blank lines and malformed lines are tolerated.

use super::{parse_date, read_jsonl, DateOrder};
use crate::error::PrismaError;
use crate::models::{normalize_url, Classification, Post};
use serde::{Deserialize, Deserializer};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, warn};

/// The subset of a classified record the report needs.
#[derive(Debug, Deserialize)]
struct ClassifiedRecord {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    real_publish_date: Option<serde_json::Value>,
    /// `Some(Value::Null)` when the key is present but null.
    #[serde(default, deserialize_with = "present")]
    publish_date: Option<serde_json::Value>,
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default)]
    data: Option<ScrapedData>,
    #[serde(default)]
    classification: Option<Classification>,
}

/// Keep a present key distinct from an absent one, even when it is null.
fn present<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}

#[derive(Debug, Default, Deserialize)]
struct ScrapedData {
    #[serde(default)]
    format: Option<String>,
}

/// Load and normalize classified posts.
///
/// URLs lose their trailing slash; later duplicates of a URL are dropped.
/// The publish date comes from `real_publish_date`, then `publish_date`.
/// Records without a `publish_date` key at all fall back to the date part
/// of the scrape `timestamp`; a `null` date stays unresolved. Posts whose date cannot be parsed keep
/// `publish_date = None` for the attributor to resolve or flag.
pub fn load_classified(path: &Path) -> Result<Vec<Post>, PrismaError> {
    if !path.exists() {
        return Err(PrismaError::MissingInput(format!(
            "classified posts file not found: {}",
            path.display()
        )));
    }

    let mut posts = Vec::new();
    let mut seen = HashSet::new();
    let mut skipped = 0usize;

    for (line_number, line) in read_jsonl(path)? {
        let record: ClassifiedRecord = match serde_json::from_str(&line) {
            Ok(record) => record,
            Err(e) => {
                warn!(line = line_number, error = %e, "Skipping malformed classified record");
                skipped += 1;
                continue;
            }
        };

        let Some(post) = record_to_post(record) else {
            warn!(line = line_number, "Skipping classified record without a URL");
            skipped += 1;
            continue;
        };

        if !seen.insert(post.url.clone()) {
            warn!(url = %post.url, "Dropping duplicate post");
            continue;
        }

        posts.push(post);
    }

    info!(
        "Loaded {} classified posts from {} ({} skipped)",
        posts.len(),
        path.display(),
        skipped
    );

    Ok(posts)
}

fn record_to_post(record: ClassifiedRecord) -> Option<Post> {
    let url = record.url.as_deref().map(normalize_url)?;
    if url.is_empty() {
        return None;
    }

    let publish_date = date_value(record.real_publish_date.as_ref())
        .or_else(|| date_value(record.publish_date.as_ref()))
        .or_else(|| {
            if record.publish_date.is_none() {
                record
                    .timestamp
                    .as_deref()
                    .and_then(|ts| parse_date(ts, DateOrder::MonthFirst))
            } else {
                None
            }
        });

    if publish_date.is_none() {
        debug!(url = %url, "No usable publish date in classified record");
    }

    Some(Post {
        url,
        publish_date,
        format: record.data.and_then(|d| d.format).filter(|f| !f.trim().is_empty()),
        classification: record.classification.unwrap_or_default(),
    })
}

/// Scraped dates are ISO strings; anything else is treated as missing.
fn date_value(value: Option<&serde_json::Value>) -> Option<chrono::NaiveDate> {
    value
        .and_then(|v| v.as_str())
        .and_then(|s| parse_date(s, DateOrder::MonthFirst))
}
