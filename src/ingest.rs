//! Scraped post ingestion.
//!
//! Payloads sent by the browser scraper are tagged by `type`. Only
//! `scraped_post` payloads are stored, one JSON line appended per payload
//! to the author's log.

use crate::error::PrismaError;
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// An inbound payload.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Payload {
    ScrapedPost(ScrapedPayload),
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
pub struct ScrapedPayload {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub publish_date: Option<Value>,
    #[serde(default)]
    pub author: Option<String>,
}

/// One line of the scraped post log.
#[derive(Debug, Serialize)]
struct ScrapedEntry {
    timestamp: String,
    url: Option<String>,
    data: Option<Value>,
    publish_date: Option<Value>,
}

/// What happened to a payload.
#[derive(Debug, PartialEq, Eq)]
pub enum IngestOutcome {
    Stored(PathBuf),
    Ignored,
}

/// `scraped_posts_<Author_Name>.jsonl`, or `scraped_posts.jsonl`.
pub fn scraped_log_path(data_dir: &Path, author: Option<&str>) -> PathBuf {
    data_dir.join(log_name("scraped_posts", author))
}

/// `classified_posts_<Author_Name>.jsonl`, or `classified_posts.jsonl`.
pub fn classified_log_path(data_dir: &Path, author: Option<&str>) -> PathBuf {
    data_dir.join(log_name("classified_posts", author))
}

fn log_name(prefix: &str, author: Option<&str>) -> String {
    match author.map(str::trim).filter(|a| !a.is_empty()) {
        Some(author) => format!("{prefix}_{}.jsonl", author.replace(' ', "_")),
        None => format!("{prefix}.jsonl"),
    }
}

/// Author encoded in a `scraped_posts_<Author>.jsonl` style file name.
pub fn author_from_log(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let author = ["scraped_posts_", "classified_posts_"]
        .iter()
        .find_map(|prefix| stem.strip_prefix(prefix))?;
    let author = author.replace('_', " ");
    let author = author.trim();
    (!author.is_empty()).then(|| author.to_string())
}

/// Parse and store one payload.
pub fn ingest(raw: &str, data_dir: &Path) -> Result<IngestOutcome, PrismaError> {
    let payload: Payload = serde_json::from_str(raw)?;

    let scraped = match payload {
        Payload::ScrapedPost(scraped) => scraped,
        Payload::Other => {
            debug!("Ignoring payload that is not a scraped post");
            return Ok(IngestOutcome::Ignored);
        }
    };

    std::fs::create_dir_all(data_dir)?;
    let path = scraped_log_path(data_dir, scraped.author.as_deref());

    let entry = ScrapedEntry {
        timestamp: Local::now().naive_local().format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
        url: scraped.url,
        data: scraped.data,
        publish_date: scraped.publish_date,
    };

    let mut line = serde_json::to_string(&entry)?;
    line.push('\n');

    let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
    file.write_all(line.as_bytes())?;

    info!(
        "Stored scraped post {} in {}",
        entry.url.as_deref().unwrap_or("<no url>"),
        path.display()
    );

    Ok(IngestOutcome::Stored(path))
}
