//! Post classification.
//!
//! Each scraped post's text is sent to the model with a tool whose schema
//! enumerates the allowed values per category. Classified records are the
//! scraped record plus a `classification` object.

use super::{LlmBackend, LlmError, ToolDefinition};
use crate::error::PrismaError;
use crate::loader::read_jsonl;
use crate::models::Classification;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{json, Map, Value};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const TEXT_TONES: &[&str] = &[
    "Professional",
    "Inspirational",
    "Motivational",
    "Casual",
    "Technical",
    "Humorous",
    "Critical",
    "Challenging",
    "Personal",
    "Empathetic",
    "Other",
];

pub const TOPICS: &[&str] = &[
    "Leadership",
    "Tech Trends",
    "Career Advice",
    "Remote Work",
    "Workplace Efficiency",
    "Venture Capital",
    "Economic Policy",
    "AI & Machine Learning",
    "Product Management",
    "Marketing",
    "Entrepreneurship",
    "Diversity & Inclusion",
    "Personal Development",
    "Hiring & Recruiting",
    "Other",
];

pub const SENTIMENTS: &[&str] = &[
    "Positive",
    "Neutral",
    "Negative",
    "Challenging",
    "Critical",
    "Mixed",
    "Other",
];

pub const NARRATIVE_TYPES: &[&str] = &[
    "Educational",
    "Personal Story",
    "Achievement",
    "Discussion",
    "Exposé",
    "Predictive",
    "Announcement",
    "Case Study",
    "Opinion",
    "How-to/Guide",
    "Other",
];

pub const CONTENT_FRAMEWORKS: &[&str] = &[
    "Hook–Problem–Solution",
    "Listicle",
    "Rant–Resolve",
    "Question–Response",
    "Story–Lesson",
    "Before–After–Bridge",
    "Step-by-Step",
    "Other",
];

pub const CALLS_TO_ACTION: &[&str] = &[
    "None",
    "Comment",
    "Share",
    "Like",
    "Visit Link",
    "Follow",
    "Register/Sign Up",
    "Download",
    "Other",
];

pub const AUDIENCE_PERSONAS: &[&str] = &[
    "Job Seekers",
    "Founders",
    "Marketers",
    "General Audience",
    "Engineers/Developers",
    "HR/Recruiters",
    "Executives",
    "Students",
    "Other",
];

pub const LENGTHS: &[&str] = &["Short", "Medium", "Long"];

/// Enumerated categories: response key and allowed values.
const ENUM_FIELDS: [(&str, &[&str]); 8] = [
    ("Text Tone", TEXT_TONES),
    ("Topic", TOPICS),
    ("Sentiment", SENTIMENTS),
    ("Narrative Type", NARRATIVE_TYPES),
    ("Content Framework", CONTENT_FRAMEWORKS),
    ("Call to Action", CALLS_TO_ACTION),
    ("Audience Persona", AUDIENCE_PERSONAS),
    ("Length", LENGTHS),
];

const BOOL_FIELDS: [(&str, &str); 3] = [
    ("Question Present", "Whether the post asks the reader a question"),
    ("Storytelling", "Whether the post tells a story"),
    ("Engagement Hook", "Whether the opening line is written to stop the scroll"),
];

const SYSTEM_PROMPT: &str = r#"You are an expert LinkedIn content analyst.
Classify the post you are given by calling the classify_post tool.
Pick exactly one allowed value for each category; use "Other" when nothing fits.
Do not invent categories or values."#;

/// The `classify_post` tool with the full category schema.
pub fn classification_tool() -> ToolDefinition {
    let mut properties = Map::new();
    for (key, values) in ENUM_FIELDS {
        properties.insert(
            key.to_string(),
            json!({"type": "string", "enum": values}),
        );
    }
    for (key, description) in BOOL_FIELDS {
        properties.insert(
            key.to_string(),
            json!({"type": "boolean", "description": description}),
        );
    }
    properties.insert(
        "Hashtags".to_string(),
        json!({"type": "array", "items": {"type": "string"}, "description": "Hashtags used in the post"}),
    );
    properties.insert(
        "Value Proposition".to_string(),
        json!({"type": "string", "description": "One sentence on what the reader gains"}),
    );

    let required: Vec<String> = properties.keys().cloned().collect();
    let parameters = json!({
        "type": "object",
        "properties": properties,
        "required": required,
    });

    ToolDefinition::function(
        "classify_post",
        "Record the classification of a LinkedIn post",
        parameters,
    )
}

fn build_prompt(post_text: &str) -> String {
    let mut prompt = String::new();
    prompt.push_str("Classify the following LinkedIn post.\n\n");
    prompt.push_str("=== POST ===\n");
    prompt.push_str(post_text.trim());
    prompt.push_str("\n=== END OF POST ===\n");
    prompt
}

/// Replace values outside a category's vocabulary with "Other".
fn snap_to_vocabulary(classification: &mut Classification) {
    let slots: [(&mut Option<String>, &[&str]); 8] = [
        (&mut classification.text_tone, TEXT_TONES),
        (&mut classification.topic, TOPICS),
        (&mut classification.sentiment, SENTIMENTS),
        (&mut classification.narrative_type, NARRATIVE_TYPES),
        (&mut classification.content_framework, CONTENT_FRAMEWORKS),
        (&mut classification.call_to_action, CALLS_TO_ACTION),
        (&mut classification.audience_persona, AUDIENCE_PERSONAS),
        (&mut classification.length, LENGTHS),
    ];

    for (slot, vocabulary) in slots {
        if let Some(value) = slot.as_mut() {
            match vocabulary.iter().find(|v| v.eq_ignore_ascii_case(value.as_str())) {
                Some(canonical) => *value = canonical.to_string(),
                None => {
                    debug!(value = %value, "Value outside vocabulary, using Other");
                    *value = "Other".to_string();
                }
            }
        }
    }
}

/// Classify one post's text.
pub async fn classify_post<B: LlmBackend>(
    backend: &B,
    post_text: &str,
) -> Result<Classification, LlmError> {
    let value = backend
        .structured(SYSTEM_PROMPT, &build_prompt(post_text), &classification_tool())
        .await?;
    let mut classification: Classification =
        serde_json::from_value(value).map_err(|e| LlmError::Parse(e.to_string()))?;
    snap_to_vocabulary(&mut classification);
    Ok(classification)
}

/// Options for a classification batch.
#[derive(Debug, Clone)]
pub struct ClassifyOptions {
    /// Pause between model calls.
    pub delay: Duration,
    pub show_progress: bool,
}

/// Counters for a finished batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifyStats {
    pub classified: usize,
    /// Calls that failed and were written with an empty classification.
    pub failed: usize,
    /// Records without post text.
    pub skipped: usize,
}

fn post_text(record: &Map<String, Value>) -> Option<&str> {
    record
        .get("data")
        .and_then(|d| d.get("postText"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Classify every scraped post in `input` and write `output`.
///
/// A failed call degrades that post to an empty classification and the
/// batch continues. Calls are paced by `options.delay`.
pub async fn classify_file<B: LlmBackend>(
    backend: &B,
    input: &Path,
    output: &Path,
    options: &ClassifyOptions,
) -> Result<ClassifyStats, PrismaError> {
    if !input.exists() {
        return Err(PrismaError::MissingInput(format!(
            "scraped posts file not found: {}",
            input.display()
        )));
    }

    let mut records: Vec<Map<String, Value>> = Vec::new();
    let mut stats = ClassifyStats::default();
    for (line_number, line) in read_jsonl(input)? {
        match serde_json::from_str::<Map<String, Value>>(&line) {
            Ok(record) if post_text(&record).is_some() => records.push(record),
            Ok(_) => stats.skipped += 1,
            Err(e) => {
                warn!(line = line_number, error = %e, "Skipping malformed scraped record");
                stats.skipped += 1;
            }
        }
    }

    info!("Classifying {} posts from {}", records.len(), input.display());

    let progress_bar = if options.show_progress {
        let pb = ProgressBar::new(records.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(std::fs::File::create(output)?);

    let total = records.len();
    for (index, mut record) in records.into_iter().enumerate() {
        let text = post_text(&record).unwrap_or_default().to_string();

        let classification = match classify_post(backend, &text).await {
            Ok(c) => {
                stats.classified += 1;
                c
            }
            Err(e) => {
                let url = record.get("url").and_then(Value::as_str).unwrap_or("?");
                warn!(url = %url, error = %e, "Classification failed; keeping empty result");
                stats.failed += 1;
                Classification::default()
            }
        };

        record.insert(
            "classification".to_string(),
            serde_json::to_value(&classification)?,
        );
        serde_json::to_writer(&mut writer, &record)?;
        writer.write_all(b"\n")?;

        if let Some(ref pb) = progress_bar {
            pb.inc(1);
        }

        if index + 1 < total && !options.delay.is_zero() {
            tokio::time::sleep(options.delay).await;
        }
    }
    writer.flush()?;

    if let Some(pb) = progress_bar {
        pb.finish_and_clear();
    }

    info!(
        "Classified {} posts ({} failed, {} skipped) into {}",
        stats.classified,
        stats.failed,
        stats.skipped,
        output.display()
    );

    Ok(stats)
}
