//! Data models for the report pipeline.
//!
//! This module contains the core data structures shared by the loaders,
//! the gain attributor, the aggregators and the report assembler.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// LLM-assigned attributes of one post.
///
/// Field names match the keys the classifier asks the model to return, so a
/// classified record's `classification` object deserializes directly.
/// Every field is optional: older records and failed classifications carry
/// only a subset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    #[serde(rename = "Text Tone", default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub text_tone: Option<String>,
    #[serde(rename = "Topic", default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(rename = "Sentiment", default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<String>,
    #[serde(rename = "Narrative Type", default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub narrative_type: Option<String>,
    #[serde(rename = "Content Framework", default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub content_framework: Option<String>,
    #[serde(rename = "Call to Action", default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub call_to_action: Option<String>,
    #[serde(rename = "Audience Persona", default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub audience_persona: Option<String>,
    #[serde(rename = "Length", default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub length: Option<String>,
    #[serde(rename = "Hashtags", default, deserialize_with = "lenient_hashtags", skip_serializing_if = "Option::is_none")]
    pub hashtags: Option<Vec<String>>,
    #[serde(rename = "Question Present", default, deserialize_with = "lenient_bool", skip_serializing_if = "Option::is_none")]
    pub question_present: Option<bool>,
    #[serde(rename = "Storytelling", default, deserialize_with = "lenient_bool", skip_serializing_if = "Option::is_none")]
    pub storytelling: Option<bool>,
    #[serde(rename = "Value Proposition", default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub value_proposition: Option<String>,
    #[serde(rename = "Engagement Hook", default, deserialize_with = "lenient_bool", skip_serializing_if = "Option::is_none")]
    pub engagement_hook: Option<bool>,
}

impl Classification {
    /// True when the model returned nothing usable.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Empty strings and nulls both mean "not classified".
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Models occasionally answer `"true"` instead of `true`.
fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Bool(b)) => Some(b),
        Some(serde_json::Value::String(s)) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" => Some(true),
            "false" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    })
}

/// Hashtags arrive as a list, or sometimes as one string ("#vc, #ai").
fn lenient_hashtags<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Array(items)) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                    _ => None,
                })
                .collect(),
        ),
        Some(serde_json::Value::String(s)) => Some(
            s.split(|c: char| c == ',' || c.is_whitespace())
                .filter(|tag| !tag.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        _ => None,
    })
}

/// One classified LinkedIn post after normalization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Post {
    /// Post URL without trailing slash.
    pub url: String,
    /// Publish date, if it could be resolved.
    pub publish_date: Option<NaiveDate>,
    /// Media format reported by the scraper (`data.format`).
    pub format: Option<String>,
    pub classification: Classification,
}

/// Strip trailing slashes so URLs from different sources join.
pub fn normalize_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// One day's net-new-follower count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FollowerObservation {
    pub date: NaiveDate,
    pub new_followers: i64,
}

/// A post with its attributed follower gain.
#[derive(Debug, Clone, Serialize)]
pub struct AttributedPost {
    pub post: Post,
    /// Sum of new followers over the attribution window; 0 when unattributed.
    pub gain: i64,
    /// False when the post has no resolvable publish date.
    pub attributed: bool,
}

/// Whether a summary groups by an enumerated value or a true/false flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Categorical,
    Boolean,
}

/// The fields the report summarizes, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SummaryField {
    Format,
    Topic,
    Length,
    TextTone,
    Sentiment,
    NarrativeType,
    ContentFramework,
    EngagementHook,
    Storytelling,
    CallToAction,
    AudiencePersona,
    QuestionPresent,
    HashtagsPresent,
}

impl SummaryField {
    pub const ALL: [SummaryField; 13] = [
        SummaryField::Format,
        SummaryField::Topic,
        SummaryField::Length,
        SummaryField::TextTone,
        SummaryField::Sentiment,
        SummaryField::NarrativeType,
        SummaryField::ContentFramework,
        SummaryField::EngagementHook,
        SummaryField::Storytelling,
        SummaryField::CallToAction,
        SummaryField::AudiencePersona,
        SummaryField::QuestionPresent,
        SummaryField::HashtagsPresent,
    ];

    /// Fixed section number in the text report.
    pub fn number(self) -> usize {
        Self::ALL
            .iter()
            .position(|f| *f == self)
            .map_or(0, |i| i + 1)
    }

    pub fn label(self) -> &'static str {
        match self {
            SummaryField::Format => "Format",
            SummaryField::Topic => "Topic",
            SummaryField::Length => "Length",
            SummaryField::TextTone => "Text Tone",
            SummaryField::Sentiment => "Sentiment",
            SummaryField::NarrativeType => "Narrative Type",
            SummaryField::ContentFramework => "Content Framework",
            SummaryField::EngagementHook => "Engagement Hook",
            SummaryField::Storytelling => "Storytelling",
            SummaryField::CallToAction => "Call to Action",
            SummaryField::AudiencePersona => "Audience Persona",
            SummaryField::QuestionPresent => "Question Present",
            SummaryField::HashtagsPresent => "Hashtags Present",
        }
    }

    /// Section title, e.g. `"1. Follower Gain by Format:"`.
    pub fn title(self) -> String {
        format!("{}. Follower Gain by {}:", self.number(), self.label())
    }

    pub fn kind(self) -> FieldKind {
        match self {
            SummaryField::EngagementHook
            | SummaryField::Storytelling
            | SummaryField::QuestionPresent
            | SummaryField::HashtagsPresent => FieldKind::Boolean,
            _ => FieldKind::Categorical,
        }
    }

    /// Slug used for chart file names.
    pub fn slug(self) -> String {
        self.label().to_lowercase().replace(' ', "_")
    }

    /// The grouping key of a post for this field, if it has one.
    pub fn value_of(self, post: &Post) -> Option<String> {
        let c = &post.classification;
        match self {
            SummaryField::Format => post.format.clone(),
            SummaryField::Topic => c.topic.clone(),
            SummaryField::Length => c.length.clone(),
            SummaryField::TextTone => c.text_tone.clone(),
            SummaryField::Sentiment => c.sentiment.clone(),
            SummaryField::NarrativeType => c.narrative_type.clone(),
            SummaryField::ContentFramework => c.content_framework.clone(),
            SummaryField::CallToAction => c.call_to_action.clone(),
            SummaryField::AudiencePersona => c.audience_persona.clone(),
            SummaryField::EngagementHook => c.engagement_hook.map(bool_label),
            SummaryField::Storytelling => c.storytelling.map(bool_label),
            SummaryField::QuestionPresent => c.question_present.map(bool_label),
            SummaryField::HashtagsPresent => c
                .hashtags
                .as_ref()
                .map(|tags| bool_label(tags.iter().any(|t| !t.trim().is_empty()))),
        }
    }
}

impl fmt::Display for SummaryField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

fn bool_label(value: bool) -> String {
    if value { "True" } else { "False" }.to_string()
}

/// One row of a ranked category summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub value: String,
    pub median_gain: f64,
    pub count: usize,
    /// `median_gain / overall_median`; `None` when the overall median is 0.
    pub relative_performance: Option<f64>,
}

/// Ranked summary of attributed gain grouped by one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub field: SummaryField,
    pub overall_median: f64,
    pub rows: Vec<SummaryRow>,
}

/// Aggregate of gains falling in one calendar period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonBucket {
    /// Display label, e.g. `"October 2024"`, `"Tuesday"`, `"Week 42"`.
    pub label: String,
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub sum: i64,
    /// Percentage difference of `median` from the overall median.
    pub vs_overall_pct: Option<f64>,
}

/// Seasonality tables for one report run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Seasonality {
    pub overall_median: f64,
    /// Ranked by median, highest first.
    pub monthly: Vec<SeasonBucket>,
    /// Monday through Sunday, days without posts omitted.
    pub weekday: Vec<SeasonBucket>,
    /// Ranked by median, highest first.
    pub weekly: Vec<SeasonBucket>,
}

/// Display row for the top/outlier tables.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostRow {
    pub url: String,
    pub activity_id: String,
    pub date: String,
    pub gain: i64,
    pub topic: String,
    pub tone: String,
    pub narrative: String,
    pub framework: String,
}

/// One line of the winning pattern table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternRow {
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Winning Value")]
    pub winning_value: String,
    #[serde(rename = "Data Evidence")]
    pub data_evidence: String,
}

/// Narrative synthesis supplied by the LLM service.
///
/// The default value is empty and renders nothing; it is used when
/// synthesis is switched off.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WinningFormula {
    #[serde(default)]
    pub winning_pattern: Vec<PatternRow>,
    #[serde(default)]
    pub key_insight: String,
}

impl WinningFormula {
    /// Placeholder used when the service returns nothing usable.
    pub fn insufficient() -> Self {
        Self {
            winning_pattern: vec![PatternRow {
                category: "No clear pattern".to_string(),
                winning_value: "No clear pattern".to_string(),
                data_evidence: "Insufficient data".to_string(),
            }],
            key_insight: "Insufficient data to identify clear patterns".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_url() {
        assert_eq!(
            normalize_url("https://www.linkedin.com/feed/update/urn:li:activity:1/"),
            "https://www.linkedin.com/feed/update/urn:li:activity:1"
        );
        assert_eq!(normalize_url(" https://x.com/a// "), "https://x.com/a");
    }

    #[test]
    fn test_field_titles_are_numbered_in_order() {
        assert_eq!(SummaryField::Format.title(), "1. Follower Gain by Format:");
        assert_eq!(
            SummaryField::CallToAction.title(),
            "10. Follower Gain by Call to Action:"
        );
        assert_eq!(
            SummaryField::HashtagsPresent.title(),
            "13. Follower Gain by Hashtags Present:"
        );
    }

    #[test]
    fn test_classification_is_lenient() {
        let json = r##"{
            "Topic": "Venture Capital",
            "Text Tone": "",
            "Question Present": "true",
            "Storytelling": false,
            "Hashtags": ["#vc"],
            "Unknown Field": 3
        }"##;
        let c: Classification = serde_json::from_str(json).unwrap();
        assert_eq!(c.topic.as_deref(), Some("Venture Capital"));
        assert_eq!(c.text_tone, None);
        assert_eq!(c.question_present, Some(true));
        assert_eq!(c.storytelling, Some(false));
        assert_eq!(c.engagement_hook, None);
        assert!(!c.is_empty());
        assert!(Classification::default().is_empty());
    }

    #[test]
    fn test_hashtags_accept_list_or_text() {
        let c: Classification =
            serde_json::from_str(r##"{"Hashtags": "#vc #ai,#seed", "Topic": "Leadership"}"##).unwrap();
        assert_eq!(
            c.hashtags,
            Some(vec!["#vc".to_string(), "#ai".to_string(), "#seed".to_string()])
        );
        assert_eq!(c.topic.as_deref(), Some("Leadership"));

        let c: Classification = serde_json::from_str(r##"{"Hashtags": ["#vc", ""]}"##).unwrap();
        assert_eq!(c.hashtags, Some(vec!["#vc".to_string()]));

        let c: Classification = serde_json::from_str(r#"{"Hashtags": 7}"#).unwrap();
        assert_eq!(c.hashtags, None);
    }

    #[test]
    fn test_value_of_boolean_and_derived_fields() {
        let post = Post {
            url: "u".to_string(),
            publish_date: None,
            format: Some("Image".to_string()),
            classification: Classification {
                question_present: Some(false),
                hashtags: Some(vec![]),
                ..Default::default()
            },
        };
        assert_eq!(SummaryField::Format.value_of(&post).as_deref(), Some("Image"));
        assert_eq!(
            SummaryField::QuestionPresent.value_of(&post).as_deref(),
            Some("False")
        );
        assert_eq!(
            SummaryField::HashtagsPresent.value_of(&post).as_deref(),
            Some("False")
        );
        assert_eq!(SummaryField::Topic.value_of(&post), None);
        assert_eq!(SummaryField::QuestionPresent.kind(), FieldKind::Boolean);
        assert_eq!(SummaryField::Topic.kind(), FieldKind::Categorical);
    }
}
