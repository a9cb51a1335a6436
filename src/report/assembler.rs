//! Report document assembly.
//!
//! Turns computed summaries, selections and seasonality into an ordered
//! list of named sections. Every figure shown here was computed upstream;
//! this module only formats.

use crate::models::{
    CategorySummary, PostRow, SeasonBucket, Seasonality, WinningFormula,
};
use chrono::NaiveDateTime;
use serde::Serialize;

/// Weeks listed in the seasonality section.
pub const TOP_WEEKS: usize = 5;

pub const SEASONALITY_TITLE: &str = "SEASONALITY ANALYSIS";

/// A complete report, ready for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct ReportDocument {
    pub title: String,
    pub author: String,
    pub generated_at: NaiveDateTime,
    pub window_days: u32,
    /// `None` when no post could be attributed.
    pub overall_median: Option<f64>,
    pub posts_total: usize,
    pub posts_attributed: usize,
    pub failed_merges: usize,
    pub winning_formula: WinningFormula,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub title: String,
    pub body: SectionBody,
}

/// Section content.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SectionBody {
    Table {
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    RankedList {
        items: Vec<String>,
    },
    Text {
        text: String,
    },
    Image {
        path: String,
        caption: String,
    },
}

impl Section {
    pub fn image(title: impl Into<String>, path: impl Into<String>, caption: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: SectionBody::Image {
                path: path.into(),
                caption: caption.into(),
            },
        }
    }
}

/// Everything the assembler embeds.
pub struct ReportInputs<'a> {
    pub author: &'a str,
    pub generated_at: NaiveDateTime,
    pub window_days: u32,
    pub overall_median: Option<f64>,
    pub posts_total: usize,
    pub posts_attributed: usize,
    pub failed_merges: usize,
    pub summaries: &'a [CategorySummary],
    pub top_posts: &'a [PostRow],
    pub outlier_count: usize,
    pub outliers_top: &'a [PostRow],
    pub outliers_bottom: &'a [PostRow],
    pub seasonality: Option<&'a Seasonality>,
    pub winning_formula: WinningFormula,
}

/// Assemble the report sections in their fixed order.
pub fn assemble(inputs: ReportInputs<'_>) -> ReportDocument {
    let mut sections = Vec::new();

    if inputs.overall_median.is_none() {
        sections.push(Section {
            title: "NO DATA".to_string(),
            body: SectionBody::Text {
                text: "No post could be attributed a follower gain; nothing to summarize."
                    .to_string(),
            },
        });
    }

    for summary in inputs.summaries {
        sections.push(summary_section(summary));
    }

    sections.push(posts_section(
        "14. Top Posts by Follower Gain:".to_string(),
        inputs.top_posts,
    ));
    sections.push(posts_section(
        format!("15. Top {} Posts:", inputs.outlier_count),
        inputs.outliers_top,
    ));
    sections.push(posts_section(
        format!("16. Bottom {} Posts:", inputs.outlier_count),
        inputs.outliers_bottom,
    ));

    if let Some(season) = inputs.seasonality {
        sections.extend(seasonality_sections(season));
    }

    ReportDocument {
        title: format!("LinkedIn Content Performance Report: {}", inputs.author),
        author: inputs.author.to_string(),
        generated_at: inputs.generated_at,
        window_days: inputs.window_days,
        overall_median: inputs.overall_median,
        posts_total: inputs.posts_total,
        posts_attributed: inputs.posts_attributed,
        failed_merges: inputs.failed_merges,
        winning_formula: inputs.winning_formula,
        sections,
    }
}

fn summary_section(summary: &CategorySummary) -> Section {
    let rows = summary
        .rows
        .iter()
        .map(|row| {
            vec![
                row.value.clone(),
                format!("{:.1}", row.median_gain),
                row.count.to_string(),
                format_relative(row.relative_performance),
            ]
        })
        .collect();

    Section {
        title: summary.field.title(),
        body: SectionBody::Table {
            columns: vec![
                summary.field.label().to_string(),
                "Median Gain".to_string(),
                "Count".to_string(),
                "Relative Performance".to_string(),
            ],
            rows,
        },
    }
}

pub fn format_relative(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{:.2}", v))
}

fn posts_section(title: String, posts: &[PostRow]) -> Section {
    let rows = posts
        .iter()
        .map(|p| {
            vec![
                p.activity_id.clone(),
                p.date.clone(),
                p.gain.to_string(),
                p.topic.clone(),
                p.tone.clone(),
                p.narrative.clone(),
                p.framework.clone(),
            ]
        })
        .collect();

    Section {
        title,
        body: SectionBody::Table {
            columns: [
                "Post",
                "Date",
                "Follower Gain",
                "Topic",
                "Text Tone",
                "Narrative Type",
                "Content Framework",
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
            rows,
        },
    }
}

fn seasonality_sections(season: &Seasonality) -> Vec<Section> {
    let list = |title: &str, buckets: &[SeasonBucket]| Section {
        title: title.to_string(),
        body: SectionBody::RankedList {
            items: buckets.iter().map(bucket_line).collect(),
        },
    };

    let top_weeks: Vec<SeasonBucket> = season.weekly.iter().take(TOP_WEEKS).cloned().collect();

    vec![
        Section {
            title: SEASONALITY_TITLE.to_string(),
            body: SectionBody::Text {
                text: format!(
                    "Overall median follower gain: {:.1}",
                    season.overall_median
                ),
            },
        },
        list("Monthly Follower Gains:", &season.monthly),
        list("Follower Gains by Day of Week:", &season.weekday),
        list("Top 5 Weeks for Follower Gains:", &top_weeks),
    ]
}

/// `"Tuesday: 6.0 median followers (n=3) - +50% vs average"`.
fn bucket_line(bucket: &SeasonBucket) -> String {
    let pct = bucket
        .vs_overall_pct
        .map_or_else(|| "N/A".to_string(), |p| format!("{:+.0}%", p));
    format!(
        "{}: {:.1} median followers (n={}) - {} vs average",
        bucket.label, bucket.median, bucket.count, pct
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SummaryField, SummaryRow};
    use chrono::NaiveDate;

    fn generated_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 11, 5)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn bucket(label: &str, median: f64, pct: Option<f64>) -> SeasonBucket {
        SeasonBucket {
            label: label.to_string(),
            count: 3,
            mean: median,
            median,
            sum: (median * 3.0) as i64,
            vs_overall_pct: pct,
        }
    }

    fn inputs<'a>(
        summaries: &'a [CategorySummary],
        top: &'a [PostRow],
        season: Option<&'a Seasonality>,
    ) -> ReportInputs<'a> {
        ReportInputs {
            author: "Jane Doe",
            generated_at: generated_at(),
            window_days: 3,
            overall_median: Some(4.0),
            posts_total: 3,
            posts_attributed: 3,
            failed_merges: 0,
            summaries,
            top_posts: top,
            outlier_count: 3,
            outliers_top: top,
            outliers_bottom: top,
            seasonality: season,
            winning_formula: WinningFormula::insufficient(),
        }
    }

    #[test]
    fn test_sections_follow_fixed_titles() {
        let summaries = vec![CategorySummary {
            field: SummaryField::CallToAction,
            overall_median: 4.0,
            rows: vec![SummaryRow {
                value: "Comment".to_string(),
                median_gain: 6.0,
                count: 2,
                relative_performance: Some(1.5),
            }],
        }];
        let doc = assemble(inputs(&summaries, &[], None));

        let titles: Vec<&str> = doc.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "10. Follower Gain by Call to Action:",
                "14. Top Posts by Follower Gain:",
                "15. Top 3 Posts:",
                "16. Bottom 3 Posts:",
            ]
        );
        match &doc.sections[0].body {
            SectionBody::Table { columns, rows } => {
                assert_eq!(columns[0], "Call to Action");
                assert_eq!(rows[0], vec!["Comment", "6.0", "2", "1.50"]);
            }
            other => panic!("unexpected body: {:?}", other),
        }
    }

    #[test]
    fn test_seasonality_lines_and_week_limit() {
        let season = Seasonality {
            overall_median: 4.0,
            monthly: vec![bucket("October 2024", 6.0, Some(50.0))],
            weekday: vec![bucket("Monday", 2.0, Some(-50.0))],
            weekly: (1..=7)
                .map(|w| bucket(&format!("Week {w}"), 4.0, None))
                .collect(),
        };
        let doc = assemble(inputs(&[], &[], Some(&season)));

        let idx = doc
            .sections
            .iter()
            .position(|s| s.title == SEASONALITY_TITLE)
            .unwrap();
        match &doc.sections[idx + 1].body {
            SectionBody::RankedList { items } => assert_eq!(
                items[0],
                "October 2024: 6.0 median followers (n=3) - +50% vs average"
            ),
            other => panic!("unexpected body: {:?}", other),
        }
        match &doc.sections[idx + 2].body {
            SectionBody::RankedList { items } => {
                assert_eq!(items[0], "Monday: 2.0 median followers (n=3) - -50% vs average")
            }
            other => panic!("unexpected body: {:?}", other),
        }
        match &doc.sections[idx + 3].body {
            SectionBody::RankedList { items } => {
                assert_eq!(items.len(), TOP_WEEKS);
                assert!(items[0].ends_with("N/A vs average"));
            }
            other => panic!("unexpected body: {:?}", other),
        }
    }

    #[test]
    fn test_no_data_section() {
        let mut input = inputs(&[], &[], None);
        input.overall_median = None;
        let doc = assemble(input);
        assert_eq!(doc.sections[0].title, "NO DATA");
        assert_eq!(doc.title, "LinkedIn Content Performance Report: Jane Doe");
    }

    #[test]
    fn test_format_relative() {
        assert_eq!(format_relative(Some(1.234)), "1.23");
        assert_eq!(format_relative(None), "N/A");
    }
}
