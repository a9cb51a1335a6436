//! The report run.
//!
//! Load → attribute → aggregate → synthesize → assemble → write, over
//! explicit inputs and an injected model backend.

use crate::analysis::{outliers, overall_median, seasonality, summarize_all, top_posts};
use crate::attribution::attribute;
use crate::cli::OutputFormat;
use crate::ingest::author_from_log;
use crate::llm::synthesis::{build_prompt, synthesize, SynthesisContext};
use crate::llm::LlmBackend;
use crate::loader::{load_classified, load_followers, load_top_posts, AnalyticsExport};
use crate::models::WinningFormula;
use crate::report::{
    assemble, generate_json_report, generate_markdown_report, generate_text_report,
    render_charts, ReportDocument, ReportInputs,
};
use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Name used when no source names the creator.
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

/// Everything one report run needs.
#[derive(Debug, Clone)]
pub struct ReportRequest {
    pub classified: PathBuf,
    pub export: AnalyticsExport,
    pub author: String,
    pub reports_dir: PathBuf,
    pub window_days: u32,
    pub top_posts: usize,
    pub outliers: usize,
    pub format: OutputFormat,
    pub charts: bool,
    pub synthesis: bool,
    pub generated_at: NaiveDateTime,
}

/// Files written by a report run.
#[derive(Debug)]
pub struct ReportArtifacts {
    pub text_path: PathBuf,
    pub document_path: PathBuf,
    pub prompt_path: Option<PathBuf>,
    pub charts: usize,
    pub document: ReportDocument,
}

/// Pick the creator name: explicit, then the export file name, then the
/// classified log name.
pub fn resolve_author(
    explicit: Option<&str>,
    export: Option<&AnalyticsExport>,
    classified: Option<&Path>,
) -> String {
    explicit
        .map(str::to_string)
        .or_else(|| export.and_then(|e| e.author.clone()))
        .or_else(|| classified.and_then(author_from_log))
        .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string())
}

/// File stem shared by every artifact of one run.
fn report_stem(author: &str, generated_at: &NaiveDateTime) -> String {
    let stamp = generated_at.format("%Y%m%d_%H%M%S");
    if author == UNKNOWN_AUTHOR {
        format!("linkedin_report_{stamp}")
    } else {
        format!("linkedin_report_{}_{stamp}", author.replace(' ', "_"))
    }
}

/// Run the full report pipeline.
pub async fn run_report<B: LlmBackend>(request: &ReportRequest, backend: &B) -> Result<ReportArtifacts> {
    let posts = load_classified(&request.classified).with_context(|| {
        format!(
            "Failed to load classified posts from {}",
            request.classified.display()
        )
    })?;
    let followers = load_followers(&request.export.followers)
        .with_context(|| format!("Failed to load {}", request.export.followers.display()))?;
    let fallback_dates = match &request.export.top_posts {
        Some(path) => load_top_posts(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => HashMap::new(),
    };

    let outcome = attribute(posts, &followers, &fallback_dates, request.window_days)?;
    let attributed = &outcome.posts;

    let summaries = summarize_all(attributed);
    let overall = overall_median(attributed);
    let season = seasonality(attributed);
    let top = top_posts(attributed, request.top_posts);
    let (outliers_top, outliers_bottom) = outliers(attributed, request.outliers);

    info!(
        "Computed {} category summaries over {} attributed posts",
        summaries.len(),
        outcome.attributed_count()
    );

    std::fs::create_dir_all(&request.reports_dir).with_context(|| {
        format!(
            "Failed to create reports directory {}",
            request.reports_dir.display()
        )
    })?;
    let stem = report_stem(&request.author, &request.generated_at);

    let (winning_formula, prompt_path) = match overall {
        Some(overall) if request.synthesis => {
            let prompt = build_prompt(&SynthesisContext {
                author: &request.author,
                window_days: request.window_days,
                overall_median: overall,
                summaries: &summaries,
                seasonality: season.as_ref(),
                top_posts: &top,
            });
            let prompt_path = request.reports_dir.join(format!("{stem}_prompt.txt"));
            std::fs::write(&prompt_path, &prompt)
                .with_context(|| format!("Failed to write {}", prompt_path.display()))?;
            (synthesize(backend, &prompt).await, Some(prompt_path))
        }
        Some(_) => (WinningFormula::default(), None),
        None => {
            warn!("No attributed posts; skipping winning formula synthesis");
            (WinningFormula::insufficient(), None)
        }
    };

    let mut document = assemble(ReportInputs {
        author: &request.author,
        generated_at: request.generated_at,
        window_days: request.window_days,
        overall_median: overall,
        posts_total: outcome.posts.len(),
        posts_attributed: outcome.attributed_count(),
        failed_merges: outcome.failed_merges,
        summaries: &summaries,
        top_posts: &top,
        outlier_count: request.outliers,
        outliers_top: &outliers_top,
        outliers_bottom: &outliers_bottom,
        seasonality: season.as_ref(),
        winning_formula,
    });

    let text_path = request.reports_dir.join(format!("{stem}.txt"));
    std::fs::write(&text_path, generate_text_report(&document))
        .with_context(|| format!("Failed to write {}", text_path.display()))?;

    let mut charts = 0;
    if request.charts {
        let chart_sections = render_charts(
            &summaries,
            season.as_ref(),
            &request.reports_dir.join("images"),
            &stem,
            "images",
        )
        .context("Failed to render charts")?;
        charts = chart_sections.len();
        document.sections.extend(chart_sections);
    }

    let document_path = request
        .reports_dir
        .join(format!("{stem}.{}", request.format.extension()));
    let content = match request.format {
        OutputFormat::Markdown => generate_markdown_report(&document),
        OutputFormat::Json => generate_json_report(&document)?,
    };
    std::fs::write(&document_path, content)
        .with_context(|| format!("Failed to write {}", document_path.display()))?;

    info!(
        "Wrote {} and {}",
        text_path.display(),
        document_path.display()
    );

    Ok(ReportArtifacts {
        text_path,
        document_path,
        prompt_path,
        charts,
        document,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PrismaError;
    use crate::llm::testing::StubBackend;
    use chrono::NaiveDate;
    use serde_json::json;
    use tempfile::TempDir;

    const FOLLOWERS: &str = "Total followers on 1/31/2024:,1520\n\
        ,\n\
        Date,New followers\n\
        1/1/2024,5\n\
        1/2/2024,3\n\
        1/4/2024,2\n\
        1/8/2024,7\n\
        1/9/2024,1\n";

    const TOP_POSTS: &str = "Post URL,Post publish date,Engagements,Post URL,Post publish date,Impressions\n\
        https://www.linkedin.com/feed/update/urn:li:activity:3/,1/8/2024,40,,,\n";

    fn classified_lines() -> String {
        [
            r##"{"url": "https://www.linkedin.com/feed/update/urn:li:activity:1/", "publish_date": "2024-01-01", "data": {"format": "Image"}, "classification": {"Topic": "Venture Capital", "Text Tone": "Professional", "Question Present": true, "Hashtags": ["#vc"]}}"##,
            r#"{"url": "https://www.linkedin.com/feed/update/urn:li:activity:2", "publish_date": "2024-01-02", "data": {"format": "Text"}, "classification": {"Topic": "Leadership", "Question Present": false, "Hashtags": []}}"#,
            r#"{"url": "https://www.linkedin.com/feed/update/urn:li:activity:3", "publish_date": null, "data": {"format": "Text"}, "classification": {"Topic": "Leadership"}}"#,
            r#"{"url": "https://www.linkedin.com/feed/update/urn:li:activity:4", "publish_date": "someday", "classification": {"Topic": "Marketing"}}"#,
        ]
        .join("\n")
    }

    fn setup(dir: &TempDir, classified: &str) -> ReportRequest {
        let data = dir.path().join("data");
        std::fs::create_dir_all(&data).unwrap();
        let followers = data.join("Content_2024-01-01_2024-01-31_JaneDoe_FOLLOWERS.csv");
        std::fs::write(&followers, FOLLOWERS).unwrap();
        std::fs::write(
            data.join("Content_2024-01-01_2024-01-31_JaneDoe_TOP_POSTS.csv"),
            TOP_POSTS,
        )
        .unwrap();
        let classified_path = data.join("classified_posts_Jane_Doe.jsonl");
        std::fs::write(&classified_path, classified).unwrap();

        let export = AnalyticsExport::from_followers(followers);
        ReportRequest {
            classified: classified_path,
            author: resolve_author(None, Some(&export), None),
            export,
            reports_dir: dir.path().join("reports"),
            window_days: 3,
            top_posts: 10,
            outliers: 3,
            format: OutputFormat::Markdown,
            charts: true,
            synthesis: true,
            generated_at: NaiveDate::from_ymd_opt(2024, 2, 1)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
        }
    }

    fn formula_answer() -> StubBackend {
        StubBackend::new(vec![Ok(json!({
            "winning_pattern": [
                {"Category": "Topic", "Winning Value": "Leadership", "Data Evidence": "median 8.0"}
            ],
            "key_insight": "Leadership posts win."
        }))])
    }

    #[tokio::test]
    async fn test_report_end_to_end() {
        let dir = TempDir::new().unwrap();
        let request = setup(&dir, &classified_lines());
        assert_eq!(request.author, "Jane Doe");

        let backend = formula_answer();
        let artifacts = run_report(&request, &backend).await.unwrap();

        assert_eq!(
            artifacts.text_path,
            dir.path().join("reports/linkedin_report_Jane_Doe_20240201_080000.txt")
        );
        assert!(artifacts.document_path.ends_with("linkedin_report_Jane_Doe_20240201_080000.md"));
        assert!(artifacts.prompt_path.as_ref().unwrap().exists());
        assert_eq!(backend.prompt_count(), 1);

        // Post 1: 5+3+2 = 10. Post 2: 3+2 = 5. Post 3 dated from the
        // export: 7+1 = 8. Post 4 stays unresolved.
        let doc = &artifacts.document;
        assert_eq!(doc.posts_total, 4);
        assert_eq!(doc.posts_attributed, 3);
        assert_eq!(doc.failed_merges, 1);
        assert_eq!(doc.overall_median, Some(8.0));

        let text = std::fs::read_to_string(&artifacts.text_path).unwrap();
        assert!(text.starts_with("Report generated on: 2024-02-01 08:00:00\n\nWINNING FORMULA\n\n"));
        assert!(text.contains("Overall Median Follower Gain (3 days): 8.00"));
        assert!(text.contains("Key Insight: Leadership posts win."));
        assert!(text.contains("1. Follower Gain by Format:"));
        assert!(text.contains("2. Follower Gain by Topic:"));
        assert!(text.contains("12. Follower Gain by Question Present:"));
        assert!(text.contains("13. Follower Gain by Hashtags Present:"));
        assert!(!text.contains("Follower Gain by Sentiment"));
        assert!(!text.contains("Marketing"));
        assert!(text.contains("14. Top Posts by Follower Gain:"));
        assert!(text.contains("15. Top 3 Posts:"));
        assert!(text.contains("16. Bottom 3 Posts:"));
        assert!(text.contains("SEASONALITY ANALYSIS"));
        assert!(text.contains("January 2024: 8.0 median followers (n=3) - +0% vs average"));

        let markdown = std::fs::read_to_string(&artifacts.document_path).unwrap();
        assert!(markdown.contains("## Charts"));
        assert!(artifacts.charts > 0);
        assert!(dir
            .path()
            .join("reports/images/linkedin_report_Jane_Doe_20240201_080000_topic.svg")
            .exists());
    }

    #[tokio::test]
    async fn test_report_without_synthesis_or_charts_as_json() {
        let dir = TempDir::new().unwrap();
        let mut request = setup(&dir, &classified_lines());
        request.synthesis = false;
        request.charts = false;
        request.format = OutputFormat::Json;

        let backend = StubBackend::default();
        let artifacts = run_report(&request, &backend).await.unwrap();

        assert_eq!(backend.prompt_count(), 0);
        assert!(artifacts.prompt_path.is_none());
        assert_eq!(artifacts.charts, 0);
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&artifacts.document_path).unwrap()).unwrap();
        assert_eq!(json["author"], "Jane Doe");
        assert_eq!(json["posts_attributed"], 3);
    }

    #[tokio::test]
    async fn test_all_unresolved_posts_abort_the_run() {
        let dir = TempDir::new().unwrap();
        let request = setup(
            &dir,
            r#"{"url": "https://x.com/p/9", "publish_date": "bad", "classification": {}}"#,
        );

        let err = run_report(&request, &StubBackend::default()).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PrismaError>(),
            Some(PrismaError::AllMergesFailed { total: 1 })
        ));
        assert!(!dir.path().join("reports").exists());
    }

    #[tokio::test]
    async fn test_empty_post_set_reports_no_data() {
        let dir = TempDir::new().unwrap();
        let request = setup(&dir, "");

        let artifacts = run_report(&request, &StubBackend::default()).await.unwrap();
        let text = std::fs::read_to_string(&artifacts.text_path).unwrap();
        assert!(text.contains("Overall Median Follower Gain (3 days): N/A"));
        assert!(text.contains("NO DATA"));
        assert!(text.contains("No clear pattern"));
    }

    #[test]
    fn test_resolve_author_precedence() {
        let export = AnalyticsExport {
            followers: PathBuf::from("x.csv"),
            top_posts: None,
            author: Some("From Export".to_string()),
        };
        assert_eq!(resolve_author(Some("Given"), Some(&export), None), "Given");
        assert_eq!(resolve_author(None, Some(&export), None), "From Export");
        assert_eq!(
            resolve_author(None, None, Some(Path::new("classified_posts_Ana_Perez.jsonl"))),
            "Ana Perez"
        );
        assert_eq!(resolve_author(None, None, None), UNKNOWN_AUTHOR);
    }
}
