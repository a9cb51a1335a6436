//! Winning formula synthesis.
//!
//! The model sees only figures the aggregator already computed and is asked
//! to restate the strongest patterns. Its answer is embedded verbatim.

use super::{LlmBackend, ToolDefinition};
use crate::models::{CategorySummary, PostRow, Seasonality, WinningFormula};
use serde_json::json;
use tracing::{info, warn};

/// Category rows quoted per summary.
const ROWS_PER_CATEGORY: usize = 3;

const SYSTEM_PROMPT: &str = r#"You are a LinkedIn growth strategist.
You receive follower-gain statistics for one creator's posts.
Identify the combination of attributes that wins followers and call the winning_formula tool.
Only restate numbers that appear in the statistics. Never compute new percentages."#;

/// Inputs quoted in the synthesis prompt.
pub struct SynthesisContext<'a> {
    pub author: &'a str,
    pub window_days: u32,
    pub overall_median: f64,
    pub summaries: &'a [CategorySummary],
    pub seasonality: Option<&'a Seasonality>,
    pub top_posts: &'a [PostRow],
}

pub fn formula_tool() -> ToolDefinition {
    ToolDefinition::function(
        "winning_formula",
        "Record the winning content pattern",
        json!({
            "type": "object",
            "properties": {
                "winning_pattern": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "Category": {"type": "string"},
                            "Winning Value": {"type": "string"},
                            "Data Evidence": {"type": "string"}
                        },
                        "required": ["Category", "Winning Value", "Data Evidence"]
                    }
                },
                "key_insight": {"type": "string"}
            },
            "required": ["winning_pattern", "key_insight"]
        }),
    )
}

/// Build the synthesis prompt from computed statistics.
pub fn build_prompt(ctx: &SynthesisContext<'_>) -> String {
    let mut prompt = String::new();

    prompt.push_str(&format!(
        "Creator: {}\nAttribution window: {} days after publishing\nOverall median follower gain: {:.2}\n\n",
        ctx.author, ctx.window_days, ctx.overall_median
    ));

    prompt.push_str("=== FOLLOWER GAIN BY CATEGORY ===\n");
    for summary in ctx.summaries {
        prompt.push_str(&format!("{}\n", summary.field.label()));
        for row in summary.rows.iter().take(ROWS_PER_CATEGORY) {
            let relative = row
                .relative_performance
                .map(|r| format!("{:.2}x overall", r))
                .unwrap_or_else(|| "N/A".to_string());
            prompt.push_str(&format!(
                "- {}: median {:.2}, {} posts, {}\n",
                row.value, row.median_gain, row.count, relative
            ));
        }
    }

    if let Some(season) = ctx.seasonality {
        prompt.push_str("\n=== TIMING ===\n");
        if let Some(best) = season.weekday.iter().max_by(|a, b| {
            a.median
                .partial_cmp(&b.median)
                .unwrap_or(std::cmp::Ordering::Equal)
        }) {
            prompt.push_str(&format!(
                "Best weekday: {} (median {:.2}, {} posts)\n",
                best.label, best.median, best.count
            ));
        }
        if let Some(best) = season.monthly.first() {
            prompt.push_str(&format!(
                "Best month: {} (median {:.2}, {} posts)\n",
                best.label, best.median, best.count
            ));
        }
    }

    if !ctx.top_posts.is_empty() {
        prompt.push_str("\n=== TOP POSTS ===\n");
        for row in ctx.top_posts {
            prompt.push_str(&format!(
                "- {} gained {} followers | {} | {} | {} | {}\n",
                row.date, row.gain, row.topic, row.tone, row.narrative, row.framework
            ));
        }
    }

    prompt.push_str("\nReturn 3 to 6 winning pattern rows and one key insight.");
    prompt
}

/// Ask the model for the winning formula.
///
/// Any failure, or an answer without pattern rows, yields
/// [`WinningFormula::insufficient`].
pub async fn synthesize<B: LlmBackend>(backend: &B, prompt: &str) -> WinningFormula {
    let value = match backend
        .structured(SYSTEM_PROMPT, prompt, &formula_tool())
        .await
    {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "Winning formula synthesis failed");
            return WinningFormula::insufficient();
        }
    };

    match serde_json::from_value::<WinningFormula>(value) {
        Ok(formula) if !formula.winning_pattern.is_empty() => {
            info!(
                "Synthesized winning formula with {} pattern rows",
                formula.winning_pattern.len()
            );
            formula
        }
        Ok(_) => {
            warn!("Model returned an empty winning pattern");
            WinningFormula::insufficient()
        }
        Err(e) => {
            warn!(error = %e, "Could not parse winning formula");
            WinningFormula::insufficient()
        }
    }
}
