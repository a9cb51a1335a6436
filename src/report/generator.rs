//! Markdown and JSON report generation.
//!
//! The structured document mirrors the text report's sections and embeds
//! the SVG charts.

use super::assembler::{ReportDocument, Section, SectionBody};
use crate::models::WinningFormula;
use anyhow::Result;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(doc: &ReportDocument) -> String {
    let mut output = String::new();

    // Title
    output.push_str(&format!("# {}\n\n", doc.title));

    output.push_str(&generate_metadata_section(doc));
    output.push_str(&generate_winning_formula_section(&doc.winning_formula));

    let (charts, sections): (Vec<&Section>, Vec<&Section>) = doc
        .sections
        .iter()
        .partition(|s| matches!(s.body, SectionBody::Image { .. }));

    for section in sections {
        output.push_str(&generate_section(section));
    }

    if !charts.is_empty() {
        output.push_str("## Charts\n\n");
        for chart in charts {
            output.push_str(&generate_section(chart));
        }
    }

    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(doc: &ReportDocument) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Creator:** {}\n", doc.author));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        doc.generated_at.format("%Y-%m-%d %H:%M:%S")
    ));
    section.push_str(&format!(
        "- **Attribution Window:** {} days after publishing\n",
        doc.window_days
    ));
    section.push_str(&format!(
        "- **Posts Attributed:** {} of {}\n",
        doc.posts_attributed, doc.posts_total
    ));
    if doc.failed_merges > 0 {
        section.push_str(&format!(
            "- **Posts Without Publish Date:** {}\n",
            doc.failed_merges
        ));
    }
    section.push_str(&format!(
        "- **Overall Median Follower Gain:** {}\n",
        doc.overall_median
            .map_or_else(|| "N/A".to_string(), |m| format!("{:.2}", m))
    ));
    section.push('\n');

    section
}

/// Generate the winning formula section.
fn generate_winning_formula_section(formula: &WinningFormula) -> String {
    let mut section = String::new();

    section.push_str("## Winning Formula\n\n");

    if !formula.winning_pattern.is_empty() {
        section.push_str("| Category | Winning Value | Data Evidence |\n");
        section.push_str("|:---|:---|:---|\n");
        for item in &formula.winning_pattern {
            section.push_str(&format!(
                "| {} | {} | {} |\n",
                escape_cell(&item.category),
                escape_cell(&item.winning_value),
                escape_cell(&item.data_evidence)
            ));
        }
        section.push('\n');
    }

    if !formula.key_insight.is_empty() {
        section.push_str(&format!("> 💡 **Key Insight:** {}\n\n", formula.key_insight));
    }

    section
}

fn generate_section(section: &Section) -> String {
    let mut block = String::new();
    let title = section.title.trim_end_matches(':');

    match &section.body {
        SectionBody::Table { columns, rows } => {
            block.push_str(&format!("### {}\n\n", title));
            if rows.is_empty() {
                block.push_str("*No posts.*\n\n");
                return block;
            }
            block.push_str(&format!(
                "| {} |\n",
                columns.iter().map(|c| escape_cell(c)).collect::<Vec<_>>().join(" | ")
            ));
            block.push_str(&format!(
                "|{}\n",
                columns
                    .iter()
                    .enumerate()
                    .map(|(i, _)| if i == 0 { ":---|" } else { "---:|" })
                    .collect::<String>()
            ));
            for row in rows {
                block.push_str(&format!(
                    "| {} |\n",
                    row.iter().map(|c| escape_cell(c)).collect::<Vec<_>>().join(" | ")
                ));
            }
            block.push('\n');
        }
        SectionBody::RankedList { items } => {
            block.push_str(&format!("### {}\n\n", title));
            for (i, item) in items.iter().enumerate() {
                block.push_str(&format!("{}. {}\n", i + 1, item));
            }
            block.push('\n');
        }
        SectionBody::Text { text } => {
            block.push_str(&format!("## {}\n\n", title));
            if !text.is_empty() {
                block.push_str(&format!("{}\n\n", text));
            }
        }
        SectionBody::Image { path, caption } => {
            block.push_str(&format!("![{}]({})\n\n", caption, path));
        }
    }

    block
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str(&format!(
        "*Report generated by prisma {}. Relative performance is a group's median gain divided by the overall median.*\n",
        env!("CARGO_PKG_VERSION")
    ));

    footer
}

/// Generate a JSON report.
pub fn generate_json_report(doc: &ReportDocument) -> Result<String> {
    serde_json::to_string_pretty(doc).map_err(Into::into)
}
