//! Plain-text report rendering.
//!
//! Section titles are a compatibility surface: downstream tools split the
//! text report on them, so they are written exactly as assembled.

use super::assembler::{ReportDocument, SectionBody};

/// Render the text report.
pub fn generate_text_report(doc: &ReportDocument) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Report generated on: {}\n\n",
        doc.generated_at.format("%Y-%m-%d %H:%M:%S")
    ));
    output.push_str("WINNING FORMULA\n\n");
    output.push_str(&format!(
        "Overall Median Follower Gain ({} days): {}\n\n",
        doc.window_days,
        doc.overall_median
            .map_or_else(|| "N/A".to_string(), |m| format!("{:.2}", m))
    ));

    if !doc.winning_formula.winning_pattern.is_empty() {
        output.push_str("Winning Pattern:\n");
        for item in &doc.winning_formula.winning_pattern {
            output.push_str(&format!("{}\n", item.category));
            output.push_str(&format!("Winning Value: {}\n", item.winning_value));
            output.push_str(&format!("Data Evidence: {}\n", item.data_evidence));
            output.push('\n');
        }
    }

    if !doc.winning_formula.key_insight.is_empty() {
        output.push_str(&format!("Key Insight: {}\n\n", doc.winning_formula.key_insight));
    }

    let body: Vec<String> = doc
        .sections
        .iter()
        .filter_map(|section| {
            let content = match &section.body {
                SectionBody::Table { columns, rows } => format_table(columns, rows),
                SectionBody::RankedList { items } => items.join("\n"),
                SectionBody::Text { text } => text.clone(),
                SectionBody::Image { .. } => return None,
            };
            Some(format!("{}\n{}\n", section.title, content))
        })
        .collect();

    output.push_str(&body.join("\n"));
    output
}

/// Column-aligned table; the first column is left-aligned, the rest right.
pub fn format_table(columns: &[String], rows: &[Vec<String>]) -> String {
    if rows.is_empty() {
        return "(no posts)".to_string();
    }

    let mut widths: Vec<usize> = columns.iter().map(|c| c.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let render = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(i, (cell, width))| {
                if i == 0 {
                    format!("{:<width$}", cell, width = *width)
                } else {
                    format!("{:>width$}", cell, width = *width)
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![render(columns)];
    lines.extend(rows.iter().map(|row| render(row.as_slice())));
    lines.join("\n")
}
