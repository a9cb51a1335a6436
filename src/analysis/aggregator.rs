//! Category summaries and statistics.
//!
//! This module groups attributed posts by one classification field and
//! computes ranked median-gain summaries.

use crate::models::{AttributedPost, CategorySummary, SummaryField, SummaryRow};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Median of a set of gains; `None` for an empty set.
///
/// Even-sized sets average the two middle values.
pub fn median(values: &[i64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    Some(if sorted.len() % 2 == 0 {
        (sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.0
    } else {
        sorted[mid] as f64
    })
}

/// Arithmetic mean; `None` for an empty set.
pub fn mean(values: &[i64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<i64>() as f64 / values.len() as f64)
    }
}

/// Gains of the posts that take part in aggregates.
fn attributed_gains(posts: &[AttributedPost]) -> Vec<i64> {
    posts.iter().filter(|p| p.attributed).map(|p| p.gain).collect()
}

/// Median gain across every attributed post.
pub fn overall_median(posts: &[AttributedPost]) -> Option<f64> {
    median(&attributed_gains(posts))
}

/// `value / overall`, undefined when the overall median is 0.
pub fn relative(value: f64, overall: f64) -> Option<f64> {
    if overall == 0.0 {
        None
    } else {
        Some(value / overall)
    }
}

/// Summarize attributed gains grouped by `field`.
///
/// Returns `None` ("no data") when no post is attributed. Posts lacking a
/// value for the field are left out of the groups but still count toward
/// the overall median. Rows are ranked by median gain, then count, then
/// label.
pub fn summarize(posts: &[AttributedPost], field: SummaryField) -> Option<CategorySummary> {
    let overall = overall_median(posts)?;

    let mut groups: HashMap<String, Vec<i64>> = HashMap::new();
    for p in posts.iter().filter(|p| p.attributed) {
        if let Some(value) = field.value_of(&p.post) {
            groups.entry(value).or_default().push(p.gain);
        }
    }

    let mut rows: Vec<SummaryRow> = groups
        .into_iter()
        .filter_map(|(value, gains)| {
            let median_gain = median(&gains)?;
            Some(SummaryRow {
                value,
                median_gain,
                count: gains.len(),
                relative_performance: relative(median_gain, overall),
            })
        })
        .collect();

    rows.sort_by(rank_rows);

    Some(CategorySummary {
        field,
        overall_median: overall,
        rows,
    })
}

/// Summaries for every field in report order, skipping fields no
/// attributed post carries.
pub fn summarize_all(posts: &[AttributedPost]) -> Vec<CategorySummary> {
    SummaryField::ALL
        .iter()
        .filter_map(|field| summarize(posts, *field))
        .filter(|summary| !summary.rows.is_empty())
        .collect()
}

fn rank_rows(a: &SummaryRow, b: &SummaryRow) -> Ordering {
    b.median_gain
        .partial_cmp(&a.median_gain)
        .unwrap_or(Ordering::Equal)
        .then_with(|| b.count.cmp(&a.count))
        .then_with(|| a.value.cmp(&b.value))
}
