//! Follower-gain attribution.
//!
//! Each post is credited with the net new followers observed from its
//! publish date through `window_days` days later, inclusive. Windows of
//! posts published close together overlap and count the same followers
//! more than once.

use crate::error::PrismaError;
use crate::models::{AttributedPost, FollowerObservation, Post};
use chrono::{Duration, NaiveDate};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};

/// Number of unresolved URLs shown in the failed-merge warning.
const FAILED_SAMPLE: usize = 5;

/// Result of attributing gains to a post set.
#[derive(Debug, Clone)]
pub struct AttributionOutcome {
    /// Every input post, in input order.
    pub posts: Vec<AttributedPost>,
    /// Posts whose publish date could not be resolved from either source.
    pub failed_merges: usize,
}

impl AttributionOutcome {
    /// Posts that take part in aggregates.
    pub fn attributed(&self) -> impl Iterator<Item = &AttributedPost> {
        self.posts.iter().filter(|p| p.attributed)
    }

    pub fn attributed_count(&self) -> usize {
        self.posts.len() - self.failed_merges
    }
}

/// Day-indexed follower series.
#[derive(Debug, Clone, Default)]
pub struct FollowerSeries {
    by_day: BTreeMap<NaiveDate, i64>,
}

impl FollowerSeries {
    pub fn new(observations: &[FollowerObservation]) -> Self {
        let mut by_day = BTreeMap::new();
        for obs in observations {
            *by_day.entry(obs.date).or_insert(0) += obs.new_followers;
        }
        Self { by_day }
    }

    /// Sum of new followers over `[start, start + window_days]`.
    ///
    /// Days without an observation contribute zero.
    pub fn window_sum(&self, start: NaiveDate, window_days: u32) -> i64 {
        let end = start + Duration::days(i64::from(window_days));
        self.by_day.range(start..=end).map(|(_, n)| *n).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_day.is_empty()
    }
}

/// Attribute follower gains to posts.
///
/// A post's own publish date wins; `fallback_dates` (URL → date from the
/// analytics export's TOP POSTS sheet) fills the gaps. Posts resolved by
/// neither keep gain 0 with `attributed = false`. If no post at all can be
/// resolved the run is aborted with [`PrismaError::AllMergesFailed`].
pub fn attribute(
    posts: Vec<Post>,
    followers: &[FollowerObservation],
    fallback_dates: &HashMap<String, NaiveDate>,
    window_days: u32,
) -> Result<AttributionOutcome, PrismaError> {
    let series = FollowerSeries::new(followers);
    if series.is_empty() {
        warn!("Follower series is empty; every attributed gain will be 0");
    }

    let total = posts.len();
    let mut filled = 0usize;
    let mut failed: Vec<String> = Vec::new();

    let attributed: Vec<AttributedPost> = posts
        .into_iter()
        .map(|mut post| {
            if post.publish_date.is_none() {
                if let Some(date) = fallback_dates.get(&post.url) {
                    debug!(url = %post.url, %date, "Publish date filled from analytics export");
                    post.publish_date = Some(*date);
                    filled += 1;
                }
            }

            match post.publish_date {
                Some(date) => AttributedPost {
                    gain: series.window_sum(date, window_days),
                    attributed: true,
                    post,
                },
                None => {
                    failed.push(post.url.clone());
                    AttributedPost {
                        post,
                        gain: 0,
                        attributed: false,
                    }
                }
            }
        })
        .collect();

    if total > 0 && failed.len() == total {
        return Err(PrismaError::AllMergesFailed { total });
    }

    if !failed.is_empty() {
        warn!(
            "{} of {} posts have no resolvable publish date and are excluded from aggregates (e.g. {})",
            failed.len(),
            total,
            failed
                .iter()
                .take(FAILED_SAMPLE)
                .cloned()
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    info!(
        "Attributed follower gains to {} posts ({}-day window, {} dates filled from export)",
        total - failed.len(),
        window_days,
        filled
    );

    Ok(AttributionOutcome {
        posts: attributed,
        failed_merges: failed.len(),
    })
}
