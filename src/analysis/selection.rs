//! Top and outlier post selection.

use crate::models::{AttributedPost, PostRow};

/// Marker preceding the numeric id in LinkedIn post URLs.
const ACTIVITY_MARKER: &str = "urn:li:activity:";

/// Attributed posts ordered by gain, highest first.
///
/// The sort is stable, so equal gains keep input order.
fn ranked(posts: &[AttributedPost]) -> Vec<&AttributedPost> {
    let mut ranked: Vec<&AttributedPost> = posts.iter().filter(|p| p.attributed).collect();
    ranked.sort_by_key(|p| std::cmp::Reverse(p.gain));
    ranked
}

/// The `n` posts with the highest gain.
pub fn top_posts(posts: &[AttributedPost], n: usize) -> Vec<PostRow> {
    ranked(posts).into_iter().take(n).map(post_row).collect()
}

/// The `n` highest and `n` lowest posts, selected independently.
///
/// Bottom rows are listed lowest first. With fewer than `2n` posts the
/// two lists overlap.
pub fn outliers(posts: &[AttributedPost], n: usize) -> (Vec<PostRow>, Vec<PostRow>) {
    let mut ascending: Vec<&AttributedPost> = posts.iter().filter(|p| p.attributed).collect();
    ascending.sort_by_key(|p| p.gain);

    let top = top_posts(posts, n);
    let bottom = ascending.into_iter().take(n).map(post_row).collect();
    (top, bottom)
}

/// Short id shown in tables: the activity number, else the last path segment.
pub fn activity_id(url: &str) -> String {
    if let Some(pos) = url.find(ACTIVITY_MARKER) {
        let id: String = url[pos + ACTIVITY_MARKER.len()..]
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        if !id.is_empty() {
            return id;
        }
    }
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(url)
        .to_string()
}

fn post_row(p: &AttributedPost) -> PostRow {
    let c = &p.post.classification;
    let or_na = |v: &Option<String>| v.clone().unwrap_or_else(|| "N/A".to_string());
    PostRow {
        url: p.post.url.clone(),
        activity_id: activity_id(&p.post.url),
        date: p
            .post
            .publish_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "N/A".to_string()),
        gain: p.gain,
        topic: or_na(&c.topic),
        tone: or_na(&c.text_tone),
        narrative: or_na(&c.narrative_type),
        framework: or_na(&c.content_framework),
    }
}
