//! Seasonality aggregation.
//!
//! Attributed gains grouped by calendar month, weekday and ISO week.

use super::aggregator::{mean, median};
use crate::models::{AttributedPost, SeasonBucket, Seasonality};
use chrono::{Datelike, NaiveDate, Weekday};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const WEEK_ORDER: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Build the seasonality tables; `None` when no post is attributed.
pub fn seasonality(posts: &[AttributedPost]) -> Option<Seasonality> {
    let dated: Vec<(NaiveDate, i64)> = posts
        .iter()
        .filter(|p| p.attributed)
        .filter_map(|p| p.post.publish_date.map(|d| (d, p.gain)))
        .collect();

    let gains: Vec<i64> = dated.iter().map(|(_, g)| *g).collect();
    let overall = median(&gains)?;

    Some(Seasonality {
        overall_median: overall,
        monthly: monthly(&dated, overall),
        weekday: by_weekday(&dated, overall),
        weekly: weekly(&dated, overall),
    })
}

fn monthly(dated: &[(NaiveDate, i64)], overall: f64) -> Vec<SeasonBucket> {
    let mut gains: BTreeMap<u32, Vec<i64>> = BTreeMap::new();
    let mut years: HashMap<u32, BTreeMap<i32, usize>> = HashMap::new();
    for (date, gain) in dated {
        gains.entry(date.month()).or_default().push(*gain);
        *years
            .entry(date.month())
            .or_default()
            .entry(date.year())
            .or_insert(0) += 1;
    }

    let mut buckets: Vec<SeasonBucket> = gains
        .iter()
        .filter_map(|(month, values)| {
            let year = years.get(month).and_then(modal_year)?;
            let name = MONTH_NAMES.get(*month as usize - 1)?;
            bucket(format!("{name} {year}"), values, overall)
        })
        .collect();
    buckets.sort_by(rank_buckets);
    buckets
}

/// Most frequent year; ties go to the earliest.
///
/// A month bucket pools the same month across years, so this is only a
/// display approximation.
fn modal_year(counts: &BTreeMap<i32, usize>) -> Option<i32> {
    counts
        .iter()
        .fold(None, |best: Option<(i32, usize)>, (year, count)| match best {
            Some((_, best_count)) if best_count >= *count => best,
            _ => Some((*year, *count)),
        })
        .map(|(year, _)| year)
}

fn by_weekday(dated: &[(NaiveDate, i64)], overall: f64) -> Vec<SeasonBucket> {
    let mut gains: HashMap<Weekday, Vec<i64>> = HashMap::new();
    for (date, gain) in dated {
        gains.entry(date.weekday()).or_default().push(*gain);
    }

    WEEK_ORDER
        .iter()
        .filter_map(|day| {
            let values = gains.get(day)?;
            bucket(weekday_name(*day).to_string(), values, overall)
        })
        .collect()
}

fn weekly(dated: &[(NaiveDate, i64)], overall: f64) -> Vec<SeasonBucket> {
    let mut gains: BTreeMap<u32, Vec<i64>> = BTreeMap::new();
    for (date, gain) in dated {
        gains.entry(date.iso_week().week()).or_default().push(*gain);
    }

    let mut buckets: Vec<SeasonBucket> = gains
        .iter()
        .filter_map(|(week, values)| bucket(format!("Week {week}"), values, overall))
        .collect();
    buckets.sort_by(rank_buckets);
    buckets
}

fn bucket(label: String, values: &[i64], overall: f64) -> Option<SeasonBucket> {
    let median = median(values)?;
    Some(SeasonBucket {
        label,
        count: values.len(),
        mean: mean(values)?,
        median,
        sum: values.iter().sum(),
        vs_overall_pct: if overall == 0.0 {
            None
        } else {
            Some((median - overall) / overall * 100.0)
        },
    })
}

/// Median descending, then count descending; the sort is stable so
/// equal buckets keep calendar order.
fn rank_buckets(a: &SeasonBucket, b: &SeasonBucket) -> Ordering {
    b.median
        .partial_cmp(&a.median)
        .unwrap_or(Ordering::Equal)
        .then_with(|| b.count.cmp(&a.count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Classification, Post};

    fn at(y: i32, m: u32, d: u32, gain: i64) -> AttributedPost {
        AttributedPost {
            post: Post {
                url: format!("https://x.com/{y}-{m}-{d}-{gain}"),
                publish_date: NaiveDate::from_ymd_opt(y, m, d),
                format: None,
                classification: Classification::default(),
            },
            gain,
            attributed: true,
        }
    }

    #[test]
    fn test_empty_is_no_data() {
        assert!(seasonality(&[]).is_none());
    }

    #[test]
    fn test_monthly_uses_modal_year_and_ranks_by_median() {
        let posts = vec![
            at(2023, 10, 2, 4),
            at(2024, 10, 7, 6),
            at(2024, 10, 8, 8),
            at(2024, 11, 4, 20),
        ];
        let s = seasonality(&posts).unwrap();

        assert_eq!(s.monthly.len(), 2);
        assert_eq!(s.monthly[0].label, "November 2024");
        assert_eq!(s.monthly[1].label, "October 2024");
        assert_eq!(s.monthly[1].count, 3);
        assert_eq!(s.monthly[1].sum, 18);
        assert_eq!(s.monthly[1].mean, 6.0);
        assert_eq!(s.monthly[1].median, 6.0);
    }

    #[test]
    fn test_modal_year_tie_goes_to_earliest() {
        let mut counts = BTreeMap::new();
        counts.insert(2024, 2);
        counts.insert(2023, 2);
        counts.insert(2022, 1);
        assert_eq!(modal_year(&counts), Some(2023));
    }

    #[test]
    fn test_weekday_order_and_omission() {
        // 2024-01-01 is a Monday, 2024-01-05 a Friday.
        let posts = vec![at(2024, 1, 5, 2), at(2024, 1, 1, 10), at(2024, 1, 8, 4)];
        let s = seasonality(&posts).unwrap();
        let labels: Vec<&str> = s.weekday.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["Monday", "Friday"]);
        assert_eq!(s.weekday[0].count, 2);
        assert_eq!(s.weekday[0].median, 7.0);
    }

    #[test]
    fn test_weekly_buckets_and_percent_vs_overall() {
        let posts = vec![at(2024, 1, 1, 10), at(2024, 1, 2, 2), at(2024, 1, 8, 4)];
        let s = seasonality(&posts).unwrap();
        assert_eq!(s.overall_median, 4.0);
        assert_eq!(s.weekly[0].label, "Week 1");
        assert_eq!(s.weekly[0].median, 6.0);
        assert_eq!(s.weekly[0].vs_overall_pct, Some(50.0));
        assert_eq!(s.weekly[1].label, "Week 2");
        assert_eq!(s.weekly[1].vs_overall_pct, Some(0.0));
    }

    #[test]
    fn test_zero_overall_median_has_no_percentages() {
        let posts = vec![at(2024, 1, 1, 0), at(2024, 1, 2, 0)];
        let s = seasonality(&posts).unwrap();
        assert!(s.monthly.iter().all(|b| b.vs_overall_pct.is_none()));
    }
}
