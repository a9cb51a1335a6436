//! Bar charts for the structured report, drawn with plotters.

use super::assembler::Section;
use crate::models::{CategorySummary, SeasonBucket, Seasonality};
use anyhow::Result;
use plotters::prelude::*;
use std::path::Path;
use tracing::debug;

const WIDTH: u32 = 760;
const LABEL_AREA: u32 = 230;
const ROW_HEIGHT: u32 = 28;
const FRAME_HEIGHT: u32 = 110;

const POSITIVE: RGBColor = RGBColor(21, 101, 192);
const NEGATIVE: RGBColor = RGBColor(198, 40, 40);

/// Horizontal bar chart of `(label, value)` pairs as an SVG document.
///
/// One bar per row, top to bottom in input order; negative values are
/// drawn in red to the left of zero.
pub fn bar_chart_svg(title: &str, bars: &[(String, f64)]) -> Result<String> {
    let rows = bars.len().max(1) as u32;
    let height = FRAME_HEIGHT + ROW_HEIGHT * rows;

    let (low, high) = bars
        .iter()
        .fold((0.0_f64, 0.0_f64), |(lo, hi), (_, v)| (lo.min(*v), hi.max(*v)));
    let pad = ((high - low) * 0.1).max(1.0);
    let x_start = if low < 0.0 { low - pad } else { 0.0 };
    let x_range = x_start..high + pad;

    let labels: Vec<&str> = bars.iter().map(|(label, _)| label.as_str()).collect();
    let label_of = |v: &SegmentValue<u32>| match v {
        SegmentValue::CenterOf(i) => labels
            .get(*i as usize)
            .map(|label| label.to_string())
            .unwrap_or_default(),
        _ => String::new(),
    };

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (WIDTH, height)).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 18))
            .margin(12)
            .x_label_area_size(32)
            .y_label_area_size(LABEL_AREA)
            .build_cartesian_2d(x_range, (0..rows).into_segmented())?;

        chart
            .configure_mesh()
            .disable_y_mesh()
            .y_labels(rows as usize)
            .y_label_formatter(&label_of)
            .x_desc("Median follower gain")
            .draw()?;

        chart.draw_series(bars.iter().enumerate().map(|(i, (_, value))| {
            let color = if *value < 0.0 { NEGATIVE } else { POSITIVE };
            let mut bar = Rectangle::new(
                [
                    (0.0, SegmentValue::Exact(i as u32)),
                    (*value, SegmentValue::Exact(i as u32 + 1)),
                ],
                color.filled(),
            );
            bar.set_margin(4, 4, 0, 0);
            bar
        }))?;

        root.present()?;
    }

    Ok(svg)
}

/// Write one chart per summary plus the monthly and weekday charts.
///
/// Files go to `images_dir`; returned sections reference them relative to
/// `link_prefix` so the document can live one level up.
pub fn render_charts(
    summaries: &[CategorySummary],
    seasonality: Option<&Seasonality>,
    images_dir: &Path,
    file_prefix: &str,
    link_prefix: &str,
) -> Result<Vec<Section>> {
    std::fs::create_dir_all(images_dir)?;
    let mut sections = Vec::new();

    let mut write_chart = |slug: &str, title: String, bars: Vec<(String, f64)>| -> Result<()> {
        if bars.is_empty() {
            return Ok(());
        }
        let file_name = format!("{file_prefix}_{slug}.svg");
        let path = images_dir.join(&file_name);
        std::fs::write(&path, bar_chart_svg(&title, &bars)?)?;
        debug!("Wrote chart {}", path.display());
        sections.push(Section::image(
            title.clone(),
            format!("{link_prefix}/{file_name}"),
            title,
        ));
        Ok(())
    };

    for summary in summaries {
        let bars = summary
            .rows
            .iter()
            .map(|r| (r.value.clone(), r.median_gain))
            .collect();
        write_chart(
            &summary.field.slug(),
            format!("Median Follower Gain by {}", summary.field.label()),
            bars,
        )?;
    }

    if let Some(season) = seasonality {
        let bars = |buckets: &[SeasonBucket]| -> Vec<(String, f64)> {
            buckets.iter().map(|b| (b.label.clone(), b.median)).collect()
        };
        write_chart(
            "monthly",
            "Monthly Follower Gains (Median)".to_string(),
            bars(&season.monthly),
        )?;
        write_chart(
            "weekday",
            "Follower Gains by Day of Week (Median)".to_string(),
            bars(&season.weekday),
        )?;
    }

    Ok(sections)
}
