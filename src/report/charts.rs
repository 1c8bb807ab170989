//! Bar charts of the dataset statistics, written as SVG

use plotters::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::DatasetStats;
use crate::error::{DatasetError, Result};

const CHART_SIZE: (u32, u32) = (1000, 600);
const BAR_COLOR: RGBColor = RGBColor(31, 119, 180);

type DrawResult = std::result::Result<(), Box<dyn std::error::Error>>;

/// One bar chart: labelled counts plus its captions
struct BarChart {
    file_stem: &'static str,
    title: &'static str,
    category_desc: &'static str,
    count_desc: &'static str,
    /// Long category names read better along the vertical axis
    horizontal: bool,
    bars: Vec<(String, usize)>,
}

fn outcome_label(key: &str, team_name: &str) -> String {
    match key {
        "HomeTeam" => format!("{} Win", team_name),
        "Opponent" => "Opponent Win".to_string(),
        "NoResult" => "No Result".to_string(),
        other => other.to_string(),
    }
}

fn charts_for(stats: &DatasetStats, team_name: &str) -> Vec<BarChart> {
    let chart = |file_stem, title, category_desc, count_desc, horizontal, bars| BarChart {
        file_stem,
        title,
        category_desc,
        count_desc,
        horizontal,
        bars,
    };

    vec![
        chart(
            "matches_per_year",
            "International Cricket Matches Per Year",
            "Year",
            "Number of Matches",
            false,
            stats.per_year.iter().map(|(year, n)| (year.to_string(), *n)).collect(),
        ),
        chart(
            "matches_by_format",
            "Distribution of Matches by Format",
            "Match Format",
            "Number of Matches",
            false,
            stats.per_format.iter().map(|(format, n)| (format.clone(), *n)).collect(),
        ),
        chart(
            "match_outcomes",
            "Distribution of Match Outcomes",
            "Match Outcome",
            "Number of Matches",
            false,
            stats
                .per_winner
                .iter()
                .map(|(key, n)| (outcome_label(key, team_name), *n))
                .collect(),
        ),
        chart(
            "top_opponents",
            "Top Opponents by Match Count",
            "Opponent Team",
            "Number of Matches",
            true,
            stats.top_opponents.clone(),
        ),
        chart(
            "top_grounds",
            "Top Match Venues by Match Count",
            "Ground/Venue",
            "Number of Matches",
            true,
            stats.top_venues.clone(),
        ),
    ]
}

fn label_at(bars: &[(String, usize)], value: &SegmentValue<usize>) -> String {
    match value {
        SegmentValue::CenterOf(i) => bars.get(*i).map(|(label, _)| label.clone()).unwrap_or_default(),
        _ => String::new(),
    }
}

fn draw_vertical(path: &Path, caption: &str, chart: &BarChart) -> DrawResult {
    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let n = chart.bars.len();
    let y_max = chart.bars.iter().map(|(_, v)| *v).max().unwrap_or(0) + 1;

    let mut ctx = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 28))
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d((0..n).into_segmented(), 0..y_max)?;

    ctx.configure_mesh()
        .disable_x_mesh()
        .x_labels(n + 1)
        .x_label_formatter(&|v: &SegmentValue<usize>| label_at(&chart.bars, v))
        .x_desc(chart.category_desc)
        .y_desc(chart.count_desc)
        .draw()?;

    ctx.draw_series(chart.bars.iter().enumerate().map(|(i, (_, v))| {
        Rectangle::new(
            [(SegmentValue::Exact(i), 0), (SegmentValue::Exact(i + 1), *v)],
            BAR_COLOR.mix(0.8).filled(),
        )
    }))?;

    root.present()?;
    Ok(())
}

fn draw_horizontal(path: &Path, caption: &str, chart: &BarChart) -> DrawResult {
    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let n = chart.bars.len();
    let x_max = chart.bars.iter().map(|(_, v)| *v).max().unwrap_or(0) + 1;

    let mut ctx = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 28))
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(260)
        .build_cartesian_2d(0..x_max, (0..n).into_segmented())?;

    ctx.configure_mesh()
        .disable_y_mesh()
        .y_labels(n + 1)
        .y_label_formatter(&|v: &SegmentValue<usize>| label_at(&chart.bars, v))
        .x_desc(chart.count_desc)
        .y_desc(chart.category_desc)
        .draw()?;

    ctx.draw_series(chart.bars.iter().enumerate().map(|(i, (_, v))| {
        Rectangle::new(
            [(0, SegmentValue::Exact(i)), (*v, SegmentValue::Exact(i + 1))],
            BAR_COLOR.mix(0.8).filled(),
        )
    }))?;

    root.present()?;
    Ok(())
}

/// Render the per-year, per-format, outcome, opponent and venue charts into
/// `out_dir`. Charts with no data are skipped. Returns the written paths.
pub fn render_charts(stats: &DatasetStats, team_name: &str, out_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)?;

    let mut written = Vec::new();
    for chart in charts_for(stats, team_name) {
        if chart.bars.is_empty() {
            debug!("Skipping {} chart, nothing to plot", chart.file_stem);
            continue;
        }

        let path = out_dir.join(format!("{}.svg", chart.file_stem));
        let caption = if chart.file_stem == "matches_per_year" {
            format!("{} {}", team_name, chart.title)
        } else {
            chart.title.to_string()
        };
        let drawn = if chart.horizontal {
            draw_horizontal(&path, &caption, &chart)
        } else {
            draw_vertical(&path, &caption, &chart)
        };
        drawn.map_err(|e| DatasetError::Chart(format!("{}: {}", path.display(), e)))?;
        written.push(path);
    }

    info!("Wrote {} charts to {}", written.len(), out_dir.display());
    Ok(written)
}
