//! Chart export as SVG.
//!
//! Renders a bucket sequence as a stacked bar chart: "Completed" at the
//! bottom of each bar, "Uncompleted" on top.

use std::fmt::Write as _;
use std::path::Path;

use chrono::NaiveDate;

use crate::aggregate::Bucket;
use crate::error::{Error, Result};
use crate::lock;

const WIDTH: f64 = 720.0;
const HEIGHT: f64 = 360.0;
const MARGIN_LEFT: f64 = 48.0;
const MARGIN_RIGHT: f64 = 16.0;
const MARGIN_TOP: f64 = 56.0;
const MARGIN_BOTTOM: f64 = 40.0;
const BAR_FILL: f64 = 0.7;
const COLOR_BACKGROUND: &str = "#1e1f24";
const COLOR_TEXT: &str = "#cccccc";
const COLOR_GRID: &str = "rgba(255,255,255,0.1)";
const COLOR_COMPLETED: &str = "#3f51b5";
const COLOR_UNCOMPLETED: &str = "rgba(200,200,200,0.3)";

/// `chart-YYYY-MM-DD.svg`
pub fn default_file_name(today: NaiveDate) -> String {
    format!("chart-{}.svg", today.format("%Y-%m-%d"))
}

/// Render `buckets` as a standalone SVG document.
pub fn render_svg(title: &str, buckets: &[Bucket]) -> String {
    let plot_width = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_height = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    let baseline = MARGIN_TOP + plot_height;
    let max_total = buckets.iter().map(Bucket::total).max().unwrap_or(0).max(1);
    let unit = plot_height / max_total as f64;
    let slot = plot_width / buckets.len().max(1) as f64;
    let bar_width = slot * BAR_FILL;

    let mut svg = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}" font-family="sans-serif">"#
    );
    let _ = writeln!(
        svg,
        r#"  <rect width="100%" height="100%" fill="{COLOR_BACKGROUND}"/>"#
    );
    let _ = writeln!(
        svg,
        r#"  <text x="{MARGIN_LEFT}" y="22" fill="{COLOR_TEXT}" font-size="14">{}</text>"#,
        escape(title)
    );
    push_legend(&mut svg);

    for tick in y_ticks(max_total) {
        let y = baseline - tick as f64 * unit;
        let _ = writeln!(
            svg,
            r#"  <line x1="{MARGIN_LEFT}" y1="{y:.1}" x2="{:.1}" y2="{y:.1}" stroke="{COLOR_GRID}"/>"#,
            MARGIN_LEFT + plot_width
        );
        let _ = writeln!(
            svg,
            r#"  <text x="{:.1}" y="{:.1}" fill="{COLOR_TEXT}" font-size="11" text-anchor="end">{tick}</text>"#,
            MARGIN_LEFT - 6.0,
            y + 4.0
        );
    }

    for (idx, bucket) in buckets.iter().enumerate() {
        let x = MARGIN_LEFT + idx as f64 * slot + (slot - bar_width) / 2.0;
        let completed_height = bucket.completed as f64 * unit;
        let uncompleted_height = bucket.uncompleted as f64 * unit;
        if bucket.completed > 0 {
            let _ = writeln!(
                svg,
                r#"  <rect x="{x:.1}" y="{:.1}" width="{bar_width:.1}" height="{completed_height:.1}" fill="{COLOR_COMPLETED}"><title>{}: {} completed</title></rect>"#,
                baseline - completed_height,
                escape(&bucket.label),
                bucket.completed
            );
        }
        if bucket.uncompleted > 0 {
            let _ = writeln!(
                svg,
                r#"  <rect x="{x:.1}" y="{:.1}" width="{bar_width:.1}" height="{uncompleted_height:.1}" fill="{COLOR_UNCOMPLETED}"><title>{}: {} uncompleted</title></rect>"#,
                baseline - completed_height - uncompleted_height,
                escape(&bucket.label),
                bucket.uncompleted
            );
        }
        let _ = writeln!(
            svg,
            r#"  <text x="{:.1}" y="{:.1}" fill="{COLOR_TEXT}" font-size="11" text-anchor="middle">{}</text>"#,
            x + bar_width / 2.0,
            baseline + 16.0,
            escape(&bucket.label)
        );
    }

    svg.push_str("</svg>\n");
    svg
}

/// Write the chart to `path`. An empty bucket list means nothing was charted.
pub fn write_svg(path: &Path, title: &str, buckets: &[Bucket]) -> Result<()> {
    if buckets.is_empty() {
        return Err(Error::NoChart);
    }
    lock::write_atomic(path, render_svg(title, buckets).as_bytes())
}

fn push_legend(svg: &mut String) {
    let entries = [("Completed", COLOR_COMPLETED), ("Uncompleted", COLOR_UNCOMPLETED)];
    let mut x = WIDTH - MARGIN_RIGHT - 220.0;
    for (label, color) in entries {
        let _ = writeln!(
            svg,
            r#"  <rect x="{x:.1}" y="32" width="12" height="12" fill="{color}"/>"#
        );
        let _ = writeln!(
            svg,
            r#"  <text x="{:.1}" y="42" fill="{COLOR_TEXT}" font-size="12">{label}</text>"#,
            x + 18.0
        );
        x += 110.0;
    }
}

/// Integer ticks from 0 to `max`, at most ~6 of them.
fn y_ticks(max: usize) -> Vec<usize> {
    let step = max.div_ceil(5).max(1);
    (0..=max).step_by(step).collect()
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}
