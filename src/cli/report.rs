//! Report and export commands

use std::path::PathBuf;

use serde::Serialize;

use crate::aggregate::{Bucket, Report};
use crate::error::Result;
use crate::export;
use crate::output::emit_success;

use super::Context;

/// Widest text bar drawn by `report`
const BAR_WIDTH: usize = 30;

/// Options for the report command
pub struct ReportOptions {
    pub mode: Option<String>,
    pub month: Option<u32>,
    pub year: Option<i32>,
}

/// Options for the export command
pub struct ExportOptions {
    pub report: ReportOptions,
    pub output: Option<PathBuf>,
}

#[derive(Serialize)]
struct ReportData {
    title: String,
    #[serde(flatten)]
    report: Report,
}

#[derive(Serialize)]
struct ExportReport {
    path: String,
    title: String,
    buckets: usize,
}

fn build(ctx: &Context, options: &ReportOptions) -> Result<Report> {
    let mode = ctx.mode(options.mode.as_deref())?;
    let navigator = ctx.navigator(options.month, options.year)?;
    let (month0, year) = navigator.current();
    let store = ctx.open_store();
    Report::build(store.tasks(), mode, month0, year, ctx.today)
}

pub fn run_report(ctx: &Context, options: ReportOptions) -> Result<()> {
    let report = build(ctx, &options)?;
    let title = report.title();

    let mut human = ctx.human(title.clone());
    human.push_summary("completed", report.completed.to_string());
    human.push_summary("uncompleted", report.uncompleted.to_string());
    for line in text_bars(&report.buckets) {
        human.push_detail(line);
    }
    if report.completed + report.uncompleted == 0 {
        human.push_next_step("taskcal add today \"...\"");
    }

    let data = ReportData { title, report };
    emit_success(ctx.output, "report", &data, Some(&human))
}

pub fn run_export(ctx: &Context, options: ExportOptions) -> Result<()> {
    let report = build(ctx, &options.report)?;
    let title = report.title();
    let path = options
        .output
        .unwrap_or_else(|| PathBuf::from(export::default_file_name(ctx.today)));

    export::write_svg(&path, &title, &report.buckets)?;
    tracing::debug!(path = %path.display(), "exported chart");

    let data = ExportReport {
        path: path.display().to_string(),
        title,
        buckets: report.buckets.len(),
    };

    let mut human = ctx.human(format!("Exported chart to {}", data.path));
    human.push_summary("chart", data.title.clone());
    if report.completed + report.uncompleted == 0 {
        human.push_warning("chart has no tasks");
    }

    emit_success(ctx.output, "export", &data, Some(&human))
}

/// One line per bucket: `label |####....| done/total`.
fn text_bars(buckets: &[Bucket]) -> Vec<String> {
    let max = buckets.iter().map(Bucket::total).max().unwrap_or(0);
    let label_width = buckets.iter().map(|b| b.label.len()).max().unwrap_or(0);
    buckets
        .iter()
        .map(|bucket| {
            let (done, open) = if max == 0 {
                (0, 0)
            } else {
                (
                    bucket.completed * BAR_WIDTH / max,
                    bucket.uncompleted * BAR_WIDTH / max,
                )
            };
            format!(
                "{:>width$} |{}{}{}| {}/{}",
                bucket.label,
                "#".repeat(done),
                ".".repeat(open),
                " ".repeat(BAR_WIDTH - done - open),
                bucket.completed,
                bucket.total(),
                width = label_width
            )
        })
        .collect()
}
