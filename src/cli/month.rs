//! Month grid command

use serde::Serialize;

use crate::aggregate::{MONTH_NAMES, WEEKDAY_NAMES};
use crate::calendar::MonthGrid;
use crate::date_key::DateKey;
use crate::error::Result;
use crate::output::emit_success;
use crate::task::TaskMap;

use super::Context;

#[derive(Serialize)]
struct MonthReport {
    label: String,
    #[serde(flatten)]
    grid: MonthGrid,
    /// Days of this month that have at least one task
    task_days: Vec<u32>,
}

pub fn run(ctx: &Context, month: Option<u32>, year: Option<i32>) -> Result<()> {
    let (month0, year) = ctx.navigator(month, year)?.current();
    let grid = MonthGrid::new(month0, year, ctx.today)?;
    let store = ctx.open_store();
    let task_days = task_days(store.tasks(), &grid)?;

    let label = format!("{} {}", MONTH_NAMES[month0 as usize], year);
    let mut human = ctx.human(label.clone());
    for line in grid_lines(&grid, &task_days) {
        human.push_detail(line);
    }
    human.push_summary("days with tasks", task_days.len().to_string());

    let report = MonthReport {
        label,
        grid,
        task_days,
    };
    emit_success(ctx.output, "month", &report, Some(&human))
}

fn task_days(tasks: &TaskMap, grid: &MonthGrid) -> Result<Vec<u32>> {
    let mut days = Vec::new();
    for day in 1..=grid.days_in_month {
        if tasks.contains(&DateKey::encode(grid.year, grid.month, day)?) {
            days.push(day);
        }
    }
    Ok(days)
}

/// Header plus one line per week. `[n]` marks today, `n*` a day with tasks.
fn grid_lines(grid: &MonthGrid, task_days: &[u32]) -> Vec<String> {
    let mut lines = vec![WEEKDAY_NAMES
        .iter()
        .map(|name| format!("{name:>5}"))
        .collect::<String>()];
    for week in grid.weeks() {
        let line = week
            .iter()
            .map(|cell| match cell {
                None => "     ".to_string(),
                Some(day) => {
                    let marker = if task_days.contains(day) { "*" } else { " " };
                    if grid.today == Some(*day) {
                        format!("[{day:>2}]{marker}")
                    } else {
                        format!("{day:>4}{marker}")
                    }
                }
            })
            .collect::<String>();
        lines.push(line.trim_end().to_string());
    }
    lines
}
