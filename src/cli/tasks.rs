//! Task commands: add, toggle, rm, list, days

use serde::Serialize;

use crate::date_key::DateKey;
use crate::error::Result;
use crate::output::emit_success;
use crate::task::{DayCounts, Task, TaskMap};

use super::{position_to_index, Context};

/// Options for the add command
pub struct AddOptions {
    pub date: String,
    pub text: Vec<String>,
}

/// Options for commands addressing one task
pub struct PositionOptions {
    pub date: String,
    pub position: usize,
}

#[derive(Serialize)]
struct TaskEntry {
    position: usize,
    text: String,
    done: bool,
}

#[derive(Serialize)]
struct DayReport {
    date: String,
    tasks: Vec<TaskEntry>,
    completed: usize,
    uncompleted: usize,
}

#[derive(Serialize)]
struct AddReport {
    date: String,
    position: usize,
    task: Task,
}

#[derive(Serialize)]
struct ToggleReport {
    date: String,
    position: usize,
    text: String,
    done: bool,
}

#[derive(Serialize)]
struct RemoveReport {
    date: String,
    position: usize,
    removed: Task,
    remaining: usize,
}

#[derive(Serialize)]
struct DaysReport {
    days: Vec<DaySummary>,
    tasks_total: usize,
}

#[derive(Serialize)]
struct DaySummary {
    date: String,
    completed: usize,
    uncompleted: usize,
}

pub fn run_add(ctx: &Context, options: AddOptions) -> Result<()> {
    let key = ctx.date(&options.date)?;
    let text = options.text.join(" ");

    let mut store = ctx.open_store();
    let index = store.add(&key, &text)?;
    let task = store.list_for(&key)[index].clone();

    let report = AddReport {
        date: key.to_string(),
        position: index + 1,
        task,
    };

    let mut human = ctx.human(format!("Added task #{} on {}", report.position, key));
    human.push_summary("text", report.task.text.clone());
    human.push_next_step(format!("taskcal toggle {} {}", key, report.position));

    emit_success(ctx.output, "add", &report, Some(&human))
}

pub fn run_toggle(ctx: &Context, options: PositionOptions) -> Result<()> {
    let key = ctx.date(&options.date)?;
    let index = position_to_index(options.position)?;

    let mut store = ctx.open_store();
    let done = store.toggle(&key, index)?;
    let text = store.list_for(&key)[index].text.clone();

    let report = ToggleReport {
        date: key.to_string(),
        position: options.position,
        text,
        done,
    };

    let state = if done { "done" } else { "not done" };
    let mut human = ctx.human(format!("Marked task #{} on {} {}", options.position, key, state));
    human.push_summary("text", report.text.clone());

    emit_success(ctx.output, "toggle", &report, Some(&human))
}

pub fn run_rm(ctx: &Context, options: PositionOptions) -> Result<()> {
    let key = ctx.date(&options.date)?;
    let index = position_to_index(options.position)?;

    let mut store = ctx.open_store();
    let removed = store.remove(&key, index)?;
    let remaining = store.list_for(&key).len();

    let report = RemoveReport {
        date: key.to_string(),
        position: options.position,
        removed,
        remaining,
    };

    let mut human = ctx.human(format!("Deleted task #{} on {}", options.position, key));
    human.push_summary("text", report.removed.text.clone());
    human.push_summary("remaining", remaining.to_string());

    emit_success(ctx.output, "rm", &report, Some(&human))
}

pub fn run_list(ctx: &Context, date: &str) -> Result<()> {
    let key = ctx.date(date)?;
    let store = ctx.open_store();
    let report = day_report(store.tasks(), &key);

    let mut human = ctx.human(format!("Tasks for {key}"));
    if report.tasks.is_empty() {
        human.push_summary("no tasks", "");
        human.push_next_step(format!("taskcal add {key} \"...\""));
    } else {
        human.push_summary("done", report.completed.to_string());
        human.push_summary("open", report.uncompleted.to_string());
        for entry in &report.tasks {
            let mark = if entry.done { "x" } else { " " };
            human.push_detail(format!("{}. [{}] {}", entry.position, mark, entry.text));
        }
    }

    emit_success(ctx.output, "list", &report, Some(&human))
}

pub fn run_days(ctx: &Context) -> Result<()> {
    let store = ctx.open_store();
    let tasks = store.tasks();
    let days: Vec<DaySummary> = tasks
        .iter()
        .map(|(key, list)| {
            let counts = DayCounts::of(list);
            DaySummary {
                date: key.to_string(),
                completed: counts.completed,
                uncompleted: counts.uncompleted,
            }
        })
        .collect();

    let report = DaysReport {
        tasks_total: tasks.task_total(),
        days,
    };

    let mut human = ctx.human(format!("{} day(s) with tasks", report.days.len()));
    for day in &report.days {
        human.push_detail(format!(
            "{}: {} done, {} open",
            day.date, day.completed, day.uncompleted
        ));
    }

    emit_success(ctx.output, "days", &report, Some(&human))
}

fn day_report(tasks: &TaskMap, key: &DateKey) -> DayReport {
    let list = tasks.list_for(key);
    let counts = DayCounts::of(list);
    DayReport {
        date: key.to_string(),
        tasks: list
            .iter()
            .enumerate()
            .map(|(idx, task)| TaskEntry {
                position: idx + 1,
                text: task.text.clone(),
                done: task.done,
            })
            .collect(),
        completed: counts.completed,
        uncompleted: counts.uncompleted,
    }
}
