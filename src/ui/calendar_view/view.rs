use chrono::Datelike;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::aggregate::{ReportMode, MONTH_NAMES, WEEKDAY_NAMES};
use crate::calendar::MonthGrid;
use crate::storage::SnapshotStorage;

use super::app::{AppState, DayModal, StatusKind};

const CELL_WIDTH: usize = 5;
const CALENDAR_WIDTH: u16 = (CELL_WIDTH * 7) as u16 + 2;
const MODAL_WIDTH: u16 = 56;
const COLOR_TEXT: Color = Color::Rgb(234, 236, 239);
const COLOR_MUTED: Color = Color::Rgb(160, 165, 172);
const COLOR_MUTED_DARK: Color = Color::Rgb(118, 124, 130);
const COLOR_INFO: Color = Color::Rgb(116, 198, 219);
const COLOR_WARNING: Color = Color::Rgb(244, 200, 98);
const COLOR_ERROR: Color = Color::Rgb(255, 107, 107);
const COLOR_SUCCESS: Color = Color::Rgb(126, 210, 146);
const COLOR_ACCENT: Color = Color::Rgb(122, 170, 255);
const COLOR_BORDER: Color = Color::Rgb(92, 126, 166);
const COLOR_COMPLETED: Color = Color::Rgb(63, 81, 181);
const COLOR_UNCOMPLETED: Color = Color::Rgb(118, 124, 130);

pub fn render<S: SnapshotStorage>(frame: &mut Frame, app: &AppState<S>) {
    let area = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(area);
    let header = chunks[0];
    let main = chunks[1];
    let footer = chunks[2];

    render_header(frame, app, header);

    let direction = if app.is_narrow() {
        Direction::Vertical
    } else {
        Direction::Horizontal
    };
    let calendar_size = if app.is_narrow() {
        Constraint::Length(10)
    } else {
        Constraint::Length(CALENDAR_WIDTH)
    };
    let panes = Layout::default()
        .direction(direction)
        .constraints([calendar_size, Constraint::Min(0)].as_ref())
        .split(main);
    render_calendar(frame, app, panes[0]);
    render_chart(frame, app, panes[1]);

    render_footer(frame, app, footer);

    if let Some(modal) = app.modal.as_ref() {
        render_day_modal(frame, app, area, modal);
    }
}

fn render_header<S: SnapshotStorage>(frame: &mut Frame, app: &AppState<S>, area: Rect) {
    let mut spans = Vec::new();
    for (idx, mode) in ReportMode::ALL.iter().enumerate() {
        if idx > 0 {
            spans.push(Span::styled("  ", Style::default().fg(COLOR_MUTED_DARK)));
        }
        let style = if *mode == app.mode {
            Style::default()
                .fg(COLOR_INFO)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(COLOR_MUTED)
        };
        spans.push(Span::styled(mode.title(), style));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_calendar<S: SnapshotStorage>(frame: &mut Frame, app: &AppState<S>, area: Rect) {
    let (month0, year) = app.navigator.current();
    let title = format!(
        " {} {} ",
        MONTH_NAMES.get(month0 as usize).copied().unwrap_or("?"),
        year
    );
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(COLOR_BORDER))
        .title(title);

    let lines = match app.grid() {
        Ok(grid) => grid_lines(app, &grid),
        Err(err) => vec![Line::from(Span::styled(
            err.to_string(),
            Style::default().fg(COLOR_ERROR),
        ))],
    };
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn grid_lines<S: SnapshotStorage>(app: &AppState<S>, grid: &MonthGrid) -> Vec<Line<'static>> {
    let header = WEEKDAY_NAMES
        .iter()
        .map(|name| {
            Span::styled(
                format!("{name:>width$}", width = CELL_WIDTH),
                Style::default().fg(COLOR_MUTED_DARK),
            )
        })
        .collect::<Vec<_>>();
    let mut lines = vec![Line::from(header)];

    let selected_day = (app.selected.year() == grid.year && app.selected.month0() == grid.month)
        .then(|| app.selected.day());

    for week in grid.weeks() {
        let spans = week
            .iter()
            .map(|cell| match cell {
                None => Span::raw(" ".repeat(CELL_WIDTH)),
                Some(day) => day_span(app, grid, *day, selected_day == Some(*day)),
            })
            .collect::<Vec<_>>();
        lines.push(Line::from(spans));
    }
    lines
}

fn day_span<S: SnapshotStorage>(
    app: &AppState<S>,
    grid: &MonthGrid,
    day: u32,
    selected: bool,
) -> Span<'static> {
    let counts = app.task_counts(day);
    let marker = if counts.is_some() { "•" } else { " " };
    let mut style = match counts {
        Some(counts) if counts.uncompleted == 0 => Style::default().fg(COLOR_SUCCESS),
        Some(_) => Style::default().fg(COLOR_WARNING),
        None => Style::default().fg(COLOR_TEXT),
    };
    if grid.today == Some(day) {
        style = style.fg(COLOR_ACCENT).add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
    }
    if selected {
        style = style.add_modifier(Modifier::REVERSED);
    }
    Span::styled(format!("{day:>3}{marker} "), style)
}

fn render_chart<S: SnapshotStorage>(frame: &mut Frame, app: &AppState<S>, area: Rect) {
    let legend = Line::from(vec![
        Span::raw(" "),
        Span::styled(
            app.chart
                .as_ref()
                .map(|report| report.title())
                .unwrap_or_default(),
            Style::default().fg(COLOR_TEXT),
        ),
        Span::raw("  "),
        Span::styled("■ Completed", Style::default().fg(COLOR_COMPLETED)),
        Span::raw("  "),
        Span::styled("■ Uncompleted", Style::default().fg(COLOR_UNCOMPLETED)),
        Span::raw(" "),
    ]);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(COLOR_BORDER))
        .title(legend);

    let Some(report) = app.chart.as_ref() else {
        frame.render_widget(block, area);
        return;
    };

    let groups = report.buckets.len().max(1) as u16;
    let inner_width = area.width.saturating_sub(2);
    // Two bars per group plus one column of gap.
    let bar_width = ((inner_width / groups).saturating_sub(1) / 2).max(1);

    let mut chart = BarChart::default()
        .block(block)
        .bar_width(bar_width)
        .bar_gap(0)
        .group_gap(1)
        .label_style(Style::default().fg(COLOR_MUTED));
    for bucket in &report.buckets {
        let bars = [
            Bar::default()
                .value(bucket.completed as u64)
                .text_value(value_text(bucket.completed, bar_width))
                .style(Style::default().fg(COLOR_COMPLETED)),
            Bar::default()
                .value(bucket.uncompleted as u64)
                .text_value(value_text(bucket.uncompleted, bar_width))
                .style(Style::default().fg(COLOR_UNCOMPLETED)),
        ];
        chart = chart.data(
            BarGroup::default()
                .label(Line::from(bucket.label.clone()))
                .bars(&bars),
        );
    }
    frame.render_widget(chart, area);
}

/// Bar value text, hidden when zero or too wide for the bar.
fn value_text(value: usize, bar_width: u16) -> String {
    let text = value.to_string();
    if value == 0 || text.len() > bar_width as usize {
        String::new()
    } else {
        text
    }
}

fn render_footer<S: SnapshotStorage>(frame: &mut Frame, app: &AppState<S>, area: Rect) {
    let hint = app.footer_hint();
    let hint_span = Span::styled(hint, Style::default().fg(COLOR_INFO));
    let line = if let Some((status, kind)) = app.status_line() {
        let status_style = match kind {
            StatusKind::Error => Style::default()
                .fg(COLOR_ERROR)
                .add_modifier(Modifier::BOLD),
            StatusKind::Info => Style::default().fg(COLOR_WARNING),
        };
        Line::from(vec![
            hint_span,
            Span::raw("  |  "),
            Span::styled(status, status_style),
        ])
    } else {
        Line::from(hint_span)
    };
    let summary_line = Line::from(Span::styled(
        app.day_summary(),
        Style::default().fg(COLOR_ACCENT),
    ));
    let widget = Paragraph::new(vec![line, summary_line])
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(COLOR_BORDER)),
        );
    frame.render_widget(widget, area);
}

fn render_day_modal<S: SnapshotStorage>(
    frame: &mut Frame,
    app: &AppState<S>,
    area: Rect,
    modal: &DayModal,
) {
    let tasks = app.selected_tasks();
    let width = MODAL_WIDTH.min(area.width.saturating_sub(6));
    let height = (tasks.len().max(1) as u16 + 6).min(area.height.saturating_sub(4));
    let rect = centered_rect(width, height, area);
    frame.render_widget(Clear, rect);

    let mut lines: Vec<Line<'static>> = Vec::new();
    if tasks.is_empty() {
        lines.push(Line::from(Span::styled(
            "no tasks yet",
            Style::default().fg(COLOR_MUTED),
        )));
    }
    for (idx, task) in tasks.iter().enumerate() {
        let (mark, color) = if task.done {
            ("[x]", COLOR_SUCCESS)
        } else {
            ("[ ]", COLOR_TEXT)
        };
        let mut style = Style::default().fg(color);
        if task.done {
            style = style.add_modifier(Modifier::CROSSED_OUT);
        }
        if modal.selected == Some(idx) {
            style = style.add_modifier(Modifier::REVERSED);
        }
        lines.push(Line::from(Span::styled(
            format!("{mark} {}", task.text),
            style,
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("> ", Style::default().fg(COLOR_ACCENT)),
        Span::styled(modal.input.clone(), Style::default().fg(COLOR_TEXT)),
        Span::styled("_", Style::default().fg(COLOR_MUTED_DARK)),
    ]));
    lines.push(Line::from(Span::styled(
        "enter add  space toggle  del delete  esc close",
        Style::default().fg(COLOR_MUTED_DARK),
    )));

    let title = format!(" {} ", app.selected.format("%A, %B %-d %Y"));
    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: false });
    frame.render_widget(widget, rect);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width.saturating_sub(2));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}
