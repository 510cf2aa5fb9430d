use std::io;
use std::path::PathBuf;
use std::time::Duration as PollDuration;

use chrono::{Datelike, Duration, Local, NaiveDate};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::aggregate::{Report, ReportMode};
use crate::calendar::{MonthGrid, Navigator};
use crate::date_key::{days_in_month, DateKey};
use crate::error::{Error, Result};
use crate::export;
use crate::storage::{FileStorage, SnapshotStorage};
use crate::task::{DayCounts, Task, TaskStore};

use super::view;

const NARROW_WIDTH: u16 = 90;
const EVENT_POLL_MS: u64 = 120;
const NO_CHART_NOTICE: &str = "No chart available to export yet.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum StatusKind {
    Error,
    Info,
}

/// Task list for the selected day, shown as a modal.
#[derive(Debug, Default)]
pub(crate) struct DayModal {
    pub(crate) input: String,
    pub(crate) selected: Option<usize>,
}

#[derive(Default, Clone, Copy)]
struct Viewport {
    width: u16,
    height: u16,
}

/// Everything the terminal calendar needs to start.
pub struct ViewerOptions {
    pub store: TaskStore<FileStorage>,
    pub navigator: Navigator,
    pub mode: ReportMode,
    /// Directory exported charts are written to
    pub export_dir: PathBuf,
}

pub struct AppState<S> {
    pub(crate) store: TaskStore<S>,
    pub(crate) navigator: Navigator,
    pub(crate) selected: NaiveDate,
    pub(crate) mode: ReportMode,
    pub(crate) modal: Option<DayModal>,
    pub(crate) today: NaiveDate,
    /// Last chart handed to the renderer
    pub(crate) chart: Option<Report>,
    status_message: Option<(String, StatusKind)>,
    viewport: Viewport,
    export_dir: PathBuf,
}

impl<S: SnapshotStorage> AppState<S> {
    pub(crate) fn new(
        store: TaskStore<S>,
        navigator: Navigator,
        mode: ReportMode,
        export_dir: PathBuf,
        today: NaiveDate,
    ) -> Self {
        let (month0, year) = navigator.current();
        let selected = if today.month0() == month0 && today.year() == year {
            today
        } else {
            first_of_month(month0, year).unwrap_or(today)
        };
        Self {
            store,
            navigator,
            selected,
            mode,
            modal: None,
            today,
            chart: None,
            status_message: None,
            viewport: Viewport::default(),
            export_dir,
        }
    }

    fn update_viewport(&mut self, width: u16, height: u16) {
        self.viewport = Viewport { width, height };
    }

    pub(crate) fn is_narrow(&self) -> bool {
        self.viewport.width < NARROW_WIDTH
    }

    pub(crate) fn selected_key(&self) -> Option<DateKey> {
        DateKey::from_date(self.selected).ok()
    }

    pub(crate) fn selected_tasks(&self) -> &[Task] {
        match self.selected_key() {
            Some(key) => self.store.list_for(&key),
            None => &[],
        }
    }

    pub(crate) fn grid(&self) -> Result<MonthGrid> {
        let (month0, year) = self.navigator.current();
        MonthGrid::new(month0, year, self.today)
    }

    pub(crate) fn task_counts(&self, day: u32) -> Option<DayCounts> {
        let (month0, year) = self.navigator.current();
        let key = DateKey::encode(year, month0, day).ok()?;
        self.store.tasks().contains(&key).then(|| self.store.tasks().counts_for(&key))
    }

    /// Rebuild the chart for the displayed month and mode.
    pub(crate) fn refresh_chart(&mut self) {
        let (month0, year) = self.navigator.current();
        match Report::build(self.store.tasks(), self.mode, month0, year, self.today) {
            Ok(report) => self.chart = Some(report),
            Err(err) => self.set_error(err.to_string()),
        }
    }

    pub(crate) fn status_line(&self) -> Option<(String, StatusKind)> {
        self.status_message.clone()
    }

    pub(crate) fn footer_hint(&self) -> String {
        if self.modal.is_some() {
            return "type task  enter add  up/down move  space toggle  del delete  esc close"
                .to_string();
        }
        "arrows day  n/p month  m mode  enter tasks  e export  q quit".to_string()
    }

    pub(crate) fn day_summary(&self) -> String {
        let counts = DayCounts::of(self.selected_tasks());
        format!(
            "{}: {} task(s), {} done  ·  {} days with tasks",
            self.selected.format("%Y-%m-%d"),
            counts.total(),
            counts.completed,
            self.store.tasks().len()
        )
    }

    fn set_error(&mut self, message: String) {
        self.status_message = Some((message, StatusKind::Error));
    }

    fn set_info(&mut self, message: String) {
        self.status_message = Some((message, StatusKind::Info));
    }

    /// Move the selection by `days`, following the navigator into other months.
    fn move_selection(&mut self, days: i64) {
        let target = self.selected + Duration::days(days);
        let (month0, year) = self.navigator.current();
        if target.month0() != month0 || target.year() != year {
            if !self.navigator.jump_to(target) {
                return;
            }
        }
        self.selected = target;
    }

    fn change_month(&mut self, forward: bool) {
        let moved = if forward {
            self.navigator.next()
        } else {
            self.navigator.previous()
        };
        if !moved {
            return;
        }
        let (month0, year) = self.navigator.current();
        let day = match days_in_month(year, month0) {
            Ok(days) => self.selected.day().min(days),
            Err(_) => 1,
        };
        if let Some(date) = NaiveDate::from_ymd_opt(year, month0 + 1, day) {
            self.selected = date;
        }
    }

    fn open_modal(&mut self) {
        let selected = (!self.selected_tasks().is_empty()).then_some(0);
        self.modal = Some(DayModal {
            input: String::new(),
            selected,
        });
    }

    fn add_from_input(&mut self, modal: &mut DayModal) {
        let Some(key) = self.selected_key() else {
            return;
        };
        match self.store.add(&key, &modal.input) {
            Ok(index) => {
                modal.input.clear();
                modal.selected = Some(index);
                self.status_message = None;
            }
            Err(Error::EmptyTask) => {}
            Err(err) => self.set_error(err.to_string()),
        }
    }

    fn toggle_selected(&mut self, modal: &mut DayModal) {
        let (Some(key), Some(index)) = (self.selected_key(), modal.selected) else {
            return;
        };
        match self.store.toggle(&key, index) {
            Ok(_) => {}
            Err(Error::IndexOutOfRange { .. }) => self.set_info("no task selected".to_string()),
            Err(err) => self.set_error(err.to_string()),
        }
    }

    fn remove_selected(&mut self, modal: &mut DayModal) {
        let (Some(key), Some(index)) = (self.selected_key(), modal.selected) else {
            return;
        };
        match self.store.remove(&key, index) {
            Ok(_) => {
                let len = self.store.list_for(&key).len();
                modal.selected = match len {
                    0 => None,
                    _ => Some(index.min(len - 1)),
                };
            }
            Err(Error::IndexOutOfRange { .. }) => self.set_info("no task selected".to_string()),
            Err(err) => self.set_error(err.to_string()),
        }
    }

    fn export_chart(&mut self) {
        let Some(report) = self.chart.as_ref() else {
            self.set_info(NO_CHART_NOTICE.to_string());
            return;
        };
        let path = self.export_dir.join(export::default_file_name(self.today));
        match export::write_svg(&path, &report.title(), &report.buckets) {
            Ok(()) => self.set_info(format!("exported {}", path.display())),
            Err(Error::NoChart) => self.set_info(NO_CHART_NOTICE.to_string()),
            Err(err) => self.set_error(err.to_string()),
        }
    }
}

fn first_of_month(month0: u32, year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month0 + 1, 1)
}

pub fn run(options: ViewerOptions) -> Result<()> {
    let mut app = AppState::new(
        options.store,
        options.navigator,
        options.mode,
        options.export_dir,
        Local::now().date_naive(),
    );
    run_terminal(&mut app)
}

fn run_terminal<S: SnapshotStorage>(app: &mut AppState<S>) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let size = terminal.size()?;
    app.update_viewport(size.width, size.height);

    let result = run_loop(&mut terminal, app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_loop<S: SnapshotStorage>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState<S>,
) -> Result<()> {
    let mut dirty = true;
    loop {
        if dirty {
            app.refresh_chart();
            terminal.draw(|frame| view::render(frame, app))?;
            dirty = false;
        }

        if event::poll(PollDuration::from_millis(EVENT_POLL_MS))? {
            match event::read()? {
                Event::Key(key) => {
                    if handle_key(app, key) {
                        break;
                    }
                    dirty = true;
                }
                Event::Resize(width, height) => {
                    app.update_viewport(width, height);
                    dirty = true;
                }
                _ => {}
            }
        }
    }
    Ok(())
}

/// Apply one key press. Returns true when the viewer should exit.
pub(crate) fn handle_key<S: SnapshotStorage>(app: &mut AppState<S>, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    if let Some(mut modal) = app.modal.take() {
        let mut keep_open = true;
        match key.code {
            KeyCode::Esc => keep_open = false,
            KeyCode::Enter => app.add_from_input(&mut modal),
            KeyCode::Up => {
                modal.selected = modal.selected.map(|idx| idx.saturating_sub(1));
            }
            KeyCode::Down => {
                let len = app.selected_tasks().len();
                modal.selected = match modal.selected {
                    _ if len == 0 => None,
                    None => Some(0),
                    Some(idx) => Some((idx + 1).min(len - 1)),
                };
            }
            KeyCode::Char(' ') if modal.input.is_empty() => app.toggle_selected(&mut modal),
            KeyCode::Delete => app.remove_selected(&mut modal),
            KeyCode::Backspace => {
                modal.input.pop();
            }
            KeyCode::Char(ch) => modal.input.push(ch),
            _ => {}
        }
        if keep_open {
            app.modal = Some(modal);
        }
        return false;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return true,
        KeyCode::Left => app.move_selection(-1),
        KeyCode::Right => app.move_selection(1),
        KeyCode::Up => app.move_selection(-7),
        KeyCode::Down => app.move_selection(7),
        KeyCode::Char('n') => app.change_month(true),
        KeyCode::Char('p') => app.change_month(false),
        KeyCode::Char('m') => app.mode = app.mode.cycle(),
        KeyCode::Enter => app.open_modal(),
        KeyCode::Char('e') => app.export_chart(),
        _ => {}
    }
    false
}
