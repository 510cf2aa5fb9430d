//! Command-line interface for taskcal
//!
//! This module defines the CLI structure using clap derive macros.
//! Each subcommand is implemented in its own submodule.

use std::path::{Path, PathBuf};

use chrono::{Duration, Local, NaiveDate};
use clap::{Parser, Subcommand};

use crate::aggregate::ReportMode;
use crate::calendar::{CalendarCursor, NavigationPolicy, Navigator};
use crate::config::Config;
use crate::date_key::DateKey;
use crate::error::{Error, Result};
use crate::output::{HumanOutput, OutputOptions};
use crate::storage::{resolve_data_dir, FileStorage};
use crate::task::TaskStore;

mod init;
mod month;
mod report;
mod tasks;

/// taskcal - personal task calendar
///
/// Attach tasks to calendar days, tick them off, and chart how many got done.
#[derive(Parser, Debug)]
#[command(name = "taskcal")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding the task snapshot and config
    #[arg(long, global = true, env = "TASKCAL_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Config file (defaults to <data-dir>/taskcal.toml)
    #[arg(long, global = true, env = "TASKCAL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a task to a day
    Add {
        /// Day: YYYY-MM-DD, today, yesterday, or tomorrow
        date: String,

        /// Task text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Mark a task done, or undone if it already is
    Toggle {
        /// Day: YYYY-MM-DD, today, yesterday, or tomorrow
        date: String,

        /// Task position as shown by `list` (starting at 1)
        position: usize,
    },

    /// Delete a task
    Rm {
        /// Day: YYYY-MM-DD, today, yesterday, or tomorrow
        date: String,

        /// Task position as shown by `list` (starting at 1)
        position: usize,
    },

    /// List the tasks of a day
    List {
        /// Day: YYYY-MM-DD, today, yesterday, or tomorrow
        #[arg(default_value = "today")]
        date: String,
    },

    /// List every day that has tasks
    Days,

    /// Show completion statistics
    Report {
        /// Report mode: daily, weekly, monthly, currentWeek
        #[arg(long)]
        mode: Option<String>,

        /// Reference month (1-12)
        #[arg(long)]
        month: Option<u32>,

        /// Reference year
        #[arg(long)]
        year: Option<i32>,
    },

    /// Show a month as a calendar grid
    Month {
        /// Month (1-12)
        #[arg(long)]
        month: Option<u32>,

        /// Year
        #[arg(long)]
        year: Option<i32>,
    },

    /// Export the statistics chart as an SVG image
    Export {
        /// Report mode: daily, weekly, monthly, currentWeek
        #[arg(long)]
        mode: Option<String>,

        /// Reference month (1-12)
        #[arg(long)]
        month: Option<u32>,

        /// Reference year
        #[arg(long)]
        year: Option<i32>,

        /// Output file (defaults to chart-<today>.svg)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write a default config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Open the interactive calendar
    Ui {
        /// Initial report mode
        #[arg(long)]
        mode: Option<String>,
    },
}

/// Resolved environment shared by all commands
pub(crate) struct Context {
    pub data_dir: PathBuf,
    pub config_path: PathBuf,
    pub config: Config,
    pub output: OutputOptions,
    pub today: NaiveDate,
    /// Why the config file on disk was replaced by defaults, if it was
    pub config_warning: Option<String>,
}

impl Context {
    /// `creating_config` is set for `init`, which may name an explicit
    /// config file that does not exist yet.
    fn resolve(
        data_dir: Option<&Path>,
        config: Option<&Path>,
        output: OutputOptions,
        creating_config: bool,
    ) -> Result<Self> {
        let data_dir = resolve_data_dir(data_dir);
        let (config_path, config, ignored) = match config {
            // An explicit config must exist and be valid.
            Some(path) if !creating_config => (path.to_path_buf(), Config::load(path)?, None),
            Some(path) => {
                let (config, ignored) = Config::load_lenient(path);
                (path.to_path_buf(), config, ignored)
            }
            None => {
                let path = Config::path_in(&data_dir);
                let (config, ignored) = Config::load_lenient(&path);
                (path, config, ignored)
            }
        };
        let config_warning = ignored
            .map(|err| format!("ignored {} and used defaults: {err}", config_path.display()));

        Ok(Self {
            data_dir,
            config_path,
            config,
            output,
            today: Local::now().date_naive(),
            config_warning,
        })
    }

    /// Human output that carries the ignored-config warning, if any.
    pub fn human(&self, header: impl Into<String>) -> HumanOutput {
        let mut human = HumanOutput::new(header);
        if let Some(warning) = &self.config_warning {
            human.push_warning(warning.clone());
        }
        human
    }

    pub fn open_store(&self) -> TaskStore<FileStorage> {
        TaskStore::open_with_slot(
            FileStorage::new(&self.data_dir),
            self.config.storage.slot.clone(),
        )
    }

    pub fn policy(&self) -> NavigationPolicy {
        self.config.navigation_policy()
    }

    pub fn mode(&self, explicit: Option<&str>) -> Result<ReportMode> {
        match explicit {
            Some(raw) => raw.parse(),
            None => Ok(self.config.default_mode()),
        }
    }

    /// Navigator positioned on today's month, or on the requested one.
    pub fn navigator(&self, month: Option<u32>, year: Option<i32>) -> Result<Navigator> {
        let policy = self.policy();
        let start = Navigator::new(CalendarCursor::containing(self.today), policy).cursor();

        let month0 = match month {
            Some(month) if (1..=12).contains(&month) => month - 1,
            Some(month) => {
                return Err(Error::InvalidArgument(format!(
                    "month {month} out of range (expected 1-12)"
                )))
            }
            None => start.month,
        };
        let year = year.unwrap_or(start.year);

        if let NavigationPolicy::Bounded { year: bounded } = policy {
            if year != bounded {
                return Err(Error::InvalidArgument(format!(
                    "year {year} is outside the configured calendar year {bounded}"
                )));
            }
        }

        Ok(Navigator::new(CalendarCursor::new(month0, year)?, policy))
    }

    /// Parse a date argument relative to today.
    pub fn date(&self, raw: &str) -> Result<DateKey> {
        parse_date_arg(raw, self.today)
    }
}

/// `YYYY-MM-DD`, `today`, `yesterday` or `tomorrow`.
pub fn parse_date_arg(raw: &str, today: NaiveDate) -> Result<DateKey> {
    match raw.trim().to_lowercase().as_str() {
        "today" => DateKey::from_date(today),
        "yesterday" => DateKey::from_date(today - Duration::days(1)),
        "tomorrow" => DateKey::from_date(today + Duration::days(1)),
        other => DateKey::parse(other),
    }
}

/// Convert a 1-based CLI position into a list index.
pub(crate) fn position_to_index(position: usize) -> Result<usize> {
    position
        .checked_sub(1)
        .ok_or_else(|| Error::InvalidArgument("task positions start at 1".to_string()))
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let output = OutputOptions {
            json: self.json,
            quiet: self.quiet,
        };
        let creating_config = matches!(self.command, Commands::Init { .. });
        let ctx = Context::resolve(
            self.data_dir.as_deref(),
            self.config.as_deref(),
            output,
            creating_config,
        )?;

        match self.command {
            Commands::Add { date, text } => tasks::run_add(&ctx, tasks::AddOptions { date, text }),
            Commands::Toggle { date, position } => {
                tasks::run_toggle(&ctx, tasks::PositionOptions { date, position })
            }
            Commands::Rm { date, position } => {
                tasks::run_rm(&ctx, tasks::PositionOptions { date, position })
            }
            Commands::List { date } => tasks::run_list(&ctx, &date),
            Commands::Days => tasks::run_days(&ctx),
            Commands::Report { mode, month, year } => {
                report::run_report(&ctx, report::ReportOptions { mode, month, year })
            }
            Commands::Export {
                mode,
                month,
                year,
                output,
            } => report::run_export(
                &ctx,
                report::ExportOptions {
                    report: report::ReportOptions { mode, month, year },
                    output,
                },
            ),
            Commands::Month { month, year } => month::run(&ctx, month, year),
            Commands::Init { force } => init::run(&ctx, force),
            Commands::Ui { mode } => {
                let mode = ctx.mode(mode.as_deref())?;
                let navigator = ctx.navigator(None, None)?;
                crate::ui::calendar_view::run(crate::ui::calendar_view::ViewerOptions {
                    store: ctx.open_store(),
                    navigator,
                    mode,
                    export_dir: ctx.data_dir.clone(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx_with(config: Config, today: NaiveDate) -> Context {
        Context {
            data_dir: PathBuf::from("."),
            config_path: PathBuf::from("taskcal.toml"),
            config,
            output: OutputOptions {
                json: false,
                quiet: true,
            },
            today,
            config_warning: None,
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn date_keywords_resolve_against_today() {
        let today = day(2025, 3, 1);
        assert_eq!(parse_date_arg("today", today).unwrap().to_string(), "2025-03-01");
        assert_eq!(parse_date_arg("Yesterday", today).unwrap().to_string(), "2025-02-28");
        assert_eq!(parse_date_arg("tomorrow", today).unwrap().to_string(), "2025-03-02");
        assert_eq!(parse_date_arg("2024-12-31", today).unwrap().to_string(), "2024-12-31");
        assert!(matches!(
            parse_date_arg("31/12/2024", today),
            Err(Error::MalformedKey(_))
        ));
    }

    #[test]
    fn positions_are_one_based() {
        assert_eq!(position_to_index(1).unwrap(), 0);
        assert!(matches!(position_to_index(0), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn navigator_defaults_to_today() {
        let ctx = ctx_with(Config::default(), day(2025, 7, 4));
        assert_eq!(ctx.navigator(None, None).unwrap().current(), (6, 2025));
        assert_eq!(ctx.navigator(Some(1), Some(2030)).unwrap().current(), (0, 2030));
        assert!(ctx.navigator(Some(13), None).is_err());
    }

    #[test]
    fn bounded_navigator_defaults_into_its_year() {
        let mut config = Config::default();
        config.calendar.policy = "bounded".to_string();
        config.calendar.year = Some(2025);
        let ctx = ctx_with(config, day(2026, 10, 16));

        assert_eq!(ctx.navigator(None, None).unwrap().current(), (9, 2025));
        assert!(matches!(
            ctx.navigator(Some(1), Some(2026)),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn navigator_rejects_years_a_key_cannot_hold() {
        let ctx = ctx_with(Config::default(), day(2025, 7, 4));
        assert!(matches!(
            ctx.navigator(Some(12), Some(i32::MAX)),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            ctx.navigator(Some(1), Some(-5)),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn invalid_implicit_config_surfaces_as_warning() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            Config::path_in(dir.path()),
            "[calendar]\npolicy = \"bounded\"",
        )
        .unwrap();
        let output = OutputOptions {
            json: false,
            quiet: true,
        };

        let ctx = Context::resolve(Some(dir.path()), None, output, false).unwrap();
        assert_eq!(ctx.policy(), NavigationPolicy::Unbounded);
        let warning = ctx.config_warning.clone().expect("warning");
        assert!(warning.contains("calendar.year is required"));

        let text = crate::output::format_human(&ctx.human("Header"));
        assert!(text.contains("Warnings:"));
    }

    #[test]
    fn missing_explicit_config_only_allowed_when_creating_it() {
        let dir = tempfile::tempdir().unwrap();
        let fresh = dir.path().join("fresh.toml");
        let output = OutputOptions {
            json: false,
            quiet: true,
        };

        assert!(Context::resolve(Some(dir.path()), Some(&fresh), output, false).is_err());
        let ctx = Context::resolve(Some(dir.path()), Some(&fresh), output, true).unwrap();
        assert_eq!(ctx.config_path, fresh);
        assert!(ctx.config_warning.is_none());
    }

    #[test]
    fn explicit_mode_overrides_config() {
        let ctx = ctx_with(Config::default(), day(2025, 1, 1));
        assert_eq!(ctx.mode(None).unwrap(), ReportMode::Daily);
        assert_eq!(ctx.mode(Some("monthly")).unwrap(), ReportMode::Monthly);
        assert!(ctx.mode(Some("hourly")).is_err());
    }

    #[test]
    fn cli_parses_multi_word_task_text() {
        let cli = Cli::try_parse_from(["taskcal", "add", "today", "Buy", "milk"]).unwrap();
        match cli.command {
            Commands::Add { date, text } => {
                assert_eq!(date, "today");
                assert_eq!(text, vec!["Buy".to_string(), "milk".to_string()]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
