//! taskcal - Personal Task Calendar Library
//!
//! This library provides the core functionality for the taskcal CLI and
//! its terminal calendar.
//!
//! # Core Concepts
//!
//! - **Date keys**: `YYYY-MM-DD` strings naming a calendar day
//! - **Task map**: per-day ordered task lists, persisted as one JSON snapshot
//! - **Reports**: completed/uncompleted counts bucketed by day, week, or month
//! - **Navigation**: month cursor, bounded to one year or unbounded
//!
//! # Module Organization
//!
//! - `date_key`: Date key encoding, decoding, and month lengths
//! - `task`: Tasks, the task map, and the persisting task store
//! - `storage`: Snapshot storage backends (files, memory)
//! - `lock`: File locking and atomic writes
//! - `aggregate`: Report modes and bucket aggregation
//! - `calendar`: Month navigation and month grid layout
//! - `export`: SVG chart export
//! - `config`: Configuration loading from `taskcal.toml`
//! - `cli`: Command-line interface using clap
//! - `output`: JSON and human output for CLI commands
//! - `ui`: Interactive terminal calendar
//! - `error`: Error types and result aliases

pub mod aggregate;
pub mod calendar;
pub mod cli;
pub mod config;
pub mod date_key;
pub mod error;
pub mod export;
pub mod lock;
pub mod output;
pub mod storage;
pub mod task;
pub mod ui;

pub use error::{Error, Result};
