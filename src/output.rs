//! Command output for taskcal.
//!
//! With `--json` every command prints one `taskcal.v1` envelope on stdout,
//! `status` being `success` (with `data`) or `error` (with `error`). Without
//! it, commands print a header followed by optional Summary, Details,
//! Warnings and Next steps blocks.

use serde::Serialize;

use crate::error::{Error, Result};

pub const SCHEMA_VERSION: &str = "taskcal.v1";

#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub json: bool,
    /// Drop human output entirely; JSON is still printed
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Details,
    Warnings,
    NextSteps,
}

impl Section {
    const ORDER: [Section; 3] = [Section::Details, Section::Warnings, Section::NextSteps];

    fn title(self) -> &'static str {
        match self {
            Section::Details => "Details",
            Section::Warnings => "Warnings",
            Section::NextSteps => "Next steps",
        }
    }
}

/// Text shown for a command when `--json` is off.
#[derive(Debug, Clone)]
pub struct HumanOutput {
    header: String,
    summary: Vec<(String, String)>,
    items: Vec<(Section, String)>,
}

impl HumanOutput {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            summary: Vec::new(),
            items: Vec::new(),
        }
    }

    /// `key: value` line; an empty value prints the key alone.
    pub fn push_summary(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.summary.push((key.into(), value.into()));
    }

    pub fn push_detail(&mut self, value: impl Into<String>) {
        self.items.push((Section::Details, value.into()));
    }

    /// Also lands in the JSON envelope's `warnings`.
    pub fn push_warning(&mut self, value: impl Into<String>) {
        self.items.push((Section::Warnings, value.into()));
    }

    /// Also lands in the JSON envelope's `next_steps`.
    pub fn push_next_step(&mut self, value: impl Into<String>) {
        self.items.push((Section::NextSteps, value.into()));
    }

    fn section(&self, section: Section) -> Vec<String> {
        self.items
            .iter()
            .filter(|(kind, _)| *kind == section)
            .map(|(_, item)| item.clone())
            .collect()
    }
}

#[derive(Serialize)]
struct Envelope<'a, B: Serialize> {
    schema_version: &'static str,
    command: &'a str,
    status: &'static str,
    #[serde(flatten)]
    body: B,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    next_steps: Vec<String>,
}

#[derive(Serialize)]
struct SuccessBody<'a, T: Serialize> {
    data: &'a T,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: ErrorDetail<'a>,
}

#[derive(Serialize)]
struct ErrorDetail<'a> {
    message: &'a str,
    code: i32,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

fn print_envelope<B: Serialize>(envelope: &Envelope<'_, B>) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(envelope)?);
    Ok(())
}

/// Print a command's result as an envelope or as human text.
pub fn emit_success<T: Serialize>(
    options: OutputOptions,
    command: &str,
    data: &T,
    human: Option<&HumanOutput>,
) -> Result<()> {
    if options.json {
        let section = |kind| human.map(|h| h.section(kind)).unwrap_or_default();
        return print_envelope(&Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "success",
            body: SuccessBody { data },
            warnings: section(Section::Warnings),
            next_steps: section(Section::NextSteps),
        });
    }

    match human {
        Some(human) if !options.quiet => println!("{}", format_human(human)),
        _ => {}
    }
    Ok(())
}

/// Report a failed command. Human errors go to stderr with at most one hint.
pub fn emit_error(command: &str, err: &Error, json: bool) -> Result<()> {
    let next_steps = error_next_steps(err);
    if json {
        let message = err.to_string();
        return print_envelope(&Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "error",
            body: ErrorBody {
                error: ErrorDetail {
                    message: &message,
                    code: err.exit_code(),
                    kind: error_kind(err),
                    details: err.details(),
                },
            },
            warnings: Vec::new(),
            next_steps,
        });
    }

    eprintln!("error: {err}");
    if let Some(hint) = next_steps.first() {
        eprintln!("hint: {hint}");
    }
    Ok(())
}

pub fn format_human(output: &HumanOutput) -> String {
    let mut lines = vec![output.header.clone()];

    if !output.summary.is_empty() {
        lines.push(String::new());
        lines.push("Summary:".to_string());
        lines.extend(output.summary.iter().map(|(key, value)| {
            if value.is_empty() {
                format!("- {key}")
            } else {
                format!("- {key}: {value}")
            }
        }));
    }

    for section in Section::ORDER {
        let items = output.section(section);
        if items.is_empty() {
            continue;
        }
        lines.push(String::new());
        lines.push(format!("{}:", section.title()));
        lines.extend(items.iter().map(|item| format!("- {item}")));
    }

    lines.join("\n")
}

/// First positional argument, used to label error output before clap runs.
pub fn infer_command_name_from_args() -> String {
    std::env::args()
        .skip(1)
        .scan(false, |skip_value, arg| {
            // Global options that take a separate value.
            let takes_value = matches!(arg.as_str(), "--data-dir" | "--config");
            let skip = *skip_value;
            *skip_value = takes_value;
            Some((skip, arg))
        })
        .find(|(skip, arg)| !skip && !arg.starts_with('-'))
        .map(|(_, arg)| arg)
        .unwrap_or_else(|| "taskcal".to_string())
}

fn error_kind(err: &Error) -> &'static str {
    match err.exit_code() {
        2 => "user_error",
        _ => "operation_failed",
    }
}

fn error_next_steps(err: &Error) -> Vec<String> {
    match err {
        Error::EmptyTask => vec!["taskcal add <date> \"task text\"".to_string()],
        Error::IndexOutOfRange { key, .. } => vec![format!("taskcal list {key}")],
        Error::MalformedKey(_) => vec!["use dates like 2025-03-15 or 'today'".to_string()],
        Error::InvalidConfig(_) => vec!["fix taskcal.toml then retry".to_string()],
        Error::LockFailed(_) => vec!["retry once the other taskcal process exits".to_string()],
        _ => Vec::new(),
    }
}
