//! Configuration loading and management
//!
//! Handles parsing of `taskcal.toml` configuration files.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::aggregate::ReportMode;
use crate::calendar::NavigationPolicy;
use crate::date_key::MAX_YEAR;
use crate::storage::{validate_slot_key, TASKS_SLOT};

/// Config file name inside the data directory
pub const CONFIG_FILE: &str = "taskcal.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Calendar navigation
    #[serde(default)]
    pub calendar: CalendarConfig,

    /// Report defaults
    #[serde(default)]
    pub report: ReportConfig,

    /// Snapshot storage
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Calendar navigation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// "unbounded" wraps across years, "bounded" stays inside `year`
    #[serde(default = "default_policy")]
    pub policy: String,

    /// Year navigation is confined to when `policy = "bounded"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

fn default_policy() -> String {
    "unbounded".to_string()
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            policy: default_policy(),
            year: None,
        }
    }
}

/// Report configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Mode used when none is given
    #[serde(default = "default_mode")]
    pub default_mode: String,
}

fn default_mode() -> String {
    "daily".to_string()
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            default_mode: default_mode(),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Slot name the task snapshot is stored under
    #[serde(default = "default_slot")]
    pub slot: String,
}

fn default_slot() -> String {
    TASKS_SLOT.to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            slot: default_slot(),
        }
    }
}

impl CalendarConfig {
    pub fn navigation_policy(&self) -> crate::error::Result<NavigationPolicy> {
        match self.policy.trim().to_lowercase().as_str() {
            "unbounded" => Ok(NavigationPolicy::Unbounded),
            "bounded" => match self.year {
                Some(year) if (0..=MAX_YEAR).contains(&year) => {
                    Ok(NavigationPolicy::Bounded { year })
                }
                Some(year) => Err(crate::error::Error::InvalidConfig(format!(
                    "calendar.year: {year} out of range (expected 0-{MAX_YEAR})"
                ))),
                None => Err(crate::error::Error::InvalidConfig(
                    "calendar.year is required when calendar.policy = \"bounded\"".to_string(),
                )),
            },
            other => Err(crate::error::Error::InvalidConfig(format!(
                "calendar.policy: invalid policy '{other}' (expected unbounded|bounded)"
            ))),
        }
    }
}

impl ReportConfig {
    pub fn mode(&self) -> crate::error::Result<ReportMode> {
        self.default_mode.parse().map_err(|_| {
            crate::error::Error::InvalidConfig(format!(
                "report.default_mode: invalid mode '{}'",
                self.default_mode
            ))
        })
    }
}

impl Config {
    /// Load configuration from a `taskcal.toml` file
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `path`, or return defaults if missing or invalid
    pub fn load_or_default(path: &Path) -> Self {
        Self::load_lenient(path).0
    }

    /// Like [`Config::load_or_default`], also handing back the error that
    /// caused an existing file to be ignored.
    pub fn load_lenient(path: &Path) -> (Self, Option<crate::error::Error>) {
        if !path.exists() {
            return (Self::default(), None);
        }
        match Self::load(path) {
            Ok(config) => (config, None),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "ignoring invalid config");
                (Self::default(), Some(err))
            }
        }
    }

    /// Default config location inside a data directory
    pub fn path_in(data_dir: &Path) -> PathBuf {
        data_dir.join(CONFIG_FILE)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> crate::error::Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Navigation policy with config errors downgraded to the default
    pub fn navigation_policy(&self) -> NavigationPolicy {
        self.calendar
            .navigation_policy()
            .unwrap_or(NavigationPolicy::Unbounded)
    }

    /// Report mode with config errors downgraded to the default
    pub fn default_mode(&self) -> ReportMode {
        self.report.mode().unwrap_or(ReportMode::Daily)
    }

    fn validate(&self) -> crate::error::Result<()> {
        self.calendar.navigation_policy()?;
        self.report.mode()?;
        validate_slot_key(&self.storage.slot)?;
        Ok(())
    }
}
