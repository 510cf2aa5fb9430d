//! taskcal init command implementation
//!
//! Creates the data directory and a default `taskcal.toml`.

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::Result;
use crate::output::emit_success;

use super::Context;

#[derive(serde::Serialize)]
struct InitReport {
    data_dir: PathBuf,
    config: PathBuf,
    created: InitCreated,
}

#[derive(serde::Serialize)]
struct InitCreated {
    data_dir: bool,
    config: bool,
}

pub fn run(ctx: &Context, force: bool) -> Result<()> {
    let created_data_dir = ensure_dir(&ctx.data_dir)?;
    let existed = ctx.config_path.exists();
    let created_config = if existed && !force {
        false
    } else {
        Config::default().save(&ctx.config_path)?;
        true
    };

    let report = InitReport {
        data_dir: ctx.data_dir.clone(),
        config: ctx.config_path.clone(),
        created: InitCreated {
            data_dir: created_data_dir,
            config: created_config,
        },
    };

    let header = if created_config || created_data_dir {
        format!("Initialized taskcal in {}", ctx.data_dir.display())
    } else {
        format!("taskcal already initialized in {}", ctx.data_dir.display())
    };
    let mut human = ctx.human(header);
    human.push_summary("config", ctx.config_path.display().to_string());
    if existed && !force {
        human.push_warning("config exists; use --force to overwrite it with defaults");
    }
    human.push_next_step("taskcal add today \"...\"");

    emit_success(ctx.output, "init", &report, Some(&human))
}

fn ensure_dir(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    std::fs::create_dir_all(path)?;
    Ok(true)
}
