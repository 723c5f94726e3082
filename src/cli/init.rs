//! todomaster init command implementation
//!
//! Writes an empty storage document and a default config.toml when either
//! is missing.

use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::cli::{push_notices, Context};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput};

#[derive(serde::Serialize)]
struct InitReport {
    storage: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    config: Option<PathBuf>,
    created: InitCreated,
}

#[derive(serde::Serialize)]
struct InitCreated {
    storage: bool,
    config: bool,
}

pub fn run(ctx: Context) -> Result<()> {
    let mut store = ctx.open_store()?;
    let created_storage = store.initialize(Utc::now())?;

    let config_path = ctx.config_path();
    let created_config = match &config_path {
        Some(path) => ensure_config(path, store.config())?,
        None => false,
    };

    let storage = store.backend().path().to_path_buf();
    let report = InitReport {
        storage: storage.clone(),
        config: config_path.clone(),
        created: InitCreated {
            storage: created_storage,
            config: created_config,
        },
    };

    let mut created_items = Vec::new();
    if created_storage {
        created_items.push("storage.json");
    }
    if created_config {
        created_items.push("config.toml");
    }

    let header = if created_items.is_empty() {
        "todomaster init: nothing to do".to_string()
    } else {
        "todomaster init: initialized".to_string()
    };

    let mut human = HumanOutput::new(header);
    push_notices(&mut human, &mut store);
    human.push_summary("storage", storage.display().to_string());
    if let Some(path) = &config_path {
        human.push_summary("config", path.display().to_string());
    }
    human.push_summary(
        "created",
        if created_items.is_empty() {
            "none".to_string()
        } else {
            created_items.join(", ")
        },
    );
    human.push_next_step("todomaster add \"Buy milk\"");

    emit_success(ctx.output, "init", &report, Some(&human))
}

fn ensure_config(path: &Path, config: &Config) -> Result<bool> {
    if path.exists() {
        if !path.is_file() {
            return Err(Error::InvalidConfig(format!(
                "config path exists but is not a file: {}",
                path.display()
            )));
        }
        return Ok(false);
    }

    config.save(path)?;
    Ok(true)
}
