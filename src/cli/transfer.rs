//! Export and import commands.

use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;

use crate::cli::{plural, push_notices, push_usage_warning, unexpected, Context};
use crate::error::{Error, Result};
use crate::lock;
use crate::output::{emit_raw, emit_success, HumanOutput};
use crate::store::{Action, Outcome};
use crate::transfer::{self, ExportCounts};

pub struct ExportOptions {
    pub out: Option<PathBuf>,
    pub ctx: Context,
}

pub struct ImportOptions {
    pub file: PathBuf,
    pub ctx: Context,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportReport {
    path: PathBuf,
    counts: ExportCounts,
}

pub fn run_export(options: ExportOptions) -> Result<()> {
    let mut store = options.ctx.open_store()?;
    let now = Utc::now();
    let document = transfer::export(store.list(), now);

    if options.out.as_deref().is_some_and(is_stdio) {
        if options.ctx.output.json {
            return emit_success(options.ctx.output, "export", &document, None);
        }
        emit_raw(options.ctx.output, &transfer::to_json(&document)?);
        return Ok(());
    }

    let path = options
        .out
        .unwrap_or_else(|| PathBuf::from(transfer::backup_file_name(now)));
    let json = transfer::to_json(&document)?;
    lock::write_atomic_locked(
        &path,
        json.as_bytes(),
        store.config().storage.lock_timeout_ms,
    )?;
    tracing::debug!(path = %path.display(), tasks = document.counts.tasks, "exported");

    let mut human = HumanOutput::new(format!("Exported to {}", path.display()));
    push_notices(&mut human, &mut store);
    human.push_summary("tasks", document.counts.tasks.to_string());
    human.push_summary("history", document.counts.history.to_string());
    human.push_next_step(format!("todomaster import {}", path.display()));

    let report = ExportReport {
        path,
        counts: document.counts,
    };
    emit_success(options.ctx.output, "export", &report, Some(&human))
}

pub fn run_import(options: ImportOptions) -> Result<()> {
    let text = read_input(&options.file)?;
    let mut store = options.ctx.open_store()?;

    let outcome = store.apply(Action::Import { text }, Utc::now())?;
    let Outcome::Imported { report } = &outcome else {
        return Err(unexpected(&outcome));
    };

    let mut human = HumanOutput::new(format!(
        "Imported {}",
        plural(report.imported, "task", "tasks")
    ));
    push_notices(&mut human, &mut store);
    human.push_summary("history", report.imported_history.to_string());
    human.push_summary("skipped (already present)", report.skipped_existing.to_string());
    human.push_summary("rejected", report.rejected.len().to_string());
    for rejection in &report.rejected {
        human.push_warning(format!(
            "{}[{}]: {}",
            rejection.collection, rejection.index, rejection.reason
        ));
    }
    push_usage_warning(&mut human, &store);

    emit_success(options.ctx.output, "import", report, Some(&human))
}

fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == "-"
}

fn read_input(path: &Path) -> Result<String> {
    if is_stdio(path) {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }
    if !path.is_file() {
        return Err(Error::InvalidArgument(format!(
            "import file not found: {}",
            path.display()
        )));
    }
    Ok(std::fs::read_to_string(path)?)
}
