//! Bulk cleanup, history, summary and usage commands.

use chrono::{NaiveDate, Utc};
use serde::Serialize;

use crate::cli::{confirm, plural, push_notices, unexpected, Context};
use crate::error::Result;
use crate::output::{emit_raw, emit_success, HumanOutput};
use crate::store::{Action, Outcome};
use crate::summary;
use crate::task::HistoryEntry;

pub struct CleanupOptions {
    pub days: Option<u32>,
    pub ctx: Context,
}

pub struct ClearOptions {
    pub yes: bool,
    pub ctx: Context,
}

pub struct SummaryOptions {
    pub date: Option<NaiveDate>,
    pub ctx: Context,
}

#[derive(Serialize)]
struct ClearedOutput {
    removed: usize,
}

#[derive(Serialize)]
struct HistoryOutput<'a> {
    count: usize,
    entries: Vec<&'a HistoryEntry>,
}

#[derive(Serialize)]
struct SummaryOutput<'a> {
    date: NaiveDate,
    markdown: &'a str,
}

pub fn run_cleanup(options: CleanupOptions) -> Result<()> {
    let mut store = options.ctx.open_store()?;
    let days = options
        .days
        .unwrap_or(store.config().cleanup.older_than_days);

    let outcome = store.apply(
        Action::Cleanup {
            older_than_days: days,
        },
        Utc::now(),
    )?;
    let Outcome::CleanedUp { report } = &outcome else {
        return Err(unexpected(&outcome));
    };

    let mut human = HumanOutput::new(format!(
        "Removed {} done more than {days} days ago",
        plural(report.removed_count, "task", "tasks")
    ));
    push_notices(&mut human, &mut store);
    human.push_summary("removed", report.removed_count.to_string());
    human.push_summary("remaining", report.remaining_count.to_string());
    human.push_summary("cutoff", report.cutoff.to_rfc3339());

    emit_success(options.ctx.output, "cleanup", report, Some(&human))
}

pub fn run_clear_completed(options: ClearOptions) -> Result<()> {
    let mut store = options.ctx.open_store()?;
    let done = store.list().counts().done;
    if done == 0 {
        let human = HumanOutput::new("No completed tasks to clear");
        return emit_success(
            options.ctx.output,
            "clear-completed",
            &ClearedOutput { removed: 0 },
            Some(&human),
        );
    }

    let prompt = format!("Delete {}?", plural(done, "completed task", "completed tasks"));
    if !confirm(&prompt, options.yes)? {
        let human = HumanOutput::new("Cancelled; nothing deleted");
        return emit_success(
            options.ctx.output,
            "clear-completed",
            &ClearedOutput { removed: 0 },
            Some(&human),
        );
    }

    let outcome = store.apply(Action::ClearCompleted, Utc::now())?;
    let Outcome::ClearedCompleted { removed } = outcome else {
        return Err(unexpected(&outcome));
    };

    let mut human = HumanOutput::new(format!(
        "Cleared {}",
        plural(removed, "completed task", "completed tasks")
    ));
    push_notices(&mut human, &mut store);

    emit_success(
        options.ctx.output,
        "clear-completed",
        &ClearedOutput { removed },
        Some(&human),
    )
}

pub fn run_history_list(ctx: Context) -> Result<()> {
    let mut store = ctx.open_store()?;
    let notices = store.take_notices();

    let mut entries: Vec<&HistoryEntry> = store.list().history.iter().collect();
    entries.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));

    let mut human = HumanOutput::new(format!(
        "{} in history",
        plural(entries.len(), "entry", "entries")
    ));
    for notice in notices {
        human.push_warning(notice);
    }
    for entry in &entries {
        human.push_detail(format!(
            "{}  {}  {}",
            entry.completed_at.format("%Y-%m-%d"),
            entry.short_id(),
            entry.title
        ));
    }
    if entries.is_empty() && !store.settings().archive_on_complete {
        human.push_next_step("todomaster settings set archive-on-complete true");
    }

    let output = HistoryOutput {
        count: entries.len(),
        entries,
    };
    emit_success(ctx.output, "history list", &output, Some(&human))
}

pub fn run_history_clear(options: ClearOptions) -> Result<()> {
    let mut store = options.ctx.open_store()?;
    let count = store.list().history.len();
    if count == 0 {
        let human = HumanOutput::new("History is already empty");
        return emit_success(
            options.ctx.output,
            "history clear",
            &ClearedOutput { removed: 0 },
            Some(&human),
        );
    }

    let prompt = format!("Delete {} from history?", plural(count, "entry", "entries"));
    if !confirm(&prompt, options.yes)? {
        let human = HumanOutput::new("Cancelled; nothing deleted");
        return emit_success(
            options.ctx.output,
            "history clear",
            &ClearedOutput { removed: 0 },
            Some(&human),
        );
    }

    let outcome = store.apply(Action::ClearHistory, Utc::now())?;
    let Outcome::ClearedHistory { removed } = outcome else {
        return Err(unexpected(&outcome));
    };

    let mut human = HumanOutput::new(format!(
        "Cleared {} from history",
        plural(removed, "entry", "entries")
    ));
    push_notices(&mut human, &mut store);

    emit_success(
        options.ctx.output,
        "history clear",
        &ClearedOutput { removed },
        Some(&human),
    )
}

pub fn run_summary(options: SummaryOptions) -> Result<()> {
    let store = options.ctx.open_store()?;
    let date = options.date.unwrap_or_else(|| Utc::now().date_naive());
    let markdown = summary::generate(&store.list().tasks, date);

    if options.ctx.output.json {
        let output = SummaryOutput {
            date,
            markdown: &markdown,
        };
        return emit_success(options.ctx.output, "summary", &output, None);
    }
    for notice in store.notices() {
        tracing::warn!(notice = %notice, "summary");
    }
    emit_raw(options.ctx.output, &markdown);
    Ok(())
}

pub fn run_usage(ctx: Context) -> Result<()> {
    let mut store = ctx.open_store()?;
    let usage = store.usage()?;

    let mut human = HumanOutput::new("Storage usage");
    push_notices(&mut human, &mut store);
    human.push_summary("bytes", usage.bytes_in_use.to_string());
    human.push_summary("quota", usage.quota_bytes.to_string());
    human.push_summary("used", format!("{:.1}%", usage.percent));
    human.push_summary("path", store.backend().path().display().to_string());
    if let Some(warning) = &usage.warning {
        human.push_warning(warning.clone());
        human.push_next_step("todomaster cleanup --days 30");
    }

    emit_success(ctx.output, "usage", &usage, Some(&human))
}
