//! Markdown summary of the active task list

use std::fmt::Write as _;

use chrono::NaiveDate;

use crate::task::{sort_tasks, Filter, TaskRecord, TaskStatus};

const NOTE_PREVIEW_CHARS: usize = 80;

/// Render a markdown report of `tasks` as of `today`.
///
/// Sections appear in the order ongoing, todo, done; empty sections are
/// left out. Output depends only on the inputs.
pub fn generate(tasks: &[TaskRecord], today: NaiveDate) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Task Summary ({})", today.format("%Y-%m-%d"));
    out.push('\n');

    if tasks.is_empty() {
        out.push_str("No tasks yet.\n");
        return out;
    }

    let count = |status: TaskStatus| tasks.iter().filter(|task| task.status == status).count();
    let done = count(TaskStatus::Done);
    let _ = writeln!(
        out,
        "**Total:** {} {} | {} ongoing | {} todo | {} done | {}% complete",
        tasks.len(),
        plural(tasks.len(), "task", "tasks"),
        count(TaskStatus::Ongoing),
        count(TaskStatus::Todo),
        done,
        done * 100 / tasks.len()
    );

    for status in TaskStatus::ALL {
        let mut section: Vec<TaskRecord> = tasks
            .iter()
            .filter(|task| task.status == status)
            .cloned()
            .collect();
        if section.is_empty() {
            continue;
        }
        sort_tasks(&mut section, Filter::from(status));

        out.push('\n');
        let _ = writeln!(out, "## {} ({})", heading(status), section.len());
        out.push('\n');
        for task in &section {
            write_task(&mut out, task, today);
        }
    }
    out
}

fn write_task(out: &mut String, task: &TaskRecord, today: NaiveDate) {
    let _ = writeln!(out, "- **{}** `{}`", single_line(&task.title), task.short_id());

    let updated = task.updated_at.date_naive();
    let _ = writeln!(
        out,
        "  - created {}, updated {} ({})",
        task.created_at.date_naive().format("%Y-%m-%d"),
        updated.format("%Y-%m-%d"),
        age(updated, today)
    );

    if let Some(completed) = task.completed_at {
        let _ = writeln!(out, "  - completed {}", completed.date_naive().format("%Y-%m-%d"));
    }

    let notes = task.note_texts();
    if let Some(first) = notes.first() {
        let preview = preview(first);
        if notes.len() > 1 {
            let _ = writeln!(out, "  - notes ({}): {}", notes.len(), preview);
        } else {
            let _ = writeln!(out, "  - notes: {preview}");
        }
    }
}

fn heading(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Ongoing => "Ongoing",
        TaskStatus::Todo => "Todo",
        TaskStatus::Done => "Done",
    }
}

fn age(date: NaiveDate, today: NaiveDate) -> String {
    match (today - date).num_days() {
        days if days <= 0 => "today".to_string(),
        1 => "1 day ago".to_string(),
        days => format!("{days} days ago"),
    }
}

fn plural<'a>(n: usize, one: &'a str, many: &'a str) -> &'a str {
    if n == 1 {
        one
    } else {
        many
    }
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn preview(text: &str) -> String {
    let line = text.lines().next().unwrap_or_default().trim();
    if line.chars().count() <= NOTE_PREVIEW_CHARS {
        return line.to_string();
    }
    let truncated: String = line.chars().take(NOTE_PREVIEW_CHARS).collect();
    format!("{}...", truncated.trim_end())
}
