//! todomaster task command implementations.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cli::{confirm, plural, push_notices, push_usage_warning, unexpected, Context};
use crate::error::{Error, Result};
use crate::lifecycle::{Counts, NewTask, Removed, TaskEdit, Transition};
use crate::output::{emit_success, HumanOutput};
use crate::search::{self, MatchSpan, NoteMatch};
use crate::store::{Action, Outcome};
use crate::task::{short_id, Filter, HistoryEntry, Notes, TaskRecord, TaskStatus};

pub struct AddOptions {
    pub title: String,
    pub notes: Option<String>,
    pub status: Option<String>,
    pub ctx: Context,
}

pub struct ListOptions {
    pub filter: Option<String>,
    pub search: Option<String>,
    pub ctx: Context,
}

pub struct ShowOptions {
    pub id: String,
    pub ctx: Context,
}

pub struct EditOptions {
    pub id: String,
    pub title: Option<String>,
    pub notes: Option<String>,
    pub ctx: Context,
}

pub struct StatusOptions {
    pub id: String,
    pub status: String,
    pub ctx: Context,
}

pub struct ToggleOptions {
    pub id: String,
    pub ctx: Context,
}

pub struct NoteOptions {
    pub id: String,
    pub text: String,
    pub ctx: Context,
}

pub struct RmOptions {
    pub id: String,
    pub yes: bool,
    pub ctx: Context,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ListedTask<'a> {
    #[serde(flatten)]
    task: &'a TaskRecord,
    short_id: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    title_matches: Vec<MatchSpan>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    note_matches: Vec<NoteMatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    title_html: Option<String>,
}

#[derive(Serialize)]
struct ListOutput<'a> {
    filter: Filter,
    #[serde(skip_serializing_if = "Option::is_none")]
    query: Option<&'a str>,
    counts: Counts,
    tasks: Vec<ListedTask<'a>>,
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
enum ShowOutput<'a> {
    Task { task: &'a TaskRecord },
    History { entry: &'a HistoryEntry },
}

pub fn run_add(options: AddOptions) -> Result<()> {
    let mut store = options.ctx.open_store()?;
    let mut draft = NewTask::new(options.title);
    draft.notes = options.notes;
    draft.status = options
        .status
        .as_deref()
        .map(str::parse::<TaskStatus>)
        .transpose()?;

    let outcome = store.apply(Action::Add(draft), Utc::now())?;
    let Outcome::Added { task } = &outcome else {
        return Err(unexpected(&outcome));
    };

    let mut human = HumanOutput::new(format!("Added \"{}\"", task.title));
    push_notices(&mut human, &mut store);
    human.push_summary("id", task.short_id());
    human.push_summary("status", task.status.as_str());
    push_usage_warning(&mut human, &store);

    emit_success(options.ctx.output, "add", task, Some(&human))
}

pub fn run_list(options: ListOptions) -> Result<()> {
    let mut store = options.ctx.open_store()?;
    let filter = match options.filter.as_deref() {
        Some(raw) => raw.parse::<Filter>()?,
        None => store.settings().filter,
    };
    let query = options
        .search
        .as_deref()
        .map(str::trim)
        .filter(|query| !query.is_empty());

    let visible = store.list().visible(filter);
    let listed: Vec<ListedTask<'_>> = match query {
        Some(query) => search::search(&visible, query)
            .into_iter()
            .map(|hit| ListedTask {
                task: hit.task,
                short_id: hit.task.short_id(),
                title_html: Some(search::highlight(&hit.task.title, &hit.title_matches)),
                title_matches: hit.title_matches,
                note_matches: hit.note_matches,
            })
            .collect(),
        None => visible
            .iter()
            .map(|task| ListedTask {
                task,
                short_id: task.short_id(),
                title_matches: Vec::new(),
                note_matches: Vec::new(),
                title_html: None,
            })
            .collect(),
    };

    let counts = store.list().counts();
    let header = match query {
        Some(query) => format!(
            "{} matching \"{query}\" ({filter})",
            plural(listed.len(), "task", "tasks")
        ),
        None => format!("{} ({filter})", plural(listed.len(), "task", "tasks")),
    };
    let mut human = HumanOutput::new(header);
    push_notices(&mut human, &mut store);
    human.push_summary(
        "open",
        format!("{} todo, {} ongoing", counts.todo, counts.ongoing),
    );
    human.push_summary("done", counts.done.to_string());
    for item in &listed {
        human.push_detail(task_line(item.task));
    }
    if counts.total == 0 {
        human.push_next_step("todomaster add \"Buy milk\"");
    }

    let output = ListOutput {
        filter,
        query,
        counts,
        tasks: listed,
    };
    emit_success(options.ctx.output, "list", &output, Some(&human))
}

pub fn run_show(options: ShowOptions) -> Result<()> {
    let mut store = options.ctx.open_store()?;
    let id = store.list().resolve_id(&options.id)?;
    let notices = store.take_notices();

    let list = store.list();
    let (mut human, output) = if let Some(task) = list.get(&id) {
        let mut human = HumanOutput::new(format!("Task {}", task.short_id()));
        human.push_summary("title", task.title.clone());
        human.push_summary("status", task.status.as_str());
        push_timestamps(&mut human, task.created_at, task.updated_at, task.completed_at);
        push_notes(&mut human, task.notes.as_ref());
        (human, ShowOutput::Task { task })
    } else if let Some(entry) = list.get_history(&id) {
        let mut human = HumanOutput::new(format!("History entry {}", entry.short_id()));
        human.push_summary("title", entry.title.clone());
        human.push_summary("status", "done (archived)");
        push_timestamps(
            &mut human,
            entry.created_at,
            entry.updated_at,
            Some(entry.completed_at),
        );
        push_notes(&mut human, entry.notes.as_ref());
        (human, ShowOutput::History { entry })
    } else {
        return Err(Error::TaskNotFound(id));
    };
    for notice in notices {
        human.push_warning(notice);
    }

    emit_success(options.ctx.output, "show", &output, Some(&human))
}

pub fn run_edit(options: EditOptions) -> Result<()> {
    let mut store = options.ctx.open_store()?;
    let action = Action::Edit {
        id: options.id,
        edit: TaskEdit {
            title: options.title,
            notes: options.notes,
        },
    };
    let outcome = store.apply(action, Utc::now())?;
    let Outcome::Edited { task } = &outcome else {
        return Err(unexpected(&outcome));
    };

    let mut human = HumanOutput::new(format!("Updated \"{}\"", task.title));
    push_notices(&mut human, &mut store);
    human.push_summary("id", task.short_id());
    push_usage_warning(&mut human, &store);

    emit_success(options.ctx.output, "edit", task, Some(&human))
}

pub fn run_status(options: StatusOptions) -> Result<()> {
    let status = options.status.parse::<TaskStatus>()?;
    let action = Action::SetStatus {
        id: options.id,
        status,
    };
    run_transition(options.ctx, action, "status")
}

pub fn run_toggle(options: ToggleOptions) -> Result<()> {
    run_transition(options.ctx, Action::Toggle { id: options.id }, "toggle")
}

fn run_transition(ctx: Context, action: Action, command: &str) -> Result<()> {
    let mut store = ctx.open_store()?;
    let outcome = store.apply(action, Utc::now())?;
    let Outcome::StatusChanged { transition } = &outcome else {
        return Err(unexpected(&outcome));
    };

    let mut human = match transition {
        Transition::Updated { from, task } => {
            HumanOutput::new(format!("\"{}\": {from} -> {}", task.title, task.status))
        }
        Transition::Archived { from, entry } => {
            let mut human = HumanOutput::new(format!(
                "\"{}\": {from} -> done, moved to history",
                entry.title
            ));
            human.push_next_step("todomaster history list");
            human
        }
    };
    push_notices(&mut human, &mut store);
    human.push_summary("id", short_id(transition.id()));
    push_usage_warning(&mut human, &store);

    emit_success(ctx.output, command, transition, Some(&human))
}

pub fn run_note(options: NoteOptions) -> Result<()> {
    let mut store = options.ctx.open_store()?;
    let action = Action::AddNote {
        id: options.id,
        text: options.text,
    };
    let outcome = store.apply(action, Utc::now())?;
    let Outcome::NoteAdded { task } = &outcome else {
        return Err(unexpected(&outcome));
    };

    let mut human = HumanOutput::new(format!("Note added to \"{}\"", task.title));
    push_notices(&mut human, &mut store);
    human.push_summary("id", task.short_id());
    human.push_summary("notes", task.notes.as_ref().map_or(0, Notes::len).to_string());
    push_usage_warning(&mut human, &store);

    emit_success(options.ctx.output, "note", task, Some(&human))
}

pub fn run_rm(options: RmOptions) -> Result<()> {
    let mut store = options.ctx.open_store()?;
    let id = store.list().resolve_id(&options.id)?;
    let title = store
        .list()
        .get(&id)
        .map(|task| task.title.clone())
        .or_else(|| store.list().get_history(&id).map(|entry| entry.title.clone()))
        .unwrap_or_default();

    if !confirm(&format!("Delete \"{title}\"?"), options.yes)? {
        let human = HumanOutput::new("Cancelled; nothing deleted");
        return emit_success(
            options.ctx.output,
            "rm",
            &serde_json::json!({ "deleted": false }),
            Some(&human),
        );
    }

    let outcome = store.apply(Action::Delete { id }, Utc::now())?;
    let Outcome::Deleted { removed } = &outcome else {
        return Err(unexpected(&outcome));
    };

    let source = match removed {
        Removed::Tasks(_) => "tasks",
        Removed::History(_) => "history",
    };
    let mut human = HumanOutput::new(format!("Deleted \"{}\"", removed.title()));
    push_notices(&mut human, &mut store);
    human.push_summary("id", short_id(removed.id()));
    human.push_summary("from", source);

    emit_success(options.ctx.output, "rm", removed, Some(&human))
}

fn task_line(task: &TaskRecord) -> String {
    let mut line = format!("[{}] {}  {}", task.status, task.short_id(), task.title);
    match task.notes.as_ref().map_or(0, Notes::len) {
        0 => {}
        1 => line.push_str(" (1 note)"),
        n => line.push_str(&format!(" ({n} notes)")),
    }
    line
}

fn push_timestamps(
    human: &mut HumanOutput,
    created: DateTime<Utc>,
    updated: DateTime<Utc>,
    completed: Option<DateTime<Utc>>,
) {
    human.push_summary("created", created.to_rfc3339());
    human.push_summary("updated", updated.to_rfc3339());
    if let Some(completed) = completed {
        human.push_summary("completed", completed.to_rfc3339());
    }
}

fn push_notes(human: &mut HumanOutput, notes: Option<&Notes>) {
    match notes {
        None => {}
        Some(Notes::Text(text)) => human.push_detail(text.clone()),
        Some(Notes::List(notes)) => {
            for note in notes {
                human.push_detail(format!("[{}] {}", note.created_at.to_rfc3339(), note.text));
            }
        }
    }
}
