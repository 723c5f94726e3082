//! Task records and the pure views over them.
//!
//! Records are persisted under the `tasks` key with camelCase field names.
//! Status names of the todo/history schema (`pending`, `completed`) are
//! accepted as aliases when reading.

use std::cmp::Reverse;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Longest accepted title, in characters
pub const MAX_TITLE_LEN: usize = 200;

/// Longest accepted notes text, in characters
pub const MAX_NOTES_LEN: usize = 500;

const SHORT_ID_LEN: usize = 8;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    #[serde(alias = "pending")]
    Todo,
    Ongoing,
    #[serde(alias = "completed")]
    Done,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Ongoing, TaskStatus::Todo, TaskStatus::Done];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::Ongoing => "ongoing",
            TaskStatus::Done => "done",
        }
    }

    /// Position in the smart ordering: most actionable first
    pub fn priority_rank(self) -> u8 {
        match self {
            TaskStatus::Ongoing => 0,
            TaskStatus::Todo => 1,
            TaskStatus::Done => 2,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == TaskStatus::Done
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "todo" | "pending" => Ok(TaskStatus::Todo),
            "ongoing" => Ok(TaskStatus::Ongoing),
            "done" | "completed" => Ok(TaskStatus::Done),
            other => Err(Error::InvalidArgument(format!(
                "unknown task status '{other}' (expected todo|ongoing|done)"
            ))),
        }
    }
}

/// View filter: everything, or a single status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    All,
    #[serde(alias = "pending")]
    Todo,
    Ongoing,
    #[serde(alias = "completed")]
    Done,
}

impl Filter {
    pub fn status(self) -> Option<TaskStatus> {
        match self {
            Filter::All => None,
            Filter::Todo => Some(TaskStatus::Todo),
            Filter::Ongoing => Some(TaskStatus::Ongoing),
            Filter::Done => Some(TaskStatus::Done),
        }
    }

    pub fn matches(self, status: TaskStatus) -> bool {
        self.status().map_or(true, |wanted| wanted == status)
    }

    pub fn as_str(self) -> &'static str {
        match self.status() {
            None => "all",
            Some(status) => status.as_str(),
        }
    }
}

impl From<TaskStatus> for Filter {
    fn from(status: TaskStatus) -> Self {
        match status {
            TaskStatus::Todo => Filter::Todo,
            TaskStatus::Ongoing => Filter::Ongoing,
            TaskStatus::Done => Filter::Done,
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Filter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("all") {
            return Ok(Filter::All);
        }
        trimmed.parse::<TaskStatus>().map(Filter::from).map_err(|_| {
            Error::InvalidArgument(format!(
                "unknown filter '{trimmed}' (expected all|todo|ongoing|done)"
            ))
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Note {
    pub fn new(text: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            created_at: now,
        }
    }
}

/// Notes are either a single free-text field or an ordered list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Notes {
    Text(String),
    List(Vec<Note>),
}

impl Notes {
    /// Texts in display order
    pub fn texts(&self) -> Vec<&str> {
        match self {
            Notes::Text(text) => vec![text.as_str()],
            Notes::List(notes) => notes.iter().map(|note| note.text.as_str()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Notes::Text(_) => 1,
            Notes::List(notes) => notes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<Notes>,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl TaskRecord {
    /// Time-based id with a random suffix
    pub fn new_id() -> String {
        Ulid::new().to_string()
    }

    /// Stamp a mutation; clock skew never moves `updated_at` backwards
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.max(self.updated_at);
    }

    /// Timestamp used for age-based cleanup
    pub fn last_activity(&self) -> DateTime<Utc> {
        self.updated_at.max(self.created_at)
    }

    pub fn short_id(&self) -> &str {
        short_id(&self.id)
    }

    pub fn note_texts(&self) -> Vec<&str> {
        self.notes.as_ref().map(Notes::texts).unwrap_or_default()
    }
}

/// An archived copy of a task that reached `done`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<Notes>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn archive(task: TaskRecord, now: DateTime<Utc>) -> Self {
        let completed_at = now.max(task.updated_at);
        Self {
            id: task.id,
            title: task.title,
            notes: task.notes,
            created_at: task.created_at,
            updated_at: completed_at,
            completed_at,
        }
    }

    pub fn short_id(&self) -> &str {
        short_id(&self.id)
    }
}

/// Trailing characters of an id, enough to tell tasks apart in listings
pub fn short_id(id: &str) -> &str {
    let count = id.chars().count();
    if count <= SHORT_ID_LEN {
        return id;
    }
    let skip = count - SHORT_ID_LEN;
    let start = id.char_indices().nth(skip).map_or(0, |(idx, _)| idx);
    &id[start..]
}

/// Validate and normalize a title
pub fn normalize_title(title: &str) -> Result<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation("task title is required".to_string()));
    }
    if trimmed.chars().count() > MAX_TITLE_LEN {
        return Err(Error::Validation(format!(
            "task title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Validate and normalize free-text notes; blank notes become `None`
pub fn normalize_notes(notes: &str) -> Result<Option<String>> {
    let trimmed = notes.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > MAX_NOTES_LEN {
        return Err(Error::Validation(format!(
            "notes must be at most {MAX_NOTES_LEN} characters"
        )));
    }
    Ok(Some(trimmed.to_string()))
}

/// Tasks matching `filter`, in source order
pub fn filter_tasks(tasks: &[TaskRecord], filter: Filter) -> Vec<TaskRecord> {
    tasks
        .iter()
        .filter(|task| filter.matches(task.status))
        .cloned()
        .collect()
}

/// Smart ordering.
///
/// With `Filter::All`, tasks are grouped ongoing, todo, done; inside a group
/// (and for single-status filters) the most recently updated come first.
/// The sort is stable, so full ties keep their input order.
pub fn sort_tasks(tasks: &mut [TaskRecord], filter: Filter) {
    match filter {
        Filter::All => {
            tasks.sort_by_key(|task| (task.status.priority_rank(), Reverse(task.updated_at)));
        }
        Filter::Todo | Filter::Ongoing | Filter::Done => {
            tasks.sort_by_key(|task| Reverse(task.updated_at));
        }
    }
}
