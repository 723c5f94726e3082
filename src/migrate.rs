//! Schema migration for persisted documents and imported records.
//!
//! Older layouts kept tasks under `todoTasks` (single list with a
//! `completed` flag) or `todos` (todo/history split with `pending` and
//! `completed` statuses). Both are read into the current layout, which is
//! written back under `tasks` with `version` set to [`SCHEMA_VERSION`].

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::lifecycle::TaskList;
use crate::settings::Settings;
use crate::task::{HistoryEntry, Note, Notes, TaskRecord, TaskStatus};

/// Current layout of the storage document
pub const SCHEMA_VERSION: &str = "2";

pub const KEY_TASKS: &str = "tasks";
pub const KEY_HISTORY: &str = "history";
pub const KEY_SETTINGS: &str = "settings";
pub const KEY_VERSION: &str = "version";
pub const KEY_LAST_SAVED: &str = "lastSaved";

/// Task keys of older layouts, in lookup order
pub const LEGACY_TASK_KEYS: [&str; 2] = ["todos", "todoTasks"];

/// Every key the store reads on load
pub const STORAGE_KEYS: [&str; 7] = [
    KEY_TASKS,
    KEY_HISTORY,
    KEY_SETTINGS,
    KEY_VERSION,
    KEY_LAST_SAVED,
    "todos",
    "todoTasks",
];

/// Result of reading a raw document
#[derive(Debug, Clone, PartialEq)]
pub struct Migration {
    pub list: TaskList,
    pub last_saved: Option<DateTime<Utc>>,
    /// Legacy keys present in the document
    pub legacy_keys: Vec<&'static str>,
    /// The document is not in the current layout and should be rewritten
    pub needs_write: bool,
    /// Human-readable notes about records that were dropped or repaired
    pub notices: Vec<String>,
}

/// Read a raw storage document into the current model
pub fn migrate_document(document: &Map<String, Value>, now: DateTime<Utc>) -> Migration {
    let mut notices = Vec::new();

    let legacy_keys: Vec<&'static str> = LEGACY_TASK_KEYS
        .iter()
        .copied()
        .filter(|key| document.contains_key(*key))
        .collect();

    let task_keys: Vec<&'static str> = std::iter::once(KEY_TASKS)
        .chain(LEGACY_TASK_KEYS)
        .filter(|key| document.contains_key(*key))
        .collect();

    // Records under `tasks` come first, so they win over legacy copies
    let mut tasks = Vec::new();
    let mut seen = HashSet::new();
    for key in &task_keys {
        let mut merged = 0;
        for (index, item) in array_items(document, key, &mut notices).iter().enumerate() {
            match record_from_value(item, now) {
                Ok(task) if seen.insert(task.id.clone()) => {
                    tasks.push(task);
                    merged += 1;
                }
                Ok(task) => notices.push(format!("dropped duplicate task id {} in {key}", task.id)),
                Err(reason) => notices.push(format!("dropped {key}[{index}]: {reason}")),
            }
        }
        if *key != KEY_TASKS && document.contains_key(KEY_TASKS) && merged > 0 {
            notices.push(format!("merged {merged} task(s) from legacy `{key}`"));
        }
    }

    let mut history = Vec::new();
    for (index, item) in array_items(document, KEY_HISTORY, &mut notices)
        .iter()
        .enumerate()
    {
        match history_from_value(item, now) {
            Ok(entry) if seen.insert(entry.id.clone()) => history.push(entry),
            Ok(entry) => notices.push(format!("dropped duplicate history id {}", entry.id)),
            Err(reason) => notices.push(format!("dropped history[{index}]: {reason}")),
        }
    }

    let settings = match document.get(KEY_SETTINGS) {
        None | Some(Value::Null) => Settings::default(),
        Some(value) => serde_json::from_value(value.clone()).unwrap_or_else(|err| {
            notices.push(format!("reset invalid settings: {err}"));
            Settings::default()
        }),
    };

    let last_saved = document
        .get(KEY_LAST_SAVED)
        .and_then(|value| parse_timestamp(Some(value)).ok().flatten());

    let has_data = !task_keys.is_empty()
        || document.contains_key(KEY_HISTORY)
        || document.contains_key(KEY_SETTINGS);
    let current_version = document.get(KEY_VERSION).and_then(Value::as_str) == Some(SCHEMA_VERSION);
    let needs_write = !legacy_keys.is_empty() || (has_data && !current_version);

    Migration {
        list: TaskList {
            tasks,
            history,
            settings,
        },
        last_saved,
        legacy_keys,
        needs_write,
        notices,
    }
}

fn array_items(document: &Map<String, Value>, key: &str, notices: &mut Vec<String>) -> Vec<Value> {
    match document.get(key) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.clone(),
        Some(_) => {
            notices.push(format!("ignored `{key}`: expected an array"));
            Vec::new()
        }
    }
}

/// Validate one task record in any supported layout.
///
/// Fills defaults for optional fields and maps legacy status encodings.
/// The error is a short reason suitable for a rejection report.
pub fn record_from_value(value: &Value, now: DateTime<Utc>) -> Result<TaskRecord, String> {
    let obj = value.as_object().ok_or("record is not an object")?;

    let id = match obj.get("id") {
        Some(Value::String(id)) if !id.trim().is_empty() => id.trim().to_string(),
        Some(Value::Number(id)) => id.to_string(),
        _ => return Err("missing id".to_string()),
    };

    let title = match obj.get("title") {
        Some(Value::String(title)) if !title.trim().is_empty() => title.trim().to_string(),
        _ => return Err("missing or blank title".to_string()),
    };

    let status = match obj.get("status") {
        Some(Value::String(raw)) => raw
            .parse::<TaskStatus>()
            .map_err(|_| format!("unknown status '{raw}'"))?,
        None | Some(Value::Null) => match obj.get("completed") {
            Some(Value::Bool(true)) => TaskStatus::Done,
            Some(Value::Bool(false)) | None | Some(Value::Null) => TaskStatus::Todo,
            Some(_) => return Err("invalid completed flag".to_string()),
        },
        Some(_) => return Err("invalid status".to_string()),
    };

    let created_at =
        parse_timestamp(obj.get("createdAt")).map_err(|err| format!("createdAt: {err}"))?;
    let created_at = created_at.unwrap_or(now);
    let updated_at = parse_timestamp(obj.get("updatedAt"))
        .map_err(|err| format!("updatedAt: {err}"))?
        .unwrap_or(created_at)
        .max(created_at);
    let completed_at = parse_timestamp(obj.get("completedAt"))
        .map_err(|err| format!("completedAt: {err}"))?
        .filter(|_| status == TaskStatus::Done);

    let notes = notes_from_value(obj.get("notes"), created_at)?;

    Ok(TaskRecord {
        id,
        title,
        notes,
        status,
        created_at,
        updated_at,
        completed_at,
    })
}

/// Validate one history entry; `completedAt` falls back to `updatedAt`
pub fn history_from_value(value: &Value, now: DateTime<Utc>) -> Result<HistoryEntry, String> {
    let record = record_from_value(value, now)?;
    let completed_at = value
        .get("completedAt")
        .map(|raw| parse_timestamp(Some(raw)))
        .transpose()
        .map_err(|err| format!("completedAt: {err}"))?
        .flatten()
        .unwrap_or(record.updated_at);

    Ok(HistoryEntry {
        id: record.id,
        title: record.title,
        notes: record.notes,
        created_at: record.created_at,
        updated_at: record.updated_at,
        completed_at,
    })
}

fn notes_from_value(
    value: Option<&Value>,
    created_at: DateTime<Utc>,
) -> Result<Option<Notes>, String> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) if text.trim().is_empty() => Ok(None),
        Some(Value::String(text)) => Ok(Some(Notes::Text(text.clone()))),
        Some(Value::Array(items)) => {
            let mut notes = Vec::with_capacity(items.len());
            for item in items {
                let note = match item {
                    Value::String(text) => Note {
                        id: Uuid::new_v4().to_string(),
                        text: text.clone(),
                        created_at,
                    },
                    Value::Object(fields) => {
                        let text = fields
                            .get("text")
                            .and_then(Value::as_str)
                            .ok_or("note without text")?;
                        let id = fields
                            .get("id")
                            .and_then(Value::as_str)
                            .filter(|id| !id.is_empty())
                            .map_or_else(|| Uuid::new_v4().to_string(), str::to_string);
                        let note_created = parse_timestamp(fields.get("createdAt"))
                            .map_err(|err| format!("note createdAt: {err}"))?
                            .unwrap_or(created_at);
                        Note {
                            id,
                            text: text.to_string(),
                            created_at: note_created,
                        }
                    }
                    _ => return Err("invalid note".to_string()),
                };
                if !note.text.trim().is_empty() {
                    notes.push(note);
                }
            }
            Ok((!notes.is_empty()).then_some(Notes::List(notes)))
        }
        Some(_) => Err("invalid notes".to_string()),
    }
}

/// RFC 3339 strings or epoch milliseconds; absent and null are `None`
fn parse_timestamp(value: Option<&Value>) -> Result<Option<DateTime<Utc>>, String> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(raw)) => DateTime::parse_from_rfc3339(raw.trim())
            .map(|parsed| Some(parsed.with_timezone(&Utc)))
            .map_err(|_| format!("invalid timestamp '{raw}'")),
        Some(Value::Number(millis)) => millis
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(Some)
            .ok_or_else(|| format!("invalid timestamp {millis}")),
        Some(_) => Err("invalid timestamp".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn doc(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn todo_tasks_key_with_completed_flags() {
        let migration = migrate_document(
            &doc(json!({
                "todoTasks": [
                    { "id": "1712", "title": "Buy milk", "notes": "", "completed": false,
                      "createdAt": "2024-04-01T10:00:00.000Z" },
                    { "id": "1713", "title": "Call Bob", "notes": "re: car", "completed": true,
                      "createdAt": "2024-04-02T10:00:00.000Z" }
                ]
            })),
            now(),
        );

        assert!(migration.needs_write);
        assert_eq!(migration.legacy_keys, vec!["todoTasks"]);
        let tasks = &migration.list.tasks;
        assert_eq!(tasks[0].status, TaskStatus::Todo);
        assert_eq!(tasks[0].notes, None);
        assert_eq!(tasks[0].updated_at, tasks[0].created_at);
        assert_eq!(tasks[1].status, TaskStatus::Done);
        assert_eq!(tasks[1].notes, Some(Notes::Text("re: car".to_string())));
    }

    #[test]
    fn todos_key_with_pending_and_completed_statuses() {
        let migration = migrate_document(
            &doc(json!({
                "todos": [
                    { "id": "a", "title": "A", "status": "pending" },
                    { "id": "b", "title": "B", "status": "ongoing" }
                ],
                "history": [
                    { "id": "c", "title": "C", "status": "completed",
                      "createdAt": "2024-05-01T00:00:00Z", "completedAt": "2024-05-02T00:00:00Z" }
                ],
                "settings": { "notifications": false }
            })),
            now(),
        );

        assert_eq!(migration.legacy_keys, vec!["todos"]);
        let list = &migration.list;
        assert_eq!(list.tasks[0].status, TaskStatus::Todo);
        assert_eq!(list.tasks[0].created_at, now());
        assert_eq!(list.tasks[1].status, TaskStatus::Ongoing);
        assert_eq!(list.history.len(), 1);
        assert_eq!(
            list.history[0].completed_at,
            Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap()
        );
        assert!(!list.settings.notifications);
    }

    #[test]
    fn status_wins_over_completed_flag() {
        let record = record_from_value(
            &json!({ "id": "x", "title": "X", "status": "ongoing", "completed": true }),
            now(),
        )
        .unwrap();
        assert_eq!(record.status, TaskStatus::Ongoing);
    }

    #[test]
    fn legacy_records_merge_into_current_tasks() {
        let migration = migrate_document(
            &doc(json!({
                "tasks": [
                    { "id": "new", "title": "Current", "status": "ongoing" },
                    { "id": "both", "title": "Current copy", "status": "todo" }
                ],
                "todos": [
                    { "id": "old", "title": "Legacy", "status": "pending" },
                    { "id": "both", "title": "Legacy copy", "status": "completed" }
                ],
                "version": SCHEMA_VERSION
            })),
            now(),
        );

        assert!(migration.needs_write);
        assert_eq!(migration.legacy_keys, vec!["todos"]);
        let ids: Vec<&str> = migration.list.tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "both", "old"]);
        assert_eq!(migration.list.tasks[1].title, "Current copy");
        assert_eq!(migration.list.tasks[2].status, TaskStatus::Todo);
        assert!(migration
            .notices
            .iter()
            .any(|notice| notice.contains("duplicate task id both in todos")));
        assert!(migration
            .notices
            .iter()
            .any(|notice| notice.contains("merged 1 task(s) from legacy `todos`")));
    }

    #[test]
    fn current_document_needs_no_write() {
        let migration = migrate_document(
            &doc(json!({
                "tasks": [{ "id": "x", "title": "X", "status": "todo",
                            "createdAt": "2024-05-01T00:00:00Z", "updatedAt": "2024-05-01T00:00:00Z" }],
                "history": [],
                "settings": {},
                "version": SCHEMA_VERSION,
                "lastSaved": "2024-05-01T00:00:00Z"
            })),
            now(),
        );
        assert!(!migration.needs_write);
        assert!(migration.notices.is_empty());
        assert!(migration.last_saved.is_some());
    }

    #[test]
    fn empty_document_needs_no_write() {
        let migration = migrate_document(&Map::new(), now());
        assert!(!migration.needs_write);
        assert!(migration.list.is_empty());
    }

    #[test]
    fn invalid_records_are_dropped_with_notice() {
        let migration = migrate_document(
            &doc(json!({
                "tasks": [
                    { "id": "ok", "title": "Fine" },
                    { "title": "No id" },
                    { "id": "ok", "title": "Duplicate" },
                    { "id": "bad", "title": "Bad", "status": "blocked" }
                ],
                "version": SCHEMA_VERSION
            })),
            now(),
        );
        assert_eq!(migration.list.tasks.len(), 1);
        assert_eq!(migration.notices.len(), 3);
    }

    #[test]
    fn notes_list_keeps_ids_and_fills_missing_fields() {
        let record = record_from_value(
            &json!({
                "id": "n", "title": "Notes",
                "createdAt": "2024-05-01T00:00:00Z",
                "notes": [ { "id": "keep", "text": "first" }, "second", { "text": "  " } ]
            }),
            now(),
        )
        .unwrap();
        match record.notes {
            Some(Notes::List(notes)) => {
                assert_eq!(notes.len(), 2);
                assert_eq!(notes[0].id, "keep");
                assert_eq!(notes[0].created_at, record.created_at);
                assert_eq!(notes[1].text, "second");
            }
            other => panic!("unexpected notes: {other:?}"),
        }
    }

    #[test]
    fn timestamps_accept_epoch_millis_and_reject_garbage() {
        let record = record_from_value(
            &json!({ "id": 1712, "title": "T", "createdAt": 1714521600000i64 }),
            now(),
        )
        .unwrap();
        assert_eq!(record.id, "1712");
        assert_eq!(record.created_at, Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap());

        let err = record_from_value(&json!({ "id": "t", "title": "T", "createdAt": "yesterday" }), now())
            .unwrap_err();
        assert!(err.starts_with("createdAt"));
    }

    #[test]
    fn updated_at_never_precedes_created_at() {
        let record = record_from_value(
            &json!({ "id": "t", "title": "T",
                     "createdAt": "2024-05-02T00:00:00Z", "updatedAt": "2024-05-01T00:00:00Z" }),
            now(),
        )
        .unwrap();
        assert_eq!(record.updated_at, record.created_at);
    }
}
