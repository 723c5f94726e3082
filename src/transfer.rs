//! Export and import of backup documents.
//!
//! Export writes an [`ExportDocument`]. Import accepts that document, or a
//! bare array of task records as produced by older versions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::lifecycle::{MergeOutcome, TaskList};
use crate::migrate::{history_from_value, record_from_value, SCHEMA_VERSION};
use crate::task::{HistoryEntry, TaskRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportCounts {
    pub tasks: usize,
    pub history: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub counts: ExportCounts,
    pub tasks: Vec<TaskRecord>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

/// A record that failed validation; `index` is its position in the input
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub collection: &'static str,
    pub index: usize,
    pub reason: String,
}

/// Validated contents of an import file, before merging
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedImport {
    pub tasks: Vec<TaskRecord>,
    pub history: Vec<HistoryEntry>,
    pub rejected: Vec<Rejection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub imported: usize,
    pub imported_history: usize,
    pub skipped_existing: usize,
    pub rejected: Vec<Rejection>,
}

impl ImportReport {
    pub fn new(merge: MergeOutcome, rejected: Vec<Rejection>) -> Self {
        Self {
            imported: merge.imported,
            imported_history: merge.imported_history,
            skipped_existing: merge.skipped_existing,
            rejected,
        }
    }
}

/// Snapshot of tasks and history for backup
pub fn export(list: &TaskList, now: DateTime<Utc>) -> ExportDocument {
    ExportDocument {
        version: SCHEMA_VERSION.to_string(),
        exported_at: now,
        counts: ExportCounts {
            tasks: list.tasks.len(),
            history: list.history.len(),
        },
        tasks: list.tasks.clone(),
        history: list.history.clone(),
    }
}

pub fn to_json(document: &ExportDocument) -> Result<String> {
    Ok(serde_json::to_string_pretty(document)?)
}

/// Default file name for a backup taken at `now`
pub fn backup_file_name(now: DateTime<Utc>) -> String {
    format!("todomaster-backup-{}.json", now.format("%Y-%m-%d"))
}

/// Parse and validate an import file.
///
/// Malformed JSON or an unexpected top-level shape is an `Error::Parse`.
/// Individual bad records are collected as rejections; if every task record
/// is rejected the whole import fails with `Error::Validation`.
pub fn parse_import(text: &str, now: DateTime<Utc>) -> Result<ParsedImport> {
    let value: Value = serde_json::from_str(text)
        .map_err(|err| Error::Parse(format!("import file is not valid JSON: {err}")))?;

    let (task_items, history_items) = match value {
        Value::Array(items) => (items, Vec::new()),
        Value::Object(mut fields) => {
            let tasks = match fields.remove("tasks") {
                Some(Value::Array(items)) => items,
                _ => {
                    return Err(Error::Parse(
                        "expected an array of tasks or an object with a `tasks` array".to_string(),
                    ))
                }
            };
            let history = match fields.remove("history") {
                None | Some(Value::Null) => Vec::new(),
                Some(Value::Array(items)) => items,
                Some(_) => return Err(Error::Parse("`history` must be an array".to_string())),
            };
            (tasks, history)
        }
        _ => {
            return Err(Error::Parse(
                "expected an array of tasks or an object with a `tasks` array".to_string(),
            ))
        }
    };

    let mut parsed = ParsedImport::default();
    for (index, item) in task_items.iter().enumerate() {
        match record_from_value(item, now) {
            Ok(task) => parsed.tasks.push(task),
            Err(reason) => parsed.rejected.push(Rejection {
                collection: "tasks",
                index,
                reason,
            }),
        }
    }
    for (index, item) in history_items.iter().enumerate() {
        match history_from_value(item, now) {
            Ok(entry) => parsed.history.push(entry),
            Err(reason) => parsed.rejected.push(Rejection {
                collection: "history",
                index,
                reason,
            }),
        }
    }

    if parsed.tasks.is_empty() && parsed.history.is_empty() {
        return Err(Error::Validation(if parsed.rejected.is_empty() {
            "no tasks found in import file".to_string()
        } else {
            format!(
                "no valid tasks found in import file ({} rejected)",
                parsed.rejected.len()
            )
        }));
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::NewTask;
    use crate::task::TaskStatus;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 30, 0).unwrap()
    }

    fn sample_list() -> TaskList {
        let mut list = TaskList::default();
        let first = list
            .create(NewTask::new("Buy milk").with_notes("oat"), now())
            .unwrap()
            .id
            .clone();
        let second = list.create(NewTask::new("Call Bob"), now()).unwrap().id.clone();
        list.add_note(&second, "after lunch", now()).unwrap();
        list.set_status(&first, TaskStatus::Done, now()).unwrap();
        list.settings.archive_on_complete = true;
        let third = list.create(NewTask::new("File taxes"), now()).unwrap().id.clone();
        list.set_status(&third, TaskStatus::Done, now()).unwrap();
        list
    }

    #[test]
    fn export_then_import_round_trips() {
        let list = sample_list();
        let document = export(&list, now());
        assert_eq!(document.counts, ExportCounts { tasks: 2, history: 1 });

        let json = to_json(&document).unwrap();
        let parsed = parse_import(&json, now()).unwrap();
        assert!(parsed.rejected.is_empty());
        assert_eq!(parsed.tasks, list.tasks);
        assert_eq!(parsed.history, list.history);

        let mut restored = TaskList::default();
        restored.merge_imported(parsed.tasks, parsed.history);
        assert_eq!(export(&restored, now()), document);
    }

    #[test]
    fn legacy_bare_array_is_accepted() {
        let parsed = parse_import(
            r#"[{"id":"1712","title":"Buy milk","notes":"","completed":true,
                 "createdAt":"2024-04-01T10:00:00.000Z"}]"#,
            now(),
        )
        .unwrap();
        assert_eq!(parsed.tasks.len(), 1);
        assert_eq!(parsed.tasks[0].status, TaskStatus::Done);
        assert_eq!(parsed.tasks[0].notes, None);
    }

    #[test]
    fn bad_records_become_rejections() {
        let parsed = parse_import(
            r#"{"tasks":[
                {"id":"a","title":"Good"},
                {"title":"No id"},
                {"id":"c","title":"  "},
                {"id":"d","title":"Odd","status":"someday"}
            ]}"#,
            now(),
        )
        .unwrap();
        assert_eq!(parsed.tasks.len(), 1);
        let reasons: Vec<(usize, &str)> = parsed
            .rejected
            .iter()
            .map(|rejection| (rejection.index, rejection.reason.as_str()))
            .collect();
        assert_eq!(
            reasons,
            vec![
                (1, "missing id"),
                (2, "missing or blank title"),
                (3, "unknown status 'someday'")
            ]
        );
    }

    #[test]
    fn malformed_json_is_parse_error() {
        assert!(matches!(parse_import("{not json", now()), Err(Error::Parse(_))));
        assert!(matches!(parse_import("42", now()), Err(Error::Parse(_))));
        assert!(matches!(
            parse_import(r#"{"todos": []}"#, now()),
            Err(Error::Parse(_))
        ));
    }

    #[test]
    fn all_rejected_is_validation_error() {
        let err = parse_import(r#"[{"title":"no id"}]"#, now()).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        let err = parse_import("[]", now()).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn backup_name_uses_date() {
        assert_eq!(backup_file_name(now()), "todomaster-backup-2024-06-01.json");
    }
}
