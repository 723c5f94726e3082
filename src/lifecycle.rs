//! Task lifecycle: creation, edits, status workflow, deletion and cleanup.
//!
//! Everything here is a pure transformation of a [`TaskList`]. Callers pass
//! the current time in; nothing reads the clock or touches storage.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::settings::Settings;
use crate::task::{
    filter_tasks, normalize_notes, normalize_title, sort_tasks, Filter, HistoryEntry, Note, Notes,
    TaskRecord, TaskStatus,
};

/// In-memory collections owned by the store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskList {
    pub tasks: Vec<TaskRecord>,
    pub history: Vec<HistoryEntry>,
    pub settings: Settings,
}

/// Input for a new task, including the quick-add extras
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub notes: Option<String>,
    pub status: Option<TaskStatus>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// Field edits; `notes: Some("")` clears the notes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskEdit {
    pub title: Option<String>,
    pub notes: Option<String>,
}

/// Result of a status change
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Transition {
    /// Status changed in place
    Updated { from: TaskStatus, task: TaskRecord },
    /// Task left the active list for history
    Archived { from: TaskStatus, entry: HistoryEntry },
}

impl Transition {
    pub fn id(&self) -> &str {
        match self {
            Transition::Updated { task, .. } => &task.id,
            Transition::Archived { entry, .. } => &entry.id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Transition::Updated { task, .. } => &task.title,
            Transition::Archived { entry, .. } => &entry.title,
        }
    }

    pub fn to(&self) -> TaskStatus {
        match self {
            Transition::Updated { task, .. } => task.status,
            Transition::Archived { .. } => TaskStatus::Done,
        }
    }
}

/// A record removed by [`TaskList::delete`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "from", content = "record", rename_all = "lowercase")]
pub enum Removed {
    Tasks(TaskRecord),
    History(HistoryEntry),
}

impl Removed {
    pub fn id(&self) -> &str {
        match self {
            Removed::Tasks(task) => &task.id,
            Removed::History(entry) => &entry.id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Removed::Tasks(task) => &task.title,
            Removed::History(entry) => &entry.title,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupReport {
    pub removed_count: usize,
    pub remaining_count: usize,
    pub cutoff: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub todo: usize,
    pub ongoing: usize,
    pub done: usize,
    pub total: usize,
    pub history: usize,
}

impl Counts {
    /// Tasks still needing attention
    pub fn open(&self) -> usize {
        self.todo + self.ongoing
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeOutcome {
    pub imported: usize,
    pub imported_history: usize,
    pub skipped_existing: usize,
}

/// Remove `done` tasks whose last activity is at or before `now - days`.
///
/// Tasks in any other status are never touched, and running it twice with
/// the same inputs removes nothing the second time.
pub fn cleanup(tasks: &mut Vec<TaskRecord>, days: u32, now: DateTime<Utc>) -> CleanupReport {
    // Thresholds reaching before the representable range mean nothing is old enough
    let cutoff = Duration::try_days(i64::from(days))
        .and_then(|age| now.checked_sub_signed(age))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let before = tasks.len();
    tasks.retain(|task| !(task.status == TaskStatus::Done && task.last_activity() <= cutoff));
    CleanupReport {
        removed_count: before - tasks.len(),
        remaining_count: tasks.len(),
        cutoff,
    }
}

impl TaskList {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty() && self.history.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&TaskRecord> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn get_history(&self, id: &str) -> Option<&HistoryEntry> {
        self.history.iter().find(|entry| entry.id == id)
    }

    fn contains(&self, id: &str) -> bool {
        self.get(id).is_some() || self.get_history(id).is_some()
    }

    fn position(&self, id: &str) -> Result<usize> {
        if let Some(idx) = self.tasks.iter().position(|task| task.id == id) {
            return Ok(idx);
        }
        if self.get_history(id).is_some() {
            return Err(Error::Validation(format!(
                "task {id} is archived in history and can no longer change"
            )));
        }
        Err(Error::TaskNotFound(id.to_string()))
    }

    /// Resolve a full id, or a unique case-insensitive prefix or suffix of
    /// one, across tasks and history
    pub fn resolve_id(&self, input: &str) -> Result<String> {
        let needle = input.trim();
        if needle.is_empty() {
            return Err(Error::InvalidArgument("task id is required".to_string()));
        }
        if self.contains(needle) {
            return Ok(needle.to_string());
        }

        let lowered = needle.to_lowercase();
        let mut matches: Vec<&str> = self
            .tasks
            .iter()
            .map(|task| task.id.as_str())
            .chain(self.history.iter().map(|entry| entry.id.as_str()))
            .filter(|id| {
                let id = id.to_lowercase();
                id.starts_with(&lowered) || id.ends_with(&lowered)
            })
            .collect();
        matches.dedup();

        match matches.as_slice() {
            [] => Err(Error::TaskNotFound(needle.to_string())),
            [only] => Ok((*only).to_string()),
            many => Err(Error::InvalidArgument(format!(
                "task id '{needle}' is ambiguous ({} matches)",
                many.len()
            ))),
        }
    }

    /// Create a task at the top of the list
    pub fn create(&mut self, draft: NewTask, now: DateTime<Utc>) -> Result<&TaskRecord> {
        let title = normalize_title(&draft.title)?;
        let notes = match draft.notes.as_deref() {
            Some(text) => normalize_notes(text)?.map(Notes::Text),
            None => None,
        };
        let status = draft.status.unwrap_or_default();

        let mut id = TaskRecord::new_id();
        while self.contains(&id) {
            id = TaskRecord::new_id();
        }

        self.tasks.insert(
            0,
            TaskRecord {
                id,
                title,
                notes,
                status,
                created_at: now,
                updated_at: now,
                completed_at: status.is_terminal().then_some(now),
            },
        );
        Ok(&self.tasks[0])
    }

    /// Replace title and/or notes
    pub fn edit(&mut self, id: &str, edit: TaskEdit, now: DateTime<Utc>) -> Result<&TaskRecord> {
        if edit.title.is_none() && edit.notes.is_none() {
            return Err(Error::InvalidArgument(
                "nothing to update: pass a title and/or notes".to_string(),
            ));
        }
        let title = edit.title.as_deref().map(normalize_title).transpose()?;
        let notes = edit.notes.as_deref().map(normalize_notes).transpose()?;

        let idx = self.position(id)?;
        let task = &mut self.tasks[idx];
        if let Some(title) = title {
            task.title = title;
        }
        if let Some(notes) = notes {
            task.notes = notes.map(Notes::Text);
        }
        task.touch(now);
        Ok(&self.tasks[idx])
    }

    /// Append a note, turning free-text notes into the first list entry
    pub fn add_note(&mut self, id: &str, text: &str, now: DateTime<Utc>) -> Result<&TaskRecord> {
        let text = normalize_notes(text)?
            .ok_or_else(|| Error::Validation("note text is required".to_string()))?;

        let idx = self.position(id)?;
        let task = &mut self.tasks[idx];
        let mut notes = match task.notes.take() {
            None => Vec::new(),
            Some(Notes::Text(existing)) => vec![Note::new(existing, task.created_at)],
            Some(Notes::List(existing)) => existing,
        };
        notes.push(Note::new(text, now));
        task.notes = Some(Notes::List(notes));
        task.touch(now);
        Ok(&self.tasks[idx])
    }

    /// Move a task to `status`.
    ///
    /// Any status may follow any other. With `archive_on_complete` set,
    /// reaching `done` moves the task to history.
    pub fn set_status(
        &mut self,
        id: &str,
        status: TaskStatus,
        now: DateTime<Utc>,
    ) -> Result<Transition> {
        let idx = self.position(id)?;
        let from = self.tasks[idx].status;

        if status == TaskStatus::Done && self.settings.archive_on_complete {
            let entry = HistoryEntry::archive(self.tasks.remove(idx), now);
            self.history.push(entry.clone());
            return Ok(Transition::Archived { from, entry });
        }

        let task = &mut self.tasks[idx];
        task.status = status;
        task.touch(now);
        if status != TaskStatus::Done {
            task.completed_at = None;
        } else if from != TaskStatus::Done || task.completed_at.is_none() {
            task.completed_at = Some(task.updated_at);
        }
        Ok(Transition::Updated {
            from,
            task: task.clone(),
        })
    }

    /// Checkbox semantics: done goes back to todo, anything else completes
    pub fn toggle(&mut self, id: &str, now: DateTime<Utc>) -> Result<Transition> {
        let idx = self.position(id)?;
        let next = match self.tasks[idx].status {
            TaskStatus::Done => TaskStatus::Todo,
            TaskStatus::Todo | TaskStatus::Ongoing => TaskStatus::Done,
        };
        self.set_status(id, next, now)
    }

    /// Remove from tasks, or failing that from history
    pub fn delete(&mut self, id: &str) -> Result<Removed> {
        if let Some(idx) = self.tasks.iter().position(|task| task.id == id) {
            return Ok(Removed::Tasks(self.tasks.remove(idx)));
        }
        if let Some(idx) = self.history.iter().position(|entry| entry.id == id) {
            return Ok(Removed::History(self.history.remove(idx)));
        }
        Err(Error::TaskNotFound(id.to_string()))
    }

    pub fn cleanup(&mut self, days: u32, now: DateTime<Utc>) -> CleanupReport {
        cleanup(&mut self.tasks, days, now)
    }

    /// Remove every `done` task regardless of age
    pub fn clear_completed(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.status != TaskStatus::Done);
        before - self.tasks.len()
    }

    pub fn clear_history(&mut self) -> usize {
        let removed = self.history.len();
        self.history.clear();
        removed
    }

    /// Append imported records whose ids are not known yet.
    ///
    /// Existing records always win; within the incoming batch the first
    /// record with a given id wins.
    pub fn merge_imported(
        &mut self,
        tasks: Vec<TaskRecord>,
        history: Vec<HistoryEntry>,
    ) -> MergeOutcome {
        let mut known: HashSet<String> = self
            .tasks
            .iter()
            .map(|task| task.id.clone())
            .chain(self.history.iter().map(|entry| entry.id.clone()))
            .collect();
        let mut outcome = MergeOutcome::default();

        for task in tasks {
            if known.insert(task.id.clone()) {
                self.tasks.push(task);
                outcome.imported += 1;
            } else {
                outcome.skipped_existing += 1;
            }
        }
        for entry in history {
            if known.insert(entry.id.clone()) {
                self.history.push(entry);
                outcome.imported_history += 1;
            } else {
                outcome.skipped_existing += 1;
            }
        }
        outcome
    }

    pub fn counts(&self) -> Counts {
        let mut counts = Counts {
            total: self.tasks.len(),
            history: self.history.len(),
            ..Counts::default()
        };
        for task in &self.tasks {
            match task.status {
                TaskStatus::Todo => counts.todo += 1,
                TaskStatus::Ongoing => counts.ongoing += 1,
                TaskStatus::Done => counts.done += 1,
            }
        }
        counts
    }

    /// Filtered and smart-sorted copy of the active tasks
    pub fn visible(&self, filter: Filter) -> Vec<TaskRecord> {
        let mut tasks = filter_tasks(&self.tasks, filter);
        sort_tasks(&mut tasks, filter);
        tasks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0).unwrap()
    }

    fn add(list: &mut TaskList, title: &str, now: DateTime<Utc>) -> String {
        list.create(NewTask::new(title), now).unwrap().id.clone()
    }

    #[test]
    fn create_sets_invariants_and_prepends() {
        let mut list = TaskList::default();
        let first = add(&mut list, "  Buy milk  ", at(1, 9));
        let second = add(&mut list, "Call Bob", at(1, 10));

        assert_eq!(list.tasks[0].id, second);
        let task = list.get(&first).unwrap();
        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.created_at, task.updated_at);
        assert_eq!(task.completed_at, None);
        assert_ne!(first, second);
    }

    #[test]
    fn create_rejects_blank_title() {
        let mut list = TaskList::default();
        let err = list.create(NewTask::new("   "), at(1, 9)).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(list.tasks.is_empty());
    }

    #[test]
    fn quick_add_with_notes_and_status() {
        let mut list = TaskList::default();
        let task = list
            .create(
                NewTask::new("Write report")
                    .with_notes("  draft first ")
                    .with_status(TaskStatus::Ongoing),
                at(1, 9),
            )
            .unwrap();
        assert_eq!(task.status, TaskStatus::Ongoing);
        assert_eq!(task.notes, Some(Notes::Text("draft first".to_string())));

        let blank = list
            .create(NewTask::new("Other").with_notes("   "), at(1, 9))
            .unwrap();
        assert_eq!(blank.notes, None);
    }

    #[test]
    fn buy_milk_scenario_ends_in_cleanup() {
        let mut list = TaskList::default();
        let id = add(&mut list, "Buy milk", at(1, 9));

        let step = list.set_status(&id, TaskStatus::Ongoing, at(1, 10)).unwrap();
        assert_eq!(step.to(), TaskStatus::Ongoing);
        let step = list.set_status(&id, TaskStatus::Done, at(1, 11)).unwrap();
        assert!(matches!(step, Transition::Updated { from: TaskStatus::Ongoing, .. }));

        let report = list.cleanup(0, at(1, 11));
        assert_eq!(report.removed_count, 1);
        assert_eq!(report.remaining_count, 0);
        assert!(list.tasks.is_empty());
    }

    #[test]
    fn updated_at_is_monotone_across_transitions() {
        let mut list = TaskList::default();
        let id = add(&mut list, "Task", at(2, 9));
        let mut last = list.get(&id).unwrap().updated_at;

        for (status, now) in [
            (TaskStatus::Ongoing, at(2, 10)),
            (TaskStatus::Todo, at(1, 8)),
            (TaskStatus::Done, at(2, 12)),
        ] {
            list.set_status(&id, status, now).unwrap();
            let task = list.get(&id).unwrap();
            assert!(task.updated_at >= last);
            assert!(task.updated_at >= task.created_at);
            last = task.updated_at;
        }
    }

    #[test]
    fn completed_at_follows_done_status() {
        let mut list = TaskList::default();
        let id = add(&mut list, "Task", at(1, 9));

        list.set_status(&id, TaskStatus::Done, at(1, 10)).unwrap();
        assert_eq!(list.get(&id).unwrap().completed_at, Some(at(1, 10)));

        list.set_status(&id, TaskStatus::Done, at(1, 11)).unwrap();
        assert_eq!(list.get(&id).unwrap().completed_at, Some(at(1, 10)));

        list.set_status(&id, TaskStatus::Todo, at(1, 12)).unwrap();
        assert_eq!(list.get(&id).unwrap().completed_at, None);
    }

    #[test]
    fn archive_on_complete_moves_to_history() {
        let mut list = TaskList::default();
        list.settings.archive_on_complete = true;
        let id = add(&mut list, "Ship it", at(1, 9));

        let transition = list.set_status(&id, TaskStatus::Done, at(1, 10)).unwrap();
        match &transition {
            Transition::Archived { from, entry } => {
                assert_eq!(*from, TaskStatus::Todo);
                assert_eq!(entry.completed_at, at(1, 10));
            }
            other => panic!("unexpected transition: {other:?}"),
        }
        assert!(list.tasks.is_empty());
        assert_eq!(list.history.len(), 1);

        let err = list.set_status(&id, TaskStatus::Todo, at(1, 11)).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn toggle_follows_checkbox_semantics() {
        let mut list = TaskList::default();
        let id = add(&mut list, "Task", at(1, 9));
        assert_eq!(list.toggle(&id, at(1, 10)).unwrap().to(), TaskStatus::Done);
        assert_eq!(list.toggle(&id, at(1, 11)).unwrap().to(), TaskStatus::Todo);

        list.set_status(&id, TaskStatus::Ongoing, at(1, 12)).unwrap();
        assert_eq!(list.toggle(&id, at(1, 13)).unwrap().to(), TaskStatus::Done);
    }

    #[test]
    fn edit_updates_fields_and_keeps_identity() {
        let mut list = TaskList::default();
        let id = add(&mut list, "Tpyo", at(1, 9));
        let created = list.get(&id).unwrap().created_at;

        let task = list
            .edit(
                &id,
                TaskEdit {
                    title: Some("Typo".to_string()),
                    notes: Some("fixed".to_string()),
                },
                at(1, 10),
            )
            .unwrap();
        assert_eq!(task.title, "Typo");
        assert_eq!(task.created_at, created);
        assert_eq!(task.updated_at, at(1, 10));

        let err = list
            .edit(
                &id,
                TaskEdit {
                    title: Some(" ".to_string()),
                    notes: None,
                },
                at(1, 11),
            )
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(list.get(&id).unwrap().title, "Typo");

        let task = list
            .edit(
                &id,
                TaskEdit {
                    title: None,
                    notes: Some(String::new()),
                },
                at(1, 12),
            )
            .unwrap();
        assert_eq!(task.notes, None);
    }

    #[test]
    fn add_note_converts_free_text() {
        let mut list = TaskList::default();
        let id = list
            .create(NewTask::new("Task").with_notes("first"), at(1, 9))
            .unwrap()
            .id
            .clone();

        let task = list.add_note(&id, "second", at(1, 10)).unwrap();
        assert_eq!(task.note_texts(), vec!["first", "second"]);
        assert_eq!(task.updated_at, at(1, 10));
        assert!(list.add_note(&id, "  ", at(1, 11)).is_err());
    }

    #[test]
    fn delete_checks_tasks_then_history() {
        let mut list = TaskList::default();
        list.settings.archive_on_complete = true;
        let archived = add(&mut list, "Old", at(1, 9));
        list.set_status(&archived, TaskStatus::Done, at(1, 10)).unwrap();
        let active = add(&mut list, "New", at(1, 11));

        assert!(matches!(list.delete(&active).unwrap(), Removed::Tasks(_)));
        assert!(matches!(list.delete(&archived).unwrap(), Removed::History(_)));
        assert!(matches!(list.delete("nope"), Err(Error::TaskNotFound(_))));
    }

    #[test]
    fn cleanup_is_idempotent_and_spares_open_tasks() {
        let mut list = TaskList::default();
        let old_done = add(&mut list, "Old done", at(1, 9));
        list.set_status(&old_done, TaskStatus::Done, at(1, 9)).unwrap();
        let recent_done = add(&mut list, "Recent done", at(20, 9));
        list.set_status(&recent_done, TaskStatus::Done, at(20, 9)).unwrap();
        add(&mut list, "Ancient todo", at(1, 8));

        let first = list.cleanup(7, at(21, 9));
        assert_eq!(first.removed_count, 1);
        assert_eq!(first.remaining_count, 2);
        assert_eq!(first.cutoff, at(14, 9));

        let again = list.cleanup(7, at(21, 9));
        assert_eq!(again.removed_count, 0);
        assert_eq!(again.remaining_count, 2);
    }

    #[test]
    fn cleanup_threshold_beyond_calendar_removes_nothing() {
        let mut list = TaskList::default();
        let done = add(&mut list, "Done long ago", at(1, 9));
        list.set_status(&done, TaskStatus::Done, at(1, 9)).unwrap();

        let report = list.cleanup(u32::MAX, at(21, 9));
        assert_eq!(report.removed_count, 0);
        assert_eq!(report.remaining_count, 1);
        assert_eq!(report.cutoff, DateTime::<Utc>::MIN_UTC);

        let report = list.cleanup(200_000_000, at(21, 9));
        assert_eq!(report.removed_count, 0);
    }

    #[test]
    fn clear_completed_and_history() {
        let mut list = TaskList::default();
        let a = add(&mut list, "A", at(1, 9));
        add(&mut list, "B", at(1, 9));
        list.set_status(&a, TaskStatus::Done, at(1, 10)).unwrap();
        assert_eq!(list.clear_completed(), 1);
        assert_eq!(list.tasks.len(), 1);

        list.settings.archive_on_complete = true;
        let b = list.tasks[0].id.clone();
        list.set_status(&b, TaskStatus::Done, at(1, 11)).unwrap();
        assert_eq!(list.clear_history(), 1);
        assert!(list.is_empty());
    }

    #[test]
    fn merge_keeps_existing_and_first_duplicate() {
        let mut list = TaskList::default();
        let id = add(&mut list, "Local", at(1, 9));

        let mut clash = list.get(&id).unwrap().clone();
        clash.title = "Remote".to_string();
        let mut fresh = clash.clone();
        fresh.id = "remote-1".to_string();
        let mut dup = fresh.clone();
        dup.title = "Second copy".to_string();

        let outcome = list.merge_imported(vec![clash, fresh, dup], Vec::new());
        assert_eq!(outcome.imported, 1);
        assert_eq!(outcome.skipped_existing, 2);
        assert_eq!(list.get(&id).unwrap().title, "Local");
        assert_eq!(list.get("remote-1").unwrap().title, "Remote");
        assert_eq!(list.tasks.last().unwrap().id, "remote-1");
    }

    #[test]
    fn resolve_id_accepts_unique_prefix_or_suffix() {
        let mut list = TaskList::default();
        list.merge_imported(
            vec![
                TaskRecord {
                    id: "01HXAAAA1111".to_string(),
                    title: "One".to_string(),
                    notes: None,
                    status: TaskStatus::Todo,
                    created_at: at(1, 9),
                    updated_at: at(1, 9),
                    completed_at: None,
                },
                TaskRecord {
                    id: "01HXBBBB2222".to_string(),
                    title: "Two".to_string(),
                    notes: None,
                    status: TaskStatus::Todo,
                    created_at: at(1, 9),
                    updated_at: at(1, 9),
                    completed_at: None,
                },
            ],
            Vec::new(),
        );

        assert_eq!(list.resolve_id("01hxaa").unwrap(), "01HXAAAA1111");
        assert_eq!(list.resolve_id("2222").unwrap(), "01HXBBBB2222");
        assert!(matches!(list.resolve_id("01HX"), Err(Error::InvalidArgument(_))));
        assert!(matches!(list.resolve_id("zzz"), Err(Error::TaskNotFound(_))));
    }

    #[test]
    fn counts_per_status() {
        let mut list = TaskList::default();
        let a = add(&mut list, "A", at(1, 9));
        let b = add(&mut list, "B", at(1, 9));
        add(&mut list, "C", at(1, 9));
        list.set_status(&a, TaskStatus::Ongoing, at(1, 10)).unwrap();
        list.set_status(&b, TaskStatus::Done, at(1, 10)).unwrap();

        let counts = list.counts();
        assert_eq!((counts.todo, counts.ongoing, counts.done), (1, 1, 1));
        assert_eq!(counts.total, 3);
        assert_eq!(counts.open(), 2);
    }
}
