//! Task store: owns the in-memory task list and its persistence round-trip.
//!
//! A store is opened once per process with an explicit backend and config,
//! then passed by reference. Every [`Action`] mutates the in-memory list and
//! saves the whole document; the last save wins.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::lifecycle::{CleanupReport, NewTask, Removed, TaskEdit, TaskList, Transition};
use crate::migrate::{
    self, KEY_HISTORY, KEY_LAST_SAVED, KEY_SETTINGS, KEY_TASKS, KEY_VERSION, LEGACY_TASK_KEYS,
    SCHEMA_VERSION, STORAGE_KEYS,
};
use crate::settings::{Settings, SettingsUpdate};
use crate::storage::KeyValueStore;
use crate::task::{TaskRecord, TaskStatus};
use crate::transfer::{self, ImportReport};

/// One user-initiated mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Add(NewTask),
    Edit { id: String, edit: TaskEdit },
    AddNote { id: String, text: String },
    SetStatus { id: String, status: TaskStatus },
    Toggle { id: String },
    Delete { id: String },
    Cleanup { older_than_days: u32 },
    ClearCompleted,
    ClearHistory,
    Import { text: String },
    UpdateSettings(SettingsUpdate),
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Add(_) => "add",
            Action::Edit { .. } => "edit",
            Action::AddNote { .. } => "note",
            Action::SetStatus { .. } => "status",
            Action::Toggle { .. } => "toggle",
            Action::Delete { .. } => "delete",
            Action::Cleanup { .. } => "cleanup",
            Action::ClearCompleted => "clear-completed",
            Action::ClearHistory => "clear-history",
            Action::Import { .. } => "import",
            Action::UpdateSettings(_) => "settings",
        }
    }
}

/// What an [`Action`] did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum Outcome {
    Added { task: TaskRecord },
    Edited { task: TaskRecord },
    NoteAdded { task: TaskRecord },
    StatusChanged { transition: Transition },
    Deleted { removed: Removed },
    CleanedUp { report: CleanupReport },
    ClearedCompleted { removed: usize },
    ClearedHistory { removed: usize },
    Imported { report: ImportReport },
    SettingsUpdated { settings: Settings },
}

/// Storage usage against the advisory quota
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageUsage {
    pub bytes_in_use: u64,
    pub quota_bytes: u64,
    pub percent: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

pub struct TaskStore<S: KeyValueStore> {
    backend: S,
    config: Config,
    list: TaskList,
    last_saved: Option<DateTime<Utc>>,
    notices: Vec<String>,
}

impl<S: KeyValueStore> TaskStore<S> {
    /// Open a store and load its state.
    ///
    /// Load failures never abort: the store starts empty and the failure is
    /// kept as a notice. With `cleanup.auto` set, aged done tasks are removed.
    pub fn open(backend: S, config: Config, now: DateTime<Utc>) -> Self {
        let mut store = Self {
            backend,
            config,
            list: TaskList::default(),
            last_saved: None,
            notices: Vec::new(),
        };

        if let Err(err) = store.load(now) {
            store
                .notices
                .push(format!("Could not load saved tasks, starting empty: {err}"));
        }

        if store.config.cleanup.auto {
            store.run_startup_cleanup(now);
        }
        store
    }

    fn run_startup_cleanup(&mut self, now: DateTime<Utc>) {
        let days = self.config.cleanup.older_than_days;
        let report = self.list.cleanup(days, now);
        if report.removed_count == 0 {
            return;
        }
        tracing::debug!(
            removed = report.removed_count,
            days,
            "startup cleanup removed done tasks"
        );
        if let Err(err) = self.save(now) {
            self.notices
                .push(format!("Startup cleanup could not be saved: {err}"));
        }
    }

    /// Replace the in-memory state with what storage holds.
    ///
    /// Missing keys load as empty collections. On a read failure the list is
    /// reset to empty and the error is returned. When an older layout cannot
    /// be written back, the loaded tasks are kept and a notice is recorded.
    pub fn load(&mut self, now: DateTime<Utc>) -> Result<()> {
        let document = match self.backend.get(&STORAGE_KEYS) {
            Ok(document) => document,
            Err(err) => {
                tracing::error!(error = %err, "failed to load tasks");
                self.list = TaskList::default();
                self.last_saved = None;
                return Err(err);
            }
        };

        let migration = migrate::migrate_document(&document, now);
        for notice in &migration.notices {
            tracing::warn!(notice = %notice, "migration");
        }
        self.notices.extend(migration.notices);
        self.list = migration.list;
        self.last_saved = migration.last_saved;
        tracing::debug!(
            tasks = self.list.tasks.len(),
            history = self.list.history.len(),
            "loaded tasks"
        );

        if migration.needs_write {
            tracing::warn!(
                legacy_keys = ?migration.legacy_keys,
                "migrating stored tasks to schema version {SCHEMA_VERSION}"
            );
            if let Err(err) = self.persist_migration(&migration.legacy_keys, now) {
                self.notices.push(format!(
                    "Loaded tasks but could not save them in the current format: {err}"
                ));
            }
        }
        Ok(())
    }

    fn persist_migration(&mut self, legacy_keys: &[&str], now: DateTime<Utc>) -> Result<()> {
        self.save(now)?;
        if !legacy_keys.is_empty() {
            self.backend.remove(legacy_keys).map_err(|err| {
                tracing::error!(error = %err, "failed to remove legacy keys");
                err
            })?;
        }
        Ok(())
    }

    /// Write the full in-memory state, overwriting what was stored.
    ///
    /// In-memory state is kept when the write fails.
    pub fn save(&mut self, now: DateTime<Utc>) -> Result<()> {
        let mut entries = Map::new();
        entries.insert(KEY_TASKS.to_string(), serde_json::to_value(&self.list.tasks)?);
        entries.insert(
            KEY_HISTORY.to_string(),
            serde_json::to_value(&self.list.history)?,
        );
        entries.insert(
            KEY_SETTINGS.to_string(),
            serde_json::to_value(&self.list.settings)?,
        );
        entries.insert(
            KEY_VERSION.to_string(),
            Value::String(SCHEMA_VERSION.to_string()),
        );
        entries.insert(KEY_LAST_SAVED.to_string(), serde_json::to_value(now)?);

        match self.backend.set(entries) {
            Ok(()) => {
                self.last_saved = Some(now);
                tracing::debug!(tasks = self.list.tasks.len(), "saved tasks");
                if let Ok(usage) = self.usage() {
                    if let Some(warning) = usage.warning {
                        tracing::warn!(bytes = usage.bytes_in_use, "{warning}");
                    }
                }
                Ok(())
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to save tasks");
                Err(match err {
                    Error::Storage { .. } | Error::LockFailed(_) => err,
                    other => Error::storage("write", other.to_string()),
                })
            }
        }
    }

    /// Bytes used by persisted state, with a warning past the threshold
    pub fn usage(&self) -> Result<StorageUsage> {
        let bytes_in_use = self.backend.bytes_in_use()?;
        let quota = &self.config.quota;
        let warning = (bytes_in_use > quota.warn_threshold()).then(|| {
            format!(
                "Storage usage is high: {bytes_in_use} of {} bytes",
                quota.max_bytes
            )
        });
        Ok(StorageUsage {
            bytes_in_use,
            quota_bytes: quota.max_bytes,
            percent: bytes_in_use as f64 * 100.0 / quota.max_bytes as f64,
            warning,
        })
    }

    /// Write the default empty document unless one already exists.
    ///
    /// Returns whether anything was written.
    pub fn initialize(&mut self, now: DateTime<Utc>) -> Result<bool> {
        let existing = self.backend.get(&STORAGE_KEYS)?;
        let initialized = existing.contains_key(KEY_TASKS)
            || LEGACY_TASK_KEYS.iter().any(|key| existing.contains_key(*key));
        if initialized {
            return Ok(false);
        }
        self.save(now)?;
        Ok(true)
    }

    /// Run one action and persist the result.
    ///
    /// Invalid input fails before anything changes. If only the save fails,
    /// the in-memory change stays and the storage error is returned.
    pub fn apply(&mut self, action: Action, now: DateTime<Utc>) -> Result<Outcome> {
        let name = action.name();
        let outcome = self.mutate(action, now)?;
        tracing::debug!(action = name, "applied action");
        self.save(now)?;
        Ok(outcome)
    }

    fn mutate(&mut self, action: Action, now: DateTime<Utc>) -> Result<Outcome> {
        let list = &mut self.list;
        Ok(match action {
            Action::Add(draft) => Outcome::Added {
                task: list.create(draft, now)?.clone(),
            },
            Action::Edit { id, edit } => {
                let id = list.resolve_id(&id)?;
                Outcome::Edited {
                    task: list.edit(&id, edit, now)?.clone(),
                }
            }
            Action::AddNote { id, text } => {
                let id = list.resolve_id(&id)?;
                Outcome::NoteAdded {
                    task: list.add_note(&id, &text, now)?.clone(),
                }
            }
            Action::SetStatus { id, status } => {
                let id = list.resolve_id(&id)?;
                Outcome::StatusChanged {
                    transition: list.set_status(&id, status, now)?,
                }
            }
            Action::Toggle { id } => {
                let id = list.resolve_id(&id)?;
                Outcome::StatusChanged {
                    transition: list.toggle(&id, now)?,
                }
            }
            Action::Delete { id } => {
                let id = list.resolve_id(&id)?;
                Outcome::Deleted {
                    removed: list.delete(&id)?,
                }
            }
            Action::Cleanup { older_than_days } => Outcome::CleanedUp {
                report: list.cleanup(older_than_days, now),
            },
            Action::ClearCompleted => Outcome::ClearedCompleted {
                removed: list.clear_completed(),
            },
            Action::ClearHistory => Outcome::ClearedHistory {
                removed: list.clear_history(),
            },
            Action::Import { text } => {
                let parsed = transfer::parse_import(&text, now)?;
                let merge = list.merge_imported(parsed.tasks, parsed.history);
                Outcome::Imported {
                    report: ImportReport::new(merge, parsed.rejected),
                }
            }
            Action::UpdateSettings(update) => {
                if update.is_empty() {
                    return Err(Error::InvalidArgument("no settings to update".to_string()));
                }
                update.apply_to(&mut list.settings);
                Outcome::SettingsUpdated {
                    settings: list.settings.clone(),
                }
            }
        })
    }

    pub fn list(&self) -> &TaskList {
        &self.list
    }

    pub fn settings(&self) -> &Settings {
        &self.list.settings
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn last_saved(&self) -> Option<DateTime<Utc>> {
        self.last_saved
    }

    /// Messages for the user gathered while loading or maintaining state
    pub fn notices(&self) -> &[String] {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notices)
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut S {
        &mut self.backend
    }
}
