//! Command-line interface for todomaster
//!
//! This module defines the CLI structure using clap derive macros.
//! Commands are grouped into submodules by concern.

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;

use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};

use crate::config::{default_config_path, Config};
use crate::error::{Error, Result};
use crate::output::{HumanOutput, OutputOptions};
use crate::storage::FileStorage;
use crate::store::{Outcome, TaskStore};

mod host;
mod init;
mod maintenance;
mod settings;
mod task;
mod transfer;

/// todomaster - a personal task list
///
/// Tasks move between todo, ongoing and done. Completed work can be kept in
/// place or archived to history, cleaned up by age, and backed up to JSON.
#[derive(Parser, Debug)]
#[command(name = "todomaster")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding storage.json (overrides storage.data_dir)
    #[arg(long, global = true, env = "TODOMASTER_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Path to config.toml
    #[arg(long, global = true, env = "TODOMASTER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write default storage and config if missing
    Init,

    /// Add a task
    Add {
        /// Task title (words are joined with spaces)
        #[arg(required = true)]
        title: Vec<String>,

        /// Notes for the task
        #[arg(short, long)]
        notes: Option<String>,

        /// Initial status: todo, ongoing, done
        #[arg(short, long)]
        status: Option<String>,
    },

    /// List tasks, smart-sorted
    List {
        /// Filter: all, todo, ongoing, done (defaults to the saved filter)
        #[arg(short, long)]
        filter: Option<String>,

        /// Case-insensitive text to find in titles and notes
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show one task or history entry
    Show {
        /// Task id, or a unique prefix/suffix of it
        id: String,
    },

    /// Change a task's title and/or notes
    Edit {
        /// Task id, or a unique prefix/suffix of it
        id: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New notes (empty string clears them)
        #[arg(long)]
        notes: Option<String>,
    },

    /// Set a task's status
    Status {
        /// Task id, or a unique prefix/suffix of it
        id: String,

        /// New status: todo, ongoing, done
        status: String,
    },

    /// Toggle completion (done becomes todo, anything else becomes done)
    Toggle {
        /// Task id, or a unique prefix/suffix of it
        id: String,
    },

    /// Append a note to a task
    Note {
        /// Task id, or a unique prefix/suffix of it
        id: String,

        /// Note text (words are joined with spaces)
        #[arg(required = true)]
        text: Vec<String>,
    },

    /// Delete a task or history entry
    Rm {
        /// Task id, or a unique prefix/suffix of it
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Remove done tasks older than a number of days
    Cleanup {
        /// Age threshold in days (defaults to cleanup.older_than_days)
        #[arg(long)]
        days: Option<u32>,
    },

    /// Remove every done task
    ClearCompleted {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Completed-task history
    #[command(subcommand)]
    History(HistoryCommands),

    /// Print a markdown summary
    Summary {
        /// Report date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Export tasks and history to a JSON backup
    Export {
        /// Output file, or `-` for stdout (defaults to todomaster-backup-<date>.json)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Merge tasks from a JSON backup
    Import {
        /// Backup file, or `-` for stdin
        file: PathBuf,
    },

    /// Report storage usage against the quota
    Usage,

    /// View or change settings
    #[command(subcommand)]
    Settings(SettingsCommands),

    /// Host message boundary
    #[command(subcommand)]
    Host(HostCommands),
}

#[derive(Subcommand, Debug)]
pub enum HistoryCommands {
    /// List completed tasks, most recent first
    List,

    /// Remove all history entries
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommands {
    /// Show current settings
    Show,

    /// Change one setting: filter, theme, archive-on-complete, notifications
    Set { key: String, value: String },
}

#[derive(Subcommand, Debug)]
pub enum HostCommands {
    /// Report version, schema and counts
    GetVersion,

    /// Return a full export document
    Backup,

    /// Remove done tasks older than a number of days
    Cleanup {
        #[arg(long, default_value_t = 30)]
        days: u32,
    },

    /// Handle a raw JSON request such as {"action":"backup"}
    Request {
        #[arg(id = "request_json", value_name = "JSON")]
        json: String,
    },
}

/// Settings shared by every command
#[derive(Debug, Clone)]
pub struct Context {
    pub data_dir: Option<PathBuf>,
    pub config_path: Option<PathBuf>,
    pub output: OutputOptions,
}

impl Context {
    /// Explicit config paths must load; the default path falls back quietly
    pub fn load_config(&self) -> Result<Config> {
        match &self.config_path {
            Some(path) if path.exists() => Config::load(path),
            Some(_) => Ok(Config::default()),
            None => Ok(Config::load_or_default(default_config_path().as_deref())),
        }
    }

    pub fn config_path(&self) -> Option<PathBuf> {
        self.config_path.clone().or_else(default_config_path)
    }

    pub fn open_store(&self) -> Result<TaskStore<FileStorage>> {
        let config = self.load_config()?;
        let data_dir = config.data_dir(self.data_dir.as_deref())?;
        tracing::debug!(data_dir = %data_dir.display(), "opening store");
        let backend =
            FileStorage::new(&data_dir).with_lock_timeout(config.storage.lock_timeout_ms);
        Ok(TaskStore::open(backend, config, Utc::now()))
    }
}

/// Surface load/maintenance notices as warnings
fn push_notices(human: &mut HumanOutput, store: &mut TaskStore<FileStorage>) {
    for notice in store.take_notices() {
        human.push_warning(notice);
    }
}

/// Ask before a destructive change; `--yes` skips the prompt
fn confirm(prompt: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    let stdin = io::stdin();
    if !stdin.is_terminal() {
        return Err(Error::InvalidArgument(format!(
            "{prompt} Re-run with --yes to confirm."
        )));
    }
    eprint!("{prompt} [y/N] ");
    io::stderr().flush()?;
    let mut answer = String::new();
    stdin.lock().read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

/// Quota advisory as a human warning; usage errors are not fatal here
fn push_usage_warning(human: &mut HumanOutput, store: &TaskStore<FileStorage>) {
    if let Ok(usage) = store.usage() {
        if let Some(warning) = usage.warning {
            human.push_warning(warning);
        }
    }
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

fn unexpected(outcome: &Outcome) -> Error {
    Error::Internal(format!("unexpected outcome: {outcome:?}"))
}

fn join_words(words: Vec<String>) -> String {
    words.join(" ")
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let ctx = Context {
            data_dir: self.data_dir,
            config_path: self.config,
            output: OutputOptions {
                json: self.json,
                quiet: self.quiet,
            },
        };

        match self.command {
            Commands::Init => init::run(ctx),
            Commands::Add {
                title,
                notes,
                status,
            } => task::run_add(task::AddOptions {
                title: join_words(title),
                notes,
                status,
                ctx,
            }),
            Commands::List { filter, search } => {
                task::run_list(task::ListOptions { filter, search, ctx })
            }
            Commands::Show { id } => task::run_show(task::ShowOptions { id, ctx }),
            Commands::Edit { id, title, notes } => task::run_edit(task::EditOptions {
                id,
                title,
                notes,
                ctx,
            }),
            Commands::Status { id, status } => {
                task::run_status(task::StatusOptions { id, status, ctx })
            }
            Commands::Toggle { id } => task::run_toggle(task::ToggleOptions { id, ctx }),
            Commands::Note { id, text } => task::run_note(task::NoteOptions {
                id,
                text: join_words(text),
                ctx,
            }),
            Commands::Rm { id, yes } => task::run_rm(task::RmOptions { id, yes, ctx }),
            Commands::Cleanup { days } => {
                maintenance::run_cleanup(maintenance::CleanupOptions { days, ctx })
            }
            Commands::ClearCompleted { yes } => {
                maintenance::run_clear_completed(maintenance::ClearOptions { yes, ctx })
            }
            Commands::History(cmd) => match cmd {
                HistoryCommands::List => maintenance::run_history_list(ctx),
                HistoryCommands::Clear { yes } => {
                    maintenance::run_history_clear(maintenance::ClearOptions { yes, ctx })
                }
            },
            Commands::Summary { date } => {
                maintenance::run_summary(maintenance::SummaryOptions { date, ctx })
            }
            Commands::Export { out } => {
                transfer::run_export(transfer::ExportOptions { out, ctx })
            }
            Commands::Import { file } => {
                transfer::run_import(transfer::ImportOptions { file, ctx })
            }
            Commands::Usage => maintenance::run_usage(ctx),
            Commands::Settings(cmd) => match cmd {
                SettingsCommands::Show => settings::run_show(ctx),
                SettingsCommands::Set { key, value } => {
                    settings::run_set(settings::SetOptions { key, value, ctx })
                }
            },
            Commands::Host(cmd) => {
                let request = match cmd {
                    HostCommands::GetVersion => crate::host::HostRequest::GetVersion,
                    HostCommands::Backup => crate::host::HostRequest::Backup,
                    HostCommands::Cleanup { days } => crate::host::HostRequest::Cleanup { days },
                    HostCommands::Request { json } => crate::host::HostRequest::from_json(&json)?,
                };
                host::run(request, ctx)
            }
        }
    }
}
