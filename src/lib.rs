//! todomaster - personal task list library
//!
//! This library provides the task store and lifecycle engine behind the
//! todomaster CLI.
//!
//! # Core Concepts
//!
//! - **Tasks**: records that move between todo, ongoing and done
//! - **History**: completed tasks archived out of the active list
//! - **Store**: one persisted document, loaded once and saved after every action
//! - **Migration**: older documents with a `completed` flag are upgraded on load
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `config`: Configuration loading from `config.toml`
//! - `error`: Error types and result aliases
//! - `task`: Task records, statuses, filters and smart sort
//! - `lifecycle`: Create, edit, transition, delete and cleanup over a task list
//! - `search`: Case-insensitive search with match spans
//! - `summary`: Markdown summary report
//! - `settings`: Persisted user preferences
//! - `migrate`: Legacy document upgrade and record validation
//! - `transfer`: Export and import of backup documents
//! - `storage`: Key-value backends (file and in-memory)
//! - `store`: The task store tying storage and lifecycle together
//! - `host`: Request/response boundary for host integrations
//! - `lock`: File locking and atomic writes
//! - `output`: Human and JSON command output

pub mod cli;
pub mod config;
pub mod error;
pub mod host;
pub mod lifecycle;
pub mod lock;
pub mod migrate;
pub mod output;
pub mod search;
pub mod settings;
pub mod storage;
pub mod store;
pub mod summary;
pub mod task;
pub mod transfer;

pub use error::{Error, Result};
