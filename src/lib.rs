//! taskman - Task Manager Library
//!
//! This library provides the core functionality for the taskman CLI tool:
//! a file-backed task store, a user directory with a single privileged
//! `admin` user, and a statistics engine that renders overview reports.
//!
//! # Core Concepts
//!
//! - **Tasks**: Records addressed by their position among readable lines
//! - **Users**: Case-insensitive usernames with exact-match credentials
//! - **Statistics**: Totals and percentages evaluated against one date
//! - **Reports**: Fixed-label text shared by the console and report files
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `codec`: Line format for task and user records
//! - `config`: Configuration loading from `.taskman.toml`
//! - `error`: Error types and result aliases
//! - `manager`: Caller-facing operations over one data directory
//! - `output`: Human and JSON output envelopes
//! - `report`: Report and task block rendering
//! - `stats`: Task and per-user statistics
//! - `storage`: Line-oriented file access with atomic rewrites
//! - `task`: Task records and the task store
//! - `user`: User records, the directory and registration

pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod manager;
pub mod output;
pub mod report;
pub mod stats;
pub mod storage;
pub mod task;
pub mod user;

pub use error::{Error, Result};
