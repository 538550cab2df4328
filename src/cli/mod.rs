//! Command-line interface for taskman
//!
//! This module defines the CLI structure using clap derive macros.
//! Each command group is implemented in its own submodule. Commands are
//! non-interactive: every input arrives as an argument and is validated
//! once; on failure the command exits with an error instead of prompting.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::codec;
use crate::error::{Error, Result};
use crate::manager::TaskManager;
use crate::user::is_admin;

mod stats;
mod task;
mod user;

/// taskman - Task Manager
///
/// Track tasks for a small team: register users, add and complete tasks,
/// and derive task and user statistics reports.
#[derive(Parser, Debug)]
#[command(name = "taskman")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding tasks.txt, user.txt and reports (defaults to current directory)
    #[arg(long, global = true, env = "TASKMAN_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Username to act as
    #[arg(short, long, global = true, env = "TASKMAN_USER")]
    pub user: Option<String>,

    /// Password for --user
    #[arg(short, long, global = true, env = "TASKMAN_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

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
    /// Check credentials for --user/--password
    Login,

    /// User management
    #[command(subcommand)]
    User(UserCommands),

    /// Task management
    #[command(subcommand)]
    Task(TaskCommands),

    /// Display task and user statistics (admin only)
    Stats {
        /// Evaluate overdue tasks as of this date (DD Mon YYYY)
        #[arg(long)]
        as_of: Option<String>,
    },

    /// Write task_overview.txt and user_overview.txt (admin only)
    Report {
        /// Evaluate overdue tasks as of this date (DD Mon YYYY)
        #[arg(long)]
        as_of: Option<String>,
    },
}

/// User subcommands
#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Register a new user (admin only)
    Add {
        /// Username for the new user
        username: String,

        /// Password for the new user
        #[arg(long)]
        credential: String,
    },
}

/// Task subcommands
#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Add a new task
    Add {
        /// Registered user the task is assigned to
        #[arg(long)]
        assignee: String,

        /// Task title (unique, case-insensitive)
        #[arg(long)]
        title: String,

        /// Task description
        #[arg(long)]
        description: String,

        /// Due date (DD Mon YYYY, e.g. 07 Mar 2001)
        #[arg(long)]
        due: String,
    },

    /// List all tasks
    List,

    /// List tasks assigned to you
    Mine,

    /// List completed tasks (admin only)
    Completed,

    /// Mark a task as complete
    Complete {
        /// Task number as shown by `task list` or `task mine`
        index: usize,
    },

    /// Reassign or reschedule an incomplete task
    Edit {
        /// Task number as shown by `task list` or `task mine`
        index: usize,

        /// New assignee
        #[arg(long)]
        assignee: Option<String>,

        /// New due date (DD Mon YYYY)
        #[arg(long)]
        due: Option<String>,
    },

    /// Delete a task (admin only)
    Delete {
        /// Task number as shown by `task list`
        index: usize,
    },
}

/// Credentials and data location shared by every command.
#[derive(Debug, Clone)]
pub struct SessionArgs {
    pub data_dir: Option<PathBuf>,
    pub user: Option<String>,
    pub password: Option<String>,
}

/// An authenticated user bound to a data directory.
pub(crate) struct Session {
    pub manager: TaskManager,
    pub username: String,
}

impl Session {
    /// Open the data directory and check the credentials.
    pub(crate) fn open(args: SessionArgs) -> Result<Self> {
        let data_dir = args
            .data_dir
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
        let manager = TaskManager::open(data_dir);

        let username = args
            .user
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or(Error::AuthenticationFailed)?
            .to_lowercase();
        let password = args.password.unwrap_or_default();
        if !manager.authenticate(&username, &password)? {
            tracing::debug!(username = %username, "authentication failed");
            return Err(Error::AuthenticationFailed);
        }

        Ok(Self { manager, username })
    }

    pub(crate) fn is_admin(&self) -> bool {
        is_admin(&self.username)
    }

    pub(crate) fn require_admin(&self, action: &str) -> Result<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(Error::Forbidden(action.to_string()))
        }
    }
}

pub(crate) fn parse_date_arg(value: Option<&str>) -> Result<Option<chrono::NaiveDate>> {
    value.map(codec::parse_date).transpose()
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let session = SessionArgs {
            data_dir: self.data_dir,
            user: self.user,
            password: self.password,
        };
        let json = self.json;
        let quiet = self.quiet;

        match self.command {
            Commands::Login => user::run_login(user::LoginOptions {
                session,
                json,
                quiet,
            }),
            Commands::User(cmd) => match cmd {
                UserCommands::Add {
                    username,
                    credential,
                } => user::run_add(user::AddOptions {
                    username,
                    credential,
                    session,
                    json,
                    quiet,
                }),
            },
            Commands::Task(cmd) => match cmd {
                TaskCommands::Add {
                    assignee,
                    title,
                    description,
                    due,
                } => task::run_add(task::AddOptions {
                    assignee,
                    title,
                    description,
                    due,
                    session,
                    json,
                    quiet,
                }),
                TaskCommands::List => task::run_list(task::ListOptions {
                    scope: task::ListScope::All,
                    session,
                    json,
                    quiet,
                }),
                TaskCommands::Mine => task::run_list(task::ListOptions {
                    scope: task::ListScope::Mine,
                    session,
                    json,
                    quiet,
                }),
                TaskCommands::Completed => task::run_list(task::ListOptions {
                    scope: task::ListScope::Completed,
                    session,
                    json,
                    quiet,
                }),
                TaskCommands::Complete { index } => task::run_complete(task::CompleteOptions {
                    index,
                    session,
                    json,
                    quiet,
                }),
                TaskCommands::Edit {
                    index,
                    assignee,
                    due,
                } => task::run_edit(task::EditOptions {
                    index,
                    assignee,
                    due,
                    session,
                    json,
                    quiet,
                }),
                TaskCommands::Delete { index } => task::run_delete(task::DeleteOptions {
                    index,
                    session,
                    json,
                    quiet,
                }),
            },
            Commands::Stats { as_of } => stats::run_stats(stats::StatsOptions {
                as_of,
                session,
                json,
                quiet,
            }),
            Commands::Report { as_of } => stats::run_report(stats::StatsOptions {
                as_of,
                session,
                json,
                quiet,
            }),
        }
    }
}
