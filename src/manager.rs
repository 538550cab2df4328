//! Caller-facing task manager operations.
//!
//! `TaskManager` ties the task store, the user directory, the statistics
//! engine and the report renderer to one data directory. Every call reloads
//! what it needs from storage; nothing is cached between calls.

use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use serde::Serialize;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::report::{self, WrittenReports};
use crate::stats::{self, Statistics};
use crate::storage::Storage;
use crate::task::{TaskEdit, TaskRecord, TaskStore};
use crate::user::{normalize_username, UserDirectory, UserStore};

/// A task together with its store index.
#[derive(Debug, Clone, Serialize)]
pub struct IndexedTask {
    pub index: usize,
    #[serde(flatten)]
    pub task: TaskRecord,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskListing {
    pub tasks: Vec<IndexedTask>,
    /// Malformed lines skipped while loading
    pub skipped: usize,
    /// The task file does not exist yet
    pub missing: bool,
}

#[derive(Debug, Clone)]
pub struct TaskManager {
    data_dir: PathBuf,
    config: Config,
    tasks: TaskStore,
    users: UserStore,
}

/// Today's date in local time
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

impl TaskManager {
    /// Open the data directory, reading `.taskman.toml` when present.
    pub fn open(data_dir: PathBuf) -> Self {
        let config = Config::load_from_dir(&data_dir);
        Self::with_config(data_dir, config)
    }

    pub fn with_config(data_dir: PathBuf, config: Config) -> Self {
        let storage = Storage::new(data_dir.clone(), &config.storage);
        Self {
            data_dir,
            tasks: TaskStore::new(storage.clone()),
            users: UserStore::new(storage),
            config,
        }
    }

    // =========================================================================
    // Users
    // =========================================================================

    pub fn authenticate(&self, username: &str, credential: &str) -> Result<bool> {
        Ok(self.users.load()?.directory.authenticate(username, credential))
    }

    /// Register a user; only `admin` may do this. Returns the refreshed
    /// directory.
    pub fn register(
        &self,
        username: &str,
        credential: &str,
        requesting_user: &str,
    ) -> Result<UserDirectory> {
        let directory = self.users.load()?.directory;
        self.users
            .register(directory, username, credential, requesting_user)
    }

    // =========================================================================
    // Tasks
    // =========================================================================

    pub fn list_all_tasks(&self) -> Result<TaskListing> {
        self.list_where(|_| true)
    }

    /// Tasks assigned to `username`, with their store-wide indices.
    pub fn list_tasks_for(&self, username: &str) -> Result<TaskListing> {
        self.list_where(|task| task.is_assigned_to(username))
    }

    pub fn list_completed_tasks(&self) -> Result<TaskListing> {
        self.list_where(TaskRecord::is_complete)
    }

    fn list_where<F>(&self, keep: F) -> Result<TaskListing>
    where
        F: Fn(&TaskRecord) -> bool,
    {
        let load = self.tasks.load()?;
        let tasks = load
            .tasks
            .into_iter()
            .enumerate()
            .filter(|(_, task)| keep(task))
            .map(|(index, task)| IndexedTask { index, task })
            .collect();
        Ok(TaskListing {
            tasks,
            skipped: load.skipped,
            missing: load.missing,
        })
    }

    /// Fetch the task at `index`.
    pub fn task(&self, index: usize) -> Result<TaskRecord> {
        let mut tasks = self.tasks.load()?.tasks;
        let len = tasks.len();
        if index >= len {
            return Err(Error::IndexOutOfRange { index, len });
        }
        Ok(tasks.swap_remove(index))
    }

    /// Create an incomplete task assigned today.
    pub fn add_task(
        &self,
        assignee: &str,
        title: &str,
        description: &str,
        due_date: NaiveDate,
    ) -> Result<TaskRecord> {
        self.add_task_on(assignee, title, description, due_date, today())
    }

    /// Create an incomplete task with an explicit assignment date.
    pub fn add_task_on(
        &self,
        assignee: &str,
        title: &str,
        description: &str,
        due_date: NaiveDate,
        assigned_on: NaiveDate,
    ) -> Result<TaskRecord> {
        let assignee = self.registered_user(assignee)?;
        let record = TaskRecord::new(
            assignee,
            title.trim(),
            description.trim(),
            assigned_on,
            due_date,
        );
        self.tasks.append(&record)?;
        Ok(record)
    }

    pub fn mark_complete(&self, index: usize) -> Result<TaskRecord> {
        self.tasks.update_at(index, |task| {
            task.completed = crate::task::Completion::Yes;
            Ok(())
        })
    }

    /// Reassign and/or reschedule an incomplete task.
    pub fn edit_task(&self, index: usize, edit: TaskEdit) -> Result<TaskRecord> {
        if edit.is_empty() {
            return Err(Error::InvalidArgument(
                "nothing to edit: give a new assignee or due date".to_string(),
            ));
        }
        let edit = TaskEdit {
            assignee: match edit.assignee.as_deref() {
                Some(assignee) => Some(self.registered_user(assignee)?),
                None => None,
            },
            due_date: edit.due_date,
        };
        self.tasks.update_at(index, move |task| {
            edit.apply(task);
            Ok(())
        })
    }

    /// Remove the task at `index`, returning it for confirmation.
    pub fn delete_task(&self, index: usize) -> Result<TaskRecord> {
        self.tasks.delete_at(index)
    }

    fn registered_user(&self, username: &str) -> Result<String> {
        let username = normalize_username(username);
        if username.is_empty() {
            return Err(Error::BlankField("assignee".to_string()));
        }
        if !self.users.load()?.directory.exists(&username) {
            return Err(Error::UnknownUser(username));
        }
        Ok(username)
    }

    // =========================================================================
    // Statistics and reports
    // =========================================================================

    pub fn compute_statistics(&self) -> Result<Statistics> {
        self.compute_statistics_at(today())
    }

    /// Statistics evaluated against a fixed date.
    pub fn compute_statistics_at(&self, today: NaiveDate) -> Result<Statistics> {
        let load = self.tasks.load()?;
        let users = self.users.load()?.directory;
        let mut statistics = stats::compute(&load.tasks, &users, today);
        statistics.skipped_lines = load.skipped;
        statistics.tasks_missing = load.missing;
        Ok(statistics)
    }

    /// Report text for display; identical to the generated files' content.
    pub fn render_report(&self, stats: &Statistics) -> String {
        report::render_report(stats).join("\n")
    }

    /// Overwrite the task and user overview report files.
    pub fn generate_reports(&self, stats: &Statistics) -> Result<WrittenReports> {
        let dir = self.config.reports.resolve_dir(&self.data_dir);
        report::write_reports(stats, &dir, &self.config.reports)
    }
}
