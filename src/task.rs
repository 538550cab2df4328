//! Task records and the line-oriented task store.
//!
//! Tasks live in a single text file, one record per line (see
//! [`crate::codec`]). A task is addressed by its position among the
//! decodable records of that file; positions are only meaningful for the
//! load they were taken from, so every mutation reloads before it indexes.

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

use crate::codec::{self, Decoded};
use crate::error::{Error, Result};
use crate::storage::Storage;
use crate::user::normalize_username;

/// Stored date: the text exactly as written plus its parsed value, when the
/// text is a valid `DD Mon YYYY` date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDate {
    raw: String,
    date: Option<NaiveDate>,
}

impl TaskDate {
    pub fn from_raw(raw: &str) -> Self {
        let raw = raw.trim().to_string();
        let date = codec::parse_date(&raw).ok();
        Self { raw, date }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            raw: codec::format_date(date),
            date: Some(date),
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Parsed date, `None` when the stored text is not a valid date
    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }
}

impl Serialize for TaskDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

/// Completion flag of a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Yes,
    No,
    /// Any other stored value, kept verbatim
    Unrecognized(String),
}

impl Completion {
    pub fn from_raw(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("yes") {
            Completion::Yes
        } else if trimmed.eq_ignore_ascii_case("no") {
            Completion::No
        } else {
            Completion::Unrecognized(trimmed.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Completion::Yes => "yes",
            Completion::No => "no",
            Completion::Unrecognized(raw) => raw,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Completion::Yes)
    }
}

impl Serialize for Completion {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskRecord {
    pub assignee: String,
    pub title: String,
    pub description: String,
    pub date_assigned: TaskDate,
    pub due_date: TaskDate,
    pub completed: Completion,
}

impl TaskRecord {
    /// A new, incomplete task.
    pub fn new(
        assignee: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        date_assigned: NaiveDate,
        due_date: NaiveDate,
    ) -> Self {
        Self {
            assignee: assignee.into(),
            title: title.into(),
            description: description.into(),
            date_assigned: TaskDate::from_date(date_assigned),
            due_date: TaskDate::from_date(due_date),
            completed: Completion::No,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.completed.is_complete()
    }

    pub fn is_assigned_to(&self, username: &str) -> bool {
        normalize_username(&self.assignee) == normalize_username(username)
    }
}

/// Changes allowed on an incomplete task.
#[derive(Debug, Clone, Default)]
pub struct TaskEdit {
    pub assignee: Option<String>,
    pub due_date: Option<NaiveDate>,
}

impl TaskEdit {
    pub fn is_empty(&self) -> bool {
        self.assignee.is_none() && self.due_date.is_none()
    }

    pub fn apply(self, task: &mut TaskRecord) {
        if let Some(assignee) = self.assignee {
            task.assignee = assignee;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = TaskDate::from_date(due_date);
        }
    }
}

/// Result of loading the task file.
#[derive(Debug, Clone, Serialize)]
pub struct TaskLoad {
    pub tasks: Vec<TaskRecord>,
    /// Lines that could not be decoded
    pub skipped: usize,
    /// The backing file does not exist yet
    pub missing: bool,
}

/// Validate a free-text field: it must be non-blank, not purely numeric and
/// storable on a single line.
pub fn validate_text_field<'a>(value: &'a str, field: &str) -> Result<&'a str> {
    let trimmed = validate_storable(value, field)?;
    if trimmed.chars().all(char::is_numeric) {
        return Err(Error::NumericField(field.to_string()));
    }
    Ok(trimmed)
}

/// Validate that a value is non-blank and can be stored as one field.
pub fn validate_storable<'a>(value: &'a str, field: &str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::BlankField(field.to_string()));
    }
    if trimmed.contains(codec::FIELD_SEPARATOR) || trimmed.contains(['\n', '\r']) {
        return Err(Error::InvalidArgument(format!(
            "{field} cannot contain '{}' or line breaks",
            codec::FIELD_SEPARATOR
        )));
    }
    Ok(trimmed)
}

/// One line of the task file as seen by a rewrite.
#[derive(Debug, Clone)]
enum StoredLine {
    /// Decoded record plus the text it was read from; only a changed record
    /// is re-encoded
    Task { raw: String, task: TaskRecord },
    /// Undecodable line, written back untouched
    Malformed(String),
}

#[derive(Debug, Clone)]
pub struct TaskStore {
    storage: Storage,
}

impl TaskStore {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Load every decodable task in file order.
    pub fn load(&self) -> Result<TaskLoad> {
        let path = self.storage.tasks_file();
        let Some(lines) = self.storage.read_lines(&path)? else {
            tracing::warn!(path = %path.display(), "task file not found, treating as empty");
            return Ok(TaskLoad {
                tasks: Vec::new(),
                skipped: 0,
                missing: true,
            });
        };

        let Decoded { records, skipped } = codec::decode_tasks(&lines);
        if skipped > 0 {
            tracing::warn!(path = %path.display(), skipped, "skipped malformed task lines");
        }
        tracing::debug!(tasks = records.len(), "loaded tasks");
        Ok(TaskLoad {
            tasks: records,
            skipped,
            missing: false,
        })
    }

    /// Append a task after checking its title against a fresh load.
    pub fn append(&self, record: &TaskRecord) -> Result<()> {
        let title = validate_text_field(&record.title, "title")?;
        validate_text_field(&record.description, "description")?;

        let current = self.load()?;
        let folded = title.to_lowercase();
        if current
            .tasks
            .iter()
            .any(|task| task.title.trim().to_lowercase() == folded)
        {
            return Err(Error::DuplicateTitle(title.to_string()));
        }

        self.storage
            .append_line(&self.storage.tasks_file(), &codec::encode_task(record))?;
        tracing::debug!(title, "appended task");
        Ok(())
    }

    /// Apply `mutator` to the task at `index` and rewrite the file.
    ///
    /// Complete tasks are immutable: the mutator is never called for them.
    /// Returns the updated record.
    pub fn update_at<F>(&self, index: usize, mutator: F) -> Result<TaskRecord>
    where
        F: FnOnce(&mut TaskRecord) -> Result<()>,
    {
        let mut lines = self.read_stored_lines()?;
        let position = task_position(&lines, index)?;
        let (raw, task) = match &mut lines[position] {
            StoredLine::Task { raw, task } => (raw, task),
            StoredLine::Malformed(_) => return Err(out_of_range(&lines, index)),
        };
        if task.is_complete() {
            return Err(Error::TaskAlreadyComplete(index));
        }

        let mut updated = task.clone();
        mutator(&mut updated)?;
        *raw = codec::encode_task(&updated);
        *task = updated.clone();

        self.write_stored_lines(&lines)?;
        tracing::debug!(index, title = %updated.title, "updated task");
        Ok(updated)
    }

    /// Remove the task at `index`, rewrite the file and return the removed
    /// record.
    pub fn delete_at(&self, index: usize) -> Result<TaskRecord> {
        let mut lines = self.read_stored_lines()?;
        let position = task_position(&lines, index)?;
        let removed = match lines.remove(position) {
            StoredLine::Task { task, .. } => task,
            StoredLine::Malformed(_) => return Err(out_of_range(&lines, index)),
        };

        self.write_stored_lines(&lines)?;
        tracing::debug!(index, title = %removed.title, "deleted task");
        Ok(removed)
    }

    fn read_stored_lines(&self) -> Result<Vec<StoredLine>> {
        let lines = self
            .storage
            .read_lines(&self.storage.tasks_file())?
            .unwrap_or_default();
        Ok(lines
            .into_iter()
            .filter(|line| !line.trim().is_empty())
            .map(|line| match codec::decode_task(&line) {
                Some(task) => StoredLine::Task { raw: line, task },
                None => StoredLine::Malformed(line),
            })
            .collect())
    }

    fn write_stored_lines(&self, lines: &[StoredLine]) -> Result<()> {
        let raw: Vec<String> = lines
            .iter()
            .map(|line| match line {
                StoredLine::Task { raw, .. } | StoredLine::Malformed(raw) => raw.clone(),
            })
            .collect();
        self.storage.write_lines(&self.storage.tasks_file(), &raw)
    }
}

/// Position in `lines` of the task with store index `index`.
fn task_position(lines: &[StoredLine], index: usize) -> Result<usize> {
    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| matches!(line, StoredLine::Task { .. }))
        .nth(index)
        .map(|(position, _)| position)
        .ok_or_else(|| out_of_range(lines, index))
}

fn out_of_range(lines: &[StoredLine], index: usize) -> Error {
    let len = lines
        .iter()
        .filter(|line| matches!(line, StoredLine::Task { .. }))
        .count();
    Error::IndexOutOfRange { index, len }
}
