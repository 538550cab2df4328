//! Line codec for task and user records.
//!
//! Task lines: `assignee, title, description, date_assigned, due_date, completed`
//! User lines: `username, credential`
//!
//! Dates use `DD Mon YYYY` (e.g. `07 Mar 2001`) and the completion flag is
//! the literal `yes` or `no`.

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::task::{Completion, TaskDate, TaskRecord};
use crate::user::UserRecord;

/// Separator between fields on a stored line
pub const FIELD_SEPARATOR: &str = ", ";

/// `strftime` format for stored dates
pub const DATE_FORMAT: &str = "%d %b %Y";

const TASK_FIELDS: usize = 6;
const USER_FIELDS: usize = 2;

/// Records decoded from a batch of lines, plus the count of lines that did
/// not have the expected shape.
#[derive(Debug, Clone, Serialize)]
pub struct Decoded<T> {
    pub records: Vec<T>,
    pub skipped: usize,
}

/// Parse a caller-supplied date in `DD Mon YYYY` form.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|_| Error::InvalidDateFormat(trimmed.to_string()))
}

/// Render a date as `DD Mon YYYY`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Decode a single task line. Returns `None` unless the line has exactly
/// six fields.
pub fn decode_task(line: &str) -> Option<TaskRecord> {
    let fields: Vec<&str> = line.trim_end().split(FIELD_SEPARATOR).collect();
    if fields.len() != TASK_FIELDS {
        return None;
    }

    Some(TaskRecord {
        assignee: fields[0].trim().to_string(),
        title: fields[1].to_string(),
        description: fields[2].to_string(),
        date_assigned: TaskDate::from_raw(fields[3]),
        due_date: TaskDate::from_raw(fields[4]),
        completed: Completion::from_raw(fields[5]),
    })
}

/// Encode a task as a single stored line.
pub fn encode_task(record: &TaskRecord) -> String {
    [
        record.assignee.as_str(),
        record.title.as_str(),
        record.description.as_str(),
        record.date_assigned.raw(),
        record.due_date.raw(),
        record.completed.as_str(),
    ]
    .join(FIELD_SEPARATOR)
}

/// Decode a user line into its record. Usernames are normalized to lowercase.
pub fn decode_user(line: &str) -> Option<UserRecord> {
    let fields: Vec<&str> = line.trim().split(FIELD_SEPARATOR).collect();
    if fields.len() != USER_FIELDS {
        return None;
    }
    let username = fields[0].trim().to_lowercase();
    if username.is_empty() {
        return None;
    }
    Some(UserRecord {
        username,
        credential: fields[1].to_string(),
    })
}

/// Encode a user as a single stored line.
pub fn encode_user(record: &UserRecord) -> String {
    format!("{}{}{}", record.username, FIELD_SEPARATOR, record.credential)
}

/// Decode every non-blank line as a task, counting the malformed ones.
pub fn decode_tasks<S: AsRef<str>>(lines: &[S]) -> Decoded<TaskRecord> {
    decode_all(lines, decode_task)
}

/// Decode every non-blank line as a user, counting the malformed ones.
///
/// A username that appears more than once keeps its first entry; the later
/// duplicates are counted as skipped.
pub fn decode_users<S: AsRef<str>>(lines: &[S]) -> Decoded<UserRecord> {
    let decoded = decode_all(lines, decode_user);
    let mut records: Vec<UserRecord> = Vec::with_capacity(decoded.records.len());
    let mut skipped = decoded.skipped;
    for record in decoded.records {
        if records.iter().any(|existing| existing.username == record.username) {
            skipped += 1;
            continue;
        }
        records.push(record);
    }
    Decoded { records, skipped }
}

fn decode_all<S, T, F>(lines: &[S], decode: F) -> Decoded<T>
where
    S: AsRef<str>,
    F: Fn(&str) -> Option<T>,
{
    let mut records = Vec::new();
    let mut skipped = 0;
    for line in lines {
        let line = line.as_ref();
        if line.trim().is_empty() {
            continue;
        }
        match decode(line) {
            Some(record) => records.push(record),
            None => skipped += 1,
        }
    }
    Decoded { records, skipped }
}
