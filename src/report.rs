//! Text rendering for statistics reports and task listings.
//!
//! The same lines are used for console display and for the report files,
//! so the renderer only produces text and never touches a destination
//! except in [`write_reports`].

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::ReportsConfig;
use crate::error::{Error, Result};
use crate::stats::{Statistics, UserStatistics};
use crate::task::TaskRecord;

const SECTION_RULE_WIDTH: usize = 20;
const TASK_RULE_WIDTH: usize = 150;
const LABEL_WIDTH: usize = 20;

fn rule(width: usize) -> String {
    "-".repeat(width)
}

fn pct(value: f64) -> String {
    format!("{value:.2}%")
}

/// Task overview section: header, rule, six labelled lines, rule.
pub fn render_task_overview(stats: &Statistics) -> Vec<String> {
    let tasks = &stats.tasks;
    vec![
        "Task Overview Report".to_string(),
        rule(SECTION_RULE_WIDTH),
        format!("Total number of tasks: {}", tasks.total),
        format!("Total number of completed tasks: {}", tasks.complete),
        format!("Total number of incomplete tasks: {}", tasks.incomplete),
        format!(
            "Total number of tasks that are incomplete and overdue: {}",
            tasks.incomplete_overdue
        ),
        format!(
            "Percentage of incomplete tasks: {}",
            pct(tasks.percentage_incomplete)
        ),
        format!("Percentage of overdue tasks: {}", pct(tasks.percentage_overdue)),
        rule(SECTION_RULE_WIDTH),
    ]
}

/// User overview section: global totals, then one block per user in
/// directory order.
pub fn render_user_overview(stats: &Statistics) -> Vec<String> {
    let mut lines = vec![
        "User Overview Report".to_string(),
        rule(SECTION_RULE_WIDTH),
        format!("Total users registered on Task Manager: {}", stats.total_users),
        format!(
            "Total number of tasks generated on Task Manager: {}",
            stats.tasks.total
        ),
    ];
    for user in &stats.users {
        lines.extend(render_user_block(user));
    }
    lines
}

fn render_user_block(user: &UserStatistics) -> Vec<String> {
    vec![
        String::new(),
        format!("User: {}", user.username),
        format!("Total tasks assigned: {}", user.assigned),
        format!(
            "Percentage of tasks assigned: {}",
            pct(user.percentage_assigned)
        ),
        format!(
            "Percentage of tasks completed: {}",
            pct(user.percentage_completed)
        ),
        format!(
            "Percentage of tasks incomplete: {}",
            pct(user.percentage_incomplete)
        ),
        format!(
            "Percentage of overdue and incomplete tasks: {}",
            pct(user.percentage_overdue_incomplete)
        ),
        rule(SECTION_RULE_WIDTH),
    ]
}

/// Both sections, task overview first.
pub fn render_report(stats: &Statistics) -> Vec<String> {
    let mut lines = render_task_overview(stats);
    lines.extend(render_user_overview(stats));
    lines
}

/// Display block for one task. `index` is the store index callers pass to
/// complete, edit or delete the task.
pub fn render_task_block(index: usize, task: &TaskRecord) -> Vec<String> {
    let field =
        |label: &str, value: &str| format!("{label:<width$} {value}", width = LABEL_WIDTH);
    vec![
        rule(TASK_RULE_WIDTH),
        field("Task Number:", &index.to_string()),
        field("Task:", &task.title),
        field("Assigned to:", &task.assignee),
        field("Date Assigned:", task.date_assigned.raw()),
        field("Due Date:", task.due_date.raw()),
        field("Task Complete:", task.completed.as_str()),
        field("Task Description:", &task.description),
        rule(TASK_RULE_WIDTH),
    ]
}

#[derive(Debug, Clone, Serialize)]
pub struct WrittenReports {
    pub task_overview: PathBuf,
    pub user_overview: PathBuf,
}

/// Overwrite both report files in `dir`.
pub fn write_reports(
    stats: &Statistics,
    dir: &Path,
    config: &ReportsConfig,
) -> Result<WrittenReports> {
    fs::create_dir_all(dir).map_err(|source| Error::StorageWrite {
        path: dir.to_path_buf(),
        source,
    })?;

    let task_overview = dir.join(config.task_overview.trim());
    write_report_file(&task_overview, &render_task_overview(stats))?;

    let user_overview = dir.join(config.user_overview.trim());
    write_report_file(&user_overview, &render_user_overview(stats))?;

    tracing::debug!(
        task_overview = %task_overview.display(),
        user_overview = %user_overview.display(),
        "wrote reports"
    );
    Ok(WrittenReports {
        task_overview,
        user_overview,
    })
}

fn write_report_file(path: &Path, lines: &[String]) -> Result<()> {
    let mut content = lines.join("\n");
    content.push('\n');
    fs::write(path, content).map_err(|source| Error::StorageWrite {
        path: path.to_path_buf(),
        source,
    })
}
