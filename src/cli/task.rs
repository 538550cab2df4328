//! taskman task command implementations.

use serde::Serialize;

use crate::cli::{parse_date_arg, Session, SessionArgs};
use crate::codec;
use crate::error::Result;
use crate::manager::{IndexedTask, TaskListing};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::report::render_task_block;
use crate::task::{TaskEdit, TaskRecord};

pub struct AddOptions {
    pub assignee: String,
    pub title: String,
    pub description: String,
    pub due: String,
    pub session: SessionArgs,
    pub json: bool,
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListScope {
    All,
    Mine,
    Completed,
}

pub struct ListOptions {
    pub scope: ListScope,
    pub session: SessionArgs,
    pub json: bool,
    pub quiet: bool,
}

pub struct CompleteOptions {
    pub index: usize,
    pub session: SessionArgs,
    pub json: bool,
    pub quiet: bool,
}

pub struct EditOptions {
    pub index: usize,
    pub assignee: Option<String>,
    pub due: Option<String>,
    pub session: SessionArgs,
    pub json: bool,
    pub quiet: bool,
}

pub struct DeleteOptions {
    pub index: usize,
    pub session: SessionArgs,
    pub json: bool,
    pub quiet: bool,
}

#[derive(Serialize)]
struct TaskListOutput {
    total: usize,
    tasks: Vec<IndexedTask>,
    skipped: usize,
}

#[derive(Serialize)]
struct TaskChangedOutput {
    index: usize,
    #[serde(flatten)]
    task: TaskRecord,
}

pub fn run_add(options: AddOptions) -> Result<()> {
    let session = Session::open(options.session)?;
    let due = codec::parse_date(&options.due)?;
    let task = session.manager.add_task(
        &options.assignee,
        &options.title,
        &options.description,
        due,
    )?;
    let index = session.manager.list_all_tasks()?.tasks.len().saturating_sub(1);
    tracing::debug!(index, title = %task.title, "added task");

    let mut human = HumanOutput::new("Task added");
    human.push_summary("Task Number", index.to_string());
    human.push_summary("Title", task.title.clone());
    human.push_summary("Assigned to", task.assignee.clone());
    human.push_summary("Due Date", task.due_date.raw());
    human.push_next_step("taskman task list");

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task add",
        &TaskChangedOutput { index, task },
        Some(&human),
    )
}

pub fn run_list(options: ListOptions) -> Result<()> {
    let session = Session::open(options.session)?;
    let (command, header, listing) = match options.scope {
        ListScope::All => ("task list", "Tasks", session.manager.list_all_tasks()?),
        ListScope::Mine => (
            "task mine",
            "My tasks",
            session.manager.list_tasks_for(&session.username)?,
        ),
        ListScope::Completed => {
            session.require_admin("view completed tasks")?;
            (
                "task completed",
                "Completed tasks",
                session.manager.list_completed_tasks()?,
            )
        }
    };

    let mut human = HumanOutput::new(header);
    push_listing_warnings(&mut human, &listing);
    let TaskListing { tasks, skipped, .. } = listing;

    if tasks.is_empty() {
        human.push_summary("Total", "0");
        human.push_detail(match options.scope {
            ListScope::All => "no tasks yet",
            ListScope::Mine => "no tasks assigned to you",
            ListScope::Completed => "no completed tasks",
        });
    } else {
        human.push_summary("Total", tasks.len().to_string());
        for entry in &tasks {
            human.extend_body(render_task_block(entry.index, &entry.task));
        }
    }

    let output = TaskListOutput {
        total: tasks.len(),
        tasks,
        skipped,
    };
    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        command,
        &output,
        Some(&human),
    )
}

pub fn run_complete(options: CompleteOptions) -> Result<()> {
    let session = Session::open(options.session)?;
    require_owner_or_admin(&session, options.index)?;
    let task = session.manager.mark_complete(options.index)?;

    let mut human = HumanOutput::new("Task marked complete");
    human.push_summary("Task Number", options.index.to_string());
    human.push_summary("Title", task.title.clone());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task complete",
        &TaskChangedOutput {
            index: options.index,
            task,
        },
        Some(&human),
    )
}

pub fn run_edit(options: EditOptions) -> Result<()> {
    let session = Session::open(options.session)?;
    let due_date = parse_date_arg(options.due.as_deref())?;
    require_owner_or_admin(&session, options.index)?;
    let task = session.manager.edit_task(
        options.index,
        TaskEdit {
            assignee: options.assignee,
            due_date,
        },
    )?;

    let mut human = HumanOutput::new("Task updated");
    human.push_summary("Task Number", options.index.to_string());
    human.push_summary("Assigned to", task.assignee.clone());
    human.push_summary("Due Date", task.due_date.raw());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task edit",
        &TaskChangedOutput {
            index: options.index,
            task,
        },
        Some(&human),
    )
}

pub fn run_delete(options: DeleteOptions) -> Result<()> {
    let session = Session::open(options.session)?;
    session.require_admin("delete tasks")?;
    let task = session.manager.delete_task(options.index)?;

    let mut human = HumanOutput::new("Task deleted");
    human.push_summary("Task Number", options.index.to_string());
    human.push_summary("Title", task.title.clone());
    human.push_next_step("task numbers after this one have shifted down by one");

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task delete",
        &TaskChangedOutput {
            index: options.index,
            task,
        },
        Some(&human),
    )
}

fn require_owner_or_admin(session: &Session, index: usize) -> Result<()> {
    if session.is_admin() {
        return Ok(());
    }
    let task = session.manager.task(index)?;
    if task.is_assigned_to(&session.username) {
        Ok(())
    } else {
        session.require_admin("change tasks assigned to other users")
    }
}

fn push_listing_warnings(human: &mut HumanOutput, listing: &TaskListing) {
    if listing.missing {
        human.push_warning("task file not found; no tasks yet");
    }
    if listing.skipped > 0 {
        human.push_warning(format!("skipped {} malformed task line(s)", listing.skipped));
    }
}
