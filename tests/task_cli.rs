mod support;

use predicates::prelude::*;
use predicates::str::contains;

use support::{json_stdout, TestData};

fn seeded() -> Result<TestData, Box<dyn std::error::Error>> {
    let data = TestData::with_users(&[("alice", "pw"), ("bob", "pw")])?;
    data.write_tasks(&[
        "alice, Write plan, Draft the plan, 01 Dec 2023, 01 Jan 2024, no",
        "bob, Review plan, Read the plan, 01 Dec 2023, 01 Feb 2024, no",
        "alice, Ship plan, Send it out, 01 Dec 2023, 01 Mar 2024, yes",
    ])?;
    Ok(data)
}

#[test]
fn add_appends_incomplete_task() -> Result<(), Box<dyn std::error::Error>> {
    let data = seeded()?;

    let value = json_stdout(data.admin_cmd().args([
        "task",
        "add",
        "--assignee",
        "Bob",
        "--title",
        "Fix bug",
        "--description",
        "Crash on start",
        "--due",
        "07 Mar 2031",
    ]));
    assert_eq!(value["command"], "task add");
    assert_eq!(value["data"]["index"], 3);
    assert_eq!(value["data"]["assignee"], "bob");
    assert_eq!(value["data"]["completed"], "no");
    assert_eq!(value["data"]["due_date"], "07 Mar 2031");

    let tasks = data.read_tasks()?;
    let last = tasks.lines().last().expect("last line");
    assert!(last.starts_with("bob, Fix bug, Crash on start, "));
    assert!(last.ends_with(", 07 Mar 2031, no"));
    Ok(())
}

#[test]
fn add_rejects_bad_input_without_writing() -> Result<(), Box<dyn std::error::Error>> {
    let data = seeded()?;
    let before = data.read_tasks()?;

    let add = |assignee: &str, title: &str, due: &str| {
        let mut cmd = data.admin_cmd();
        cmd.args([
            "task",
            "add",
            "--assignee",
            assignee,
            "--title",
            title,
            "--description",
            "desc",
            "--due",
            due,
        ]);
        cmd
    };

    add("carol", "New", "01 Jan 2030")
        .assert()
        .code(2)
        .stderr(contains("not registered"));
    add("alice", "write PLAN", "01 Jan 2030")
        .assert()
        .code(2)
        .stderr(contains("already exists"));
    add("alice", "New", "2030-01-01")
        .assert()
        .code(2)
        .stderr(contains("DD Mon YYYY"));
    add("alice", "2024", "01 Jan 2030")
        .assert()
        .code(2)
        .stderr(contains("only numbers"));

    assert_eq!(data.read_tasks()?, before);
    Ok(())
}

#[test]
fn list_shows_every_task_block() -> Result<(), Box<dyn std::error::Error>> {
    let data = seeded()?;

    data.cmd_as("bob", "pw")
        .args(["task", "list"])
        .assert()
        .success()
        .stdout(contains("Write plan"))
        .stdout(contains("Review plan"))
        .stdout(contains("-".repeat(150)))
        .stdout(contains(format!("{:<20} 2", "Task Number:")));

    let value = json_stdout(data.cmd_as("bob", "pw").args(["task", "list"]));
    assert_eq!(value["data"]["total"], 3);
    assert_eq!(value["data"]["tasks"][1]["title"], "Review plan");
    assert_eq!(value["data"]["tasks"][1]["index"], 1);
    Ok(())
}

#[test]
fn mine_lists_only_own_tasks_with_store_indices() -> Result<(), Box<dyn std::error::Error>> {
    let data = seeded()?;

    let value = json_stdout(data.cmd_as("alice", "pw").args(["task", "mine"]));
    let indices: Vec<u64> = value["data"]["tasks"]
        .as_array()
        .expect("tasks")
        .iter()
        .map(|task| task["index"].as_u64().expect("index"))
        .collect();
    assert_eq!(indices, vec![0, 2]);

    data.cmd_as("alice", "pw")
        .args(["task", "mine"])
        .assert()
        .success()
        .stdout(contains("Review plan").not());
    Ok(())
}

#[test]
fn completed_is_admin_only() -> Result<(), Box<dyn std::error::Error>> {
    let data = seeded()?;

    data.cmd_as("alice", "pw")
        .args(["task", "completed"])
        .assert()
        .code(3);

    let value = json_stdout(data.admin_cmd().args(["task", "completed"]));
    assert_eq!(value["data"]["total"], 1);
    assert_eq!(value["data"]["tasks"][0]["title"], "Ship plan");
    assert_eq!(value["data"]["tasks"][0]["index"], 2);
    Ok(())
}

#[test]
fn complete_marks_task_and_rejects_second_attempt() -> Result<(), Box<dyn std::error::Error>> {
    let data = seeded()?;

    data.cmd_as("alice", "pw")
        .args(["task", "complete", "0"])
        .assert()
        .success();
    assert!(data
        .read_tasks()?
        .lines()
        .next()
        .expect("first line")
        .ends_with(", yes"));

    let before = data.read_tasks()?;
    data.cmd_as("alice", "pw")
        .args(["task", "complete", "0"])
        .assert()
        .code(3)
        .stderr(contains("can no longer be changed"));
    assert_eq!(data.read_tasks()?, before);
    Ok(())
}

#[test]
fn only_assignee_or_admin_may_change_a_task() -> Result<(), Box<dyn std::error::Error>> {
    let data = seeded()?;
    let before = data.read_tasks()?;

    data.cmd_as("alice", "pw")
        .args(["task", "complete", "1"])
        .assert()
        .code(3);
    data.cmd_as("alice", "pw")
        .args(["task", "edit", "1", "--due", "01 Jan 2030"])
        .assert()
        .code(3);
    assert_eq!(data.read_tasks()?, before);

    data.admin_cmd()
        .args(["task", "complete", "1"])
        .assert()
        .success();
    Ok(())
}

#[test]
fn edit_reassigns_and_reschedules() -> Result<(), Box<dyn std::error::Error>> {
    let data = seeded()?;

    let value = json_stdout(data.cmd_as("alice", "pw").args([
        "task",
        "edit",
        "0",
        "--assignee",
        "bob",
        "--due",
        "15 Aug 2030",
    ]));
    assert_eq!(value["data"]["assignee"], "bob");
    assert_eq!(value["data"]["due_date"], "15 Aug 2030");

    let first = data.read_tasks()?.lines().next().expect("line").to_string();
    assert_eq!(
        first,
        "bob, Write plan, Draft the plan, 01 Dec 2023, 15 Aug 2030, no"
    );

    data.admin_cmd()
        .args(["task", "edit", "0"])
        .assert()
        .code(2)
        .stderr(contains("nothing to edit"));
    data.admin_cmd()
        .args(["task", "edit", "2", "--assignee", "bob"])
        .assert()
        .code(3);
    Ok(())
}

#[test]
fn delete_is_admin_only_and_shifts_indices() -> Result<(), Box<dyn std::error::Error>> {
    let data = seeded()?;

    data.cmd_as("alice", "pw")
        .args(["task", "delete", "0"])
        .assert()
        .code(3);

    data.admin_cmd()
        .args(["task", "delete", "0"])
        .assert()
        .success()
        .stdout(contains("Task deleted"));

    let value = json_stdout(data.admin_cmd().args(["task", "list"]));
    assert_eq!(value["data"]["total"], 2);
    assert_eq!(value["data"]["tasks"][0]["title"], "Review plan");
    assert_eq!(value["data"]["tasks"][0]["index"], 0);
    Ok(())
}

#[test]
fn out_of_range_index_is_user_error() -> Result<(), Box<dyn std::error::Error>> {
    let data = seeded()?;
    data.admin_cmd()
        .args(["task", "delete", "3"])
        .assert()
        .code(2)
        .stderr(contains("out of range"));
    data.admin_cmd()
        .args(["task", "complete", "99"])
        .assert()
        .code(2);
    Ok(())
}

#[test]
fn malformed_lines_are_skipped_and_preserved() -> Result<(), Box<dyn std::error::Error>> {
    let data = TestData::with_users(&[("alice", "pw")])?;
    data.write_tasks(&[
        "this line is not a task",
        "alice, A, a, 01 Jan 2024, 01 Feb 2030, no",
        "",
        "alice, B, b, 01 Jan 2024, 01 Feb 2030, no",
    ])?;

    data.cmd_as("alice", "pw")
        .args(["task", "list"])
        .assert()
        .success()
        .stdout(contains("skipped 1 malformed task line(s)"));

    data.admin_cmd()
        .args(["task", "complete", "1"])
        .assert()
        .success();
    let lines: Vec<String> = data.read_tasks()?.lines().map(str::to_string).collect();
    assert_eq!(
        lines,
        vec![
            "this line is not a task",
            "alice, A, a, 01 Jan 2024, 01 Feb 2030, no",
            "alice, B, b, 01 Jan 2024, 01 Feb 2030, yes",
        ]
    );
    Ok(())
}

#[test]
fn missing_task_file_lists_nothing() -> Result<(), Box<dyn std::error::Error>> {
    let data = TestData::with_users(&[])?;
    let value = json_stdout(data.admin_cmd().args(["task", "list"]));
    assert_eq!(value["data"]["total"], 0);
    assert_eq!(value["warnings"][0], "task file not found; no tasks yet");
    Ok(())
}
