//! Aggregate task and per-user statistics.
//!
//! Statistics are computed in a single pass over a task snapshot against
//! one evaluation date. A task is overdue when its due date is strictly
//! before that date, whether or not it is complete; "incomplete overdue"
//! additionally requires the task to be incomplete.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::task::{Completion, TaskRecord};
use crate::user::{normalize_username, UserDirectory};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TaskStatistics {
    pub total: usize,
    pub complete: usize,
    pub incomplete: usize,
    pub overdue: usize,
    pub incomplete_overdue: usize,
    pub percentage_incomplete: f64,
    pub percentage_overdue: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserStatistics {
    pub username: String,
    pub assigned: usize,
    pub complete: usize,
    pub incomplete: usize,
    pub incomplete_overdue: usize,
    pub percentage_assigned: f64,
    pub percentage_completed: f64,
    pub percentage_incomplete: f64,
    pub percentage_overdue_incomplete: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Statistics {
    pub evaluated_on: NaiveDate,
    pub tasks: TaskStatistics,
    pub total_users: usize,
    /// One entry per registered user, in directory order
    pub users: Vec<UserStatistics>,
    /// Tasks left out of overdue counts because their due date is unreadable
    pub invalid_due_dates: usize,
    /// Malformed task lines left out of every count
    pub skipped_lines: usize,
    /// The task file does not exist yet
    pub tasks_missing: bool,
}

impl Statistics {
    pub fn user(&self, username: &str) -> Option<&UserStatistics> {
        let wanted = normalize_username(username);
        self.users.iter().find(|user| user.username == wanted)
    }
}

/// Compute statistics for `tasks` and `users` as of `today`.
pub fn compute(tasks: &[TaskRecord], users: &UserDirectory, today: NaiveDate) -> Statistics {
    let mut per_user: Vec<UserStatistics> = users
        .usernames()
        .map(|username| UserStatistics {
            username: username.to_string(),
            ..UserStatistics::default()
        })
        .collect();
    let slot_by_name: HashMap<String, usize> = per_user
        .iter()
        .enumerate()
        .map(|(slot, user)| (user.username.clone(), slot))
        .collect();

    let mut totals = TaskStatistics::default();
    let mut invalid_due_dates = 0;

    for task in tasks {
        totals.total += 1;

        let overdue = match task.due_date.date() {
            Some(due) => due < today,
            None => {
                invalid_due_dates += 1;
                tracing::warn!(
                    title = %task.title,
                    due_date = %task.due_date.raw(),
                    "invalid due date, excluded from overdue counts"
                );
                false
            }
        };
        let incomplete = matches!(task.completed, Completion::No);

        match task.completed {
            Completion::Yes => totals.complete += 1,
            Completion::No => totals.incomplete += 1,
            Completion::Unrecognized(_) => {}
        }
        if overdue {
            totals.overdue += 1;
            if incomplete {
                totals.incomplete_overdue += 1;
            }
        }

        let Some(&slot) = slot_by_name.get(&normalize_username(&task.assignee)) else {
            continue;
        };
        let user = &mut per_user[slot];
        user.assigned += 1;
        match task.completed {
            Completion::Yes => user.complete += 1,
            Completion::No => user.incomplete += 1,
            Completion::Unrecognized(_) => {}
        }
        if overdue && incomplete {
            user.incomplete_overdue += 1;
        }
    }

    totals.percentage_incomplete = percent(totals.incomplete, totals.total);
    totals.percentage_overdue = percent(totals.overdue, totals.total);

    for user in &mut per_user {
        user.percentage_assigned = percent(user.assigned, totals.total);
        user.percentage_completed = percent(user.complete, user.assigned);
        user.percentage_incomplete = percent(user.incomplete, user.assigned);
        user.percentage_overdue_incomplete = percent(user.incomplete_overdue, user.assigned);
    }

    Statistics {
        evaluated_on: today,
        tasks: totals,
        total_users: users.len(),
        users: per_user,
        invalid_due_dates,
        skipped_lines: 0,
        tasks_missing: false,
    }
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::decode_task;
    use crate::user::UserRecord;

    fn directory(names: &[&str]) -> UserDirectory {
        UserDirectory::new(
            names
                .iter()
                .map(|name| UserRecord {
                    username: name.to_string(),
                    credential: "pw".to_string(),
                })
                .collect(),
        )
    }

    fn tasks(lines: &[&str]) -> Vec<TaskRecord> {
        lines
            .iter()
            .map(|line| decode_task(line).expect("decode"))
            .collect()
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("date")
    }

    #[test]
    fn empty_store_has_zero_percentages() {
        let users = directory(&["admin", "alice"]);
        let stats = compute(&[], &users, day(2024, 1, 1));
        assert_eq!(stats.tasks, TaskStatistics::default());
        assert_eq!(stats.total_users, 2);
        assert_eq!(stats.users.len(), 2);
        for user in &stats.users {
            assert_eq!(user.assigned, 0);
            assert_eq!(user.percentage_assigned, 0.0);
            assert_eq!(user.percentage_completed, 0.0);
            assert!(!user.percentage_assigned.is_nan());
        }
    }

    #[test]
    fn quarter_split_percentages() {
        let users = directory(&["alice"]);
        let records = tasks(&[
            "alice, A, a, 01 Jan 2023, 01 Jan 2030, yes",
            "alice, B, b, 01 Jan 2023, 01 Jan 2030, no",
            "alice, C, c, 01 Jan 2023, 01 Feb 2023, no",
            "alice, D, d, 01 Jan 2023, 01 Mar 2023, no",
        ]);
        let stats = compute(&records, &users, day(2024, 1, 1));
        assert_eq!(stats.tasks.total, 4);
        assert_eq!(stats.tasks.complete, 1);
        assert_eq!(stats.tasks.incomplete, 3);
        assert_eq!(stats.tasks.overdue, 2);
        assert_eq!(stats.tasks.incomplete_overdue, 2);
        assert_eq!(format!("{:.2}", stats.tasks.percentage_incomplete), "75.00");
        assert_eq!(format!("{:.2}", stats.tasks.percentage_overdue), "50.00");
    }

    #[test]
    fn two_task_scenario() {
        let users = directory(&["admin", "alice", "bob"]);
        let records = tasks(&[
            "alice, T1, first, 01 Dec 1999, 01 Jan 2000, no",
            "bob, T2, second, 01 Dec 1999, 01 Jan 2999, yes",
        ]);
        let stats = compute(&records, &users, day(2024, 1, 1));

        assert_eq!(stats.tasks.total, 2);
        assert_eq!(stats.tasks.complete, 1);
        assert_eq!(stats.tasks.incomplete, 1);
        assert_eq!(stats.tasks.overdue, 1);
        assert_eq!(stats.tasks.incomplete_overdue, 1);
        assert_eq!(stats.tasks.percentage_incomplete, 50.0);
        assert_eq!(stats.tasks.percentage_overdue, 50.0);

        let alice = stats.user("alice").expect("alice");
        assert_eq!(alice.assigned, 1);
        assert_eq!(alice.percentage_assigned, 50.0);
        assert_eq!(alice.percentage_completed, 0.0);
        assert_eq!(alice.percentage_incomplete, 100.0);
        assert_eq!(alice.percentage_overdue_incomplete, 100.0);

        let admin = stats.user("admin").expect("admin");
        assert_eq!(admin.assigned, 0);
        assert_eq!(admin.percentage_incomplete, 0.0);
    }

    #[test]
    fn complete_overdue_counts_as_overdue_only() {
        let users = directory(&["alice"]);
        let records = tasks(&["alice, Old, done late, 01 Jan 2000, 02 Jan 2000, yes"]);
        let stats = compute(&records, &users, day(2024, 1, 1));
        assert_eq!(stats.tasks.overdue, 1);
        assert_eq!(stats.tasks.incomplete_overdue, 0);
        assert_eq!(stats.user("alice").expect("alice").incomplete_overdue, 0);
    }

    #[test]
    fn due_today_is_not_overdue() {
        let users = directory(&["alice"]);
        let records = tasks(&["alice, Now, due today, 01 Jan 2024, 01 Jan 2024, no"]);
        let stats = compute(&records, &users, day(2024, 1, 1));
        assert_eq!(stats.tasks.overdue, 0);
    }

    #[test]
    fn invalid_due_date_only_skips_overdue() {
        let users = directory(&["alice"]);
        let records = tasks(&[
            "alice, Bad, bad date, 01 Jan 2000, whenever, no",
            "alice, Late, late, 01 Jan 2000, 01 Feb 2000, no",
        ]);
        let stats = compute(&records, &users, day(2024, 1, 1));
        assert_eq!(stats.tasks.total, 2);
        assert_eq!(stats.tasks.incomplete, 2);
        assert_eq!(stats.tasks.overdue, 1);
        assert_eq!(stats.invalid_due_dates, 1);
        assert_eq!(stats.user("alice").expect("alice").assigned, 2);
    }

    #[test]
    fn unrecognized_flag_counts_in_total_only() {
        let users = directory(&["alice"]);
        let records = tasks(&[
            "alice, Odd, odd flag, 01 Jan 2000, 01 Feb 2000, maybe",
            "alice, Open, open, 01 Jan 2000, 01 Feb 2030, no",
        ]);
        let stats = compute(&records, &users, day(2024, 1, 1));
        assert_eq!(stats.tasks.total, 2);
        assert_eq!(stats.tasks.complete, 0);
        assert_eq!(stats.tasks.incomplete, 1);
        assert_eq!(stats.tasks.overdue, 1);
        assert_eq!(stats.tasks.incomplete_overdue, 0);

        let alice = stats.user("alice").expect("alice");
        assert_eq!(alice.assigned, 2);
        assert_eq!(alice.percentage_completed, 0.0);
        assert_eq!(alice.percentage_incomplete, 50.0);
    }

    #[test]
    fn assignee_matching_ignores_case_and_unknown_users() {
        let users = directory(&["alice"]);
        let records = tasks(&[
            "Alice, A, a, 01 Jan 2000, 01 Feb 2030, no",
            "ghost, B, b, 01 Jan 2000, 01 Feb 2030, no",
        ]);
        let stats = compute(&records, &users, day(2024, 1, 1));
        assert_eq!(stats.tasks.total, 2);
        let alice = stats.user("alice").expect("alice");
        assert_eq!(alice.assigned, 1);
        assert_eq!(alice.percentage_assigned, 50.0);
        assert!(stats.user("ghost").is_none());
    }
}
