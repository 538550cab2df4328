//! taskman login and user command implementations.

use serde::Serialize;

use crate::cli::{Session, SessionArgs};
use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::user::{is_admin, normalize_username, UserSummary};

pub struct LoginOptions {
    pub session: SessionArgs,
    pub json: bool,
    pub quiet: bool,
}

pub struct AddOptions {
    pub username: String,
    pub credential: String,
    pub session: SessionArgs,
    pub json: bool,
    pub quiet: bool,
}

#[derive(Serialize)]
struct UserAddedOutput {
    user: UserSummary,
    total_users: usize,
}

pub fn run_login(options: LoginOptions) -> Result<()> {
    let session = Session::open(options.session)?;
    let summary = UserSummary {
        username: session.username.clone(),
        admin: session.is_admin(),
    };

    let mut human = HumanOutput::new(format!("Logged in as {}", summary.username));
    if summary.admin {
        human.push_next_step("taskman user add <name> --credential <password>");
        human.push_next_step("taskman stats");
    } else {
        human.push_next_step("taskman task mine");
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "login",
        &summary,
        Some(&human),
    )
}

pub fn run_add(options: AddOptions) -> Result<()> {
    let session = Session::open(options.session)?;
    let directory = session.manager.register(
        &options.username,
        &options.credential,
        &session.username,
    )?;
    let username = normalize_username(&options.username);
    let user = directory
        .get(&username)
        .map(UserSummary::from)
        .unwrap_or_else(|| UserSummary {
            admin: is_admin(&username),
            username: username.clone(),
        });

    let mut human = HumanOutput::new("User registered");
    human.push_summary("Username", user.username.clone());
    human.push_summary("Total users", directory.len().to_string());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "user add",
        &UserAddedOutput {
            user,
            total_users: directory.len(),
        },
        Some(&human),
    )
}
