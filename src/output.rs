//! Shared output formatting for taskman CLI commands.

use serde::Serialize;

use crate::error::{Error, JsonError, Result};

pub const SCHEMA_VERSION: &str = "taskman.v1";

#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub json: bool,
    pub quiet: bool,
}

#[derive(Debug, Clone)]
pub struct HumanOutput {
    header: String,
    body: Vec<String>,
    summary: Vec<(String, String)>,
    details: Vec<String>,
    warnings: Vec<String>,
    next_steps: Vec<String>,
}

impl HumanOutput {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            body: Vec::new(),
            summary: Vec::new(),
            details: Vec::new(),
            warnings: Vec::new(),
            next_steps: Vec::new(),
        }
    }

    /// Lines printed verbatim right after the header
    pub fn extend_body<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.body.extend(lines.into_iter().map(Into::into));
    }

    pub fn push_summary(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.summary.push((key.into(), value.into()));
    }

    pub fn push_detail(&mut self, value: impl Into<String>) {
        self.details.push(value.into());
    }

    pub fn push_warning(&mut self, value: impl Into<String>) {
        self.warnings.push(value.into());
    }

    pub fn push_next_step(&mut self, value: impl Into<String>) {
        self.next_steps.push(value.into());
    }
}

/// `--json` payload of a successful command
#[derive(Serialize)]
struct SuccessEnvelope<'a, T: Serialize> {
    schema_version: &'static str,
    command: &'a str,
    status: &'static str,
    data: &'a T,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    warnings: &'a [String],
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    next_steps: &'a [String],
}

/// `--json` payload of a failed command
#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    schema_version: &'static str,
    command: &'a str,
    status: &'static str,
    error: JsonError,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    next_steps: Vec<String>,
}

fn error_envelope<'a>(command: &'a str, err: &Error) -> ErrorEnvelope<'a> {
    ErrorEnvelope {
        schema_version: SCHEMA_VERSION,
        command,
        status: "error",
        error: JsonError::from(err),
        next_steps: error_next_steps(err),
    }
}

pub fn emit_success<T: Serialize>(
    options: OutputOptions,
    command: &str,
    data: &T,
    human: Option<&HumanOutput>,
) -> Result<()> {
    if options.json {
        let payload = SuccessEnvelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "success",
            data,
            warnings: human.map(|h| h.warnings.as_slice()).unwrap_or_default(),
            next_steps: human.map(|h| h.next_steps.as_slice()).unwrap_or_default(),
        };
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    match human {
        Some(human) if !options.quiet => println!("{}", format_human(human)),
        _ => {}
    }
    Ok(())
}

pub fn emit_error(command: &str, err: &Error, json: bool) -> Result<()> {
    let envelope = error_envelope(command, err);
    if json {
        println!("{}", serde_json::to_string_pretty(&envelope)?);
        return Ok(());
    }

    eprintln!("error: {err}");
    if let Some(hint) = envelope.next_steps.first() {
        eprintln!("hint: {hint}");
    }
    Ok(())
}

pub fn format_human(output: &HumanOutput) -> String {
    let mut lines = Vec::new();
    lines.push(output.header.clone());
    if !output.body.is_empty() {
        lines.push(String::new());
        lines.extend(output.body.iter().cloned());
    }

    push_summary(&mut lines, &output.summary);
    push_section(&mut lines, "Details", &output.details);
    push_section(&mut lines, "Warnings", &output.warnings);
    push_section(&mut lines, "Next steps", &output.next_steps);

    lines.join("\n")
}

pub fn infer_command_name_from_args() -> String {
    let mut args = std::env::args().skip(1);
    let mut command = None;
    let mut subcommand = None;

    while let Some(arg) = args.next() {
        if arg.starts_with('-') {
            if takes_value(&arg) {
                args.next();
            }
            continue;
        }
        command = Some(arg);
        break;
    }

    let command = match command {
        Some(cmd) => cmd,
        None => return "taskman".to_string(),
    };

    if matches!(command.as_str(), "task" | "user") {
        for arg in args {
            if arg.starts_with('-') {
                continue;
            }
            subcommand = Some(arg);
            break;
        }
    }

    if let Some(sub) = subcommand {
        format!("{command} {sub}")
    } else {
        command
    }
}

fn takes_value(flag: &str) -> bool {
    matches!(flag, "--data-dir" | "--user" | "-u" | "--password" | "-p")
}

fn error_next_steps(err: &Error) -> Vec<String> {
    match err {
        Error::AuthenticationFailed => {
            vec!["pass --user/--password or set TASKMAN_USER/TASKMAN_PASSWORD".to_string()]
        }
        Error::UnknownUser(_) => vec!["taskman user add <name> (as admin)".to_string()],
        Error::IndexOutOfRange { .. } => vec!["taskman task list".to_string()],
        Error::InvalidDateFormat(_) => vec!["use DD Mon YYYY, e.g. 07 Mar 2001".to_string()],
        Error::InvalidConfig(_) => vec!["fix .taskman.toml then retry".to_string()],
        _ => Vec::new(),
    }
}

fn push_summary(lines: &mut Vec<String>, summary: &[(String, String)]) {
    if summary.is_empty() {
        return;
    }

    lines.push(String::new());
    lines.push("Summary:".to_string());
    for (key, value) in summary {
        if value.is_empty() {
            lines.push(format!("- {key}"));
        } else {
            lines.push(format!("- {key}: {value}"));
        }
    }
}

fn push_section(lines: &mut Vec<String>, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }

    lines.push(String::new());
    lines.push(format!("{title}:"));
    for item in items {
        lines.push(format!("- {item}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_human_renders_sections_in_order() {
        let mut human = HumanOutput::new("Task added");
        human.push_summary("Index", "3");
        human.push_summary("Complete", "");
        human.push_warning("task file not found");
        human.push_next_step("taskman task list");

        let text = format_human(&human);
        assert_eq!(
            text,
            "Task added\n\nSummary:\n- Index: 3\n- Complete\n\nWarnings:\n- task file not found\n\nNext steps:\n- taskman task list"
        );
    }

    #[test]
    fn body_lines_are_verbatim() {
        let mut human = HumanOutput::new("Statistics");
        human.extend_body(["Task Overview Report", "--------------------"]);
        human.push_summary("Evaluated on", "01 Jan 2024");
        assert_eq!(
            format_human(&human),
            "Statistics\n\nTask Overview Report\n--------------------\n\nSummary:\n- Evaluated on: 01 Jan 2024"
        );
    }

    #[test]
    fn error_envelope_carries_code_kind_and_hint() {
        let err = Error::IndexOutOfRange { index: 9, len: 2 };
        let value = serde_json::to_value(error_envelope("task delete", &err)).expect("json");
        assert_eq!(value["schema_version"], SCHEMA_VERSION);
        assert_eq!(value["status"], "error");
        assert_eq!(value["error"]["code"], 2);
        assert_eq!(value["error"]["kind"], "user_error");
        assert_eq!(value["error"]["details"]["index"], 9);
        assert_eq!(value["next_steps"][0], "taskman task list");

        let forbidden = Error::Forbidden("delete tasks".to_string());
        let value = serde_json::to_value(error_envelope("task delete", &forbidden)).expect("json");
        assert_eq!(value["error"]["kind"], "policy_blocked");
        assert!(value["error"].get("details").is_none());
        assert!(value.get("next_steps").is_none());
    }

    #[test]
    fn header_only_output() {
        let human = HumanOutput::new("3");
        assert_eq!(format_human(&human), "3");
    }
}
