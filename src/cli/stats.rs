//! taskman stats and report command implementations.

use serde::Serialize;

use crate::cli::{parse_date_arg, Session, SessionArgs};
use crate::error::Result;
use crate::manager::today;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::report::{self, WrittenReports};
use crate::stats::Statistics;

pub struct StatsOptions {
    pub as_of: Option<String>,
    pub session: SessionArgs,
    pub json: bool,
    pub quiet: bool,
}

#[derive(Serialize)]
struct ReportOutput {
    #[serde(flatten)]
    statistics: Statistics,
    written: WrittenReports,
}

fn load_statistics(session: &Session, as_of: Option<&str>) -> Result<Statistics> {
    let evaluated_on = parse_date_arg(as_of)?.unwrap_or_else(today);
    session.manager.compute_statistics_at(evaluated_on)
}

fn push_statistics_warnings(human: &mut HumanOutput, stats: &Statistics) {
    if stats.tasks_missing {
        human.push_warning("task file not found; no tasks yet");
    }
    if stats.skipped_lines > 0 {
        human.push_warning(format!("skipped {} malformed task line(s)", stats.skipped_lines));
    }
    if stats.invalid_due_dates > 0 {
        human.push_warning(format!(
            "{} task(s) have an unreadable due date and were left out of overdue counts",
            stats.invalid_due_dates
        ));
    }
}

pub fn run_stats(options: StatsOptions) -> Result<()> {
    let session = Session::open(options.session)?;
    session.require_admin("view statistics")?;
    let stats = load_statistics(&session, options.as_of.as_deref())?;

    let mut human = HumanOutput::new("Statistics");
    human.extend_body(report::render_report(&stats));
    human.push_summary("Evaluated on", crate::codec::format_date(stats.evaluated_on));
    push_statistics_warnings(&mut human, &stats);

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "stats",
        &stats,
        Some(&human),
    )
}

pub fn run_report(options: StatsOptions) -> Result<()> {
    let session = Session::open(options.session)?;
    session.require_admin("generate reports")?;
    let stats = load_statistics(&session, options.as_of.as_deref())?;
    let written = session.manager.generate_reports(&stats)?;

    let mut human = HumanOutput::new("Reports generated");
    human.push_summary("Task overview", written.task_overview.display().to_string());
    human.push_summary("User overview", written.user_overview.display().to_string());
    human.push_summary("Evaluated on", crate::codec::format_date(stats.evaluated_on));
    push_statistics_warnings(&mut human, &stats);
    human.push_next_step("taskman stats");

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "report",
        &ReportOutput {
            statistics: stats,
            written,
        },
        Some(&human),
    )
}
