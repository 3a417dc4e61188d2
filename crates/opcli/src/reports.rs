//! Local markdown generators: weekly status summaries and decision logs.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use colored::Colorize;

use opcli_core::models::Project;
use opcli_core::report::{
    build_decision_markdown, build_weekly_summary, decision_filename, weekly_filename,
    DecisionEntry, DEFAULT_WEEKLY_STATUS_DIR, WEEKLY_FETCH_LIMIT,
};

use crate::client::{load_config, OpenProjectClient};
use crate::files::{unique_path, write_text_file};
use crate::prelude::{println, *};

/// Options for the weekly status summary
#[derive(Debug, clap::Args, Clone)]
pub struct WeeklySummaryOptions {
    /// Project ID or identifier
    #[arg(long, env = "OPENPROJECT_DEFAULT_PROJECT")]
    pub project: Option<String>,

    /// Output file. Defaults to project-knowledge/status/YYYY-MM-DD-weekly-status.md
    #[arg(long)]
    pub output: Option<PathBuf>,
}

/// Options for a decision log entry
#[derive(Debug, clap::Args, Clone)]
#[command(after_help = "EXAMPLES:
  opcli log-decision --title \"Adopt wiki templates\" --decision \"Design docs start from the RFC template\"")]
pub struct LogDecisionOptions {
    /// Project ID or identifier
    #[arg(long, env = "OPENPROJECT_DEFAULT_PROJECT")]
    pub project: Option<String>,

    /// Decision title
    #[arg(long)]
    pub title: String,

    /// Decision statement
    #[arg(long)]
    pub decision: String,

    /// Context notes
    #[arg(long)]
    pub context: Option<String>,

    /// Impact notes
    #[arg(long)]
    pub impact: Option<String>,

    /// Follow-up actions
    #[arg(long)]
    pub followup: Option<String>,
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Fetch the project's work packages and render the summary for `date`.
pub async fn weekly_summary_data(
    client: &OpenProjectClient,
    project_ref: &str,
    date: NaiveDate,
) -> Result<(Project, String)> {
    let project = client.resolve_project(project_ref).await?;
    let id = project.require_id()?;
    let work_packages = client
        .work_packages(id, WEEKLY_FETCH_LIMIT, None, None)
        .await?;
    log::debug!("summarizing {} work package(s)", work_packages.len());

    let summary = build_weekly_summary(&project.display_name(), &work_packages, date);
    Ok((project, summary))
}

/// Handle the weekly-summary command
pub async fn weekly_handler(options: WeeklySummaryOptions, global: crate::Global) -> Result<()> {
    let config = load_config();
    let project_ref = config.require_project(options.project.as_deref())?;
    let client = OpenProjectClient::from_config(&config)?;

    let date = today();
    let (project, summary) = weekly_summary_data(&client, &project_ref, date).await?;
    println!("{summary}");

    let output = options
        .output
        .unwrap_or_else(|| Path::new(DEFAULT_WEEKLY_STATUS_DIR).join(weekly_filename(date)));
    let written = write_text_file(&output, &summary)?;
    println!("Saved weekly summary to {}", written.display().to_string().green());

    print_debug_json(&project, global.debug_json)
}

/// Write `entry` under `dir` without overwriting an earlier entry.
pub fn write_decision(dir: &Path, entry: &DecisionEntry) -> Result<PathBuf> {
    let path = unique_path(&dir.join(decision_filename(&entry.date, &entry.title)));
    write_text_file(&path, &build_decision_markdown(entry))
}

/// Handle the log-decision command. Needs no API credentials.
pub async fn decision_handler(options: LogDecisionOptions, _global: crate::Global) -> Result<()> {
    let config = load_config();
    let project = config.require_project(options.project.as_deref())?;

    let entry = DecisionEntry {
        date: today().to_string(),
        project,
        title: options.title,
        decision: options.decision,
        context: options.context.unwrap_or_default(),
        impact: options.impact.unwrap_or_default(),
        followup: options.followup.unwrap_or_default(),
    };

    let written = write_decision(&config.decision_log_dir(), &entry)?;
    println!("Created decision log: {}", written.display().to_string().green());
    Ok(())
}
