//! Markdown generators: weekly status summaries and decision logs.
//!
//! # Examples
//!
//! ```
//! use opcli_core::report::{slugify, status_bucket, StatusBucket};
//!
//! assert_eq!(slugify("Adopt CLI!"), "adopt-cli");
//! assert_eq!(status_bucket("Closed"), StatusBucket::Completed);
//! ```

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::models::WorkPackage;

pub const DEFAULT_DECISION_LOG_DIR: &str = "project-knowledge/decisions";
pub const DEFAULT_WEEKLY_STATUS_DIR: &str = "project-knowledge/status";

/// How many work packages the weekly summary reads.
pub const WEEKLY_FETCH_LIMIT: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusBucket {
    Completed,
    InProgress,
    Blockers,
}

const COMPLETED_TOKENS: [&str; 4] = ["done", "closed", "resolved", "complete"];
const BLOCKER_TOKENS: [&str; 4] = ["block", "risk", "hold", "stuck"];

/// Classify a status name. Anything unrecognized counts as in progress.
pub fn status_bucket(status_name: &str) -> StatusBucket {
    let label = status_name.trim().to_lowercase();
    if COMPLETED_TOKENS.iter().any(|t| label.contains(t)) {
        StatusBucket::Completed
    } else if BLOCKER_TOKENS.iter().any(|t| label.contains(t)) {
        StatusBucket::Blockers
    } else {
        StatusBucket::InProgress
    }
}

/// `- #{id} {subject} ({status}; {assignee})`
pub fn wp_line(wp: &WorkPackage) -> String {
    format!(
        "- #{} {} ({}; {})",
        wp.id_label(),
        wp.subject(),
        wp.status(),
        wp.assignee()
    )
}

fn section(lines: &mut Vec<String>, heading: &str, items: &[&WorkPackage], cap: usize, empty: &str) {
    lines.push(String::new());
    lines.push(format!("## {heading}"));
    if items.is_empty() {
        lines.push(empty.to_string());
    } else {
        lines.extend(items.iter().take(cap).map(|wp| wp_line(wp)));
    }
}

/// Render the weekly status markdown for `project_name` as of `date`.
pub fn build_weekly_summary(project_name: &str, work_packages: &[WorkPackage], date: NaiveDate) -> String {
    let mut completed = Vec::new();
    let mut in_progress = Vec::new();
    let mut blockers = Vec::new();

    for wp in work_packages {
        match status_bucket(&wp.status()) {
            StatusBucket::Completed => completed.push(wp),
            StatusBucket::Blockers => blockers.push(wp),
            StatusBucket::InProgress => in_progress.push(wp),
        }
    }

    let mut lines = vec![
        format!("# Weekly Status - {project_name}"),
        format!("Date: {}", date.format("%Y-%m-%d")),
    ];

    section(
        &mut lines,
        "Wins / completed",
        &completed,
        10,
        "- No completed items detected in current snapshot.",
    );
    section(&mut lines, "In progress", &in_progress, 15, "- No in-progress items detected.");
    section(
        &mut lines,
        "Blockers / risks",
        &blockers,
        10,
        "- No explicit blockers inferable from current status labels.",
    );
    section(
        &mut lines,
        "Next focus",
        &in_progress,
        5,
        "- Confirm priorities for the next sprint window.",
    );

    format!("{}\n", lines.join("\n").trim())
}

pub fn weekly_filename(date: NaiveDate) -> String {
    format!("{}-weekly-status.md", date.format("%Y-%m-%d"))
}

// ============================================================================
// Decision log
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecisionEntry {
    pub date: String,
    pub project: String,
    pub title: String,
    pub decision: String,
    pub context: String,
    pub impact: String,
    pub followup: String,
}

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        placeholder
    } else {
        trimmed
    }
}

pub fn build_decision_markdown(entry: &DecisionEntry) -> String {
    format!(
        "# Decision: {title}\n\n\
         Date: {date}\n\
         Project: {project}\n\n\
         ## Context\n{context}\n\n\
         ## Decision\n{decision}\n\n\
         ## Impact\n{impact}\n\n\
         ## Follow-up\n{followup}\n",
        title = entry.title,
        date = entry.date,
        project = entry.project,
        context = or_placeholder(&entry.context, "(none provided)"),
        decision = entry.decision.trim(),
        impact = or_placeholder(&entry.impact, "(to be assessed)"),
        followup = or_placeholder(&entry.followup, "(none)"),
    )
}

fn slug_separator() -> &'static Regex {
    static SEPARATOR: OnceLock<Regex> = OnceLock::new();
    SEPARATOR.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("valid slug regex"))
}

/// Filesystem-safe slug. Never empty.
pub fn slugify(value: &str) -> String {
    let lowered = value.to_lowercase();
    let slug = slug_separator().replace_all(&lowered, "-");
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "decision".to_string()
    } else {
        slug.to_string()
    }
}

pub fn decision_filename(date: &str, title: &str) -> String {
    format!("{date}_{}.md", slugify(title))
}
