pub mod comment;
pub mod create;
pub mod get;
pub mod list;
pub mod update;

use colored::Colorize;
use opcli_core::display::{format_date, truncate};
use opcli_core::models::WorkPackage;

use crate::prelude::{println, *};

/// Print work package rows, or a notice when the list is empty.
fn print_work_packages(work_packages: &[WorkPackage]) {
    if work_packages.is_empty() {
        println!("No matching work packages found.");
        return;
    }

    let mut table = new_table();
    table.add_row(prettytable::row![
        "WP ID".bold().cyan(),
        "Subject".bold().cyan(),
        "Status".bold().cyan(),
        "Assignee".bold().cyan(),
        "Updated".bold().cyan()
    ]);

    for wp in work_packages {
        let assignee = wp.assignee();
        let assignee = if assignee == "Unassigned" {
            truncate(&assignee, 14).bright_black().to_string()
        } else {
            truncate(&assignee, 14).bright_magenta().to_string()
        };
        table.add_row(prettytable::row![
            wp.id_label(),
            truncate(wp.subject(), 35),
            truncate(&wp.status(), 13).green(),
            assignee,
            format_date(wp.updated_at.as_deref()).bright_black()
        ]);
    }

    table.printstd();
}

/// Display a work package's details as a formatted CLI table.
///
/// Shared by get-work-package and update-work-package.
fn display_work_package(wp: &WorkPackage) {
    std::println!(
        "\n{} {}\n",
        f!("Work package #{}", wp.id_label()).bold().cyan(),
        wp.subject().bright_white()
    );

    let dash = |value: Option<&str>| value.filter(|v| !v.is_empty()).unwrap_or("-").to_string();
    let assignee = wp.assignee();
    let assignee = if assignee == "Unassigned" {
        assignee.bright_black().to_string()
    } else {
        assignee.bright_magenta().to_string()
    };

    let mut table = new_table();
    let rows = [
        ("Status", wp.status().green().to_string()),
        ("Type", wp.links.title_or("type", "-").bright_blue().to_string()),
        ("Priority", wp.links.title_or("priority", "-").bright_yellow().to_string()),
        ("Assignee", assignee),
        ("Author", wp.links.title_or("author", "-")),
        ("Start date", dash(wp.start_date.as_deref())),
        ("Due date", dash(wp.due_date.as_deref()).yellow().to_string()),
        ("Created", format_date(wp.created_at.as_deref()).bright_black().to_string()),
        ("Updated", format_date(wp.updated_at.as_deref()).bright_black().to_string()),
        (
            "Lock version",
            wp.lock_version
                .map(|v| v.to_string())
                .unwrap_or_else(|| "-".to_string()),
        ),
    ];
    for (label, value) in rows {
        table.add_row(prettytable::row![label.bold().cyan(), value]);
    }
    table.printstd();

    let description = wp.description().trim();
    if !description.is_empty() {
        std::println!("\n{}:", "Description".bold().cyan());
        std::println!("{description}\n");
    }
}
