use colored::Colorize;
use reqwest::Method;

use opcli_core::models::{from_value, WorkPackage};
use opcli_core::work_package::{
    patch_path, status_payload, update_payload, LinkUpdates, UpdateFields,
};

use crate::client::OpenProjectClient;
use crate::prelude::{println, *};

/// Options for moving a work package to another status
#[derive(Debug, clap::Args, Clone)]
pub struct UpdateStatusOptions {
    /// Work package ID
    #[arg(long)]
    pub id: u64,

    /// Target status name (case-insensitive)
    #[arg(long)]
    pub status: String,
}

/// Options for updating work package fields
#[derive(Debug, clap::Args, Clone)]
#[command(after_help = "EXAMPLES:
  # Reassign and reschedule in one call:
  opcli update-work-package --id 42 --assignee ada --due-date 2026-03-01

  # Move through the workflow and retitle:
  opcli update-work-package --id 42 --status \"In progress\" --subject \"Ship v2 notes\"")]
pub struct UpdateOptions {
    /// Work package ID
    #[arg(long)]
    pub id: u64,

    /// New subject/title
    #[arg(long)]
    pub subject: Option<String>,

    /// New description text
    #[arg(long)]
    pub description: Option<String>,

    /// New status name (transition-aware, case-insensitive)
    #[arg(long)]
    pub status: Option<String>,

    /// Assignee user id, login, or display name
    #[arg(long)]
    pub assignee: Option<String>,

    /// Priority name
    #[arg(long)]
    pub priority: Option<String>,

    /// Work package type name
    #[arg(long = "type")]
    pub work_type: Option<String>,

    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<String>,

    /// Due date (YYYY-MM-DD)
    #[arg(long)]
    pub due_date: Option<String>,
}

impl UpdateOptions {
    fn fields(&self) -> UpdateFields {
        UpdateFields {
            subject: self.subject.clone(),
            description: self.description.clone(),
            status: self.status.clone(),
            assignee: self.assignee.clone(),
            priority: self.priority.clone(),
            work_type: self.work_type.clone(),
            start_date: self.start_date.clone(),
            due_date: self.due_date.clone(),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// Move work package `id` to `status`, respecting the workflow when the server exposes it.
pub async fn update_status_data(
    client: &OpenProjectClient,
    id: u64,
    status: &str,
) -> Result<WorkPackage> {
    let wp = client.work_package(id).await?;
    let lock_version = wp.require_lock_version()?;
    let resolved = client.resolve_allowed_status(&wp, status).await?;

    let updated = client
        .request(
            Method::PATCH,
            &patch_path(&wp, id),
            &[],
            Some(&status_payload(lock_version, &resolved.href)),
            &[200],
        )
        .await
        .map_err(|err| {
            err.rejected_as(f!("Status update rejected by workflow for work package #{id}."))
        })?;

    Ok(from_value(updated)?)
}

/// Apply several field changes to work package `id` in a single PATCH.
///
/// `fields` must already be validated; link fields are resolved here.
pub async fn update_fields_data(
    client: &OpenProjectClient,
    id: u64,
    fields: &UpdateFields,
) -> Result<WorkPackage> {
    let wp = client.work_package(id).await?;
    let lock_version = wp.require_lock_version()?;

    let mut links = LinkUpdates::default();
    if let Some(status) = non_blank(&fields.status) {
        links.status = Some(client.resolve_allowed_status(&wp, status).await?.href);
    }
    if let Some(priority) = non_blank(&fields.priority) {
        links.priority = Some(client.resolve_priority(priority).await?.href);
    }
    if let Some(assignee) = non_blank(&fields.assignee) {
        links.assignee = Some(client.resolve_user(assignee).await?.href);
    }
    if let Some(work_type) = non_blank(&fields.work_type) {
        let project_id = OpenProjectClient::project_id_of(&wp);
        links.work_type = Some(client.resolve_type(project_id, work_type).await?.href);
    }

    let payload = update_payload(lock_version, fields, &links)?;
    let updated = client
        .request(Method::PATCH, &patch_path(&wp, id), &[], Some(&payload), &[200])
        .await
        .map_err(|err| err.rejected_as(f!("Work package update rejected for #{id}.")))?;

    Ok(from_value(updated)?)
}

/// Handle the update-work-package-status command
pub async fn status_handler(options: UpdateStatusOptions, global: crate::Global) -> Result<()> {
    let client = OpenProjectClient::from_env()?;
    let updated = update_status_data(&client, options.id, &options.status).await?;

    let id = updated.id.unwrap_or(options.id);
    let status = updated.links.title_or("status", &options.status);
    println!(
        "Updated work package #{id} to status '{}'.",
        status.green()
    );
    print_debug_json(&updated, global.debug_json)
}

/// Handle the update-work-package command
pub async fn handler(options: UpdateOptions, global: crate::Global) -> Result<()> {
    // Checked before any credentials are required.
    let fields = options.fields().validated()?;

    let client = OpenProjectClient::from_env()?;
    let updated = update_fields_data(&client, options.id, &fields).await?;

    println!("Updated work package #{}.", updated.id.unwrap_or(options.id));
    super::display_work_package(&updated);
    print_debug_json(&updated, global.debug_json)
}
