//! Reference lists: statuses, types, priorities and users.

use colored::Colorize;
use opcli_core::display::truncate;
use opcli_core::models::{CatalogEntry, Project, User};
use opcli_core::pagination::ensure_limit;
use opcli_core::work_package::filter_users;

use crate::client::OpenProjectClient;
use crate::prelude::{println, *};

/// Options for listing work package types
#[derive(Debug, clap::Args, Clone)]
pub struct ListTypesOptions {
    /// Optional project ID or identifier for project-scoped types
    #[arg(long)]
    pub project: Option<String>,
}

/// Options for listing users
#[derive(Debug, clap::Args, Clone)]
pub struct ListUsersOptions {
    /// Case-insensitive substring filter over name, login and id
    #[arg(long)]
    pub query: Option<String>,

    /// Maximum number of users to fetch
    #[arg(long, default_value_t = 200, allow_negative_numbers = true)]
    pub limit: i64,
}

fn id_cell(id: Option<u64>) -> String {
    id.map(|id| id.to_string()).unwrap_or_else(|| "?".to_string())
}

fn flag_cell(flag: Option<bool>) -> String {
    if flag.unwrap_or(false) {
        "True".green().to_string()
    } else {
        "False".bright_black().to_string()
    }
}

fn print_entries<F>(entries: &[CatalogEntry], empty: &str, extra_header: &str, extra: F)
where
    F: Fn(&CatalogEntry) -> String,
{
    if entries.is_empty() {
        println!("{empty}");
        return;
    }

    let mut table = new_table();
    table.add_row(prettytable::row![
        "ID".bold().cyan(),
        "Name".bold().cyan(),
        extra_header.bold().cyan()
    ]);
    for entry in entries {
        table.add_row(prettytable::row![
            id_cell(entry.id),
            truncate(entry.name.as_deref().unwrap_or("-"), 25),
            extra(entry)
        ]);
    }
    table.printstd();
}

// ============================================================================
// Statuses and priorities
// ============================================================================

pub async fn statuses_handler(global: crate::Global) -> Result<()> {
    let client = OpenProjectClient::from_env()?;
    let statuses = client.statuses().await?;

    print_entries(&statuses, "No statuses returned.", "Closed", |s| {
        flag_cell(s.is_closed)
    });
    print_debug_json(&statuses, global.debug_json)
}

pub async fn priorities_handler(global: crate::Global) -> Result<()> {
    let client = OpenProjectClient::from_env()?;
    let priorities = client.priorities().await?;

    print_entries(&priorities, "No priorities returned.", "Position", |p| {
        p.position
            .map(|position| position.to_string())
            .unwrap_or_else(|| "-".to_string())
    });
    print_debug_json(&priorities, global.debug_json)
}

// ============================================================================
// Types
// ============================================================================

/// Types usable in the optional project, with the project they were resolved for.
pub async fn list_types_data(
    client: &OpenProjectClient,
    project: Option<&str>,
) -> Result<(Option<Project>, Vec<CatalogEntry>)> {
    let project = match project.map(str::trim).filter(|p| !p.is_empty()) {
        Some(reference) => Some(client.resolve_project(reference).await?),
        None => None,
    };
    let project_id = project.as_ref().map(Project::require_id).transpose()?;

    let types = client.types(project_id).await?;
    Ok((project, types))
}

pub async fn types_handler(options: ListTypesOptions, global: crate::Global) -> Result<()> {
    let client = OpenProjectClient::from_env()?;
    let (project, types) = list_types_data(&client, options.project.as_deref()).await?;

    if let Some(project) = &project {
        println!("Project: {}", project.label().bold());
    }
    print_entries(&types, "No types returned.", "Milestone", |t| {
        flag_cell(t.is_milestone)
    });
    print_debug_json(&types, global.debug_json)
}

// ============================================================================
// Users
// ============================================================================

pub async fn list_users_data(
    client: &OpenProjectClient,
    query: Option<&str>,
    limit: usize,
) -> Result<Vec<User>> {
    let users = match client.users(limit).await {
        Ok(users) => users,
        Err(err) if err.status_code() == Some(403) => {
            return Err(eyre!(
                "Listing users is forbidden for this token/role. \
                 Use an account with user-list permission or assign by numeric user ID."
            ))
        }
        Err(err) => return Err(err.into()),
    };

    Ok(filter_users(users, query))
}

pub async fn users_handler(options: ListUsersOptions, global: crate::Global) -> Result<()> {
    let limit = ensure_limit(options.limit)?;
    let client = OpenProjectClient::from_env()?;
    let users = list_users_data(&client, options.query.as_deref(), limit).await?;

    if users.is_empty() {
        println!("No users returned.");
    } else {
        let mut table = new_table();
        table.add_row(prettytable::row![
            "ID".bold().cyan(),
            "Name".bold().cyan(),
            "Login".bold().cyan()
        ]);
        for user in &users {
            table.add_row(prettytable::row![
                id_cell(user.id),
                truncate(&user.display_name(), 32),
                truncate(user.login(), 22).bright_black()
            ]);
        }
        table.printstd();
    }

    print_debug_json(&users, global.debug_json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::{client_for, collection};
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_list_users_filters_by_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(collection(
                vec![
                    json!({ "id": 1, "name": "Ada Lovelace", "login": "ada" }),
                    json!({ "id": 2, "name": "Grace Hopper", "login": "grace" }),
                ],
                false,
            )))
            .mount(&server)
            .await;

        let users = list_users_data(&client_for(&server.uri()), Some("HOP"), 200)
            .await
            .unwrap();

        assert_eq!(users.len(), 1);
        assert_eq!(users[0].login(), "grace");
    }

    #[tokio::test]
    async fn test_list_users_forbidden_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/users"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let err = list_users_data(&client_for(&server.uri()), None, 10)
            .await
            .unwrap_err();

        assert!(err
            .to_string()
            .starts_with("Listing users is forbidden for this token/role."));
    }

    #[tokio::test]
    async fn test_list_types_for_project() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/projects"))
            .respond_with(ResponseTemplate::new(200).set_body_json(collection(
                vec![json!({ "id": 8, "identifier": "ops", "name": "Operations" })],
                false,
            )))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v3/projects/8/types"))
            .respond_with(ResponseTemplate::new(200).set_body_json(collection(
                vec![json!({ "id": 1, "name": "Task" }), json!({ "id": 2, "name": "Milestone", "isMilestone": true })],
                false,
            )))
            .expect(1)
            .mount(&server)
            .await;

        // Act
        let (project, types) = list_types_data(&client_for(&server.uri()), Some("ops"))
            .await
            .unwrap();

        // Assert
        assert_eq!(project.map(|p| p.label()), Some("ops".to_string()));
        assert_eq!(types.len(), 2);
        assert_eq!(types[1].is_milestone, Some(true));
    }

    #[tokio::test]
    async fn test_list_types_without_project_uses_global_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/types"))
            .respond_with(ResponseTemplate::new(200).set_body_json(collection(
                vec![json!({ "id": 1, "name": "Task" })],
                false,
            )))
            .expect(1)
            .mount(&server)
            .await;

        let (project, types) = list_types_data(&client_for(&server.uri()), None).await.unwrap();

        assert!(project.is_none());
        assert_eq!(types.len(), 1);
    }
}
