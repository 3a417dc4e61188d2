use colored::Colorize;
use opcli_core::models::{Project, WorkPackage};
use opcli_core::pagination::ensure_limit;
use opcli_core::work_package::filter_work_packages;

use crate::client::{load_config, OpenProjectClient};
use crate::prelude::{println, *};

/// Options for listing work packages
#[derive(Debug, clap::Args, Clone)]
#[command(after_help = "EXAMPLES:
  # Open items assigned to Ada in the default project:
  opcli list-work-packages --status open --assignee ada

  # The first 10 work packages of a project by identifier:
  opcli list-work-packages --project know-malawi --limit 10

NOTES:
  - --status and --assignee are case-insensitive substring filters
  - Use 'unassigned' to match work packages without an assignee")]
pub struct ListOptions {
    /// Project ID or identifier
    #[arg(long, env = "OPENPROJECT_DEFAULT_PROJECT")]
    pub project: Option<String>,

    /// Status filter (case-insensitive substring match)
    #[arg(long)]
    pub status: Option<String>,

    /// Assignee filter (case-insensitive substring match)
    #[arg(long)]
    pub assignee: Option<String>,

    /// Maximum number of work packages to fetch
    #[arg(long, default_value_t = 50, allow_negative_numbers = true)]
    pub limit: i64,
}

/// Work packages of the referenced project, filtered client-side.
pub async fn list_work_packages_data(
    client: &OpenProjectClient,
    project_ref: &str,
    status: Option<&str>,
    assignee: Option<&str>,
    limit: usize,
) -> Result<(Project, Vec<WorkPackage>)> {
    let project = client.resolve_project(project_ref).await?;
    let work_packages = client
        .work_packages(project.require_id()?, limit, status, assignee)
        .await?;

    Ok((project, filter_work_packages(work_packages, status, assignee)))
}

/// Handle the list-work-packages command
pub async fn handler(options: ListOptions, global: crate::Global) -> Result<()> {
    let limit = ensure_limit(options.limit)?;
    let config = load_config();
    let project_ref = config.require_project(options.project.as_deref())?;
    let client = OpenProjectClient::from_config(&config)?;

    let (project, work_packages) = list_work_packages_data(
        &client,
        &project_ref,
        options.status.as_deref(),
        options.assignee.as_deref(),
        limit,
    )
    .await?;

    println!("Project: {}", project.label().bold());
    super::print_work_packages(&work_packages);
    print_debug_json(&work_packages, global.debug_json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::{client_for, collection};
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_list_filters_by_status_and_assignee() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/projects"))
            .respond_with(ResponseTemplate::new(200).set_body_json(collection(
                vec![json!({ "id": 3, "identifier": "demo", "name": "Demo" })],
                false,
            )))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v3/projects/3/work_packages"))
            .and(query_param("status", "progress"))
            .respond_with(ResponseTemplate::new(200).set_body_json(collection(
                vec![
                    json!({ "id": 1, "subject": "A", "_links": {
                        "status": { "href": "/api/v3/statuses/7", "title": "In progress" }
                    } }),
                    json!({ "id": 2, "subject": "B", "_links": {
                        "status": { "href": "/api/v3/statuses/1", "title": "New" }
                    } }),
                    json!({ "id": 3, "subject": "C", "_links": {
                        "status": { "href": "/api/v3/statuses/7", "title": "In progress" },
                        "assignee": { "href": "/api/v3/users/4", "title": "Ada" }
                    } }),
                ],
                false,
            )))
            .expect(1)
            .mount(&server)
            .await;

        // Act
        let (project, wps) = list_work_packages_data(
            &client_for(&server.uri()),
            "demo",
            Some("progress"),
            Some("unassigned"),
            50,
        )
        .await
        .unwrap();

        // Assert
        assert_eq!(project.label(), "demo");
        let ids: Vec<String> = wps.iter().map(WorkPackage::id_label).collect();
        assert_eq!(ids, vec!["1"]);
    }
}
