use colored::Colorize;
use reqwest::Method;

use opcli_core::models::{from_value, WorkPackage};
use opcli_core::work_package::{create_payload, DEFAULT_TYPE};

use crate::client::{load_config, OpenProjectClient};
use crate::prelude::{println, *};

/// Options for creating a work package
#[derive(Debug, clap::Args, Clone)]
pub struct CreateOptions {
    /// Project ID or identifier
    #[arg(long, env = "OPENPROJECT_DEFAULT_PROJECT")]
    pub project: Option<String>,

    /// Work package subject/title
    #[arg(long)]
    pub subject: String,

    /// Work package type name
    #[arg(long = "type", default_value = DEFAULT_TYPE)]
    pub work_type: String,

    /// Optional work package description
    #[arg(long)]
    pub description: Option<String>,
}

/// Create a work package in the referenced project.
pub async fn create_work_package_data(
    client: &OpenProjectClient,
    project_ref: &str,
    subject: &str,
    work_type: &str,
    description: Option<&str>,
) -> Result<WorkPackage> {
    let project = client.resolve_project(project_ref).await?;
    let project_id = project.require_id()?;
    let project_href = project.self_href()?;
    let resolved_type = client.resolve_type(Some(project_id), work_type).await?;
    log::debug!("creating {} in project {}", resolved_type.name, project.label());

    let payload = create_payload(subject, &project_href, &resolved_type.href, description);
    let created = client
        .request(Method::POST, "/work_packages", &[], Some(&payload), &[200, 201])
        .await?;

    Ok(from_value(created)?)
}

/// Handle the create-work-package command
pub async fn handler(options: CreateOptions, global: crate::Global) -> Result<()> {
    let config = load_config();
    let project_ref = config.require_project(options.project.as_deref())?;
    let client = OpenProjectClient::from_config(&config)?;

    let created = create_work_package_data(
        &client,
        &project_ref,
        &options.subject,
        &options.work_type,
        options.description.as_deref(),
    )
    .await?;

    println!(
        "Created work package {}: {}",
        f!("#{}", created.id_label()).bold().cyan(),
        created.subject.as_deref().unwrap_or(&options.subject)
    );
    print_debug_json(&created, global.debug_json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::{client_for, collection};
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_project_and_types(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/api/v3/projects"))
            .respond_with(ResponseTemplate::new(200).set_body_json(collection(
                vec![json!({
                    "id": 3,
                    "identifier": "demo",
                    "name": "Demo",
                    "_links": { "self": { "href": "/api/v3/projects/3" } }
                })],
                false,
            )))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v3/projects/3/types"))
            .respond_with(ResponseTemplate::new(200).set_body_json(collection(
                vec![
                    json!({ "id": 1, "name": "Task", "_links": { "self": { "href": "/api/v3/types/1" } } }),
                    json!({ "id": 2, "name": "Bug" }),
                ],
                false,
            )))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_create_task_in_resolved_project() {
        // Arrange
        let server = MockServer::start().await;
        mount_project_and_types(&server).await;
        Mock::given(method("POST"))
            .and(path("/api/v3/work_packages"))
            .and(body_json(json!({
                "subject": "Draft onboarding guide",
                "_links": {
                    "project": { "href": "/api/v3/projects/3" },
                    "type": { "href": "/api/v3/types/1" }
                }
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": 101,
                "subject": "Draft onboarding guide",
                "lockVersion": 0
            })))
            .expect(1)
            .mount(&server)
            .await;

        // Act
        let created = create_work_package_data(
            &client_for(&server.uri()),
            "DEMO",
            "Draft onboarding guide",
            DEFAULT_TYPE,
            None,
        )
        .await
        .unwrap();

        // Assert
        assert_eq!(created.id, Some(101));
        assert_eq!(created.subject(), "Draft onboarding guide");
    }

    #[tokio::test]
    async fn test_create_with_description_and_built_type_href() {
        let server = MockServer::start().await;
        mount_project_and_types(&server).await;
        Mock::given(method("POST"))
            .and(path("/api/v3/work_packages"))
            .and(body_json(json!({
                "subject": "Crash on save",
                "description": { "raw": "Steps to reproduce" },
                "_links": {
                    "project": { "href": "/api/v3/projects/3" },
                    "type": { "href": "/api/v3/types/2" }
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 102 })))
            .expect(1)
            .mount(&server)
            .await;

        let created = create_work_package_data(
            &client_for(&server.uri()),
            "3",
            "Crash on save",
            "bug",
            Some("Steps to reproduce"),
        )
        .await
        .unwrap();

        assert_eq!(created.id, Some(102));
    }

    #[tokio::test]
    async fn test_create_unknown_type_makes_no_post() {
        let server = MockServer::start().await;
        mount_project_and_types(&server).await;
        Mock::given(method("GET"))
            .and(path("/api/v3/types"))
            .respond_with(ResponseTemplate::new(200).set_body_json(collection(vec![], false)))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let err = create_work_package_data(&client_for(&server.uri()), "demo", "x", "Epic", None)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Unknown type 'Epic'. Available types: Bug, Task");
    }
}
