use colored::Colorize;
use opcli_core::display::truncate;
use opcli_core::models::Project;

use crate::client::{OpenProjectClient, PROJECT_LOOKUP_LIMIT};
use crate::prelude::{println, *};

pub async fn list_projects_data(client: &OpenProjectClient) -> Result<Vec<Project>> {
    Ok(client.projects(PROJECT_LOOKUP_LIMIT).await?)
}

/// Handle the list-projects command
pub async fn handler(global: crate::Global) -> Result<()> {
    let client = OpenProjectClient::from_env()?;
    let projects = list_projects_data(&client).await?;

    if projects.is_empty() {
        println!("No projects found.");
    } else {
        let mut table = new_table();
        table.add_row(prettytable::row![
            "ID".bold().cyan(),
            "Identifier".bold().cyan(),
            "Name".bold().cyan()
        ]);
        for project in &projects {
            table.add_row(prettytable::row![
                project.id.map(|id| id.to_string()).unwrap_or_else(|| "?".into()),
                truncate(project.identifier().unwrap_or("-"), 20).bright_blue(),
                truncate(project.name().unwrap_or("-"), 30)
            ]);
        }
        table.printstd();
    }

    print_debug_json(&projects, global.debug_json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::{client_for, collection};
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_list_projects_requests_up_to_lookup_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/projects"))
            .and(query_param("offset", "1"))
            .and(query_param("pageSize", "200"))
            .respond_with(ResponseTemplate::new(200).set_body_json(collection(
                vec![json!({ "id": 3, "identifier": "demo", "name": "Demo" })],
                false,
            )))
            .expect(1)
            .mount(&server)
            .await;

        let projects = list_projects_data(&client_for(&server.uri())).await.unwrap();

        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].label(), "demo");
    }
}
