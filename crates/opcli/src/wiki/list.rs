use colored::Colorize;
use reqwest::Method;
use serde_json::json;

use opcli_core::display::{format_date, truncate};
use opcli_core::wiki::{index_pages, index_path, WikiPage};

use crate::client::{load_config, OpenProjectClient};
use crate::prelude::{println, *};

/// Options for listing wiki pages
#[derive(Debug, clap::Args, Clone)]
pub struct ListOptions {
    /// Project ID or identifier
    #[arg(long, env = "OPENPROJECT_DEFAULT_PROJECT")]
    pub project: Option<String>,
}

pub async fn list_wiki_pages_data(
    client: &OpenProjectClient,
    project_ref: &str,
) -> Result<(String, Vec<WikiPage>)> {
    let identifier = client.resolve_project_identifier(project_ref).await?;
    let payload = client
        .legacy(Method::GET, &index_path(&identifier), None, &[200])
        .await?;
    Ok((identifier, index_pages(&payload)))
}

/// Handle the list-wiki-pages command
pub async fn handler(options: ListOptions, global: crate::Global) -> Result<()> {
    let config = load_config();
    let project_ref = config.require_project(options.project.as_deref())?;
    let client = OpenProjectClient::from_config(&config)?;

    let (identifier, pages) = list_wiki_pages_data(&client, &project_ref).await?;

    println!("Project wiki: {}", identifier.bold());
    if pages.is_empty() {
        println!("No wiki pages found.");
    } else {
        let mut table = new_table();
        table.add_row(prettytable::row![
            "Title".bold().cyan(),
            "Version".bold().cyan(),
            "Updated".bold().cyan()
        ]);
        for page in &pages {
            table.add_row(prettytable::row![
                truncate(&page.title_or("(untitled)"), 33),
                page.version_label(),
                format_date(page.updated()).bright_black()
            ]);
        }
        table.printstd();
    }

    print_debug_json(
        &json!({ "project": identifier, "wiki_pages": pages }),
        global.debug_json,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::{client_for, collection};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_list_uses_resolved_identifier_and_drops_junk() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/projects"))
            .respond_with(ResponseTemplate::new(200).set_body_json(collection(
                vec![json!({ "id": 3, "identifier": "know-malawi", "name": "Know Malawi" })],
                false,
            )))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/projects/know-malawi/wiki/index.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "wiki_pages": [
                    { "title": "Wiki", "version": 4, "updated_on": "2026-01-02T10:00:00Z" },
                    "junk",
                    { "title": "Onboarding" }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (identifier, pages) = list_wiki_pages_data(&client_for(&server.uri()), "3")
            .await
            .unwrap();

        assert_eq!(identifier, "know-malawi");
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].version_label(), "4");
        assert_eq!(pages[1].version_label(), "-");
    }
}
