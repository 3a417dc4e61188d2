use std::path::PathBuf;

use colored::Colorize;

use opcli_core::models::from_value;
use opcli_core::wiki::{placeholder_content, WikiPage};

use crate::client::{load_config, OpenProjectClient};
use crate::files::write_text_file;
use crate::prelude::{println, *};

const NO_TEXT_NOTICE: &str = "No wiki text returned. This server may expose only wiki metadata \
    via API v3 or block legacy wiki JSON endpoints for the current auth mode.";

/// Options for reading a wiki page
#[derive(Debug, clap::Args, Clone)]
#[command(after_help = "EXAMPLES:
  # Read by title in the default project:
  opcli read-wiki-page --title Onboarding

  # Read by API v3 id and save the text:
  opcli read-wiki-page --id 17 --output notes/onboarding.md")]
pub struct ReadOptions {
    /// Wiki page ID from API v3
    #[arg(long)]
    pub id: Option<u64>,

    /// Project ID or identifier, used with --title
    #[arg(long)]
    pub project: Option<String>,

    /// Wiki page title
    #[arg(long)]
    pub title: Option<String>,

    /// Optional output file for the page text
    #[arg(long)]
    pub output: Option<PathBuf>,
}

/// Which page the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageTarget {
    Id(u64),
    Title { project: Option<String>, title: String },
}

impl ReadOptions {
    pub fn target(&self) -> Result<PageTarget> {
        let project = self.project.clone().filter(|p| !p.is_empty());
        let title = self.title.clone().filter(|t| !t.is_empty());

        match (self.id, project, title) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => Err(Error::InvalidArgs(
                "Use either --id OR (--project and --title), not both.".to_string(),
            )
            .into()),
            (Some(id), None, None) => Ok(PageTarget::Id(id)),
            (None, project, Some(title)) => Ok(PageTarget::Title { project, title }),
            (None, _, None) => Err(Error::InvalidArgs("Provide --id or --title.".to_string()).into()),
        }
    }
}

/// A page as displayed: its title, the project it was read from (may be empty), and the payload.
#[derive(Debug, Clone)]
pub struct WikiRead {
    pub title: String,
    pub project: String,
    pub page: WikiPage,
}

/// Read a page by API v3 id, filling in the text from the legacy endpoint when possible.
pub async fn read_by_id_data(client: &OpenProjectClient, id: u64) -> Result<WikiRead> {
    let page: WikiPage = from_value(client.get(&f!("/wiki_pages/{id}")).await?)?;
    let title = page.title_or(&f!("wiki-page-{id}"));
    let project = page.project_ref().unwrap_or_default();

    if !page.text().is_empty() || project.is_empty() {
        return Ok(WikiRead {
            title,
            project,
            page,
        });
    }

    match super::read_by_title(client, &project, &title).await {
        Ok((identifier, legacy_page)) => Ok(WikiRead {
            title,
            project: identifier,
            page: legacy_page,
        }),
        Err(err) => {
            log::debug!("legacy read of '{title}' failed, keeping API v3 metadata: {err}");
            Ok(WikiRead {
                title,
                project,
                page,
            })
        }
    }
}

pub async fn read_by_title_data(
    client: &OpenProjectClient,
    project_ref: &str,
    title: &str,
) -> Result<WikiRead> {
    let (identifier, page) = super::read_by_title(client, project_ref, title).await?;
    Ok(WikiRead {
        title: page.title_or(title),
        project: identifier,
        page,
    })
}

/// Handle the read-wiki-page command
pub async fn handler(options: ReadOptions, global: crate::Global) -> Result<()> {
    let target = options.target()?;
    let config = load_config();
    let client = OpenProjectClient::from_config(&config)?;

    let read = match target {
        PageTarget::Id(id) => read_by_id_data(&client, id).await?,
        PageTarget::Title { project, title } => {
            let project_ref = config.require_project(project.as_deref())?;
            read_by_title_data(&client, &project_ref, &title).await?
        }
    };

    let text = read.page.text();
    println!("{} {}", "Wiki page:".bold().cyan(), read.title.bright_white());
    if !read.project.is_empty() {
        println!("{} {}", "Project:".bold().cyan(), read.project);
    }
    println!("{} {}", "Version:".bold().cyan(), read.page.version_label());
    println!();
    if text.is_empty() {
        println!("{}", NO_TEXT_NOTICE.bright_black());
    } else {
        println!("{text}");
    }

    if let Some(output) = &options.output {
        let content = if text.is_empty() {
            placeholder_content(&read.title)
        } else {
            text.to_string()
        };
        let written = write_text_file(output, &content)?;
        println!("\nSaved wiki content to {}", written.display());
    }

    print_debug_json(&read.page, global.debug_json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::{client_for, collection};
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn options(id: Option<u64>, project: Option<&str>, title: Option<&str>) -> ReadOptions {
        ReadOptions {
            id,
            project: project.map(str::to_string),
            title: title.map(str::to_string),
            output: None,
        }
    }

    async fn mount_projects(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/api/v3/projects"))
            .respond_with(ResponseTemplate::new(200).set_body_json(collection(
                vec![json!({ "id": 3, "identifier": "demo", "name": "Demo" })],
                false,
            )))
            .mount(server)
            .await;
    }

    #[test]
    fn test_target_argument_rules() {
        assert_eq!(options(Some(4), None, None).target().unwrap(), PageTarget::Id(4));
        assert_eq!(
            options(None, None, Some("Home")).target().unwrap(),
            PageTarget::Title {
                project: None,
                title: "Home".to_string()
            }
        );
        assert_eq!(
            options(Some(4), None, Some("Home")).target().unwrap_err().to_string(),
            "Use either --id OR (--project and --title), not both."
        );
        assert_eq!(
            options(Some(4), Some("demo"), None).target().unwrap_err().to_string(),
            "Use either --id OR (--project and --title), not both."
        );
        assert_eq!(
            options(None, Some("demo"), None).target().unwrap_err().to_string(),
            "Provide --id or --title."
        );
    }

    #[tokio::test]
    async fn test_read_by_title_unwraps_legacy_payload() {
        let server = MockServer::start().await;
        mount_projects(&server).await;
        Mock::given(method("GET"))
            .and(path("/projects/demo/wiki/Release%20Notes.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "wiki_page": { "title": "Release Notes", "text": { "raw": "v2 shipped." }, "version": 5 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let read = read_by_title_data(&client_for(&server.uri()), "demo", "Release Notes")
            .await
            .unwrap();

        assert_eq!(read.project, "demo");
        assert_eq!(read.title, "Release Notes");
        assert_eq!(read.page.text(), "v2 shipped.");
        assert_eq!(read.page.version_label(), "5");
    }

    #[tokio::test]
    async fn test_read_by_id_fills_text_from_legacy_endpoint() {
        // Arrange
        let server = MockServer::start().await;
        mount_projects(&server).await;
        Mock::given(method("GET"))
            .and(path("/api/v3/wiki_pages/17"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 17,
                "title": "Home",
                "_embedded": { "project": { "id": 3, "identifier": "demo" } }
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/projects/demo/wiki/Home.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "title": "Home", "text": "Welcome", "version": 2
            })))
            .expect(1)
            .mount(&server)
            .await;

        // Act
        let read = read_by_id_data(&client_for(&server.uri()), 17).await.unwrap();

        // Assert
        assert_eq!(read.project, "demo");
        assert_eq!(read.page.text(), "Welcome");
    }

    #[tokio::test]
    async fn test_read_by_id_keeps_metadata_when_legacy_read_fails() {
        let server = MockServer::start().await;
        mount_projects(&server).await;
        Mock::given(method("GET"))
            .and(path("/api/v3/wiki_pages/17"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 17,
                "title": "Home",
                "_links": { "project": { "href": "/api/v3/projects/3", "title": "demo" } }
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/projects/demo/wiki/Home.json"))
            .respond_with(ResponseTemplate::new(403))
            .expect(1)
            .mount(&server)
            .await;

        let read = read_by_id_data(&client_for(&server.uri()), 17).await.unwrap();

        assert_eq!(read.title, "Home");
        assert_eq!(read.project, "demo");
        assert_eq!(read.page.id, Some(17));
        assert_eq!(read.page.text(), "");
    }

    #[tokio::test]
    async fn test_read_by_id_without_title_uses_placeholder_title() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/wiki_pages/8"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 8 })))
            .mount(&server)
            .await;

        let read = read_by_id_data(&client_for(&server.uri()), 8).await.unwrap();

        assert_eq!(read.title, "wiki-page-8");
        assert_eq!(read.project, "");
    }
}
