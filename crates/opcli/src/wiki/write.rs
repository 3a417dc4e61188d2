use std::path::PathBuf;

use colored::Colorize;
use reqwest::Method;

use opcli_core::wiki::{page_path, write_payload, WikiPage, WikiPayload};

use crate::client::{load_config, OpenProjectClient};
use crate::files::read_text_file;
use crate::prelude::{println, *};

/// Options for creating or replacing a wiki page
#[derive(Debug, clap::Args, Clone)]
#[command(after_help = "EXAMPLES:
  # Inline content:
  opcli write-wiki-page --title Onboarding --content \"Start here.\"

  # From a file, with a version comment:
  opcli write-wiki-page --title Onboarding --content-file onboarding.md --comment \"Refresh\"")]
pub struct WriteOptions {
    /// Project ID or identifier
    #[arg(long, env = "OPENPROJECT_DEFAULT_PROJECT")]
    pub project: Option<String>,

    /// Wiki page title
    #[arg(long)]
    pub title: String,

    /// Page text
    #[arg(long)]
    pub content: Option<String>,

    /// File holding the page text
    #[arg(long)]
    pub content_file: Option<PathBuf>,

    /// Version comment
    #[arg(long)]
    pub comment: Option<String>,
}

impl WriteOptions {
    /// The page text from exactly one of `--content` and `--content-file`.
    pub fn text(&self) -> Result<String> {
        let content = self.content.as_deref().filter(|c| !c.is_empty());
        let content_file = self
            .content_file
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty());

        match (content, content_file) {
            (Some(content), None) => Ok(content.to_string()),
            (None, Some(path)) => read_text_file(path),
            _ => Err(Error::InvalidArgs(
                "Provide exactly one of --content or --content-file.".to_string(),
            )
            .into()),
        }
    }
}

/// Replace the page text, then return the page as the server now has it.
///
/// Servers that answer the PUT with an empty body are read back once.
pub async fn write_wiki_page_data(
    client: &OpenProjectClient,
    project_ref: &str,
    title: &str,
    text: &str,
    comment: Option<&str>,
) -> Result<(String, WikiPage)> {
    let identifier = client.resolve_project_identifier(project_ref).await?;
    let body = write_payload(text, comment);
    let response = client
        .legacy(
            Method::PUT,
            &page_path(&identifier, title)?,
            Some(&body),
            &[200, 201, 204],
        )
        .await?;

    if super::is_empty_body(&response) {
        log::debug!("empty write response for '{title}', reading the page back");
        return super::read_by_title(client, &identifier, title).await;
    }

    Ok((identifier, WikiPayload::parse(response)?.into_page()))
}

/// Handle the write-wiki-page command
pub async fn handler(options: WriteOptions, global: crate::Global) -> Result<()> {
    let text = options.text()?;
    let config = load_config();
    let project_ref = config.require_project(options.project.as_deref())?;
    let client = OpenProjectClient::from_config(&config)?;

    let (identifier, page) = write_wiki_page_data(
        &client,
        &project_ref,
        &options.title,
        &text,
        options.comment.as_deref(),
    )
    .await?;

    println!(
        "Wrote wiki page '{}' in project '{}' (version: {}).",
        options.title.bold(),
        identifier,
        page.version_label()
    );
    print_debug_json(&page, global.debug_json)
}
