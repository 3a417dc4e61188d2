//! Wiki pages, read and written through the legacy JSON endpoints.
//!
//! The hypermedia API only exposes wiki metadata on most servers, so page text
//! always goes through `/projects/{identifier}/wiki/{title}.json` with the same
//! credentials.

pub mod list;
pub mod read;
pub mod write;

use reqwest::Method;
use serde_json::Value;

use opcli_core::wiki::{page_path, WikiPage, WikiPayload};

use crate::client::OpenProjectClient;
use crate::prelude::*;

/// Read a page by project reference and title. Returns the resolved project identifier too.
pub async fn read_by_title(
    client: &OpenProjectClient,
    project_ref: &str,
    title: &str,
) -> Result<(String, WikiPage)> {
    let identifier = client.resolve_project_identifier(project_ref).await?;
    let payload = client
        .legacy(Method::GET, &page_path(&identifier, title)?, None, &[200])
        .await?;
    Ok((identifier, WikiPayload::parse(payload)?.into_page()))
}

fn is_empty_body(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}
