//! Wiki pages over the legacy JSON surface (and HAL metadata by id).

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::Result;
use crate::hal::{text_of, Links, TextValue};
use crate::models::{from_value, Project};
use crate::paths::{encode_segment, encode_wiki_title};

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct WikiEmbedded {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<Project>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct WikiPage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_on: Option<String>,
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(rename = "_embedded", default, skip_serializing_if = "Option::is_none")]
    pub embedded: Option<WikiEmbedded>,
    #[serde(rename = "_links", default, skip_serializing_if = "Links::is_empty")]
    pub links: Links,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WikiPage {
    pub fn text(&self) -> &str {
        text_of(self.text.as_ref())
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.is_empty())
    }

    pub fn title_or(&self, default: &str) -> String {
        self.title().unwrap_or(default).to_string()
    }

    pub fn version_label(&self) -> String {
        match &self.version {
            None | Some(Value::Null) => "-".to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    /// Legacy `updated_on`, else HAL `updatedAt`.
    pub fn updated(&self) -> Option<&str> {
        self.updated_on
            .as_deref()
            .filter(|v| !v.is_empty())
            .or(self.updated_at.as_deref())
    }

    /// Project reference usable for a legacy read of this page.
    ///
    /// Embedded identifier, else embedded id, else the project link title.
    pub fn project_ref(&self) -> Option<String> {
        let embedded = self.embedded.as_ref().and_then(|e| e.project.as_ref());
        embedded
            .and_then(|p| p.identifier().map(str::to_string))
            .or_else(|| embedded.and_then(|p| p.id).map(|id| id.to_string()))
            .or_else(|| {
                let title = self.links.title_or("project", "");
                (!title.is_empty()).then_some(title)
            })
    }
}

/// The two shapes a legacy wiki response comes in.
#[derive(Debug, Clone, PartialEq)]
pub enum WikiPayload {
    Wrapped(WikiPage),
    Bare(WikiPage),
}

impl WikiPayload {
    pub fn parse(payload: Value) -> Result<Self> {
        match payload {
            Value::Object(mut map) if map.get("wiki_page").is_some_and(Value::is_object) => {
                let inner = map.remove("wiki_page").unwrap_or_default();
                Ok(WikiPayload::Wrapped(from_value(inner)?))
            }
            other => Ok(WikiPayload::Bare(from_value(other)?)),
        }
    }

    pub fn into_page(self) -> WikiPage {
        match self {
            WikiPayload::Wrapped(page) | WikiPayload::Bare(page) => page,
        }
    }
}

/// Object-shaped entries of the legacy `wiki_pages` index.
pub fn index_pages(payload: &Value) -> Vec<WikiPage> {
    payload
        .get("wiki_pages")
        .and_then(Value::as_array)
        .map(|pages| {
            pages
                .iter()
                .filter(|p| p.is_object())
                .filter_map(|p| from_value(p.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

pub fn index_path(project_identifier: &str) -> String {
    format!("/projects/{}/wiki/index.json", encode_segment(project_identifier))
}

pub fn page_path(project_identifier: &str, title: &str) -> Result<String> {
    Ok(format!(
        "/projects/{}/wiki/{}.json",
        encode_segment(project_identifier),
        encode_wiki_title(title)?
    ))
}

/// Body for the legacy PUT. Blank comments are omitted.
pub fn write_payload(text: &str, comment: Option<&str>) -> Value {
    let mut page = json!({ "text": text });
    if let Some(comment) = comment.filter(|c| !c.is_empty()) {
        page["comments"] = json!(comment);
    }
    json!({ "wiki_page": page })
}

/// File content written by `read-wiki-page --output` when the server returned no text.
pub fn placeholder_content(title: &str) -> String {
    format!("# {title}\n\n(No wiki text returned by API.)\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wrapped_and_bare() {
        let wrapped = WikiPayload::parse(json!({
            "wiki_page": { "title": "Home", "text": "Hello", "version": 3 }
        }))
        .unwrap();
        assert!(matches!(wrapped, WikiPayload::Wrapped(_)));
        let page = wrapped.into_page();
        assert_eq!(page.text(), "Hello");
        assert_eq!(page.version_label(), "3");

        let bare = WikiPayload::parse(json!({ "title": "Home", "text": { "raw": "Raw body" } })).unwrap();
        assert!(matches!(bare, WikiPayload::Bare(_)));
        assert_eq!(bare.into_page().text(), "Raw body");
    }

    #[test]
    fn test_non_object_wiki_page_is_bare() {
        let parsed = WikiPayload::parse(json!({ "wiki_page": "oops", "title": "X" })).unwrap();
        assert!(matches!(parsed, WikiPayload::Bare(_)));
    }

    #[test]
    fn test_index_pages() {
        let pages = index_pages(&json!({
            "wiki_pages": [
                { "title": "Home", "version": 1, "updated_on": "2026-01-02T10:00:00Z" },
                "skip me",
                { "title": "Roadmap", "updatedAt": "2026-01-03T10:00:00Z" }
            ]
        }));
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].updated(), Some("2026-01-02T10:00:00Z"));
        assert_eq!(pages[1].updated(), Some("2026-01-03T10:00:00Z"));
        assert_eq!(pages[1].version_label(), "-");

        assert!(index_pages(&json!({ "wiki_pages": "nope" })).is_empty());
        assert!(index_pages(&json!({})).is_empty());
    }

    #[test]
    fn test_paths() {
        assert_eq!(index_path("know malawi"), "/projects/know%20malawi/wiki/index.json");
        assert_eq!(
            page_path("demo", "Release Notes").unwrap(),
            "/projects/demo/wiki/Release%20Notes.json"
        );
        assert!(page_path("demo", " ").is_err());
    }

    #[test]
    fn test_write_payload() {
        assert_eq!(
            write_payload("Body", Some("typo fix")),
            json!({ "wiki_page": { "text": "Body", "comments": "typo fix" } })
        );
        assert_eq!(write_payload("Body", Some("")), json!({ "wiki_page": { "text": "Body" } }));
    }

    #[test]
    fn test_project_ref_precedence() {
        let page: WikiPage = from_value(json!({
            "_embedded": { "project": { "id": 3, "identifier": "demo" } },
            "_links": { "project": { "title": "Demo Project" } }
        }))
        .unwrap();
        assert_eq!(page.project_ref().as_deref(), Some("demo"));

        let by_id: WikiPage = from_value(json!({ "_embedded": { "project": { "id": 3 } } })).unwrap();
        assert_eq!(by_id.project_ref().as_deref(), Some("3"));

        let by_title: WikiPage =
            from_value(json!({ "_links": { "project": { "title": "Demo Project" } } })).unwrap();
        assert_eq!(by_title.project_ref().as_deref(), Some("Demo Project"));

        assert_eq!(WikiPage::default().project_ref(), None);
    }

    #[test]
    fn test_placeholder_content() {
        assert_eq!(
            placeholder_content("Home"),
            "# Home\n\n(No wiki text returned by API.)\n"
        );
    }
}
