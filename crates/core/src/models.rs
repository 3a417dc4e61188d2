//! Typed views over the resources returned by the hypermedia API.
//!
//! Optional keys default to `None`; unknown keys are kept in `extra` so a
//! model serializes back to the payload it came from (used by `--debug-json`).

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::hal::{text_of, Links, TextValue};
use crate::paths::api_href;

/// Decode a raw JSON resource into a typed model.
pub fn from_value<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| Error::InvalidResponse(e.to_string()))
}

/// Decode a list of raw resources.
pub fn from_values<T: DeserializeOwned>(values: Vec<Value>) -> Result<Vec<T>> {
    values.into_iter().map(from_value).collect()
}

fn trimmed(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

// ============================================================================
// Project
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct Project {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "_links", default, skip_serializing_if = "Links::is_empty")]
    pub links: Links,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Project {
    pub fn identifier(&self) -> Option<&str> {
        trimmed(self.identifier.as_deref())
    }

    pub fn name(&self) -> Option<&str> {
        trimmed(self.name.as_deref())
    }

    /// Numeric id, required for project-scoped endpoints.
    pub fn require_id(&self) -> Result<u64> {
        self.id
            .ok_or_else(|| Error::InvalidResponse("project payload did not include an id".into()))
    }

    /// Short label for headers: identifier, else name, else id.
    pub fn label(&self) -> String {
        self.identifier()
            .or(self.name())
            .map(str::to_string)
            .or_else(|| self.id.map(|id| id.to_string()))
            .unwrap_or_else(|| "-".to_string())
    }

    /// Human label for reports: name, else identifier, else id.
    pub fn display_name(&self) -> String {
        self.name()
            .or(self.identifier())
            .map(str::to_string)
            .or_else(|| self.id.map(|id| id.to_string()))
            .unwrap_or_else(|| "-".to_string())
    }

    /// Stable reference for legacy paths: identifier, else id.
    pub fn stable_identifier(&self) -> Result<String> {
        if let Some(identifier) = self.identifier() {
            return Ok(identifier.to_string());
        }
        self.id.map(|id| id.to_string()).ok_or_else(|| {
            Error::InvalidResponse("Resolved project does not include identifier or id.".into())
        })
    }

    pub fn self_href(&self) -> Result<String> {
        if let Some(href) = self.links.href("self") {
            return Ok(href);
        }
        Ok(api_href("projects", self.require_id()?))
    }
}

// ============================================================================
// Work package
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkPackage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<TextValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_version: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(rename = "_links", default, skip_serializing_if = "Links::is_empty")]
    pub links: Links,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WorkPackage {
    pub fn id_label(&self) -> String {
        self.id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "?".to_string())
    }

    pub fn subject(&self) -> &str {
        self.subject.as_deref().unwrap_or("(no subject)")
    }

    pub fn description(&self) -> &str {
        text_of(self.description.as_ref())
    }

    pub fn status(&self) -> String {
        self.links.title_or("status", "-")
    }

    pub fn assignee(&self) -> String {
        self.links.title_or("assignee", "Unassigned")
    }

    /// The optimistic-concurrency token every mutation must echo back.
    pub fn require_lock_version(&self) -> Result<i64> {
        self.lock_version.ok_or_else(|| {
            Error::InvalidResponse("Work package payload did not include lockVersion.".into())
        })
    }
}

// ============================================================================
// Status, type, priority
// ============================================================================

/// A named reference entity (status, type or priority).
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_closed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_milestone: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
    #[serde(rename = "_links", default, skip_serializing_if = "Links::is_empty")]
    pub links: Links,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CatalogEntry {
    pub fn name(&self) -> Option<&str> {
        trimmed(self.name.as_deref())
    }

    /// Self href, else the canonical href built from `resource` and the id.
    pub fn href_in(&self, resource: &str) -> String {
        self.links.href("self").unwrap_or_else(|| {
            api_href(
                resource,
                self.id.map(|id| id.to_string()).unwrap_or_else(|| "None".to_string()),
            )
        })
    }
}

// ============================================================================
// User
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(rename = "_links", default, skip_serializing_if = "Links::is_empty")]
    pub links: Links,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    fn full_name(&self) -> Option<String> {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .filter_map(trimmed)
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }

    /// Preferred display name: name, "first last", login, id, else `-`.
    pub fn display_name(&self) -> String {
        trimmed(self.name.as_deref())
            .map(str::to_string)
            .or_else(|| self.full_name())
            .or_else(|| trimmed(self.login.as_deref()).map(str::to_string))
            .or_else(|| self.id.map(|id| id.to_string()))
            .unwrap_or_else(|| "-".to_string())
    }

    pub fn login(&self) -> &str {
        trimmed(self.login.as_deref()).unwrap_or("-")
    }

    /// Keys a human might type to refer to this user, in match order.
    pub fn identity_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = [
            self.name.as_deref(),
            self.login.as_deref(),
            self.first_name.as_deref(),
            self.last_name.as_deref(),
        ]
        .into_iter()
        .filter_map(trimmed)
        .map(str::to_string)
        .collect();

        if let Some(full) = self.full_name() {
            keys.push(full);
        }
        if let Some(id) = self.id {
            keys.push(id.to_string());
        }
        keys
    }
}

// ============================================================================
// Relation
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct Relation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub relation_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lag: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "_links", default, skip_serializing_if = "Links::is_empty")]
    pub links: Links,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
