//! HAL (hypermedia) payload shapes and response classification.
//!
//! The server embeds action links in every resource and wraps collections in
//! `_embedded.elements`. Everything here is pure: raw bodies in, typed outcomes out.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;

// ============================================================================
// Links
// ============================================================================

/// A single HAL link handle.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct Link {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

/// The `_links` object of a resource.
///
/// Kept as raw values because some relations are arrays of links; only
/// object-shaped relations are exposed through [`Links::get`].
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(transparent)]
pub struct Links(BTreeMap<String, Value>);

impl Links {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The link object for `rel`, when present and object-shaped.
    pub fn get(&self, rel: &str) -> Option<Link> {
        let value = self.0.get(rel)?;
        if !value.is_object() {
            return None;
        }
        Some(serde_json::from_value(value.clone()).unwrap_or_default())
    }

    /// Non-blank href of `rel`.
    pub fn href(&self, rel: &str) -> Option<String> {
        self.get(rel)
            .and_then(|link| link.href)
            .map(|href| href.trim().to_string())
            .filter(|href| !href.is_empty())
    }

    /// Display label of `rel`: its title, else the last href segment, else `default`.
    pub fn title_or(&self, rel: &str, default: &str) -> String {
        let Some(link) = self.get(rel) else {
            return default.to_string();
        };

        if let Some(title) = link.title.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            return title.to_string();
        }

        link.href
            .as_deref()
            .map(|href| href.trim().trim_end_matches('/'))
            .filter(|href| !href.is_empty())
            .and_then(|href| href.rsplit('/').next())
            .map(str::to_string)
            .unwrap_or_else(|| default.to_string())
    }
}

// ============================================================================
// Formattable text
// ============================================================================

/// Object form of a formattable text field.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Formattable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    #[serde(flatten)]
    pub rest: serde_json::Map<String, Value>,
}

/// Text fields arrive either as plain strings or as `{ "raw": ..., "html": ... }` objects.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum TextValue {
    Plain(String),
    Formattable(Formattable),
    Other(Value),
}

impl TextValue {
    /// Raw markup, or an empty string when the shape carries none.
    pub fn raw(&self) -> &str {
        match self {
            TextValue::Plain(text) => text,
            TextValue::Formattable(text) => text.raw.as_deref().unwrap_or(""),
            TextValue::Other(_) => "",
        }
    }
}

/// Raw text of an optional formattable field.
pub fn text_of(value: Option<&TextValue>) -> &str {
    value.map(TextValue::raw).unwrap_or("")
}

// ============================================================================
// Collections
// ============================================================================

/// One page of a HAL collection, reduced to what the collector needs.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Object-shaped members of `_embedded.elements`.
    pub elements: Vec<Value>,
    /// Items the server reports as consumed by this page.
    pub count: i64,
    /// Whether `_links.nextByOffset` advertises another page.
    pub has_next: bool,
}

/// Object-shaped entries of `_embedded.elements`; anything else yields an empty list.
pub fn embedded_elements(payload: &Value) -> Vec<Value> {
    payload
        .get("_embedded")
        .and_then(|embedded| embedded.get("elements"))
        .and_then(Value::as_array)
        .map(|elements| elements.iter().filter(|e| e.is_object()).cloned().collect())
        .unwrap_or_default()
}

/// Reduce a collection payload to a [`Page`].
///
/// A missing or zero `count` falls back to the number of elements returned.
pub fn parse_page(payload: &Value) -> Page {
    let elements = embedded_elements(payload);
    let reported = payload.get("count").and_then(Value::as_i64).unwrap_or(0);
    let count = if reported == 0 {
        elements.len() as i64
    } else {
        reported
    };
    let has_next = payload
        .get("_links")
        .and_then(|links| links.get("nextByOffset"))
        .is_some_and(Value::is_object);

    Page {
        elements,
        count,
        has_next,
    }
}

/// Walk a nested object path, returning `None` at the first missing key.
pub fn nested<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().try_fold(value, |current, key| current.get(*key))
}

// ============================================================================
// Response classification
// ============================================================================

/// Which API surface a request went to. The legacy surface has its own error wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    Hal,
    Legacy,
}

impl Surface {
    pub fn network_error(self, cause: impl std::fmt::Display) -> Error {
        let message = match self {
            Surface::Hal => format!("Network error while calling OpenProject: {cause}"),
            Surface::Legacy => format!("Network error while calling legacy endpoint: {cause}"),
        };
        Error::Network(message)
    }
}

/// Decode a successful body. Absent or non-JSON bodies become an empty object.
pub fn decode_body(body: &str) -> Value {
    if body.trim().is_empty() {
        return Value::Object(Default::default());
    }
    serde_json::from_str(body).unwrap_or_else(|_| Value::Object(Default::default()))
}

/// Best-effort readable message from an error body.
///
/// Order: top-level `message`, then the joined `_embedded.errors[].message`
/// values, then a generic fallback. Non-JSON bodies are returned as text.
pub fn error_detail(body: &str) -> String {
    let Ok(data) = serde_json::from_str::<Value>(body) else {
        let text = body.trim();
        return if text.is_empty() {
            "No error body returned.".to_string()
        } else {
            text.to_string()
        };
    };

    if let Some(message) = data
        .get("message")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty())
    {
        return message.to_string();
    }

    let messages: Vec<&str> = nested(&data, &["_embedded", "errors"])
        .and_then(Value::as_array)
        .map(|errors| {
            errors
                .iter()
                .filter_map(|err| err.get("message").and_then(Value::as_str))
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .collect()
        })
        .unwrap_or_default();

    if !messages.is_empty() {
        return messages.join("; ");
    }

    "Unexpected error format returned by server.".to_string()
}

/// Turn a status outside the expected set into the matching [`Error`].
pub fn classify_failure(surface: Surface, method: &str, path: &str, status: u16, body: &str) -> Error {
    if status == 401 || status == 403 {
        let message = match surface {
            Surface::Hal => "Authentication failed. Check OPENPROJECT_BASE_URL, OPENPROJECT_API_TOKEN, \
                             and token permissions."
                .to_string(),
            Surface::Legacy => "Legacy wiki endpoint rejected authentication. \
                                Use OPENPROJECT_AUTH_MODE=basic with OPENPROJECT_USERNAME/OPENPROJECT_PASSWORD, \
                                or verify legacy wiki API access for your token."
                .to_string(),
        };
        return Error::Auth { message, status };
    }

    let detail = error_detail(body);
    let method = method.to_uppercase();
    let message = match surface {
        Surface::Hal => format!("OpenProject API error {status} for {method} {path}: {detail}"),
        Surface::Legacy => {
            format!("OpenProject legacy API error {status} for {method} {path}: {detail}")
        }
    };
    Error::Api { message, status }
}
