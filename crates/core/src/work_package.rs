//! Work package mutations: input validation and payload construction.
//!
//! Nothing here talks to the server. The shell resolves references into hrefs
//! and then asks this module for the exact JSON body and path to send.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use serde_json::{json, Map, Value};

use crate::error::{Error, Result};
use crate::models::{User, WorkPackage};
use crate::paths::{api_href, to_api_path};

pub const DEFAULT_TYPE: &str = "Task";

// ============================================================================
// Validation
// ============================================================================

fn iso_date_shape() -> &'static Regex {
    static SHAPE: OnceLock<Regex> = OnceLock::new();
    SHAPE.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date regex"))
}

/// Accept exactly `YYYY-MM-DD` naming a real calendar day.
pub fn ensure_iso_date(value: &str, arg_name: &str) -> Result<String> {
    let trimmed = value.trim();
    let valid = iso_date_shape().is_match(trimmed)
        && NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").is_ok();
    if valid {
        Ok(trimmed.to_string())
    } else {
        Err(Error::config(format!("{arg_name} must be in YYYY-MM-DD format.")))
    }
}

// ============================================================================
// Relations
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RelationType {
    Relates,
    Duplicates,
    Duplicated,
    Blocks,
    Blocked,
    Precedes,
    Follows,
    Includes,
    PartOf,
    Requires,
    Required,
}

impl RelationType {
    pub const ALL: [RelationType; 11] = [
        RelationType::Relates,
        RelationType::Duplicates,
        RelationType::Duplicated,
        RelationType::Blocks,
        RelationType::Blocked,
        RelationType::Precedes,
        RelationType::Follows,
        RelationType::Includes,
        RelationType::PartOf,
        RelationType::Requires,
        RelationType::Required,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RelationType::Relates => "relates",
            RelationType::Duplicates => "duplicates",
            RelationType::Duplicated => "duplicated",
            RelationType::Blocks => "blocks",
            RelationType::Blocked => "blocked",
            RelationType::Precedes => "precedes",
            RelationType::Follows => "follows",
            RelationType::Includes => "includes",
            RelationType::PartOf => "partof",
            RelationType::Requires => "requires",
            RelationType::Required => "required",
        }
    }

    /// Wire names in alphabetical order, for help and error text.
    pub fn allowed_names() -> Vec<&'static str> {
        let mut names: Vec<&'static str> = Self::ALL.iter().map(|r| r.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == wanted)
            .ok_or_else(|| {
                Error::config(format!(
                    "Unsupported relation type '{s}'. Allowed types: {}",
                    Self::allowed_names().join(", ")
                ))
            })
    }
}

/// Body for `POST /work_packages/{from}/relations`.
pub fn relation_payload(
    kind: RelationType,
    to_id: u64,
    description: Option<&str>,
    lag: Option<i64>,
) -> Result<Value> {
    let mut payload = json!({
        "type": kind.as_str(),
        "_links": { "to": { "href": api_href("work_packages", to_id) } },
    });
    if let Some(description) = description {
        payload["description"] = json!(description);
    }
    if let Some(lag) = lag {
        if lag < 0 {
            return Err(Error::config("--lag must be zero or greater."));
        }
        payload["lag"] = json!(lag);
    }
    Ok(payload)
}

/// `filters` query value for the global relations endpoint.
pub fn involved_filter(work_package_id: u64) -> String {
    json!([{ "involved": { "operator": "=", "values": [work_package_id.to_string()] } }]).to_string()
}

// ============================================================================
// Create / update
// ============================================================================

/// Body for `POST /work_packages`.
pub fn create_payload(
    subject: &str,
    project_href: &str,
    type_href: &str,
    description: Option<&str>,
) -> Value {
    let mut payload = json!({
        "subject": subject,
        "_links": {
            "project": { "href": project_href },
            "type": { "href": type_href },
        },
    });
    if let Some(description) = description.filter(|d| !d.is_empty()) {
        payload["description"] = json!({ "raw": description });
    }
    payload
}

/// Body for a status-only PATCH.
pub fn status_payload(lock_version: i64, status_href: &str) -> Value {
    json!({
        "lockVersion": lock_version,
        "_links": { "status": { "href": status_href } },
    })
}

/// Where mutations of `wp` are sent: its `updateImmediately` link, else the canonical path.
pub fn patch_path(wp: &WorkPackage, id: u64) -> String {
    wp.links
        .href("updateImmediately")
        .map(|href| to_api_path(&href))
        .unwrap_or_else(|| format!("/work_packages/{id}"))
}

/// Fields requested by `update-work-package`, as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateFields {
    pub subject: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub assignee: Option<String>,
    pub priority: Option<String>,
    pub work_type: Option<String>,
    pub start_date: Option<String>,
    pub due_date: Option<String>,
}

impl UpdateFields {
    pub fn is_empty(&self) -> bool {
        [
            &self.subject,
            &self.description,
            &self.status,
            &self.assignee,
            &self.priority,
            &self.work_type,
            &self.start_date,
            &self.due_date,
        ]
        .iter()
        .all(|field| field.is_none())
    }

    /// Reject an empty request and normalize the date fields. Runs before any network call.
    pub fn validated(mut self) -> Result<Self> {
        if self.is_empty() {
            return Err(Error::config("Provide at least one field to update."));
        }
        self.start_date = validated_date(self.start_date, "--start-date")?;
        self.due_date = validated_date(self.due_date, "--due-date")?;
        Ok(self)
    }
}

fn validated_date(value: Option<String>, arg_name: &str) -> Result<Option<String>> {
    match value.as_deref().filter(|v| !v.is_empty()) {
        Some(date) => ensure_iso_date(date, arg_name).map(Some),
        None => Ok(None),
    }
}

/// Link targets resolved by the shell for an update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkUpdates {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub assignee: Option<String>,
    pub work_type: Option<String>,
}

/// Body for a multi-field PATCH.
pub fn update_payload(lock_version: i64, fields: &UpdateFields, links: &LinkUpdates) -> Result<Value> {
    let mut payload = Map::new();
    payload.insert("lockVersion".into(), json!(lock_version));

    if let Some(subject) = &fields.subject {
        payload.insert("subject".into(), json!(subject));
    }
    if let Some(description) = &fields.description {
        payload.insert("description".into(), json!({ "raw": description }));
    }
    if let Some(start) = &fields.start_date {
        payload.insert("startDate".into(), json!(start));
    }
    if let Some(due) = &fields.due_date {
        payload.insert("dueDate".into(), json!(due));
    }

    let link_fields = [
        ("status", &links.status),
        ("priority", &links.priority),
        ("assignee", &links.assignee),
        ("type", &links.work_type),
    ];
    let mut link_map = Map::new();
    for (rel, href) in link_fields {
        if let Some(href) = href {
            link_map.insert(rel.into(), json!({ "href": href }));
        }
    }
    if !link_map.is_empty() {
        payload.insert("_links".into(), Value::Object(link_map));
    }

    if payload.len() <= 1 {
        return Err(Error::config("No fields provided to update."));
    }
    Ok(Value::Object(payload))
}

// ============================================================================
// Comments
// ============================================================================

/// One way of attaching a comment, tried in order by the shell.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentAttempt {
    pub method: &'static str,
    pub path: String,
    pub body: Value,
    pub expected: &'static [u16],
}

/// The strategies that apply to `wp`, most specific first.
///
/// 1. The advertised `addComment` action, when it uses POST or PATCH.
/// 2. A PATCH carrying the comment, when the lock version is known.
/// 3. A POST to the activities collection. Always present.
pub fn plan_comment_attempts(wp: &WorkPackage, id: u64, comment: &str) -> Vec<CommentAttempt> {
    let mut attempts = Vec::with_capacity(3);
    let body = json!({ "comment": { "raw": comment } });

    if let Some(link) = wp.links.get("addComment") {
        let method = link.method.as_deref().unwrap_or("post").to_uppercase();
        let method = match method.as_str() {
            "POST" => Some("POST"),
            "PATCH" => Some("PATCH"),
            _ => None,
        };
        if let (Some(method), Some(href)) = (method, link.href.filter(|h| !h.trim().is_empty())) {
            attempts.push(CommentAttempt {
                method,
                path: to_api_path(&href),
                body: body.clone(),
                expected: &[200, 201],
            });
        }
    }

    if let Some(lock_version) = wp.lock_version {
        attempts.push(CommentAttempt {
            method: "PATCH",
            path: patch_path(wp, id),
            body: json!({ "lockVersion": lock_version, "comment": { "raw": comment } }),
            expected: &[200],
        });
    }

    let activities = wp
        .links
        .href("activities")
        .map(|href| to_api_path(&href))
        .unwrap_or_else(|| format!("/work_packages/{id}/activities"));
    attempts.push(CommentAttempt {
        method: "POST",
        path: activities,
        body,
        expected: &[200, 201],
    });

    attempts
}

pub const COMMENT_UNAVAILABLE: &str = "Unable to add comment. API v3 comment creation is not \
    available via addComment, PATCH comment, or activities endpoint on this server/version.";

// ============================================================================
// Listing
// ============================================================================

/// Server-side filter hints for a project work package listing.
pub fn listing_hints(status: Option<&str>, assignee: Option<&str>) -> Vec<(String, String)> {
    let mut params = Vec::new();
    if let Some(status) = status.filter(|s| !s.is_empty()) {
        params.push(("status".to_string(), status.to_string()));
    }
    if let Some(assignee) = assignee.filter(|a| !a.is_empty()) {
        params.push(("assignee".to_string(), assignee.to_string()));
    }
    params
}

/// Case-insensitive substring filters on status and assignee titles.
pub fn filter_work_packages(
    work_packages: Vec<WorkPackage>,
    status: Option<&str>,
    assignee: Option<&str>,
) -> Vec<WorkPackage> {
    let status_query = status.unwrap_or("").trim().to_lowercase();
    let assignee_query = assignee.unwrap_or("").trim().to_lowercase();

    work_packages
        .into_iter()
        .filter(|wp| {
            let status = wp.links.title_or("status", "").trim().to_lowercase();
            let assignee = wp.links.title_or("assignee", "unassigned").trim().to_lowercase();
            (status_query.is_empty() || status.contains(&status_query))
                && (assignee_query.is_empty() || assignee.contains(&assignee_query))
        })
        .collect()
}

/// Case-insensitive substring filter over the user's identity keys.
pub fn filter_users(users: Vec<User>, query: Option<&str>) -> Vec<User> {
    let needle = query.unwrap_or("").trim().to_lowercase();
    if needle.is_empty() {
        return users;
    }
    users
        .into_iter()
        .filter(|user| {
            user.identity_keys()
                .iter()
                .any(|key| key.to_lowercase().contains(&needle))
        })
        .collect()
}
