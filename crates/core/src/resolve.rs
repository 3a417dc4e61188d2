//! Matching human references against lists fetched from the server.
//!
//! The shell fetches; these functions decide. Every resolver returns a
//! [`ResolvedRef`] whose `href` is what mutation payloads link to.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::error::{Error, Result};
use crate::hal::nested;
use crate::models::{from_value, CatalogEntry, Project, User};
use crate::paths::api_href;

/// A resolved entity: display name plus canonical link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRef {
    pub name: String,
    pub href: String,
}

fn sorted_unique<I: IntoIterator<Item = String>>(values: I) -> Vec<String> {
    values.into_iter().collect::<BTreeSet<_>>().into_iter().collect()
}

// ============================================================================
// Projects
// ============================================================================

/// Find a project by numeric id, identifier, or exact name.
///
/// The rules are tried in that order, each across the whole list, so an id
/// match always beats a project whose name happens to be the same digits.
pub fn match_project<'a>(projects: &'a [Project], reference: &str) -> Result<&'a Project> {
    let target = reference.trim();
    if target.is_empty() {
        return Err(Error::config("Project value is empty."));
    }
    if projects.is_empty() {
        return Err(Error::resolve("No projects were returned by OpenProject."));
    }

    let lowered = target.to_lowercase();
    let by_id = target
        .parse::<u64>()
        .ok()
        .filter(|_| target.chars().all(|c| c.is_ascii_digit()))
        .and_then(|id| projects.iter().find(|p| p.id == Some(id)));

    by_id
        .or_else(|| {
            projects
                .iter()
                .find(|p| p.identifier().is_some_and(|i| i.to_lowercase() == lowered))
        })
        .or_else(|| {
            projects
                .iter()
                .find(|p| p.name().is_some_and(|n| n.to_lowercase() == lowered))
        })
        .ok_or_else(|| {
            Error::resolve(
                "Could not resolve project. Provide a valid project ID or identifier, \
                 or set OPENPROJECT_DEFAULT_PROJECT.",
            )
        })
}

// ============================================================================
// Types, statuses, priorities
// ============================================================================

/// Which kind of named reference is being resolved. Drives hrefs and messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    Type,
    Status,
    Priority,
    /// A status restricted to the transitions the workflow allows.
    AllowedStatus,
}

impl RefKind {
    pub fn resource(self) -> &'static str {
        match self {
            RefKind::Type => "types",
            RefKind::Status | RefKind::AllowedStatus => "statuses",
            RefKind::Priority => "priorities",
        }
    }

    /// Error for a reference that matched none of `available` names.
    pub fn not_found(self, target: &str, available: &[String]) -> Error {
        if available.is_empty() {
            return Error::resolve(match self {
                RefKind::Type => {
                    "Could not resolve type list from OpenProject. Check permissions for reading types."
                }
                RefKind::Status | RefKind::AllowedStatus => "No statuses were returned by OpenProject.",
                RefKind::Priority => "No priorities were returned by OpenProject.",
            });
        }

        let hint = sorted_unique(available.iter().cloned()).join(", ");
        Error::resolve(match self {
            RefKind::Type => format!("Unknown type '{target}'. Available types: {hint}"),
            RefKind::Status => format!("Unknown status '{target}'. Available statuses: {hint}"),
            RefKind::Priority => {
                format!("Unknown priority '{target}'. Available priorities: {hint}")
            }
            RefKind::AllowedStatus => format!(
                "Status '{target}' is not an allowed transition for this work package. \
                 Allowed statuses: {hint}"
            ),
        })
    }
}

/// Non-blank names of `entries`, in source order.
pub fn entry_names(entries: &[CatalogEntry]) -> Vec<String> {
    entries
        .iter()
        .filter_map(CatalogEntry::name)
        .map(str::to_string)
        .collect()
}

/// First entry whose name equals `target`, ignoring case and surrounding space.
pub fn find_named(entries: &[CatalogEntry], target: &str, kind: RefKind) -> Option<ResolvedRef> {
    let lowered = target.trim().to_lowercase();
    entries.iter().find_map(|entry| {
        let name = entry.name()?;
        (name.to_lowercase() == lowered).then(|| ResolvedRef {
            name: name.to_string(),
            href: entry.href_in(kind.resource()),
        })
    })
}

/// Resolve against a single list, failing with the kind's message on no match.
pub fn match_named(entries: &[CatalogEntry], target: &str, kind: RefKind) -> Result<ResolvedRef> {
    find_named(entries, target, kind).ok_or_else(|| kind.not_found(target, &entry_names(entries)))
}

/// Statuses the work package form allows as the next transition.
///
/// `None` means the form carries no usable transition data and the caller
/// should fall back to the global status list.
pub fn allowed_statuses(form: &Value) -> Option<Vec<CatalogEntry>> {
    let schema = nested(form, &["_embedded", "schema", "status"]).filter(|s| s.is_object())?;
    let values = nested(schema, &["_embedded", "allowedValues"])?.as_array()?;
    if values.is_empty() {
        return None;
    }

    Some(
        values
            .iter()
            .filter(|v| v.is_object())
            .filter_map(|v| from_value::<CatalogEntry>(v.clone()).ok())
            .collect(),
    )
}

// ============================================================================
// Users
// ============================================================================

/// How an assignee reference will be looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserTarget {
    Id(u64),
    Name(String),
}

pub fn parse_user_target(reference: &str) -> Result<UserTarget> {
    let target = reference.trim();
    if target.is_empty() {
        return Err(Error::config("Assignee value is empty."));
    }
    if target.chars().all(|c| c.is_ascii_digit()) {
        if let Ok(id) = target.parse() {
            return Ok(UserTarget::Id(id));
        }
    }
    Ok(UserTarget::Name(target.to_string()))
}

/// First user with an exact identity-key match, else the first with a substring match.
pub fn match_user<'a>(users: &'a [User], target: &str) -> Option<&'a User> {
    let needle = target.trim().to_lowercase();
    let mut partial = None;

    for user in users {
        let keys: Vec<String> = user.identity_keys().iter().map(|k| k.to_lowercase()).collect();
        if keys.iter().any(|k| *k == needle) {
            return Some(user);
        }
        if partial.is_none() && keys.iter().any(|k| k.contains(&needle)) {
            partial = Some(user);
        }
    }

    partial
}

/// Up to 12 sorted display names, for error hints.
pub fn known_users_hint(users: &[User]) -> String {
    let names: Vec<String> = sorted_unique(
        users
            .iter()
            .map(User::display_name)
            .filter(|name| !name.is_empty() && name != "-"),
    );
    if names.is_empty() {
        return "No visible users found.".to_string();
    }
    names.into_iter().take(12).collect::<Vec<_>>().join(", ")
}

pub fn unknown_user(reference: &str, users: &[User]) -> Error {
    Error::resolve(format!(
        "Unknown user '{reference}'. Use numeric user ID, login, or exact display name. Known users: {}",
        known_users_hint(users)
    ))
}

pub fn users_listing_forbidden() -> Error {
    Error::resolve(
        "Cannot resolve assignee by name because user listing is not permitted. \
         Use numeric --assignee <user_id> or request permission to list users.",
    )
}

/// Canonical reference for a matched user.
pub fn user_ref(user: &User) -> Result<ResolvedRef> {
    let href = user
        .links
        .href("self")
        .or_else(|| user.id.map(|id| api_href("users", id)))
        .ok_or_else(|| Error::resolve("Resolved user did not include a self href or id."))?;

    Ok(ResolvedRef {
        name: user.display_name(),
        href,
    })
}
