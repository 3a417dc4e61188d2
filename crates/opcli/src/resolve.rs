//! Turning human references into server entities.
//!
//! Each resolver fetches what it needs and delegates matching to
//! [`opcli_core::resolve`].

use reqwest::Method;
use serde_json::json;

use opcli_core::fallback::{type_candidates, WORKFLOW_FORM_FALLBACK};
use opcli_core::hal::embedded_elements;
use opcli_core::models::{from_values, CatalogEntry, Project, WorkPackage};
use opcli_core::paths::{api_href, extract_numeric_id_from_href, to_api_path};
use opcli_core::resolve::{
    allowed_statuses, entry_names, find_named, match_named, match_project, match_user,
    parse_user_target, unknown_user, user_ref, users_listing_forbidden, RefKind, ResolvedRef,
    UserTarget,
};
use opcli_core::Result;

use crate::client::{OpenProjectClient, PROJECT_LOOKUP_LIMIT, USER_LOOKUP_LIMIT};

impl OpenProjectClient {
    /// Resolve a project by numeric id, identifier, or exact name.
    pub async fn resolve_project(&self, reference: &str) -> Result<Project> {
        if reference.trim().is_empty() {
            // Fail before fetching anything.
            return match_project(&[], reference).cloned();
        }
        let projects = self.projects(PROJECT_LOOKUP_LIMIT).await?;
        match_project(&projects, reference).cloned()
    }

    /// Identifier of the referenced project, else its id.
    pub async fn resolve_project_identifier(&self, reference: &str) -> Result<String> {
        self.resolve_project(reference).await?.stable_identifier()
    }

    /// Resolve a type name, preferring the project's own types.
    pub async fn resolve_type(&self, project_id: Option<u64>, name: &str) -> Result<ResolvedRef> {
        let mut available = Vec::new();

        for candidate in type_candidates(project_id) {
            let payload = match self.get(&candidate.path).await {
                Ok(payload) => payload,
                Err(err) if candidate.should_skip(&err) => continue,
                Err(err) => return Err(err),
            };

            let types: Vec<CatalogEntry> = from_values(embedded_elements(&payload))?;
            if let Some(found) = find_named(&types, name, RefKind::Type) {
                return Ok(found);
            }
            available.extend(entry_names(&types));
        }

        Err(RefKind::Type.not_found(name, &available))
    }

    pub async fn resolve_status(&self, name: &str) -> Result<ResolvedRef> {
        match_named(&self.statuses().await?, name, RefKind::Status)
    }

    pub async fn resolve_priority(&self, name: &str) -> Result<ResolvedRef> {
        match_named(&self.priorities().await?, name, RefKind::Priority)
    }

    /// Resolve a status among the transitions the workflow allows for `wp`.
    ///
    /// Uses the work package form; falls back to the global status list when
    /// the form is unavailable or carries no transition data.
    pub async fn resolve_allowed_status(&self, wp: &WorkPackage, name: &str) -> Result<ResolvedRef> {
        let lock_version = wp.require_lock_version()?;

        let Some(form_href) = wp.links.href("update") else {
            return self.resolve_status(name).await;
        };

        let form = match self
            .request(
                Method::POST,
                &to_api_path(&form_href),
                &[],
                Some(&json!({ "lockVersion": lock_version })),
                &[200],
            )
            .await
        {
            Ok(form) => form,
            Err(err) if err.has_status(WORKFLOW_FORM_FALLBACK) => {
                log::debug!("work package form unavailable ({err}), using global statuses");
                return self.resolve_status(name).await;
            }
            Err(err) => return Err(err),
        };

        let Some(allowed) = allowed_statuses(&form) else {
            return self.resolve_status(name).await;
        };

        if let Some(found) = find_named(&allowed, name, RefKind::AllowedStatus) {
            return Ok(found);
        }

        let names = entry_names(&allowed);
        if names.is_empty() {
            return self.resolve_status(name).await;
        }
        Err(RefKind::AllowedStatus.not_found(name, &names))
    }

    /// Resolve an assignee by numeric id, login, or display name.
    pub async fn resolve_user(&self, reference: &str) -> Result<ResolvedRef> {
        match parse_user_target(reference)? {
            UserTarget::Id(id) => {
                let user = self.user(id).await?;
                Ok(ResolvedRef {
                    name: user.display_name(),
                    href: api_href("users", id),
                })
            }
            UserTarget::Name(target) => {
                let users = match self.users(USER_LOOKUP_LIMIT).await {
                    Ok(users) => users,
                    Err(err) if err.status_code() == Some(403) => {
                        return Err(users_listing_forbidden())
                    }
                    Err(err) => return Err(err),
                };

                match match_user(&users, &target) {
                    Some(user) => user_ref(user),
                    None => Err(unknown_user(reference, &users)),
                }
            }
        }
    }

    /// Numeric project id parsed from a work package's project link.
    pub fn project_id_of(wp: &WorkPackage) -> Option<u64> {
        wp.links
            .href("project")
            .and_then(|href| extract_numeric_id_from_href(&href, "projects"))
    }
}
