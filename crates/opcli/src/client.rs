//! Authenticated access to the OpenProject HAL API and its legacy JSON surface.
//!
//! One [`OpenProjectClient`] is built per process. Every call is awaited before
//! the next one is issued; the only retries are the endpoint fallbacks the
//! callers spell out.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;

use opcli_core::config::{ApiSettings, Config};
use opcli_core::fallback::{type_candidates, FILTER_HINT_REJECTIONS};
use opcli_core::hal::{classify_failure, decode_body, embedded_elements, parse_page, Surface};
use opcli_core::models::{from_value, from_values, CatalogEntry, Project, User, WorkPackage};
use opcli_core::pagination::{split_page_size, Pager};
use opcli_core::paths::{to_legacy_path, API_PREFIX};
use opcli_core::work_package::listing_hints;
use opcli_core::{Error, Result};

use crate::prelude::f;

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Projects fetched when resolving a project reference.
pub const PROJECT_LOOKUP_LIMIT: usize = 500;

/// Users fetched when resolving an assignee by name.
pub const USER_LOOKUP_LIMIT: usize = 500;

const USER_AGENT_VALUE: &str = concat!("opcli/", env!("CARGO_PKG_VERSION"));

/// Read `OPENPROJECT_*` settings from the process environment.
pub fn load_config() -> Config {
    Config::from_lookup(|key| std::env::var(key).ok())
}

#[derive(Debug, Clone)]
pub struct OpenProjectClient {
    http: reqwest::Client,
    base_url: String,
}

impl OpenProjectClient {
    /// Create a client with Basic Auth, HAL headers and the request timeout installed.
    pub fn new(settings: &ApiSettings) -> Result<Self> {
        use base64::Engine;

        let (user, password) = settings.auth.credentials();
        let encoded = base64::engine::general_purpose::STANDARD.encode(format!("{user}:{password}"));

        let mut authorization = HeaderValue::from_str(&format!("Basic {encoded}"))
            .map_err(|e| Error::config(format!("Invalid credentials header: {e}")))?;
        authorization.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, authorization);
        headers.insert(ACCEPT, HeaderValue::from_static("application/hal+json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: settings.base_url.clone(),
        })
    }

    /// Validate the API settings in `config` and build a client.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.api()?)
    }

    pub fn from_env() -> Result<Self> {
        Self::from_config(&load_config())
    }

    // ========================================================================
    // Request layer
    // ========================================================================

    /// Call the HAL API. `path` is relative to `/api/v3`.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        params: &[(String, String)],
        body: Option<&Value>,
        expected: &[u16],
    ) -> Result<Value> {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            f!("/{path}")
        };
        let url = f!("{}{API_PREFIX}{path}", self.base_url);

        let mut builder = self.http.request(method.clone(), &url);
        if !params.is_empty() {
            builder = builder.query(params);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        self.dispatch(builder, Surface::Hal, &method, &path, expected)
            .await
    }

    /// Call a legacy (non-`/api/v3`) JSON endpoint with the same session.
    pub async fn legacy(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        expected: &[u16],
    ) -> Result<Value> {
        let path = to_legacy_path(path);
        let url = f!("{}{path}", self.base_url);

        let mut builder = self
            .http
            .request(method.clone(), &url)
            .header(ACCEPT, "application/json");
        if let Some(body) = body {
            builder = builder.json(body);
        }

        self.dispatch(builder, Surface::Legacy, &method, &path, expected)
            .await
    }

    async fn dispatch(
        &self,
        builder: RequestBuilder,
        surface: Surface,
        method: &Method,
        path: &str,
        expected: &[u16],
    ) -> Result<Value> {
        let response = builder.send().await.map_err(|e| {
            log::debug!("{method} {path} failed before a response: {e}");
            surface.network_error(e)
        })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| surface.network_error(e))?;
        log::debug!("{method} {path} -> {status}");

        if expected.contains(&status) {
            Ok(decode_body(&body))
        } else {
            Err(classify_failure(surface, method.as_str(), path, status, &body))
        }
    }

    pub async fn get(&self, path: &str) -> Result<Value> {
        self.request(Method::GET, path, &[], None, &[200]).await
    }

    // ========================================================================
    // Collections
    // ========================================================================

    /// Walk a HAL collection until `limit` elements are collected or the server runs out.
    pub async fn collect(
        &self,
        path: &str,
        params: &[(String, String)],
        limit: usize,
    ) -> Result<Vec<Value>> {
        let (base, requested_page_size) = split_page_size(params);
        let mut pager = Pager::new(limit, requested_page_size);
        let mut collected = Vec::new();

        while let Some(page) = pager.next_request() {
            let payload = self
                .request(Method::GET, path, &page.params(&base), None, &[200])
                .await?;
            pager.absorb(parse_page(&payload), &mut collected);
        }

        log::debug!("collected {} element(s) from {path}", collected.len());
        Ok(collected)
    }

    pub async fn collect_as<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(String, String)],
        limit: usize,
    ) -> Result<Vec<T>> {
        from_values(self.collect(path, params, limit).await?)
    }

    async fn embedded<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let payload = self.get(path).await?;
        from_values(embedded_elements(&payload))
    }

    // ========================================================================
    // Resources
    // ========================================================================

    pub async fn projects(&self, limit: usize) -> Result<Vec<Project>> {
        self.collect_as("/projects", &[], limit).await
    }

    pub async fn statuses(&self) -> Result<Vec<CatalogEntry>> {
        self.embedded("/statuses").await
    }

    pub async fn priorities(&self) -> Result<Vec<CatalogEntry>> {
        self.embedded("/priorities").await
    }

    pub async fn users(&self, limit: usize) -> Result<Vec<User>> {
        self.collect_as("/users", &[], limit).await
    }

    pub async fn user(&self, id: u64) -> Result<User> {
        from_value(self.get(&f!("/users/{id}")).await?)
    }

    /// Types usable in a project, falling back to the global list.
    ///
    /// A missing project endpoint is skipped; a failing global endpoint is reported.
    pub async fn types(&self, project_id: Option<u64>) -> Result<Vec<CatalogEntry>> {
        let candidates = type_candidates(project_id);
        let last = candidates.len().saturating_sub(1);

        for (index, candidate) in candidates.iter().enumerate() {
            match self.embedded::<CatalogEntry>(&candidate.path).await {
                Ok(types) if !types.is_empty() => return Ok(types),
                Ok(_) => continue,
                Err(err) if index < last && candidate.should_skip(&err) => {
                    log::debug!("{} unavailable, trying next candidate", candidate.path);
                    continue;
                }
                Err(err) => return Err(err),
            }
        }

        Ok(Vec::new())
    }

    pub async fn work_package(&self, id: u64) -> Result<WorkPackage> {
        from_value(self.get(&f!("/work_packages/{id}")).await?)
    }

    /// Work packages of a project, passing the filters to the server as hints.
    ///
    /// Servers that reject the hints are asked again without them; callers
    /// still filter client-side.
    pub async fn work_packages(
        &self,
        project_id: u64,
        limit: usize,
        status: Option<&str>,
        assignee: Option<&str>,
    ) -> Result<Vec<WorkPackage>> {
        let path = f!("/projects/{project_id}/work_packages");
        let hints = listing_hints(status, assignee);

        match self.collect_as(&path, &hints, limit).await {
            Err(err) if !hints.is_empty() && err.has_status(FILTER_HINT_REJECTIONS) => {
                log::debug!("filter hints rejected ({err}), retrying without them");
                self.collect_as(&path, &[], limit).await
            }
            result => result,
        }
    }
}
