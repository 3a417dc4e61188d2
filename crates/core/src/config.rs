//! Runtime configuration read from `OPENPROJECT_*` environment variables.
//!
//! [`Config::from_lookup`] takes the variable source as a function so the
//! rules can be tested without touching the process environment.

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::paths::normalize_base_url;
use crate::report::DEFAULT_DECISION_LOG_DIR;

pub const BASE_URL: &str = "OPENPROJECT_BASE_URL";
pub const AUTH_MODE: &str = "OPENPROJECT_AUTH_MODE";
pub const API_TOKEN: &str = "OPENPROJECT_API_TOKEN";
pub const USERNAME: &str = "OPENPROJECT_USERNAME";
pub const PASSWORD: &str = "OPENPROJECT_PASSWORD";
pub const DEFAULT_PROJECT: &str = "OPENPROJECT_DEFAULT_PROJECT";
pub const DECISION_LOG_DIR: &str = "OPENPROJECT_DECISION_LOG_DIR";

/// User name OpenProject expects when the password is an API token.
const TOKEN_USER: &str = "apikey";

/// Credentials for HTTP basic authentication.
#[derive(Clone, PartialEq, Eq)]
pub enum Auth {
    Token(String),
    Basic { username: String, password: String },
}

impl Auth {
    /// `(user, password)` pair sent in the `Authorization` header.
    pub fn credentials(&self) -> (&str, &str) {
        match self {
            Auth::Token(token) => (TOKEN_USER, token.as_str()),
            Auth::Basic { username, password } => (username.as_str(), password.as_str()),
        }
    }
}

impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Auth::Token(_) => f.write_str("Auth::Token(***)"),
            Auth::Basic { username, .. } => write!(f, "Auth::Basic({username}, ***)"),
        }
    }
}

/// Everything the HTTP client needs, validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiSettings {
    pub base_url: String,
    pub auth: Auth,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub base_url: Option<String>,
    pub auth_mode: Option<String>,
    pub api_token: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub default_project: Option<String>,
    pub decision_log_dir: Option<String>,
}

impl Config {
    /// Build from a variable lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            base_url: read(BASE_URL),
            auth_mode: read(AUTH_MODE),
            api_token: read(API_TOKEN),
            username: read(USERNAME),
            password: read(PASSWORD),
            default_project: read(DEFAULT_PROJECT),
            decision_log_dir: read(DECISION_LOG_DIR),
        }
    }

    /// Validate what API commands need. Fails before any network call.
    pub fn api(&self) -> Result<ApiSettings> {
        let base_url = normalize_base_url(self.base_url.as_deref().unwrap_or(""))?;

        let mode = self
            .auth_mode
            .as_deref()
            .unwrap_or("token")
            .to_lowercase();

        let auth = match mode.as_str() {
            "token" => Auth::Token(self.api_token.clone().ok_or_else(|| {
                Error::config("OPENPROJECT_API_TOKEN is required for token authentication.")
            })?),
            "basic" => match (&self.username, &self.password) {
                (Some(username), Some(password)) => Auth::Basic {
                    username: username.clone(),
                    password: password.clone(),
                },
                _ => {
                    return Err(Error::config(
                        "OPENPROJECT_USERNAME and OPENPROJECT_PASSWORD are required for basic auth mode.",
                    ))
                }
            },
            other => {
                return Err(Error::config(format!(
                    "Unsupported auth mode '{other}'. Use 'token' (default) or 'basic'."
                )))
            }
        };

        Ok(ApiSettings { base_url, auth })
    }

    /// The explicit `--project` value, else the configured default.
    pub fn require_project(&self, project: Option<&str>) -> Result<String> {
        project
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .or_else(|| self.default_project.clone())
            .ok_or_else(|| {
                Error::config("--project is required unless OPENPROJECT_DEFAULT_PROJECT is set.")
            })
    }

    pub fn decision_log_dir(&self) -> PathBuf {
        PathBuf::from(
            self.decision_log_dir
                .as_deref()
                .unwrap_or(DEFAULT_DECISION_LOG_DIR),
        )
    }
}
