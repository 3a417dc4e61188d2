//! Path and href normalization for both API surfaces.

use crate::error::{Error, Result};

/// Prefix of the hypermedia API relative to the server root.
pub const API_PREFIX: &str = "/api/v3";

/// Normalize an API href, full URL, or bare path into a path relative to [`API_PREFIX`].
///
/// - A full URL keeps only its path component.
/// - A leading `/api/v3` is stripped.
/// - The result always starts with exactly one `/`.
pub fn to_api_path(url_or_path: &str) -> String {
    let mut value = url_or_path.trim();
    if value.is_empty() {
        return "/".to_string();
    }

    if let Some(scheme_end) = value.find("://") {
        let after_scheme = &value[scheme_end + 3..];
        value = match after_scheme.find('/') {
            Some(slash) => strip_query(&after_scheme[slash..]),
            None => "/",
        };
    }

    if let Some(rest) = value.strip_prefix(API_PREFIX) {
        value = if rest.is_empty() { "/" } else { rest };
    }

    format!("/{}", value.trim_start_matches('/'))
}

/// Normalize a path on the legacy (non-prefixed) surface.
pub fn to_legacy_path(path: &str) -> String {
    let value = path.trim();
    if value.starts_with('/') {
        value.to_string()
    } else {
        format!("/{value}")
    }
}

fn strip_query(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    &path[..end]
}

/// Clean the configured base URL: trim, drop trailing slashes and a trailing `/api/v3`.
pub fn normalize_base_url(raw: &str) -> Result<String> {
    let mut cleaned = raw.trim().trim_end_matches('/');
    if let Some(stripped) = cleaned.strip_suffix(API_PREFIX) {
        cleaned = stripped.trim_end_matches('/');
    }

    if cleaned.is_empty() {
        return Err(Error::config("OPENPROJECT_BASE_URL is required."));
    }

    Ok(cleaned.to_string())
}

/// Canonical href of a resource on the hypermedia API.
pub fn api_href(resource: &str, id: impl std::fmt::Display) -> String {
    format!("{API_PREFIX}/{resource}/{id}")
}

/// Percent-encode a single path segment (identifiers, wiki titles).
pub fn encode_segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Encode a wiki title for use in a legacy wiki path. Blank titles are rejected.
pub fn encode_wiki_title(title: &str) -> Result<String> {
    let value = title.trim();
    if value.is_empty() {
        return Err(Error::config("Wiki title is required."));
    }
    Ok(encode_segment(value))
}

/// Extract the trailing numeric id from an href like `/api/v3/<resource>/<id>`.
pub fn extract_numeric_id_from_href(href: &str, resource: &str) -> Option<u64> {
    let href = href.trim();
    let (head, id) = href.rsplit_once('/')?;
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if !head.ends_with(&format!("/{resource}")) {
        return None;
    }
    id.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_api_path_strips_prefix() {
        assert_eq!(to_api_path("/api/v3/work_packages/42"), "/work_packages/42");
        assert_eq!(to_api_path("/api/v3"), "/");
        assert_eq!(to_api_path("  /api/v3/statuses  "), "/statuses");
    }

    #[test]
    fn test_to_api_path_bare_relative_path() {
        assert_eq!(to_api_path("projects"), "/projects");
        assert_eq!(to_api_path("/projects"), "/projects");
        assert_eq!(to_api_path("//projects"), "/projects");
        assert_eq!(to_api_path(""), "/");
        assert_eq!(to_api_path("   "), "/");
    }

    #[test]
    fn test_to_api_path_full_url_keeps_only_path() {
        assert_eq!(
            to_api_path("https://op.example.com/api/v3/work_packages/7/form"),
            "/work_packages/7/form"
        );
        assert_eq!(
            to_api_path("https://op.example.com/api/v3/work_packages?offset=2"),
            "/work_packages"
        );
        assert_eq!(to_api_path("https://op.example.com"), "/");
    }

    #[test]
    fn test_to_legacy_path() {
        assert_eq!(to_legacy_path("projects/demo/wiki.json"), "/projects/demo/wiki.json");
        assert_eq!(to_legacy_path(" /projects/demo "), "/projects/demo");
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(
            normalize_base_url(" https://op.example.com/ ").unwrap(),
            "https://op.example.com"
        );
        assert_eq!(
            normalize_base_url("https://op.example.com/api/v3/").unwrap(),
            "https://op.example.com"
        );
        assert!(normalize_base_url("   ").is_err());
        assert!(normalize_base_url("/api/v3").is_err());
    }

    #[test]
    fn test_encode_wiki_title() {
        assert_eq!(encode_wiki_title(" Release Notes ").unwrap(), "Release%20Notes");
        assert_eq!(encode_wiki_title("a/b").unwrap(), "a%2Fb");
        assert!(encode_wiki_title("   ").is_err());
    }

    #[test]
    fn test_extract_numeric_id_from_href() {
        assert_eq!(
            extract_numeric_id_from_href("/api/v3/projects/12", "projects"),
            Some(12)
        );
        assert_eq!(extract_numeric_id_from_href("/api/v3/projects/demo", "projects"), None);
        assert_eq!(extract_numeric_id_from_href("/api/v3/types/3", "projects"), None);
        assert_eq!(extract_numeric_id_from_href("", "projects"), None);
    }

    #[test]
    fn test_api_href() {
        assert_eq!(api_href("statuses", 5), "/api/v3/statuses/5");
    }
}
