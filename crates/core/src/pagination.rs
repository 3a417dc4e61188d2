//! Offset pagination over HAL collections.
//!
//! [`Pager`] holds the loop state of a bounded collection walk. The shell
//! issues the request described by [`Pager::next_request`], feeds the decoded
//! page back through [`Pager::absorb`], and repeats until `next_request`
//! returns `None`.

use serde_json::Value;

use crate::error::{Error, Result};
use crate::hal::Page;

/// Largest page size the server accepts.
pub const MAX_PAGE_SIZE: usize = 200;

/// Query parameters as ordered key/value pairs.
pub type Params = Vec<(String, String)>;

/// The `offset`/`pageSize` pair for one page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: i64,
    pub page_size: usize,
}

impl PageRequest {
    /// Caller params followed by this page's `offset` and `pageSize`.
    pub fn params(&self, base: &[(String, String)]) -> Params {
        let mut params: Params = base.to_vec();
        params.push(("offset".to_string(), self.offset.to_string()));
        params.push(("pageSize".to_string(), self.page_size.to_string()));
        params
    }
}

#[derive(Debug)]
pub struct Pager {
    limit: usize,
    page_size: usize,
    offset: i64,
    collected: usize,
    finished: bool,
}

impl Pager {
    /// `requested_page_size` is the caller's own `pageSize` param, if any.
    pub fn new(limit: usize, requested_page_size: Option<i64>) -> Self {
        let page_size = requested_page_size
            .unwrap_or(limit.min(MAX_PAGE_SIZE) as i64)
            .clamp(1, MAX_PAGE_SIZE as i64) as usize;

        Self {
            limit,
            page_size,
            offset: 1,
            collected: 0,
            finished: limit == 0,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn next_request(&self) -> Option<PageRequest> {
        if self.finished || self.collected >= self.limit {
            return None;
        }
        let remaining = self.limit - self.collected;
        Some(PageRequest {
            offset: self.offset,
            page_size: self.page_size.min(remaining),
        })
    }

    /// Append the page's elements to `out` (never past the limit) and advance.
    pub fn absorb(&mut self, page: Page, out: &mut Vec<Value>) {
        if page.elements.is_empty() {
            self.finished = true;
            return;
        }

        let remaining = self.limit.saturating_sub(self.collected);
        let kept = page.elements.len().min(remaining);
        out.extend(page.elements.into_iter().take(kept));
        self.collected += kept;

        if page.count <= 0 || !page.has_next {
            self.finished = true;
            return;
        }

        // The server-reported count drives the offset, not the number kept.
        self.offset += page.count;
    }
}

/// Validate a user-supplied `--limit`.
pub fn ensure_limit(limit: i64) -> Result<usize> {
    usize::try_from(limit)
        .ok()
        .filter(|l| *l > 0)
        .ok_or_else(|| Error::config("--limit must be greater than 0."))
}

/// Pull a caller-supplied `pageSize` out of `params`.
///
/// Unparseable values are dropped and the default page size applies.
pub fn split_page_size(params: &[(String, String)]) -> (Params, Option<i64>) {
    let mut rest = Vec::with_capacity(params.len());
    let mut page_size = None;
    for (key, value) in params {
        if key == "pageSize" {
            page_size = value.trim().parse::<i64>().ok();
        } else {
            rest.push((key.clone(), value.clone()));
        }
    }
    (rest, page_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::parse_page;
    use serde_json::json;

    fn page(ids: std::ops::Range<u64>, count: Option<i64>, has_next: bool) -> Page {
        let elements: Vec<Value> = ids.map(|id| json!({ "id": id })).collect();
        let mut payload = json!({ "_embedded": { "elements": elements }, "_links": {} });
        if let Some(count) = count {
            payload["count"] = json!(count);
        }
        if has_next {
            payload["_links"]["nextByOffset"] = json!({ "href": "/api/v3/projects?offset=2" });
        }
        parse_page(&payload)
    }

    #[test]
    fn test_zero_limit_issues_no_request() {
        let pager = Pager::new(0, None);
        assert_eq!(pager.next_request(), None);
    }

    #[test]
    fn test_page_size_defaults_and_clamps() {
        assert_eq!(Pager::new(50, None).page_size(), 50);
        assert_eq!(Pager::new(500, None).page_size(), MAX_PAGE_SIZE);
        assert_eq!(Pager::new(10, Some(1000)).page_size(), MAX_PAGE_SIZE);
        assert_eq!(Pager::new(10, Some(0)).page_size(), 1);
        assert_eq!(Pager::new(10, Some(-4)).page_size(), 1);
    }

    #[test]
    fn test_first_request_starts_at_offset_one() {
        let pager = Pager::new(5, Some(20));
        assert_eq!(
            pager.next_request(),
            Some(PageRequest {
                offset: 1,
                page_size: 5
            })
        );
    }

    #[test]
    fn test_offset_advances_by_reported_count() {
        // Arrange
        let mut pager = Pager::new(10, Some(3));
        let mut out = Vec::new();

        // Act
        pager.absorb(page(0..3, Some(3), true), &mut out);

        // Assert
        assert_eq!(out.len(), 3);
        assert_eq!(
            pager.next_request(),
            Some(PageRequest {
                offset: 4,
                page_size: 3
            })
        );
    }

    #[test]
    fn test_never_exceeds_limit_when_page_over_delivers() {
        let mut pager = Pager::new(4, None);
        let mut out = Vec::new();

        pager.absorb(page(0..10, Some(10), true), &mut out);

        assert_eq!(out.len(), 4);
        assert_eq!(pager.next_request(), None);
    }

    #[test]
    fn test_stops_without_next_link() {
        let mut pager = Pager::new(100, None);
        let mut out = Vec::new();

        pager.absorb(page(0..2, Some(2), false), &mut out);

        assert_eq!(out.len(), 2);
        assert_eq!(pager.next_request(), None);
    }

    #[test]
    fn test_stops_on_empty_page() {
        let mut pager = Pager::new(100, None);
        let mut out = Vec::new();

        pager.absorb(page(0..0, Some(0), true), &mut out);

        assert!(out.is_empty());
        assert_eq!(pager.next_request(), None);
    }

    #[test]
    fn test_missing_count_falls_back_to_element_count() {
        let mut pager = Pager::new(100, Some(2));
        let mut out = Vec::new();

        pager.absorb(page(0..2, None, true), &mut out);

        assert_eq!(pager.next_request().map(|r| r.offset), Some(3));
    }

    #[test]
    fn test_params_append_offset_and_page_size() {
        let request = PageRequest {
            offset: 7,
            page_size: 25,
        };
        let params = request.params(&[("filters".to_string(), "[]".to_string())]);
        assert_eq!(
            params,
            vec![
                ("filters".to_string(), "[]".to_string()),
                ("offset".to_string(), "7".to_string()),
                ("pageSize".to_string(), "25".to_string()),
            ]
        );
    }

    #[test]
    fn test_ensure_limit() {
        assert_eq!(ensure_limit(50).unwrap(), 50);
        assert!(ensure_limit(0).is_err());
        assert_eq!(
            ensure_limit(-3).unwrap_err().to_string(),
            "--limit must be greater than 0."
        );
    }

    #[test]
    fn test_split_page_size() {
        let params = vec![
            ("pageSize".to_string(), "30".to_string()),
            ("sortBy".to_string(), "x".to_string()),
        ];
        let (rest, size) = split_page_size(&params);
        assert_eq!(size, Some(30));
        assert_eq!(rest, vec![("sortBy".to_string(), "x".to_string())]);

        let (_, invalid) = split_page_size(&[("pageSize".to_string(), "lots".to_string())]);
        assert_eq!(invalid, None);
    }
}
