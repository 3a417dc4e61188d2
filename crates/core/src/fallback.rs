//! Ordered endpoint fallback.
//!
//! OpenProject versions and permission setups differ in which endpoints they
//! expose. Operations that have more than one way to reach a resource list
//! their options as [`Candidate`]s and walk them in order, moving on only when
//! the failure status is one the candidate declares as skippable.

use crate::error::Error;

/// Endpoint missing or method not supported.
pub const NOT_FOUND_OR_NOT_ALLOWED: &[u16] = &[404, 405];

/// Failures of the work package form that mean "use the global status list".
pub const WORKFLOW_FORM_FALLBACK: &[u16] = &[404, 405, 422];

/// Failures that move the comment writer to its next strategy.
pub const COMMENT_REJECTIONS: &[u16] = &[400, 404, 405, 415, 422];

/// Failures that mean the server did not understand our filter hints.
pub const FILTER_HINT_REJECTIONS: &[u16] = &[400, 422];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub path: String,
    pub skip_on: &'static [u16],
}

impl Candidate {
    pub fn new(path: impl Into<String>, skip_on: &'static [u16]) -> Self {
        Self {
            path: path.into(),
            skip_on,
        }
    }

    /// True when `err` lets the walk continue with the next candidate.
    pub fn should_skip(&self, err: &Error) -> bool {
        err.has_status(self.skip_on)
    }
}

/// Candidates for listing the types usable in a project.
pub fn type_candidates(project_id: Option<u64>) -> Vec<Candidate> {
    let mut candidates = Vec::with_capacity(2);
    if let Some(id) = project_id {
        candidates.push(Candidate::new(
            format!("/projects/{id}/types"),
            NOT_FOUND_OR_NOT_ALLOWED,
        ));
    }
    candidates.push(Candidate::new("/types", NOT_FOUND_OR_NOT_ALLOWED));
    candidates
}

fn specificity(err: &Error) -> u8 {
    if err.has_status(NOT_FOUND_OR_NOT_ALLOWED) {
        0
    } else {
        1
    }
}

/// Pick the error worth showing when both a primary endpoint and its fallback failed.
///
/// A "not found / not allowed" answer says less than any other failure, so the
/// other one wins; on a tie the primary error is kept.
pub fn more_specific(primary: Error, secondary: Error) -> Error {
    if specificity(&secondary) > specificity(&primary) {
        secondary
    } else {
        primary
    }
}
