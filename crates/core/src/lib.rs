//! Core library for opcli
//!
//! This crate implements the **Functional Core** of the opcli application,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! opcli is split into two crates:
//!
//! - **`opcli_core`** (this crate): payload models, path rules, matching and
//!   rendering logic, with zero I/O
//! - **`opcli`**: HTTP calls, the filesystem and terminal output (the Imperative Shell)
//!
//! The shell owns every network round-trip. Between round-trips it hands raw
//! JSON to this crate and gets back typed models, resolved hrefs, request
//! bodies, or the next page to fetch.
//!
//! # Module Organization
//!
//! - [`paths`]: API and legacy path normalization, href helpers
//! - [`hal`]: HAL links, collections, formattable text, error classification
//! - [`models`]: typed projects, work packages, catalog entries, users, relations
//! - [`pagination`]: the offset pager driving collection walks
//! - [`fallback`]: ordered endpoint candidates and their skip rules
//! - [`resolve`]: matching human references to server entities
//! - [`work_package`]: mutation payloads, comment strategies, list filters
//! - [`wiki`]: legacy wiki payload shapes and paths
//! - [`report`]: weekly summary and decision log markdown
//! - [`config`]: `OPENPROJECT_*` configuration
//! - [`display`]: terminal text helpers
//!
//! # Example Usage
//!
//! ```
//! use opcli_core::models::{from_values, Project};
//! use opcli_core::resolve::match_project;
//! use serde_json::json;
//!
//! let projects: Vec<Project> = from_values(vec![
//!     json!({ "id": 3, "identifier": "demo", "name": "Demo" }),
//! ])
//! .unwrap();
//!
//! let project = match_project(&projects, "DEMO").unwrap();
//! assert_eq!(project.id, Some(3));
//! ```

pub mod config;
pub mod display;
pub mod error;
pub mod fallback;
pub mod hal;
pub mod models;
pub mod pagination;
pub mod paths;
pub mod report;
pub mod resolve;
pub mod wiki;
pub mod work_package;

pub use error::{Error, Result};
