//! gitlab-changelog - Changelogs for GitLab projects
//!
//! Builds a plain-text changelog for one GitLab project. A release is
//! either a tag or a merge request merged into the target branch; each
//! release lists the titles of the commits in its history.
//!
//! # Architecture
//!
//! - [`cli`] - Argument parsing, logging setup, and the changelog command
//! - [`core`] - Domain types and the resolved run configuration
//! - [`forge`] - GitLab REST client behind the `Forge` traits, plus a mock
//! - [`release`] - Release resolution by tags or by merge requests
//! - [`ui`] - Changelog rendering and console output
//!
//! # Example
//!
//! ```
//! use gitlab_changelog::core::types::{parse_timestamp, Commit, Release};
//! use gitlab_changelog::ui::changelog::render;
//!
//! let release = Release {
//!     version_name: "v1".into(),
//!     release_date: parse_timestamp("2020-01-01").unwrap(),
//!     commits: vec![Commit::new("c1", "Add feature")],
//! };
//! let text = render(vec![release], "proj");
//! assert!(text.contains("proj - v1 (Released 2020-1-1)"));
//! ```

pub mod cli;
pub mod core;
pub mod forge;
pub mod release;
pub mod ui;
