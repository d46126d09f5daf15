//! forge
//!
//! Abstraction for the remote hosting service (GitLab).
//!
//! # Architecture
//!
//! The [`Forge`] trait is the top-level handle; [`ProjectForge`] is the
//! project-scoped handle obtained from [`Forge::for_project`]. Release
//! resolution and the changelog command only depend on these traits, so
//! tests can run the whole pipeline against [`mock::MockForge`].
//!
//! # Modules
//!
//! - `traits`: `Forge`/`ProjectForge` traits and `ForgeError`
//! - [`gitlab`]: GitLab implementation using the REST API
//! - [`mock`]: Mock implementation for deterministic testing
//!
//! # Example
//!
//! ```ignore
//! use gitlab_changelog::forge::gitlab::GitLabClient;
//! use gitlab_changelog::forge::{Forge, ProjectForge};
//!
//! let forge = GitLabClient::new("https://gitlab.example.com", token)?;
//! let project = forge.search_projects(Some("my-project")).await?.remove(0);
//! let tags = forge.for_project(project).list_tags().await?;
//! ```

pub mod gitlab;
pub mod mock;
mod traits;

pub use traits::*;
