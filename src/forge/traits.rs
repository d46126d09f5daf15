//! forge::traits
//!
//! Forge traits for reading from a remote hosting service.
//!
//! # Design
//!
//! The API is split in two:
//!
//! - [`Forge`] is an immutable handle to the service. It can search
//!   projects and hand out project-scoped handles.
//! - [`ProjectForge`] is bound to one [`Project`] and is the only way to
//!   reach project endpoints (tags, commits, merge requests).
//!
//! A project-scoped call therefore cannot be made before a project has
//! been chosen; the type does not exist until then.
//!
//! The traits are async because every operation is network I/O. Errors are
//! returned as [`ForgeError`] and are never retried here.
//!
//! # Example
//!
//! ```ignore
//! use gitlab_changelog::forge::{Forge, ForgeError};
//!
//! async fn tag_names(forge: &dyn Forge, name: &str) -> Result<Vec<String>, ForgeError> {
//!     let project = forge
//!         .search_projects(Some(name))
//!         .await?
//!         .into_iter()
//!         .find(|p| p.name == name)
//!         .ok_or_else(|| ForgeError::NoProjectSelected(name.to_string()))?;
//!
//!     let scoped = forge.for_project(project);
//!     Ok(scoped.list_tags().await?.into_iter().map(|t| t.name).collect())
//! }
//! ```

use async_trait::async_trait;
use thiserror::Error;

use crate::core::types::{Commit, MergeRequest, Project, Tag};

/// Errors from forge operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ForgeError {
    /// No project matched the requested name, so nothing project-scoped can run.
    #[error("no project selected: no project named '{0}' was found")]
    NoProjectSelected(String),

    /// Authentication failed (invalid token, insufficient permissions).
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Network or connection error, including timeouts.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The response body was not what the API contract promises.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The client could not be configured (bad URL, unusable token).
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// An immutable handle to a hosting service.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow use across async tasks.
#[async_trait]
pub trait Forge: Send + Sync {
    /// Get the forge name (e.g., "gitlab").
    fn name(&self) -> &'static str;

    /// Search projects visible to the token.
    ///
    /// # Arguments
    ///
    /// * `name_filter` - Optional substring filter applied by the server
    ///
    /// # Errors
    ///
    /// Any transport or API failure, unmodified.
    async fn search_projects(&self, name_filter: Option<&str>) -> Result<Vec<Project>, ForgeError>;

    /// Get a handle scoped to `project`.
    fn for_project(&self, project: Project) -> Box<dyn ProjectForge>;
}

/// A handle bound to a single project.
#[async_trait]
pub trait ProjectForge: Send + Sync {
    /// The project this handle is bound to.
    fn project(&self) -> &Project;

    /// List the project's tags.
    async fn list_tags(&self) -> Result<Vec<Tag>, ForgeError>;

    /// List commits, newest first.
    ///
    /// # Arguments
    ///
    /// * `ref_name` - Restrict to the history of this branch or tag. When
    ///   `None`, the server's default branch is used.
    async fn list_commits(&self, ref_name: Option<&str>) -> Result<Vec<Commit>, ForgeError>;

    /// List merge requests in the merged state.
    async fn list_merged_merge_requests(&self) -> Result<Vec<MergeRequest>, ForgeError>;
}
