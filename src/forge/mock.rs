//! forge::mock
//!
//! Mock forge implementation for deterministic testing.
//!
//! # Design
//!
//! The mock forge serves projects, tags, commits, and merge requests from
//! memory. Every call is recorded so tests can assert which requests were
//! (or were not) made, and any operation can be configured to fail.
//!
//! Commits are keyed by ref name. Asking for a ref the mock does not know
//! returns `NotFound`, as GitLab does.
//!
//! # Example
//!
//! ```
//! use gitlab_changelog::core::types::{Commit, Project};
//! use gitlab_changelog::forge::mock::MockForge;
//! use gitlab_changelog::forge::{Forge, ProjectForge};
//!
//! # tokio_test::block_on(async {
//! let forge = MockForge::new()
//!     .with_projects(vec![Project::new(1, "proj")])
//!     .with_commits(Some("v1"), vec![Commit::new("c1", "Add feature")]);
//!
//! let projects = forge.search_projects(Some("proj")).await.unwrap();
//! let scoped = forge.for_project(projects[0].clone());
//! let commits = scoped.list_commits(Some("v1")).await.unwrap();
//! assert_eq!(commits[0].title, "Add feature");
//! # });
//! ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::traits::{Forge, ForgeError, ProjectForge};
use crate::core::types::{Commit, MergeRequest, Project, Tag};

/// Mock forge for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping. Clones and the
/// project-scoped handles it hands out share the same state.
#[derive(Debug, Clone)]
pub struct MockForge {
    /// Internal state shared across clones.
    inner: Arc<Mutex<MockForgeInner>>,
}

/// Internal mutable state.
#[derive(Debug, Default)]
struct MockForgeInner {
    /// Projects returned by search.
    projects: Vec<Project>,
    /// Tags returned for any project.
    tags: Vec<Tag>,
    /// Commit listings by ref (`None` is the default branch).
    commits: HashMap<Option<String>, Vec<Commit>>,
    /// Merged merge requests returned for any project.
    merge_requests: Vec<MergeRequest>,
    /// Operation to fail on (for testing error paths).
    fail_on: Option<FailOn>,
    /// Recorded operations for verification.
    operations: Vec<MockOperation>,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    /// Fail search_projects with the given error.
    SearchProjects(ForgeError),
    /// Fail list_tags with the given error.
    ListTags(ForgeError),
    /// Fail every list_commits call with the given error.
    ListCommits(ForgeError),
    /// Fail list_commits only for this ref.
    ListCommitsFor(String, ForgeError),
    /// Fail list_merged_merge_requests with the given error.
    ListMergedMergeRequests(ForgeError),
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    SearchProjects { name_filter: Option<String> },
    ListTags { project_id: u64 },
    ListCommits { project_id: u64, ref_name: Option<String> },
    ListMergedMergeRequests { project_id: u64 },
}

impl MockOperation {
    /// Whether this operation needed a selected project.
    pub fn is_project_scoped(&self) -> bool {
        !matches!(self, MockOperation::SearchProjects { .. })
    }
}

impl MockForge {
    /// Create a new empty mock forge.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockForgeInner::default())),
        }
    }

    /// Set the projects returned by search.
    pub fn with_projects(self, projects: Vec<Project>) -> Self {
        self.inner.lock().unwrap().projects = projects;
        self
    }

    /// Set the tags.
    pub fn with_tags(self, tags: Vec<Tag>) -> Self {
        self.inner.lock().unwrap().tags = tags;
        self
    }

    /// Set the commit listing for a ref (`None` for the default branch).
    pub fn with_commits(self, ref_name: Option<&str>, commits: Vec<Commit>) -> Self {
        self.inner
            .lock()
            .unwrap()
            .commits
            .insert(ref_name.map(str::to_string), commits);
        self
    }

    /// Set the merged merge requests.
    pub fn with_merge_requests(self, merge_requests: Vec<MergeRequest>) -> Self {
        self.inner.lock().unwrap().merge_requests = merge_requests;
        self
    }

    /// Configure the mock to fail on a specific operation.
    ///
    /// # Example
    ///
    /// ```
    /// use gitlab_changelog::forge::mock::{FailOn, MockForge};
    /// use gitlab_changelog::forge::ForgeError;
    ///
    /// let forge = MockForge::new()
    ///     .fail_on(FailOn::ListTags(ForgeError::NetworkError("reset".into())));
    /// ```
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        self.inner.lock().unwrap().fail_on = Some(fail_on);
        self
    }

    /// Clear the failure configuration.
    pub fn clear_fail_on(&self) {
        self.inner.lock().unwrap().fail_on = None;
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<MockOperation> {
        self.inner.lock().unwrap().operations.clone()
    }

    /// Clear recorded operations.
    pub fn clear_operations(&self) {
        self.inner.lock().unwrap().operations.clear();
    }

    /// Record an operation.
    fn record(&self, op: MockOperation) {
        self.inner.lock().unwrap().operations.push(op);
    }

    /// Return the configured error if `op` should fail.
    fn check_fail(&self, op: &MockOperation) -> Result<(), ForgeError> {
        let inner = self.inner.lock().unwrap();
        let err = match (&inner.fail_on, op) {
            (Some(FailOn::SearchProjects(e)), MockOperation::SearchProjects { .. })
            | (Some(FailOn::ListTags(e)), MockOperation::ListTags { .. })
            | (Some(FailOn::ListCommits(e)), MockOperation::ListCommits { .. })
            | (
                Some(FailOn::ListMergedMergeRequests(e)),
                MockOperation::ListMergedMergeRequests { .. },
            ) => Some(e.clone()),
            (
                Some(FailOn::ListCommitsFor(target, e)),
                MockOperation::ListCommits {
                    ref_name: Some(ref_name),
                    ..
                },
            ) if target == ref_name => Some(e.clone()),
            _ => None,
        };

        match err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Record `op`, then fail if configured to.
    fn begin(&self, op: MockOperation) -> Result<(), ForgeError> {
        self.record(op.clone());
        self.check_fail(&op)
    }
}

impl Default for MockForge {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Forge for MockForge {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn search_projects(&self, name_filter: Option<&str>) -> Result<Vec<Project>, ForgeError> {
        self.begin(MockOperation::SearchProjects {
            name_filter: name_filter.map(str::to_string),
        })?;

        // GitLab search is a case-insensitive substring match
        let inner = self.inner.lock().unwrap();
        let needle = name_filter.map(str::to_lowercase);
        Ok(inner
            .projects
            .iter()
            .filter(|p| match &needle {
                Some(n) => p.name.to_lowercase().contains(n.as_str()),
                None => true,
            })
            .cloned()
            .collect())
    }

    fn for_project(&self, project: Project) -> Box<dyn ProjectForge> {
        Box::new(MockProjectForge {
            forge: self.clone(),
            project,
        })
    }
}

/// Project-scoped handle onto a [`MockForge`].
#[derive(Debug, Clone)]
pub struct MockProjectForge {
    forge: MockForge,
    project: Project,
}

#[async_trait]
impl ProjectForge for MockProjectForge {
    fn project(&self) -> &Project {
        &self.project
    }

    async fn list_tags(&self) -> Result<Vec<Tag>, ForgeError> {
        self.forge.begin(MockOperation::ListTags {
            project_id: self.project.id,
        })?;

        Ok(self.forge.inner.lock().unwrap().tags.clone())
    }

    async fn list_commits(&self, ref_name: Option<&str>) -> Result<Vec<Commit>, ForgeError> {
        let ref_name = ref_name.map(str::to_string);
        self.forge.begin(MockOperation::ListCommits {
            project_id: self.project.id,
            ref_name: ref_name.clone(),
        })?;

        let inner = self.forge.inner.lock().unwrap();
        inner.commits.get(&ref_name).cloned().ok_or_else(|| {
            ForgeError::NotFound(format!(
                "404 Ref {} Not Found",
                ref_name.as_deref().unwrap_or("(default)")
            ))
        })
    }

    async fn list_merged_merge_requests(&self) -> Result<Vec<MergeRequest>, ForgeError> {
        self.forge.begin(MockOperation::ListMergedMergeRequests {
            project_id: self.project.id,
        })?;

        Ok(self.forge.inner.lock().unwrap().merge_requests.clone())
    }
}
