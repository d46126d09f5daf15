//! release
//!
//! Release resolution: turning forge listings into [`Release`]s.
//!
//! # Strategies
//!
//! - [`tags`]: every tag is a release; its commits are the tag's history
//! - [`merge_requests`]: every merge request merged into the target branch
//!   is a release; its commits are the source branch's history
//!
//! Both strategies fetch one commit listing per candidate ref concurrently
//! and wait for all of them ([`fetch_batches`]). If any listing fails the
//! whole resolution fails and the remaining requests are dropped. The
//! batches are then attributed back to candidates by [`matching`].

pub mod matching;
pub mod merge_requests;
pub mod tags;

use futures::future::try_join_all;
use tracing::debug;

use crate::core::types::{Commit, Release, ReleaseIndicator};
use crate::forge::{ForgeError, ProjectForge};

/// Commits listed for one ref, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitBatch {
    /// The ref the listing was requested for
    pub ref_name: String,
    /// The commits, in the order the API returned them
    pub commits: Vec<Commit>,
}

/// Fetch the commit listing of every ref concurrently.
///
/// Duplicate refs are fetched once. Batches come back in the order their
/// refs were first given.
///
/// # Errors
///
/// The first error from any listing; no partial results are returned.
pub async fn fetch_batches(
    project: &dyn ProjectForge,
    refs: &[&str],
) -> Result<Vec<CommitBatch>, ForgeError> {
    let mut unique: Vec<&str> = Vec::with_capacity(refs.len());
    for &r in refs {
        if !unique.contains(&r) {
            unique.push(r);
        }
    }

    debug!(count = unique.len(), "fetching commit listings");

    let requests = unique.into_iter().map(|ref_name| async move {
        let commits = project.list_commits(Some(ref_name)).await?;
        debug!(ref_name, commits = commits.len(), "fetched commit listing");
        Ok::<_, ForgeError>(CommitBatch {
            ref_name: ref_name.to_string(),
            commits,
        })
    });

    try_join_all(requests).await
}

/// Resolve releases for `project` using the chosen strategy.
///
/// # Arguments
///
/// * `indicator` - Which strategy defines a release
/// * `project` - Project-scoped forge handle
/// * `target_branch` - Target branch for merge request releases
pub async fn resolve_releases(
    indicator: ReleaseIndicator,
    project: &dyn ProjectForge,
    target_branch: &str,
) -> Result<Vec<Release>, ForgeError> {
    match indicator {
        ReleaseIndicator::Tags => tags::resolve(project).await,
        ReleaseIndicator::MergeRequests => merge_requests::resolve(project, target_branch).await,
    }
}
