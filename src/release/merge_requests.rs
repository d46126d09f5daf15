//! release::merge_requests
//!
//! Merge request strategy: every merge request merged into the target
//! branch is a release.
//!
//! The release is named after the source branch and dated by the merge
//! request's creation time. Its commits are the source branch history,
//! matched back to the merge request through the merge request's `sha`.
//! Merge requests into any other branch are ignored.

use tracing::debug;

use super::{fetch_batches, matching};
use crate::core::types::{MergeRequest, Release};
use crate::forge::{ForgeError, ProjectForge};

/// Resolve one release per merge request merged into `target_branch`.
pub async fn resolve(
    project: &dyn ProjectForge,
    target_branch: &str,
) -> Result<Vec<Release>, ForgeError> {
    let eligible: Vec<MergeRequest> = project
        .list_merged_merge_requests()
        .await?
        .into_iter()
        .filter(|mr| mr.target_branch == target_branch)
        .collect();
    debug!(count = eligible.len(), target_branch, "fetched merged merge requests");

    let refs: Vec<&str> = eligible.iter().map(|mr| mr.source_branch.as_str()).collect();
    let batches = fetch_batches(project, &refs).await?;

    Ok(matching::attribute(
        &eligible,
        batches,
        |mr: &MergeRequest| mr.sha.as_str(),
        Release::from_merge_request,
    ))
}
