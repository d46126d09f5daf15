//! release::tags
//!
//! Tag strategy: every tag is a release.
//!
//! The release is named after the tag and dated by the committed date of
//! the commit it points to. Its commits are the tag's full history as
//! listed by the API.

use tracing::debug;

use super::{fetch_batches, matching};
use crate::core::types::{Release, Tag};
use crate::forge::{ForgeError, ProjectForge};

/// Resolve one release per tag.
pub async fn resolve(project: &dyn ProjectForge) -> Result<Vec<Release>, ForgeError> {
    let tags = project.list_tags().await?;
    debug!(count = tags.len(), "fetched tags");

    let refs: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
    let batches = fetch_batches(project, &refs).await?;

    Ok(matching::attribute(
        &tags,
        batches,
        |tag: &Tag| tag.commit_id.as_str(),
        Release::from_tag,
    ))
}
