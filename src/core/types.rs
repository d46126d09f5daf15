//! core::types
//!
//! Domain types for changelog generation.
//!
//! # Types
//!
//! - [`Project`] - A GitLab project selected by name
//! - [`Tag`] - A version tag and the commit it points to
//! - [`MergeRequest`] - A merged merge request
//! - [`Commit`] - A single commit from a ref's history
//! - [`Release`] - A version label, its date, and the commits it shipped
//! - [`ReleaseIndicator`] - Which of the above defines a release boundary
//!
//! # Timestamps
//!
//! Timestamps keep the UTC offset they were recorded with. Comparisons are
//! by instant, so releases recorded in different offsets still sort
//! correctly, while calendar dates are rendered the way the author saw them.
//!
//! # Examples
//!
//! ```
//! use gitlab_changelog::core::types::{parse_timestamp, ReleaseIndicator};
//!
//! let ts = parse_timestamp("2012-05-28T04:42:42.000-07:00").unwrap();
//! assert_eq!(ts.offset().local_minus_utc(), -7 * 3600);
//!
//! assert_eq!(ReleaseIndicator::from_flag(Some("merge_requests")), ReleaseIndicator::MergeRequests);
//! assert_eq!(ReleaseIndicator::from_flag(Some("foo")), ReleaseIndicator::Tags);
//! ```

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use thiserror::Error;

/// A point in time with the offset it was recorded in.
pub type Timestamp = DateTime<FixedOffset>;

/// Errors from parsing domain values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

/// Parse a timestamp as returned by the GitLab API.
///
/// Accepts RFC 3339 (with or without fractional seconds) and bare
/// `YYYY-MM-DD` dates, which are taken as midnight UTC.
///
/// # Errors
///
/// Returns `TypeError::InvalidTimestamp` if neither form matches.
pub fn parse_timestamp(value: &str) -> Result<Timestamp, TypeError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts);
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::MIN).and_utc().fixed_offset())
        .map_err(|_| TypeError::InvalidTimestamp(value.to_string()))
}

/// A GitLab project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    /// Numeric project id used in API paths
    pub id: u64,
    /// Display name, matched exactly against the requested name
    pub name: String,
}

impl Project {
    /// Create a project.
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// A repository tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// Tag name, used as the version label
    pub name: String,
    /// Id of the commit the tag points to
    pub commit_id: String,
    /// Committed date of that commit
    pub committed_date: Timestamp,
}

/// A merged merge request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRequest {
    /// Branch the changes came from
    pub source_branch: String,
    /// Branch the changes were merged into
    pub target_branch: String,
    /// Head commit the merge request merged as
    pub sha: String,
    /// When the merge request was opened
    pub created_at: Timestamp,
}

/// A commit in a ref's history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    /// Full commit id
    pub id: String,
    /// First line of the commit message
    pub title: String,
    /// Committed date, when the API reported one
    pub committed_date: Option<Timestamp>,
}

impl Commit {
    /// Create a commit without a date.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            committed_date: None,
        }
    }
}

/// A release: a version label, its date, and its commits newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub version_name: String,
    pub release_date: Timestamp,
    pub commits: Vec<Commit>,
}

impl Release {
    /// Build a release from a tag and the commit batch fetched for it.
    pub fn from_tag(tag: &Tag, commits: Vec<Commit>) -> Self {
        Self {
            version_name: tag.name.clone(),
            release_date: tag.committed_date,
            commits,
        }
    }

    /// Build a release from a merge request and its source branch commits.
    pub fn from_merge_request(mr: &MergeRequest, commits: Vec<Commit>) -> Self {
        Self {
            version_name: mr.source_branch.clone(),
            release_date: mr.created_at,
            commits,
        }
    }
}

/// What defines a release boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReleaseIndicator {
    /// Each tag is a release
    #[default]
    Tags,
    /// Each merge request merged into the target branch is a release
    MergeRequests,
}

impl ReleaseIndicator {
    /// Interpret the `--release_indicator` flag value.
    ///
    /// Only `merge_requests` selects merge requests. Anything else,
    /// including no value at all, falls back to tags.
    pub fn from_flag(value: Option<&str>) -> Self {
        match value {
            Some("merge_requests") => ReleaseIndicator::MergeRequests,
            _ => ReleaseIndicator::Tags,
        }
    }
}

impl std::fmt::Display for ReleaseIndicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReleaseIndicator::Tags => write!(f, "tags"),
            ReleaseIndicator::MergeRequests => write!(f, "merge_requests"),
        }
    }
}
