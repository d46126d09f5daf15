//! cli::commands::changelog
//!
//! Build and print the changelog.
//!
//! # Flow
//!
//! 1. Announce the tags strategy (stderr, unless quiet)
//! 2. Search projects and pick the exact name match
//! 3. Resolve releases with the configured strategy
//! 4. Render to stdout
//!
//! Nothing project-scoped is requested until step 2 has produced a project.

use anyhow::{Context as _, Result};
use std::io::Write;
use tracing::{debug, info};

use crate::core::config::Config;
use crate::core::types::{Project, ReleaseIndicator};
use crate::forge::gitlab::GitLabClient;
use crate::forge::{Forge, ForgeError};
use crate::release::resolve_releases;
use crate::ui::{changelog::write_changelog, output};

/// Notice printed when tags define releases.
pub const TAGS_NOTICE: &str = "Using tags as release indicator";

/// Run the changelog command.
///
/// This is a synchronous wrapper that uses tokio to run the async implementation.
pub fn changelog(config: &Config) -> Result<()> {
    let forge = GitLabClient::from_config(config).context("Failed to create GitLab client")?;

    let rt = tokio::runtime::Runtime::new()?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    rt.block_on(changelog_async(&forge, config, &mut out))
}

/// Async implementation of changelog, generic over the forge and the sink.
pub async fn changelog_async<W: Write>(
    forge: &dyn Forge,
    config: &Config,
    out: &mut W,
) -> Result<()> {
    if config.release_indicator == ReleaseIndicator::Tags {
        output::note(TAGS_NOTICE, config.verbosity);
    }

    let project = select_project(forge, &config.project_name).await?;
    info!(project_id = project.id, name = %project.name, "selected project");

    let scoped = forge.for_project(project);
    let releases = resolve_releases(
        config.release_indicator,
        scoped.as_ref(),
        &config.target_branch,
    )
    .await
    .with_context(|| {
        format!(
            "Failed to resolve releases using {}",
            config.release_indicator
        )
    })?;
    debug!(count = releases.len(), "resolved releases");

    write_changelog(out, releases, &config.project_name).context("Failed to write changelog")?;
    Ok(())
}

/// Find the project whose name is exactly `name`.
///
/// Search is a server-side substring match, so the first exact match among
/// the results wins.
async fn select_project(forge: &dyn Forge, name: &str) -> Result<Project> {
    let candidates = forge
        .search_projects(Some(name))
        .await
        .context("Failed to search projects")?;
    debug!(count = candidates.len(), name, "project search results");

    candidates
        .into_iter()
        .find(|p| p.name == name)
        .ok_or_else(|| ForgeError::NoProjectSelected(name.to_string()).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{parse_timestamp, Commit, MergeRequest, Tag};
    use crate::forge::mock::{FailOn, MockForge, MockOperation};
    use crate::ui::output::Verbosity;

    fn config(indicator: ReleaseIndicator) -> Config {
        Config::new("https://gitlab.example.com", "proj", "tok")
            .with_release_indicator(indicator)
            .with_verbosity(Verbosity::Quiet)
    }

    async fn run(forge: &MockForge, config: &Config) -> Result<String> {
        let mut out = Vec::new();
        changelog_async(forge, config, &mut out).await?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn tags_changelog() {
        let forge = MockForge::new()
            .with_projects(vec![Project::new(1, "proj")])
            .with_tags(vec![Tag {
                name: "v1".into(),
                commit_id: "c1".into(),
                committed_date: parse_timestamp("2020-01-01T00:00:00Z").unwrap(),
            }])
            .with_commits(
                Some("v1"),
                vec![
                    Commit::new("c1", "Add feature"),
                    Commit::new("c0", "Merge branch 'x'"),
                ],
            );

        let text = run(&forge, &config(ReleaseIndicator::Tags)).await.unwrap();
        assert_eq!(
            text,
            "=================================================\n\
             proj - v1 (Released 2020-1-1)\n\
             \tAdd feature\n\n"
        );
    }

    #[tokio::test]
    async fn merge_request_changelog() {
        let forge = MockForge::new()
            .with_projects(vec![Project::new(1, "proj")])
            .with_merge_requests(vec![
                MergeRequest {
                    source_branch: "feature/b".into(),
                    target_branch: "master".into(),
                    sha: "b1".into(),
                    created_at: parse_timestamp("2021-06-02T10:00:00Z").unwrap(),
                },
                MergeRequest {
                    source_branch: "feature/a".into(),
                    target_branch: "master".into(),
                    sha: "a1".into(),
                    created_at: parse_timestamp("2021-06-01T10:00:00Z").unwrap(),
                },
            ])
            .with_commits(Some("feature/a"), vec![Commit::new("a1", "A work")])
            .with_commits(Some("feature/b"), vec![Commit::new("b1", "B work")]);

        let text = run(&forge, &config(ReleaseIndicator::MergeRequests))
            .await
            .unwrap();
        let a = text.find("proj - feature/a (Released 2021-6-1)").unwrap();
        let b = text.find("proj - feature/b (Released 2021-6-2)").unwrap();
        assert!(a < b);
    }

    #[tokio::test]
    async fn exact_name_match_wins_over_earlier_substring_match() {
        let forge = MockForge::new()
            .with_projects(vec![Project::new(1, "proj-old"), Project::new(2, "proj")]);

        run(&forge, &config(ReleaseIndicator::Tags)).await.unwrap();

        assert!(forge
            .operations()
            .contains(&MockOperation::ListTags { project_id: 2 }));
    }

    #[tokio::test]
    async fn missing_project_stops_before_scoped_calls() {
        let forge = MockForge::new().with_projects(vec![Project::new(1, "proj-old")]);

        let err = run(&forge, &config(ReleaseIndicator::Tags))
            .await
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<ForgeError>(),
            Some(&ForgeError::NoProjectSelected("proj".into()))
        );
        assert!(forge.operations().iter().all(|op| !op.is_project_scoped()));
    }

    #[tokio::test]
    async fn search_failure_is_reported_with_context() {
        let forge = MockForge::new()
            .fail_on(FailOn::SearchProjects(ForgeError::AuthFailed("401 Unauthorized".into())));

        let err = run(&forge, &config(ReleaseIndicator::Tags))
            .await
            .unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.starts_with("Failed to search projects"));
        assert!(message.contains("authentication failed"));
    }

    #[tokio::test]
    async fn no_output_on_resolution_failure() {
        let forge = MockForge::new()
            .with_projects(vec![Project::new(1, "proj")])
            .fail_on(FailOn::ListMergedMergeRequests(ForgeError::NetworkError(
                "timed out".into(),
            )));

        let mut out = Vec::new();
        let result = changelog_async(
            &forge,
            &config(ReleaseIndicator::MergeRequests),
            &mut out,
        )
        .await;
        assert!(result.is_err());
        assert!(out.is_empty());
    }
}
