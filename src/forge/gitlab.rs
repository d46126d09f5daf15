//! forge::gitlab
//!
//! GitLab forge implementation using the REST API (v4).
//!
//! # Design
//!
//! [`GitLabClient`] implements [`Forge`]. It owns a configured `reqwest`
//! client with the private token installed as a default header, so the
//! token never has to travel with individual calls. Project-scoped calls go
//! through [`GitLabProjectClient`], which can only be obtained from
//! [`Forge::for_project`].
//!
//! Endpoints used, relative to `{base_url}/api/v4/projects`:
//!
//! | Operation | Request |
//! |-----------|---------|
//! | search projects | `GET ?simple=true&search=<name>` |
//! | tags | `GET /{id}/repository/tags` |
//! | commits | `GET /{id}/repository/commits?ref_name=<ref>` |
//! | merged merge requests | `GET /{id}/merge_requests?state=merged` |
//!
//! Only the first page of each listing is read.
//!
//! # Errors
//!
//! Failures map onto [`ForgeError`] and are never retried:
//! - 401/403 -> `AuthFailed`
//! - 404 -> `NotFound`
//! - other non-2xx -> `ApiError`
//! - transport failures and timeouts -> `NetworkError`
//! - undecodable bodies -> `InvalidResponse`
//!
//! # Example
//!
//! ```ignore
//! use gitlab_changelog::forge::gitlab::GitLabClient;
//! use gitlab_changelog::forge::Forge;
//!
//! let client = GitLabClient::new("https://gitlab.example.com", "glpat-xxx")?;
//! let projects = client.search_projects(Some("my-project")).await?;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::traits::{Forge, ForgeError, ProjectForge};
use crate::core::config::{Config, DEFAULT_REQUEST_TIMEOUT};
use crate::core::types::{parse_timestamp, Commit, MergeRequest, Project, Tag, Timestamp};

/// Path appended to the instance URL to reach the projects API.
const PROJECTS_PATH: &str = "/api/v4/projects";

/// Header carrying the private token.
const PRIVATE_TOKEN_HEADER: &str = "private-token";

/// User-Agent header value for API requests.
const USER_AGENT_VALUE: &str = concat!("gitlab-changelog/", env!("CARGO_PKG_VERSION"));

/// Shared request plumbing for the top-level and project-scoped clients.
#[derive(Clone)]
struct Transport {
    /// HTTP client with auth headers installed
    client: Client,
    /// `{base_url}/api/v4/projects`
    projects_url: String,
}

impl Transport {
    fn new(base_url: &str, token: &str, timeout: Option<Duration>) -> Result<Self, ForgeError> {
        let base_url = base_url.trim_end_matches('/');
        Url::parse(base_url)
            .map_err(|e| ForgeError::InvalidConfig(format!("invalid base URL '{}': {}", base_url, e)))?;

        let mut token_value = HeaderValue::from_str(token).map_err(|_| {
            ForgeError::InvalidConfig("private token contains characters not allowed in a header".into())
        })?;
        token_value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(PRIVATE_TOKEN_HEADER, token_value);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ForgeError::InvalidConfig(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            projects_url: format!("{}{}", base_url, PROJECTS_PATH),
        })
    }

    /// GET `url` with `query` and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ForgeError> {
        tracing::debug!(%url, ?query, "GET");

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| ForgeError::NetworkError(e.to_string()))?;

        handle_response(response).await
    }
}

/// Handle API response, mapping errors appropriately.
async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T, ForgeError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ForgeError::NetworkError(e.to_string()))?;

    if status.is_success() {
        serde_json::from_str(&body)
            .map_err(|e| ForgeError::InvalidResponse(format!("failed to parse response: {}", e)))
    } else {
        Err(error_for_status(status, &body))
    }
}

/// Map a non-success status and its body to a `ForgeError`.
fn error_for_status(status: StatusCode, body: &str) -> ForgeError {
    let message = error_message(body);

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ForgeError::AuthFailed(message),
        StatusCode::NOT_FOUND => ForgeError::NotFound(message),
        _ if status.is_server_error() => ForgeError::ApiError {
            status: status.as_u16(),
            message: format!("GitLab server error: {}", message),
        },
        _ => ForgeError::ApiError {
            status: status.as_u16(),
            message,
        },
    }
}

/// Extract a readable message from a GitLab error body.
///
/// GitLab uses `{"message": "..."}` for most errors, `{"message": {...}}`
/// for validation errors, and `{"error": "...", "error_description": "..."}`
/// for OAuth-style token errors.
fn error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        match value.get("message") {
            Some(serde_json::Value::String(msg)) => return msg.clone(),
            Some(other) => return other.to_string(),
            None => {}
        }
        for key in ["error_description", "error"] {
            if let Some(msg) = value.get(key).and_then(|v| v.as_str()) {
                return msg.to_string();
            }
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        "Unknown error".to_string()
    } else {
        trimmed.to_string()
    }
}

/// GitLab forge implementation.
#[derive(Clone)]
pub struct GitLabClient {
    transport: Transport,
}

// Custom Debug to keep the client (and its default headers) out of logs
impl std::fmt::Debug for GitLabClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitLabClient")
            .field("projects_url", &self.transport.projects_url)
            .finish()
    }
}

impl GitLabClient {
    /// Create a client for the GitLab instance at `base_url`.
    ///
    /// Uses [`DEFAULT_REQUEST_TIMEOUT`] for every request.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Instance URL, e.g. `https://gitlab.example.com`
    /// * `token` - Private (personal access) token
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the URL does not parse or the token is not a
    /// valid header value.
    ///
    /// # Example
    ///
    /// ```
    /// use gitlab_changelog::forge::gitlab::GitLabClient;
    ///
    /// let client = GitLabClient::new("https://gitlab.example.com/", "glpat-xxx").unwrap();
    /// assert_eq!(client.projects_url(), "https://gitlab.example.com/api/v4/projects");
    ///
    /// assert!(GitLabClient::new("not a url", "glpat-xxx").is_err());
    /// ```
    pub fn new(base_url: &str, token: &str) -> Result<Self, ForgeError> {
        Self::with_timeout(base_url, token, Some(DEFAULT_REQUEST_TIMEOUT))
    }

    /// Create a client with a custom per-request timeout.
    ///
    /// `None` disables the timeout.
    pub fn with_timeout(
        base_url: &str,
        token: &str,
        timeout: Option<Duration>,
    ) -> Result<Self, ForgeError> {
        Ok(Self {
            transport: Transport::new(base_url, token, timeout)?,
        })
    }

    /// Create a client from a run configuration.
    pub fn from_config(config: &Config) -> Result<Self, ForgeError> {
        Self::with_timeout(
            &config.base_url,
            &config.private_token,
            config.request_timeout,
        )
    }

    /// Get the projects API URL.
    pub fn projects_url(&self) -> &str {
        &self.transport.projects_url
    }

    /// Get a concrete project-scoped client.
    pub fn project_client(&self, project: Project) -> GitLabProjectClient {
        GitLabProjectClient {
            transport: self.transport.clone(),
            project,
        }
    }
}

#[async_trait]
impl Forge for GitLabClient {
    fn name(&self) -> &'static str {
        "gitlab"
    }

    async fn search_projects(&self, name_filter: Option<&str>) -> Result<Vec<Project>, ForgeError> {
        let mut query = vec![("simple", "true")];
        if let Some(name) = name_filter {
            query.push(("search", name));
        }

        let projects: Vec<GitLabProject> = self
            .transport
            .get_json(&self.transport.projects_url, &query)
            .await?;

        Ok(projects.into_iter().map(Into::into).collect())
    }

    fn for_project(&self, project: Project) -> Box<dyn ProjectForge> {
        Box::new(self.project_client(project))
    }
}

/// GitLab client bound to one project.
#[derive(Clone)]
pub struct GitLabProjectClient {
    transport: Transport,
    project: Project,
}

impl std::fmt::Debug for GitLabProjectClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitLabProjectClient")
            .field("projects_url", &self.transport.projects_url)
            .field("project", &self.project)
            .finish()
    }
}

impl GitLabProjectClient {
    /// Build URL for a project endpoint.
    fn project_url(&self, path: &str) -> String {
        format!("{}/{}/{}", self.transport.projects_url, self.project.id, path)
    }
}

#[async_trait]
impl ProjectForge for GitLabProjectClient {
    fn project(&self) -> &Project {
        &self.project
    }

    async fn list_tags(&self) -> Result<Vec<Tag>, ForgeError> {
        let tags: Vec<GitLabTag> = self
            .transport
            .get_json(&self.project_url("repository/tags"), &[])
            .await?;

        tags.into_iter().map(Tag::try_from).collect()
    }

    async fn list_commits(&self, ref_name: Option<&str>) -> Result<Vec<Commit>, ForgeError> {
        let query: Vec<(&str, &str)> = ref_name.map(|r| ("ref_name", r)).into_iter().collect();

        let commits: Vec<GitLabCommit> = self
            .transport
            .get_json(&self.project_url("repository/commits"), &query)
            .await?;

        commits.into_iter().map(Commit::try_from).collect()
    }

    async fn list_merged_merge_requests(&self) -> Result<Vec<MergeRequest>, ForgeError> {
        let mrs: Vec<GitLabMergeRequest> = self
            .transport
            .get_json(&self.project_url("merge_requests"), &[("state", "merged")])
            .await?;

        mrs.into_iter().map(MergeRequest::try_from).collect()
    }
}

// --------------------------------------------------------------------------
// Wire types
// --------------------------------------------------------------------------

/// Project as returned by `GET /projects?simple=true`.
#[derive(Debug, Deserialize)]
struct GitLabProject {
    id: u64,
    name: String,
}

/// Tag as returned by `GET /projects/{id}/repository/tags`.
#[derive(Debug, Deserialize)]
struct GitLabTag {
    name: String,
    commit: GitLabTagCommit,
}

#[derive(Debug, Deserialize)]
struct GitLabTagCommit {
    id: String,
    committed_date: String,
}

/// Commit as returned by `GET /projects/{id}/repository/commits`.
#[derive(Debug, Deserialize)]
struct GitLabCommit {
    id: String,
    title: String,
    #[serde(default)]
    committed_date: Option<String>,
}

/// Merge request as returned by `GET /projects/{id}/merge_requests`.
#[derive(Debug, Deserialize)]
struct GitLabMergeRequest {
    source_branch: String,
    target_branch: String,
    sha: String,
    created_at: String,
}

fn timestamp_field(
    value: &str,
    field: &str,
    owner: &str,
) -> Result<Timestamp, ForgeError> {
    parse_timestamp(value)
        .map_err(|e| ForgeError::InvalidResponse(format!("{} of {}: {}", field, owner, e)))
}

impl From<GitLabProject> for Project {
    fn from(p: GitLabProject) -> Self {
        Project::new(p.id, p.name)
    }
}

impl TryFrom<GitLabTag> for Tag {
    type Error = ForgeError;

    fn try_from(tag: GitLabTag) -> Result<Self, Self::Error> {
        let committed_date = timestamp_field(
            &tag.commit.committed_date,
            "committed_date",
            &format!("tag '{}'", tag.name),
        )?;

        Ok(Tag {
            name: tag.name,
            commit_id: tag.commit.id,
            committed_date,
        })
    }
}

impl TryFrom<GitLabCommit> for Commit {
    type Error = ForgeError;

    fn try_from(commit: GitLabCommit) -> Result<Self, Self::Error> {
        let committed_date = match commit.committed_date.as_deref() {
            Some(raw) => Some(timestamp_field(
                raw,
                "committed_date",
                &format!("commit {}", commit.id),
            )?),
            None => None,
        };

        Ok(Commit {
            id: commit.id,
            title: commit.title,
            committed_date,
        })
    }
}

impl TryFrom<GitLabMergeRequest> for MergeRequest {
    type Error = ForgeError;

    fn try_from(mr: GitLabMergeRequest) -> Result<Self, Self::Error> {
        let created_at = timestamp_field(
            &mr.created_at,
            "created_at",
            &format!("merge request from '{}'", mr.source_branch),
        )?;

        Ok(MergeRequest {
            source_branch: mr.source_branch,
            target_branch: mr.target_branch,
            sha: mr.sha,
            created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod construction {
        use super::*;

        #[test]
        fn projects_url_strips_trailing_slash() {
            let client = GitLabClient::new("https://gitlab.example.com/", "token").unwrap();
            assert_eq!(
                client.projects_url(),
                "https://gitlab.example.com/api/v4/projects"
            );
        }

        #[test]
        fn projects_url_keeps_subpath() {
            let client = GitLabClient::new("https://example.com/gitlab", "token").unwrap();
            assert_eq!(
                client.projects_url(),
                "https://example.com/gitlab/api/v4/projects"
            );
        }

        #[test]
        fn invalid_base_url() {
            let err = GitLabClient::new("gitlab.example.com", "token").unwrap_err();
            assert!(matches!(err, ForgeError::InvalidConfig(_)));
        }

        #[test]
        fn token_with_newline_rejected() {
            let err = GitLabClient::new("https://gitlab.example.com", "abc\ndef").unwrap_err();
            assert!(matches!(err, ForgeError::InvalidConfig(_)));
        }

        #[test]
        fn from_config_uses_config_values() {
            let config = Config::new("https://gitlab.example.com", "proj", "token")
                .with_request_timeout(None);
            let client = GitLabClient::from_config(&config).unwrap();
            assert_eq!(client.name(), "gitlab");
            assert_eq!(
                client.projects_url(),
                "https://gitlab.example.com/api/v4/projects"
            );
        }

        #[test]
        fn debug_does_not_expose_token() {
            let client = GitLabClient::new("https://gitlab.example.com", "glpat-secret").unwrap();
            let debug_output = format!("{:?}", client);
            assert!(!debug_output.contains("glpat-secret"));
            assert!(debug_output.contains("projects_url"));

            let scoped = client.project_client(Project::new(7, "proj"));
            let debug_output = format!("{:?}", scoped);
            assert!(!debug_output.contains("glpat-secret"));
            assert!(debug_output.contains("proj"));
        }

        #[test]
        fn project_url_format() {
            let client = GitLabClient::new("https://gitlab.example.com", "token").unwrap();
            let scoped = client.project_client(Project::new(42, "proj"));
            assert_eq!(
                scoped.project_url("repository/tags"),
                "https://gitlab.example.com/api/v4/projects/42/repository/tags"
            );
            assert_eq!(scoped.project().id, 42);
        }
    }

    mod errors {
        use super::*;

        #[test]
        fn message_string() {
            assert_eq!(
                error_message(r#"{"message":"404 Project Not Found"}"#),
                "404 Project Not Found"
            );
        }

        #[test]
        fn message_object() {
            assert_eq!(
                error_message(r#"{"message":{"ref_name":["is invalid"]}}"#),
                r#"{"ref_name":["is invalid"]}"#
            );
        }

        #[test]
        fn oauth_style_error() {
            assert_eq!(
                error_message(r#"{"error":"invalid_token","error_description":"Token was revoked"}"#),
                "Token was revoked"
            );
            assert_eq!(error_message(r#"{"error":"insufficient_scope"}"#), "insufficient_scope");
        }

        #[test]
        fn plain_and_empty_bodies() {
            assert_eq!(error_message("Bad Gateway\n"), "Bad Gateway");
            assert_eq!(error_message(""), "Unknown error");
        }

        #[test]
        fn status_mapping() {
            assert!(matches!(
                error_for_status(StatusCode::UNAUTHORIZED, r#"{"message":"401 Unauthorized"}"#),
                ForgeError::AuthFailed(ref m) if m == "401 Unauthorized"
            ));
            assert!(matches!(
                error_for_status(StatusCode::FORBIDDEN, ""),
                ForgeError::AuthFailed(_)
            ));
            assert!(matches!(
                error_for_status(StatusCode::NOT_FOUND, r#"{"message":"404 Not found"}"#),
                ForgeError::NotFound(_)
            ));
            assert_eq!(
                error_for_status(StatusCode::BAD_REQUEST, r#"{"message":"bad"}"#),
                ForgeError::ApiError {
                    status: 400,
                    message: "bad".into()
                }
            );
            assert_eq!(
                error_for_status(StatusCode::BAD_GATEWAY, ""),
                ForgeError::ApiError {
                    status: 502,
                    message: "GitLab server error: Unknown error".into()
                }
            );
        }
    }

    mod wire {
        use super::*;

        #[test]
        fn tag_conversion() {
            let raw: GitLabTag = serde_json::from_str(
                r#"{"name":"v1.0.0","message":null,"commit":{"id":"abc","short_id":"abc","committed_date":"2020-01-01T10:00:00.000+01:00"}}"#,
            )
            .unwrap();
            let tag = Tag::try_from(raw).unwrap();
            assert_eq!(tag.name, "v1.0.0");
            assert_eq!(tag.commit_id, "abc");
            assert_eq!(tag.committed_date.offset().local_minus_utc(), 3600);
        }

        #[test]
        fn tag_with_bad_date() {
            let raw: GitLabTag = serde_json::from_str(
                r#"{"name":"v1","commit":{"id":"abc","committed_date":"soon"}}"#,
            )
            .unwrap();
            let err = Tag::try_from(raw).unwrap_err();
            assert!(matches!(err, ForgeError::InvalidResponse(ref m) if m.contains("tag 'v1'")));
        }

        #[test]
        fn commit_without_date() {
            let raw: GitLabCommit =
                serde_json::from_str(r#"{"id":"c1","title":"Add feature"}"#).unwrap();
            let commit = Commit::try_from(raw).unwrap();
            assert_eq!(commit, Commit::new("c1", "Add feature"));
        }

        #[test]
        fn commit_with_date() {
            let raw: GitLabCommit = serde_json::from_str(
                r#"{"id":"c1","title":"Add feature","committed_date":"2020-01-01T00:00:00Z"}"#,
            )
            .unwrap();
            let commit = Commit::try_from(raw).unwrap();
            assert!(commit.committed_date.is_some());
        }

        #[test]
        fn merge_request_conversion() {
            let raw: GitLabMergeRequest = serde_json::from_str(
                r#"{"iid":3,"source_branch":"feature","target_branch":"master","sha":"def","created_at":"2021-06-15T12:00:00.000Z","state":"merged"}"#,
            )
            .unwrap();
            let mr = MergeRequest::try_from(raw).unwrap();
            assert_eq!(mr.source_branch, "feature");
            assert_eq!(mr.target_branch, "master");
            assert_eq!(mr.sha, "def");
        }

        #[test]
        fn project_conversion_ignores_extra_fields() {
            let raw: GitLabProject = serde_json::from_str(
                r#"{"id":5,"name":"proj","path_with_namespace":"group/proj"}"#,
            )
            .unwrap();
            assert_eq!(Project::from(raw), Project::new(5, "proj"));
        }
    }
}
