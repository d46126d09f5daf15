//! core::config
//!
//! Resolved run configuration.
//!
//! # Overview
//!
//! The tool reads no configuration files. Everything comes from the command
//! line, with defaults for the settings the command line does not expose.
//!
//! # Precedence
//!
//! 1. Default values
//! 2. CLI arguments (applied by [`crate::cli::args::Cli::into_config`])
//!
//! # Example
//!
//! ```
//! use gitlab_changelog::core::config::Config;
//! use gitlab_changelog::core::types::ReleaseIndicator;
//!
//! let config = Config::new("https://gitlab.example.com", "my-project", "glpat-xxx")
//!     .with_release_indicator(ReleaseIndicator::MergeRequests);
//!
//! assert_eq!(config.target_branch, "master");
//! assert_eq!(config.release_indicator, ReleaseIndicator::MergeRequests);
//! ```

use std::time::Duration;

use crate::core::types::ReleaseIndicator;
use crate::ui::output::Verbosity;

/// Branch that merge requests must target to count as releases.
pub const DEFAULT_TARGET_BRANCH: &str = "master";

/// Per-request timeout applied by the HTTP client.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for a single changelog run.
#[derive(Clone)]
pub struct Config {
    /// GitLab instance URL, without the `/api/v4` suffix
    pub base_url: String,
    /// Exact name of the project to report on
    pub project_name: String,
    /// Private token sent with every request
    pub private_token: String,
    /// Which entities define a release
    pub release_indicator: ReleaseIndicator,
    /// Target branch for merge request releases
    pub target_branch: String,
    /// Timeout for each HTTP request (`None` waits forever)
    pub request_timeout: Option<Duration>,
    /// Output verbosity
    pub verbosity: Verbosity,
}

// Custom Debug to avoid exposing private_token
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("base_url", &self.base_url)
            .field("project_name", &self.project_name)
            .field("has_private_token", &!self.private_token.is_empty())
            .field("release_indicator", &self.release_indicator)
            .field("target_branch", &self.target_branch)
            .field("request_timeout", &self.request_timeout)
            .field("verbosity", &self.verbosity)
            .finish()
    }
}

impl Config {
    /// Create a configuration with default settings.
    pub fn new(
        base_url: impl Into<String>,
        project_name: impl Into<String>,
        private_token: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            project_name: project_name.into(),
            private_token: private_token.into(),
            release_indicator: ReleaseIndicator::default(),
            target_branch: DEFAULT_TARGET_BRANCH.to_string(),
            request_timeout: Some(DEFAULT_REQUEST_TIMEOUT),
            verbosity: Verbosity::Normal,
        }
    }

    /// Set the release indicator.
    pub fn with_release_indicator(mut self, indicator: ReleaseIndicator) -> Self {
        self.release_indicator = indicator;
        self
    }

    /// Set the target branch for merge request releases.
    pub fn with_target_branch(mut self, branch: impl Into<String>) -> Self {
        self.target_branch = branch.into();
        self
    }

    /// Set the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the output verbosity.
    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }
}
