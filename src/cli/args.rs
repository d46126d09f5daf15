//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Usage
//!
//! ```text
//! gitlab-changelog <gitlab_url> <project_name> <private_token> [--release_indicator <ri>]
//! ```
//!
//! # Global Flags
//!
//! - `--help` / `-h`: Show usage
//! - `--version`: Show version
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Errors only
//!
//! Malformed invocations never fail: they print the usage text to stdout
//! and exit successfully, as `--help` does.

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use std::ffi::OsString;

use crate::core::config::Config;
use crate::core::types::ReleaseIndicator;
use crate::ui::output::Verbosity;

/// Build a changelog for a GitLab project from its tags or merged merge requests
#[derive(Parser, Debug)]
#[command(name = "gitlab-changelog")]
#[command(version, about, long_about = None)]
#[command(after_help = "\
EXAMPLE:
    gitlab-changelog https://gitlab.example.com my-project glpat-XXXXXXXXXXXX

RELEASE INDICATORS:
    tags            Every tag is a release. Its commits are the tag's history.
                    This is the default.
    merge_requests  Every merge request merged into master is a release. Its
                    commits are the history of the source branch.

    Any other value is treated as tags.")]
pub struct Cli {
    /// Base URL of the GitLab instance
    pub gitlab_url: String,

    /// Exact name of the project
    pub project_name: String,

    /// Personal access token with API read access
    pub private_token: String,

    /// What marks a release: tags or merge_requests
    #[arg(long = "release_indicator", value_name = "RI")]
    pub release_indicator: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Errors only; suppresses notices
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

impl Cli {
    /// Parse arguments, or produce the text to print instead of running.
    ///
    /// `Err` carries the usage text (or the version line for `--version`).
    /// It is not a failure: the caller prints it to stdout and exits 0.
    pub fn parse_or_usage<I, T>(args: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        match Self::try_parse_from(args) {
            Ok(cli) => Ok(cli),
            Err(e) if e.kind() == ErrorKind::DisplayVersion => Err(e.render().to_string()),
            Err(_) => Err(usage()),
        }
    }

    /// Output verbosity from the global flags.
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.debug)
    }

    /// Resolve the run configuration.
    pub fn into_config(self) -> Config {
        let indicator = ReleaseIndicator::from_flag(self.release_indicator.as_deref());
        let verbosity = self.verbosity();

        Config::new(self.gitlab_url, self.project_name, self.private_token)
            .with_release_indicator(indicator)
            .with_verbosity(verbosity)
    }
}

/// The usage text.
pub fn usage() -> String {
    Cli::command().render_help().to_string()
}
