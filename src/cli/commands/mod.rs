//! cli::commands
//!
//! Command handlers.
//!
//! # Async Commands
//!
//! The changelog command is async because it talks to GitLab. The
//! synchronous entry point builds a tokio runtime and blocks on the async
//! implementation, which takes the forge as a trait object so it can run
//! against a mock.

mod changelog;

pub use changelog::{changelog, changelog_async, TAGS_NOTICE};
