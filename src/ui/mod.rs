//! ui
//!
//! User-facing output.
//!
//! # Modules
//!
//! - [`output`] - Verbosity and stderr helpers
//! - [`changelog`] - Plain-text changelog rendering
//!
//! # Design
//!
//! All console output goes through this module, so the stdout/stderr
//! split stays consistent.

pub mod changelog;
pub mod output;
