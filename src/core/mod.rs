//! core
//!
//! Core domain types and configuration.
//!
//! # Modules
//!
//! - [`types`] - Projects, tags, merge requests, commits, and releases
//! - [`config`] - Resolved run configuration
//!
//! # Design Principles
//!
//! - Domain types are independent of the GitLab wire format
//! - Configuration is immutable once a run starts

pub mod config;
pub mod types;
