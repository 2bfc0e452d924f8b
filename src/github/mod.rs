//! GitHub REST API access.
//!
//! Only the calls needed to publish a repository are covered: existence
//! check, creation, and default-branch update.

mod client;

pub use client::{ApiError, GitHubApi, Owner};
