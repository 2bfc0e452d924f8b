//! Crate entry point for **pwagh**.
//!
//! Two request handlers for a PWA builder site:
//! - [`publish`] pushes a local directory to a GitHub repository, creating
//!   the repository and setting its default branch as needed.
//! - [`clone_template`] seeds a project's public directory from a template repository.
//!
//! Both take their settings explicitly and always return an [`Outcome`];
//! failures are data, never panics or propagated errors.

mod git;
mod github;
mod logging;
mod name;
mod outcome;
mod paths;
mod progress;
mod publish;
mod settings;
mod template;

use anyhow::Result;
use std::path::{Path, PathBuf};

pub use github::{ApiError, GitHubApi, Owner};
pub use logging::{ErrorSink, TracingSink, error_chain, init as init_logging};
pub use name::normalize_name;
pub use outcome::Outcome;
pub use paths::{project_public_dir, pwagh_home};
pub use publish::{
    DEFAULT_BRANCH, PublishError, PublishRequest, authenticated_url, publish, try_publish,
};
pub use settings::{
    CommitAuthor, DEFAULT_TEMPLATE_URL, IntegrationSettings, Secret, Settings, SiteSettings,
    load_settings, parse_settings,
};
pub use template::{CloneError, CloneRequest, clone_template, try_clone_template};

/// CLI command: publish `path` to GitHub as `repo`, pushing `branch`.
///
/// # Errors
/// Returns an error only if the settings cannot be loaded; publish failures
/// are reported through the returned [`Outcome`].
pub fn cmd_publish(
    config: Option<&Path>,
    path: PathBuf,
    repo: &str,
    branch: &str,
) -> Result<Outcome> {
    let settings = load_settings(config)?;
    let req = PublishRequest::new(path, repo).with_branch(branch);

    let pb = progress::spinner(format!("publishing {}…", req.repo_name));
    let outcome = publish(&settings, &req, &TracingSink);
    match outcome.error() {
        None => progress::finish(&pb, true, format!("published {}", req.repo_name)),
        Some(err) => progress::finish(
            &pb,
            false,
            format!("publish {} (error: {})", req.repo_name, err),
        ),
    }
    Ok(outcome)
}

/// CLI command: clone the template (or `url`) into the project's public directory.
///
/// # Errors
/// Returns an error only if the settings cannot be loaded.
pub fn cmd_clone(config: Option<&Path>, project: &str, url: Option<String>) -> Result<Outcome> {
    let settings = load_settings(config)?;
    let mut req = CloneRequest::new(project);
    if let Some(u) = url {
        req = req.with_url(u);
    }

    let pb = progress::spinner(format!("cloning template for {}…", project));
    let outcome = clone_template(&settings.site, &req, &TracingSink);
    match outcome.file_path() {
        Some(p) => progress::finish(&pb, true, format!("cloned into {}", p.display())),
        None => progress::finish(
            &pb,
            false,
            format!("clone {} (error: {})", project, outcome.error().unwrap_or_default()),
        ),
    }
    Ok(outcome)
}
