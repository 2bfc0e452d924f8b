//! Publish a local directory as a GitHub repository.
//!
//! The procedure is strictly sequential and stops at the first failing step:
//!
//! 1. Resolve `owner/repo` (organization if configured, else the user).
//! 2. Check the repository exists on GitHub; create it when the API says 404,
//!    then wait for provisioning.
//! 3. Open or initialize the local repository, stage everything, commit.
//! 4. Point `origin` at the token-authenticated URL.
//! 5. Switch to the target branch (creating it), stage and commit again.
//! 6. Push `branch:branch` to `origin`.
//! 7. Make the pushed branch the repository's default branch.
//!
//! Both commits are always made, even with nothing staged, so publishing an
//! unchanged directory twice succeeds both times. Nothing here locks the path
//! or the remote: concurrent publishes of the same directory race.

mod error;

use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

pub use error::PublishError;

use crate::git;
use crate::github::{ApiError, GitHubApi, Owner};
use crate::logging::{ErrorSink, error_chain};
use crate::name::normalize_name;
use crate::outcome::Outcome;
use crate::settings::{IntegrationSettings, Secret, Settings};

pub const DEFAULT_BRANCH: &str = "master";

const INITIAL_COMMIT: &str = "Initial commit";
const AUTOMATED_COMMIT: &str = "Automated commit";
const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// What to publish and where.
#[derive(Debug, Clone)]
pub struct PublishRequest {
    pub path: PathBuf,
    pub repo_name: String,
    pub branch_name: String,
}

impl PublishRequest {
    /// Request for `path` as `repo_name` on the default branch (`master`).
    pub fn new(path: impl Into<PathBuf>, repo_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            repo_name: repo_name.into(),
            branch_name: DEFAULT_BRANCH.to_string(),
        }
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch_name = branch.into();
        self
    }
}

/// Run a publish and fold any failure into an [`Outcome`].
///
/// Operational failures are reported to `sink`. Neither the returned error
/// nor the logged trace ever contains the access token.
pub fn publish(settings: &Settings, req: &PublishRequest, sink: &dyn ErrorSink) -> Outcome {
    let token = &settings.github.token;
    match try_publish(settings, req) {
        Ok(()) => Outcome::ok(),
        Err(e) => {
            let error = token.redact(&e.to_string());
            if let Some(title) = e.log_title() {
                sink.log_error(&token.redact(&error_chain(&e)), title);
            }
            tracing::warn!(error = %error, "publish failed");
            Outcome::failure(error)
        }
    }
}

/// Run a publish, returning the step-specific error on failure.
///
/// # Errors
/// See [`PublishError`]; the variant names the step that failed.
pub fn try_publish(settings: &Settings, req: &PublishRequest) -> Result<(), PublishError> {
    let gh = &settings.github;
    if !req.path.exists() {
        return Err(PublishError::PathNotFound(req.path.clone()));
    }
    let repo_name = normalize_name(&req.repo_name).ok_or_else(|| PublishError::InvalidName {
        kind: "repository",
        name: req.repo_name.clone(),
    })?;
    let branch = normalize_name(&req.branch_name).ok_or_else(|| PublishError::InvalidName {
        kind: "branch",
        name: req.branch_name.clone(),
    })?;

    let owner = resolve_owner(gh)?;
    let full_name = owner.full_name(&repo_name);
    tracing::info!(repo = %full_name, branch = %branch, path = %req.path.display(), "publishing");

    let api = GitHubApi::new(&gh.api_url, &gh.token)
        .map_err(|e| PublishError::Network(e.to_string()))?;
    ensure_hosted_repo(&api, gh, &owner, &repo_name, &full_name)?;

    let repo = git::open_or_init(&req.path)?;
    git::stage_all(&repo)?;
    git::commit(&repo, INITIAL_COMMIT, &settings.commit)?;

    git::ensure_remote(&repo, &authenticated_url(&gh.git_url, &gh.token, &full_name))?;

    git::checkout_branch(&repo, &branch)?;
    git::stage_all(&repo)?;
    git::commit(&repo, AUTOMATED_COMMIT, &settings.commit)?;

    git::push_branch(&repo, &branch, &gh.token).map_err(PublishError::Push)?;
    tracing::info!(repo = %full_name, branch = %branch, "push successful");

    api.set_default_branch(&full_name, &branch)
        .map_err(default_branch_error)?;
    tracing::info!(repo = %full_name, branch = %branch, "default branch set");
    Ok(())
}

fn resolve_owner(gh: &IntegrationSettings) -> Result<Owner, PublishError> {
    if let Some(org) = gh.target_org() {
        return Ok(Owner::Org(org.to_string()));
    }
    let user = gh.username.trim();
    if user.is_empty() {
        return Err(PublishError::MissingOwner);
    }
    Ok(Owner::User(user.to_string()))
}

/// Make sure `full_name` exists on GitHub, creating it when the API reports 404.
fn ensure_hosted_repo(
    api: &GitHubApi,
    gh: &IntegrationSettings,
    owner: &Owner,
    repo_name: &str,
    full_name: &str,
) -> Result<(), PublishError> {
    match api.repo_exists(full_name) {
        Ok(true) => {
            tracing::info!(repo = %full_name, "repository already exists");
            Ok(())
        }
        Ok(false) => {
            api.create_repo(owner, repo_name, gh.private)
                .map_err(create_error)?;
            tracing::info!(repo = %full_name, private = gh.private, "repository created");
            wait_for_provisioning(api, gh, full_name);
            Ok(())
        }
        Err(ApiError::Status { message, .. }) => Err(PublishError::ExistenceCheck(message)),
        Err(e) => Err(PublishError::Network(e.to_string())),
    }
}

/// A rejected creation keeps its step prefix; an unreachable API does not.
fn create_error(e: ApiError) -> PublishError {
    match e {
        ApiError::Status { message, .. } => PublishError::Create(message),
        other => PublishError::Network(other.to_string()),
    }
}

fn default_branch_error(e: ApiError) -> PublishError {
    match e {
        ApiError::Status { message, .. } => PublishError::DefaultBranch(message),
        other => PublishError::DefaultBranchUnreachable(other.to_string()),
    }
}

/// Give GitHub time to finish setting up a freshly created repository.
///
/// By default this is a fixed sleep. With `provision_poll` the existence
/// endpoint is polled instead, bounded by the same delay.
fn wait_for_provisioning(api: &GitHubApi, gh: &IntegrationSettings, full_name: &str) {
    let delay = gh.provision_delay();
    if !gh.provision_poll {
        if !delay.is_zero() {
            tracing::debug!(secs = delay.as_secs(), "waiting for repository provisioning");
            thread::sleep(delay);
        }
        return;
    }

    let Some(deadline) = Instant::now().checked_add(delay) else {
        tracing::warn!(repo = %full_name, "provisioning delay out of range, not waiting");
        return;
    };
    loop {
        if matches!(api.repo_exists(full_name), Ok(true)) {
            return;
        }
        let now = Instant::now();
        if now >= deadline {
            tracing::warn!(repo = %full_name, "repository not visible yet, pushing anyway");
            return;
        }
        thread::sleep(POLL_INTERVAL.min(deadline - now));
    }
}

/// `https://<token>@host/<owner>/<repo>.git`, built from the configured git base URL.
pub fn authenticated_url(git_url: &str, token: &Secret, full_name: &str) -> String {
    let base = git_url.trim_end_matches('/');
    let (scheme, rest) = base.split_once("://").unwrap_or(("https", base));
    format!("{}://{}@{}/{}.git", scheme, token.expose(), rest, full_name)
}
