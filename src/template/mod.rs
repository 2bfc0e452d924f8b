use git2::ErrorCode;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::git;
use crate::logging::{ErrorSink, error_chain};
use crate::outcome::Outcome;
use crate::paths::project_public_dir;
use crate::settings::SiteSettings;

/// Which project to seed, and from where.
#[derive(Debug, Clone)]
pub struct CloneRequest {
    pub project_name: String,
    /// Source repository; `None` means the site's configured template.
    pub repo_url: Option<String>,
}

impl CloneRequest {
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            repo_url: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.repo_url = Some(url.into());
        self
    }
}

#[derive(Debug, Error)]
pub enum CloneError {
    #[error("Invalid project name: {0:?}")]
    InvalidProject(String),

    #[error("Directory {} exists but is not a valid Git repository.", .0.display())]
    NotARepository(PathBuf),

    #[error("{}", .0.message())]
    Git(#[from] git2::Error),

    #[error("{0}")]
    Io(#[from] io::Error),
}

/// Clone the template repository into the project's public directory.
///
/// Whatever is already in a non-empty target directory is deleted first.
/// On success the outcome carries the target path.
pub fn clone_template(site: &SiteSettings, req: &CloneRequest, sink: &dyn ErrorSink) -> Outcome {
    match try_clone_template(site, req) {
        Ok(dest) => Outcome::Success {
            message: Some("Repository cloned successfully.".to_string()),
            file_path: Some(dest),
        },
        Err(e) => {
            if matches!(e, CloneError::Git(_) | CloneError::Io(_)) {
                sink.log_error(&error_chain(&e), "Template Clone Failed");
            }
            tracing::warn!(error = %e, project = %req.project_name, "template clone failed");
            Outcome::failure(e.to_string())
        }
    }
}

/// Clone the template, returning the populated directory.
///
/// # Errors
/// - [`CloneError::InvalidProject`] if the project name is not a single path segment.
/// - [`CloneError::Io`] if the old directory cannot be inspected or removed.
/// - [`CloneError::NotARepository`] if the destination is in the way of the clone.
/// - [`CloneError::Git`] for any other clone failure.
pub fn try_clone_template(site: &SiteSettings, req: &CloneRequest) -> Result<PathBuf, CloneError> {
    let dest = project_public_dir(&site.path, &req.project_name)
        .ok_or_else(|| CloneError::InvalidProject(req.project_name.clone()))?;
    let url = req.repo_url.as_deref().unwrap_or(&site.template_url);

    clear_dir(&dest)?;
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }

    tracing::info!(url, dest = %dest.display(), "cloning template");
    match git::clone_into(url, &dest) {
        Ok(_) => Ok(dest),
        Err(e) if e.code() == ErrorCode::Exists => Err(CloneError::NotARepository(dest)),
        Err(e) => Err(e.into()),
    }
}

/// Remove `dir` recursively if it exists and has any entries.
fn clear_dir(dir: &Path) -> io::Result<()> {
    if !dir.is_dir() {
        return Ok(());
    }
    if fs::read_dir(dir)?.next().is_some() {
        fs::remove_dir_all(dir)?;
        tracing::info!(dir = %dir.display(), "removed existing directory");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn clear_dir_removes_non_empty() {
        let td = tempdir().unwrap();
        let d = td.path().join("proj");
        fs::create_dir_all(d.join("nested")).unwrap();
        fs::write(d.join("nested").join("stale.txt"), "x").unwrap();
        clear_dir(&d).unwrap();
        assert!(!d.exists());
    }

    #[test]
    fn clear_dir_keeps_empty_and_ignores_missing() {
        let td = tempdir().unwrap();
        let d = td.path().join("proj");
        fs::create_dir_all(&d).unwrap();
        clear_dir(&d).unwrap();
        assert!(d.is_dir());
        clear_dir(&td.path().join("missing")).unwrap();
    }

    #[test]
    fn invalid_project_is_rejected_before_touching_disk() {
        let td = tempdir().unwrap();
        let site = SiteSettings {
            path: td.path().to_path_buf(),
            ..Default::default()
        };
        let err = try_clone_template(&site, &CloneRequest::new("../escape")).unwrap_err();
        assert!(matches!(err, CloneError::InvalidProject(_)));
    }

    #[test]
    fn not_a_repository_message() {
        let e = CloneError::NotARepository(PathBuf::from("/srv/site/public/files/shop"));
        assert_eq!(
            e.to_string(),
            "Directory /srv/site/public/files/shop exists but is not a valid Git repository."
        );
    }
}
