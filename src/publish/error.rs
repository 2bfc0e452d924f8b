use std::path::PathBuf;
use thiserror::Error;

/// Why a publish stopped. Each variant corresponds to the step that failed.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("The provided path does not exist.")]
    PathNotFound(PathBuf),

    #[error("Invalid {kind} name: {name:?}")]
    InvalidName { kind: &'static str, name: String },

    #[error("GitHub username is not configured.")]
    MissingOwner,

    #[error("Failed to check repository existence: {0}")]
    ExistenceCheck(String),

    #[error("Failed to create repository: {0}")]
    Create(String),

    #[error("Push failed: {}", .0.message())]
    Push(#[source] git2::Error),

    #[error("Failed to set default branch: {0}")]
    DefaultBranch(String),

    /// The default-branch request never got an answer.
    #[error("{0}")]
    DefaultBranchUnreachable(String),

    /// The hosting API could not be reached at all.
    #[error("{0}")]
    Network(String),

    /// Any other local repository failure.
    #[error("{}", .0.message())]
    Git(#[from] git2::Error),
}

impl PublishError {
    /// Category label for the error sink, or `None` when the failure is not
    /// worth recording (bad input, plain API rejections).
    pub fn log_title(&self) -> Option<&'static str> {
        match self {
            PublishError::Push(_) | PublishError::Network(_) | PublishError::Git(_) => {
                Some("Git Push Failed")
            }
            PublishError::DefaultBranchUnreachable(_) => Some("Failed to set default branch"),
            PublishError::PathNotFound(_)
            | PublishError::InvalidName { .. }
            | PublishError::MissingOwner
            | PublishError::ExistenceCheck(_)
            | PublishError::Create(_)
            | PublishError::DefaultBranch(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_step() {
        assert_eq!(
            PublishError::ExistenceCheck("Server Error".into()).to_string(),
            "Failed to check repository existence: Server Error"
        );
        assert_eq!(
            PublishError::Push(git2::Error::from_str("remote rejected")).to_string(),
            "Push failed: remote rejected"
        );
        assert_eq!(
            PublishError::PathNotFound(PathBuf::from("/nope")).to_string(),
            "The provided path does not exist."
        );
    }

    #[test]
    fn only_operational_failures_are_logged() {
        assert_eq!(
            PublishError::Push(git2::Error::from_str("x")).log_title(),
            Some("Git Push Failed")
        );
        assert_eq!(
            PublishError::DefaultBranchUnreachable("x".into()).log_title(),
            Some("Failed to set default branch")
        );
        assert_eq!(PublishError::DefaultBranch("x".into()).log_title(), None);
        assert_eq!(PublishError::Create("x".into()).log_title(), None);
        assert_eq!(PublishError::MissingOwner.log_title(), None);
    }
}
