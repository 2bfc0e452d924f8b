use serde::{Serialize, Serializer};
use std::path::PathBuf;

/// Result of a publish or clone request, as handed back to the caller.
///
/// Informational text on success goes to `message`; `error` is only ever
/// populated on failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success {
        message: Option<String>,
        file_path: Option<PathBuf>,
    },
    Failure {
        error: String,
    },
}

impl Outcome {
    pub fn ok() -> Self {
        Outcome::Success {
            message: None,
            file_path: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Outcome::Failure {
            error: error.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Outcome::Failure { error } => Some(error.as_str()),
            Outcome::Success { .. } => None,
        }
    }

    pub fn file_path(&self) -> Option<&PathBuf> {
        match self {
            Outcome::Success { file_path, .. } => file_path.as_ref(),
            Outcome::Failure { .. } => None,
        }
    }
}

#[derive(Serialize)]
struct Wire<'a> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_path: Option<&'a PathBuf>,
}

impl Serialize for Outcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let wire = match self {
            Outcome::Success { message, file_path } => Wire {
                success: true,
                message: message.as_deref(),
                error: None,
                file_path: file_path.as_ref(),
            },
            Outcome::Failure { error } => Wire {
                success: false,
                message: None,
                error: Some(error.as_str()),
                file_path: None,
            },
        };
        wire.serialize(serializer)
    }
}
