use crate::config::ConfigError;
use crate::registry::RegistryError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by detection and devfile selection.
#[derive(Debug, Error)]
pub enum DetectionError {
    #[error("Root path does not exist: {0}")]
    RootNotFound(PathBuf),

    #[error("Root path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Failed to read {path}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("Detection was cancelled")]
    Cancelled,

    #[error("Detection task failed: {0}")]
    TaskFailed(String),

    #[error("no languages provided")]
    NoLanguage,

    #[error("No valid devfile found for project in {0}")]
    NoDevfileForPath(PathBuf),

    #[error("No valid devfile found for current language {0}")]
    NoDevfileForLanguage(String),

    #[error("no valid devfile found by using those languages")]
    NoDevfileForLanguages,

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl DetectionError {
    pub(crate) fn io(path: impl Into<PathBuf>, err: anyhow::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: format!("{:#}", err),
        }
    }

    /// True for the "nothing matched" family, which callers may answer with a manual choice.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NoLanguage
                | Self::NoDevfileForPath(_)
                | Self::NoDevfileForLanguage(_)
                | Self::NoDevfileForLanguages
        )
    }
}

pub type Result<T> = std::result::Result<T, DetectionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        assert!(DetectionError::NoDevfileForLanguage("Go".into()).is_not_found());
        assert!(DetectionError::NoLanguage.is_not_found());
        assert!(!DetectionError::Cancelled.is_not_found());
        assert!(!DetectionError::RootNotFound(PathBuf::from("/x")).is_not_found());
    }

    #[test]
    fn test_io_message_keeps_context_chain() {
        let err = anyhow::anyhow!("permission denied").context("Failed to walk /repo");
        let err = DetectionError::io("/repo", err);
        let text = err.to_string();
        assert!(text.contains("/repo"));
        assert!(text.contains("permission denied"));
    }
}
