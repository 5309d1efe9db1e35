use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while provisioning templates and setting up a repository.
#[derive(Debug, Error)]
pub enum GitmanError {
    /// Local store, disk cache or artifact filesystem access failed.
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Remote listing or body retrieval failed (transport, status or decode).
    #[error("failed to fetch {what}: {message}")]
    Fetch { what: String, message: String },

    #[error("failed to load config at {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },

    #[error("command `{command}` failed with exit code {code:?}")]
    Command { command: String, code: Option<i32> },

    /// Template name that cannot be mapped onto a file inside the store.
    #[error("invalid template name '{name}'")]
    InvalidName { name: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GitmanError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn fetch(what: impl Into<String>, message: impl ToString) -> Self {
        Self::Fetch {
            what: what.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GitmanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_mentions_path() {
        let err = GitmanError::io(
            "/tmp/gitignores",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let message = err.to_string();
        assert!(message.contains("/tmp/gitignores"), "{message}");
        assert!(message.contains("denied"), "{message}");
    }

    #[test]
    fn fetch_error_names_target() {
        let err = GitmanError::fetch("gitignore template 'Go'", "HTTP 404 Not Found");
        assert_eq!(
            err.to_string(),
            "failed to fetch gitignore template 'Go': HTTP 404 Not Found"
        );
    }
}
