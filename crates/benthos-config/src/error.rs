use benthos_docs::LintError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// A condition that stops a config load.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] benthos_yaml::Error),

    #[error(transparent)]
    Lint(#[from] LintError),
}

impl LoadError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        LoadError::Io {
            path: path.into(),
            source,
        }
    }

    /// Line the error points at, when it has one.
    pub fn line(&self) -> Option<usize> {
        match self {
            LoadError::Io { .. } => None,
            LoadError::Parse(err) => Some(err.line()),
            LoadError::Lint(err) => Some(err.lint().line),
        }
    }
}

pub type Result<T> = std::result::Result<T, LoadError>;
