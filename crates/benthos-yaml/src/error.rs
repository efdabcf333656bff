//! Error types for YAML parsing.

use thiserror::Error;

/// Result type alias for benthos-yaml operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while turning raw text into a [`crate::Node`] tree.
///
/// Every variant carries a best-effort 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The raw bytes are not valid UTF-8.
    #[error("line {line}: invalid utf-8 encoding")]
    Encoding { line: usize },

    /// YAML syntax error reported by the scanner.
    #[error("line {line}: {message}")]
    Syntax { message: String, line: usize },

    /// A mapping defines the same key twice.
    #[error("line {line}: mapping key '{key}' already defined at line {first_line}")]
    DuplicateKey {
        key: String,
        line: usize,
        first_line: usize,
    },

    /// Structurally valid YAML that this tree cannot represent.
    #[error("line {line}: {message}")]
    InvalidStructure { message: String, line: usize },
}

impl Error {
    /// The line the error was detected at.
    pub fn line(&self) -> usize {
        match self {
            Error::Encoding { line }
            | Error::Syntax { line, .. }
            | Error::DuplicateKey { line, .. }
            | Error::InvalidStructure { line, .. } => *line,
        }
    }
}
