//! Centralized error types for chatline.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the chatline library.
#[derive(Error, Debug)]
pub enum ChatlineError {
    /// I/O error with the associated file path.
    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The scan root does not exist.
    #[error("Root path not found: {0}")]
    RootNotFound(PathBuf),

    /// The scan root exists but is not a directory.
    #[error("Root path is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// A container file is not the expected export shape.
    #[error("Unrecognized export container '{path}': {reason}")]
    Parse { path: PathBuf, reason: String },

    /// Containers were found but not a single record survived parsing.
    #[error("No records parsed from {containers} container file(s); nothing to report")]
    NoRecords { containers: u64 },

    /// The report could not be written.
    #[error("Cannot write report '{path}': {reason}")]
    Report { path: PathBuf, reason: String },
}

/// Convenience alias for `Result<T, ChatlineError>`.
pub type Result<T> = std::result::Result<T, ChatlineError>;

impl ChatlineError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a `Parse` variant from a path and a reason.
    pub fn parse(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a `Report` variant from a path and a reason.
    pub fn report(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Report {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Allow `?` on `std::io::Error` inside functions returning `ChatlineError`
/// when no path context is available (rare — prefer `ChatlineError::io`).
impl From<std::io::Error> for ChatlineError {
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            path: PathBuf::from("<unknown>"),
            source,
        }
    }
}
