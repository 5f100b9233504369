//! Error types shared by the loaders and the badge writer

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoverageError {
    /// Content is not valid structured data or lacks the expected keys
    #[error("malformed coverage report {}: {reason}", .path.display())]
    MalformedReport { path: PathBuf, reason: String },

    #[error("I/O error on {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize {}", .path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unknown coverage format: {0}. Supported: json, lcov")]
    UnknownFormat(String),
}

impl CoverageError {
    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::MalformedReport {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, CoverageError>;
