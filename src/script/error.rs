use thiserror::Error;

use crate::error::IoOperation;

/// Errors while fetching the Detect script into the workspace.
#[derive(Debug, Error)]
pub enum AcquireError {
    #[error("Download of {url} failed: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Download of {url} failed with HTTP {status}")]
    Http { url: String, status: u16 },

    #[error("Failed to {operation} {path}: {source}")]
    Io {
        path: String,
        operation: IoOperation,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported script source: {0}")]
    InvalidSource(String),
}

impl AcquireError {
    pub(crate) fn io(
        path: &std::path::Path,
        operation: IoOperation,
        source: std::io::Error,
    ) -> Self {
        Self::Io {
            path: path.display().to_string(),
            operation,
            source,
        }
    }
}
