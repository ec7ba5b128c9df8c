use serde::Serialize;
use thiserror::Error;

use crate::classify::{ErrorCategory, describe_exit_code};

/// Errors while composing scanner arguments. Raised before any process starts.
#[derive(Debug, Error)]
pub enum ArgumentError {
    #[error("Scan system is missing {0}")]
    MissingField(&'static str),

    #[error("Scan system has a malformed {field}: {message}")]
    MalformedField {
        field: &'static str,
        message: String,
    },

    #[error("Unknown container distro {0:?}")]
    UnknownDistro(String),

    #[error("Failed to resolve path {path}: {source}")]
    Path {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// A failed scanner invocation, classified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanFailure {
    /// Exit code, `None` when the process never started or was killed.
    pub exit_code: Option<i32>,
    /// Raw error text: exit status or spawn failure.
    pub detail: String,
    pub category: Option<ErrorCategory>,
}

impl ScanFailure {
    /// Failure of a process that ran and exited unsuccessfully.
    pub fn from_exit(
        exit_code: Option<i32>,
        detail: String,
        category: Option<ErrorCategory>,
    ) -> Self {
        Self {
            exit_code,
            detail,
            category,
        }
    }

    /// Failure of a process that could not be started.
    pub fn spawn(error: &std::io::Error) -> Self {
        Self {
            exit_code: None,
            detail: format!("failed to start scanner: {}", error),
            category: Some(ErrorCategory::Infrastructure),
        }
    }
}

impl std::fmt::Display for ScanFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.exit_code {
            Some(code) => write!(f, "{}: {}", describe_exit_code(code), self.detail),
            None => write!(f, "{}", self.detail),
        }
    }
}

impl std::error::Error for ScanFailure {}
