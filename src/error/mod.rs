//! Error types for detect-scan.
//!
//! Each layer owns its error enum; [`StepError`] is the step-level result
//! that the binary reports.

mod context;

pub use context::IoOperation;

use thiserror::Error;

use crate::classify::ErrorCategory;
use crate::config::ConfigError;
use crate::prepare::BuildError;
use crate::scan::{ArgumentError, ScanFailure};
use crate::script::AcquireError;

/// Terminal failure of one scan step run.
#[derive(Debug, Error)]
pub enum StepError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A preparation stage failed; reported exactly as the stage reported it.
    #[error(transparent)]
    ArtifactPrep(#[from] BuildError),

    #[error("Failed to acquire scanner script: {0}")]
    ScriptAcquisition(#[from] AcquireError),

    #[error("Invalid scan arguments: {0}")]
    Arguments(#[from] ArgumentError),

    #[error("{0}")]
    PrimaryScan(ScanFailure),

    #[error("{0}")]
    ImageScan(ScanFailure),

    /// Both passes failed. The image failure is quoted ahead of the primary one.
    #[error("error during scanning images: {:?}: {}", .image.to_string(), .primary)]
    CombinedScan {
        primary: ScanFailure,
        image: ScanFailure,
    },
}

impl StepError {
    /// Category reported alongside the failure, if one could be derived.
    pub fn category(&self) -> Option<ErrorCategory> {
        match self {
            Self::Config(_) | Self::Arguments(_) => Some(ErrorCategory::Configuration),
            Self::PrimaryScan(failure) | Self::ImageScan(failure) => failure.category,
            Self::CombinedScan { primary, image } => primary.category.or(image.category),
            Self::ArtifactPrep(_) | Self::ScriptAcquisition(_) => None,
        }
    }
}

/// Result type alias for step-level operations.
pub type Result<T> = std::result::Result<T, StepError>;
