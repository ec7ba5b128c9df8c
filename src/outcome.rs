//! Terminal result of a step run.

use std::cell::Cell;

use serde::Serialize;

use crate::classify::ErrorCategory;
use crate::error::StepError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Success,
    Failure,
}

/// Where a failed run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePhase {
    Configuration,
    ArtifactPreparation,
    ScriptAcquisition,
    Arguments,
    PrimaryScan,
    ImageScan,
    /// Primary and image scan both failed.
    Both,
}

impl FailurePhase {
    pub fn of(error: &StepError) -> Self {
        match error {
            StepError::Config(_) => Self::Configuration,
            StepError::ArtifactPrep(_) => Self::ArtifactPreparation,
            StepError::ScriptAcquisition(_) => Self::ScriptAcquisition,
            StepError::Arguments(_) => Self::Arguments,
            StepError::PrimaryScan(_) => Self::PrimaryScan,
            StepError::ImageScan(_) => Self::ImageScan,
            StepError::CombinedScan { .. } => Self::Both,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::ArtifactPreparation => "artifact_preparation",
            Self::ScriptAcquisition => "script_acquisition",
            Self::Arguments => "arguments",
            Self::PrimaryScan => "primary_scan",
            Self::ImageScan => "image_scan",
            Self::Both => "both",
        }
    }
}

impl std::fmt::Display for FailurePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Immutable summary of one run, built once from its final result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanOutcome {
    pub status: OutcomeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<FailurePhase>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<ErrorCategory>,
}

impl ScanOutcome {
    pub fn success() -> Self {
        Self {
            status: OutcomeStatus::Success,
            phase: None,
            message: None,
            category: None,
        }
    }

    pub fn failure(error: &StepError) -> Self {
        Self {
            status: OutcomeStatus::Failure,
            phase: Some(FailurePhase::of(error)),
            message: Some(error.to_string()),
            category: error.category(),
        }
    }

    pub fn from_result(result: &Result<(), StepError>) -> Self {
        match result {
            Ok(()) => Self::success(),
            Err(e) => Self::failure(e),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }
}

/// Status sink read by telemetry consumers after the run.
///
/// `scan_completed` stays false unless the whole sequence finished.
#[derive(Debug, Default)]
pub struct StepStatus {
    scan_completed: Cell<bool>,
    category: Cell<Option<ErrorCategory>>,
}

impl StepStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_completed(&self) {
        self.scan_completed.set(true);
    }

    pub fn set_category(&self, category: Option<ErrorCategory>) {
        self.category.set(category);
    }

    pub fn scan_completed(&self) -> bool {
        self.scan_completed.get()
    }

    pub fn category(&self) -> Option<ErrorCategory> {
        self.category.get()
    }
}
