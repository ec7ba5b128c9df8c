//! Failure classification for Detect output.
//!
//! Two static tables drive classification:
//! - `DEFAULT_SIGNATURES`: literal lines Detect prints for a failed run, grouped
//!   by category. The first signature contained in the output wins.
//! - `EXIT_CODES`: Detect's documented exit codes with their description and
//!   category, used for the human readable message and as a fallback category.

use serde::{Deserialize, Serialize};

/// Coarse classification bucket for a failed scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Compliance,
    Configuration,
    Infrastructure,
    Service,
    Unknown,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Compliance => "compliance",
            ErrorCategory::Configuration => "configuration",
            ErrorCategory::Infrastructure => "infrastructure",
            ErrorCategory::Service => "service",
            ErrorCategory::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Known failure lines, in match order.
pub const DEFAULT_SIGNATURES: &[(ErrorCategory, &[&str])] = &[
    (
        ErrorCategory::Compliance,
        &["FAILURE_POLICY_VIOLATION - Detect found policy violations."],
    ),
    (
        ErrorCategory::Configuration,
        &[
            "FAILURE_CONFIGURATION - Detect was unable to start due to issues with it's configuration.",
            "FAILURE_DETECTOR - Detect had one or more detector failures while extracting dependencies. Check that all projects build and your environment is configured correctly.",
            "FAILURE_SCAN - Detect was unable to run the signature scanner against your source. Check your configuration.",
        ],
    ),
    (
        ErrorCategory::Infrastructure,
        &[
            "FAILURE_PROXY_CONNECTIVITY - Detect was unable to use the configured proxy. Check your configuration and connection.",
            "FAILURE_BLACKDUCK_CONNECTIVITY - Detect was unable to connect to Black Duck. Check your configuration and connection.",
            "FAILURE_POLARIS_CONNECTIVITY - Detect was unable to connect to Polaris. Check your configuration and connection.",
        ],
    ),
    (
        ErrorCategory::Service,
        &[
            "FAILURE_TIMEOUT - Detect could not wait for actions to be completed on Black Duck. Check your Black Duck server or increase your timeout.",
            "FAILURE_DETECTOR_REQUIRED - Detect did not run all of the required detectors. Fix detector issues or disable required detectors.",
            "FAILURE_BLACKDUCK_VERSION_NOT_SUPPORTED - Detect attempted an operation that was not supported by your version of Black Duck. Ensure your Black Duck version is compatible with this version of Detect.",
            "FAILURE_BLACKDUCK_FEATURE_ERROR - Detect encountered an error while attempting an operation on Black Duck. Ensure your Black Duck is compatible with this version of Detect.",
            "FAILURE_GENERAL_ERROR - Detect encountered a known error, details of the error are provided.",
            "FAILURE_UNKNOWN_ERROR - Detect encountered an unknown error.",
        ],
    ),
];

/// A documented Detect exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCodeInfo {
    pub code: i32,
    pub description: &'static str,
    pub category: Option<ErrorCategory>,
}

pub const EXIT_CODES: &[ExitCodeInfo] = &[
    ExitCodeInfo {
        code: 0,
        description: "SUCCESS",
        category: None,
    },
    ExitCodeInfo {
        code: 1,
        description: "FAILURE_BLACKDUCK_CONNECTIVITY => Detect was unable to connect to Black Duck. Check your configuration and connection.",
        category: Some(ErrorCategory::Infrastructure),
    },
    ExitCodeInfo {
        code: 2,
        description: "FAILURE_TIMEOUT => Detect could not wait for actions to be completed on Black Duck. Check your Black Duck server or increase your timeout.",
        category: Some(ErrorCategory::Service),
    },
    ExitCodeInfo {
        code: 3,
        description: "FAILURE_POLICY_VIOLATION => Detect found policy violations.",
        category: Some(ErrorCategory::Compliance),
    },
    ExitCodeInfo {
        code: 4,
        description: "FAILURE_PROXY_CONNECTIVITY => Detect was unable to use the configured proxy. Check your configuration and connection.",
        category: Some(ErrorCategory::Infrastructure),
    },
    ExitCodeInfo {
        code: 5,
        description: "FAILURE_DETECTOR => Detect had one or more detector failures while extracting dependencies. Check that all projects build and your environment is configured correctly.",
        category: Some(ErrorCategory::Configuration),
    },
    ExitCodeInfo {
        code: 6,
        description: "FAILURE_SCAN => Detect was unable to run the signature scanner against your source. Check your configuration.",
        category: Some(ErrorCategory::Configuration),
    },
    ExitCodeInfo {
        code: 7,
        description: "FAILURE_CONFIGURATION => Detect was unable to start because of a configuration issue. Check and fix your configuration.",
        category: Some(ErrorCategory::Configuration),
    },
    ExitCodeInfo {
        code: 9,
        description: "FAILURE_DETECTOR_REQUIRED => Detect did not run all of the required detectors. Fix detector issues or disable required detectors.",
        category: Some(ErrorCategory::Service),
    },
    ExitCodeInfo {
        code: 10,
        description: "FAILURE_BLACKDUCK_VERSION_NOT_SUPPORTED => Detect attempted an operation that was not supported by your version of Black Duck. Ensure your Black Duck version is compatible with this version of Detect.",
        category: Some(ErrorCategory::Service),
    },
    ExitCodeInfo {
        code: 11,
        description: "FAILURE_BLACKDUCK_FEATURE_ERROR => Detect encountered an error while attempting an operation on Black Duck. Ensure your Black Duck is compatible with this version of Detect.",
        category: Some(ErrorCategory::Service),
    },
    ExitCodeInfo {
        code: 12,
        description: "FAILURE_POLARIS_CONNECTIVITY => Detect was unable to connect to Polaris. Check your configuration and connection.",
        category: Some(ErrorCategory::Infrastructure),
    },
    ExitCodeInfo {
        code: 99,
        description: "FAILURE_GENERAL_ERROR => Detect encountered a known error, details of the error are provided.",
        category: Some(ErrorCategory::Service),
    },
    ExitCodeInfo {
        code: 100,
        description: "FAILURE_UNKNOWN_ERROR => Detect encountered an unknown error.",
        category: Some(ErrorCategory::Service),
    },
];

/// Look up a documented exit code.
pub fn exit_code_info(code: i32) -> Option<&'static ExitCodeInfo> {
    EXIT_CODES.iter().find(|info| info.code == code)
}

/// Human readable text for an exit code.
pub fn describe_exit_code(code: i32) -> String {
    match exit_code_info(code) {
        Some(info) => info.description.to_string(),
        None => format!("[{}]: Not known exit code key", code),
    }
}

/// Ordered signature table mapping output text to an [`ErrorCategory`].
#[derive(Debug, Clone)]
pub struct ErrorClassifier {
    signatures: Vec<(ErrorCategory, String)>,
}

impl ErrorClassifier {
    /// Create a classifier over the default Detect signatures.
    pub fn new() -> Self {
        Self::from_table(DEFAULT_SIGNATURES)
    }

    pub fn from_table(table: &[(ErrorCategory, &[&str])]) -> Self {
        let signatures = table
            .iter()
            .flat_map(|(category, texts)| texts.iter().map(|t| (*category, t.to_string())))
            .collect();
        Self { signatures }
    }

    /// Append a signature. It is checked after every existing one.
    pub fn with_signature(
        mut self,
        category: ErrorCategory,
        signature: impl Into<String>,
    ) -> Self {
        self.signatures.push((category, signature.into()));
        self
    }

    /// Category of the first signature found in `output`.
    pub fn classify(&self, output: &str) -> Option<ErrorCategory> {
        self.signatures
            .iter()
            .find(|(_, signature)| output.contains(signature.as_str()))
            .map(|(category, _)| *category)
    }

    /// Classify output, falling back to the exit code table when nothing matched.
    pub fn classify_with_exit_code(
        &self,
        output: &str,
        exit_code: Option<i32>,
    ) -> Option<ErrorCategory> {
        self.classify(output)
            .or_else(|| exit_code.and_then(exit_code_info).and_then(|info| info.category))
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }
}

impl Default for ErrorClassifier {
    fn default() -> Self {
        Self::new()
    }
}
