use crate::outcome::ScanOutcome;
use crate::reporter::Reporter;

pub struct JsonReporter;

impl JsonReporter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for JsonReporter {
    fn report(&self, outcome: &ScanOutcome) -> String {
        serde_json::to_string_pretty(outcome)
            .unwrap_or_else(|e| format!(r#"{{"error": "Failed to serialize outcome: {}"}}"#, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ErrorCategory;
    use crate::error::StepError;
    use crate::scan::ScanFailure;

    #[test]
    fn test_json_success() {
        let output = JsonReporter::new().report(&ScanOutcome::success());
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["status"], "success");
        assert!(parsed.get("phase").is_none());
    }

    #[test]
    fn test_json_combined_failure() {
        let err = StepError::CombinedScan {
            primary: ScanFailure::from_exit(
                Some(3),
                "exit status 3".into(),
                Some(ErrorCategory::Compliance),
            ),
            image: ScanFailure::from_exit(
                Some(2),
                "exit status 2".into(),
                Some(ErrorCategory::Service),
            ),
        };
        let output = JsonReporter::new().report(&ScanOutcome::failure(&err));

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["phase"], "both");
        assert_eq!(parsed["category"], "compliance");
        let message = parsed["message"].as_str().unwrap();
        assert!(message.contains("FAILURE_POLICY_VIOLATION"));
        assert!(message.contains("FAILURE_TIMEOUT"));
    }
}
