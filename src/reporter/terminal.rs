use colored::Colorize;

use crate::classify::ErrorCategory;
use crate::outcome::ScanOutcome;
use crate::reporter::Reporter;

/// One-line colored summary for the console.
pub struct TerminalReporter {
    project: String,
}

impl TerminalReporter {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
        }
    }

    fn category_label(&self, category: ErrorCategory) -> colored::ColoredString {
        let label = format!("[{}]", category);
        match category {
            ErrorCategory::Compliance => label.red().bold(),
            ErrorCategory::Configuration => label.yellow().bold(),
            ErrorCategory::Infrastructure => label.magenta(),
            ErrorCategory::Service => label.cyan(),
            ErrorCategory::Unknown => label.white(),
        }
    }
}

impl Reporter for TerminalReporter {
    fn report(&self, outcome: &ScanOutcome) -> String {
        if outcome.is_success() {
            return format!("{} Detect scan of {} completed", "PASS".green().bold(), self.project);
        }

        let mut line = format!("{}", "FAIL".red().bold());
        if let Some(phase) = outcome.phase {
            line.push_str(&format!(" ({})", phase));
        }
        if let Some(category) = outcome.category {
            line.push(' ');
            line.push_str(&self.category_label(category).to_string());
        }
        if let Some(message) = &outcome.message {
            line.push(' ');
            line.push_str(message);
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StepError;
    use crate::scan::ScanFailure;

    #[test]
    fn test_success_line() {
        colored::control::set_override(false);
        let line = TerminalReporter::new("shop").report(&ScanOutcome::success());
        assert_eq!(line, "PASS Detect scan of shop completed");
    }

    #[test]
    fn test_failure_line() {
        colored::control::set_override(false);
        let err = StepError::ImageScan(ScanFailure::from_exit(
            Some(2),
            "exit status 2".into(),
            Some(ErrorCategory::Service),
        ));
        let line = TerminalReporter::new("shop").report(&ScanOutcome::failure(&err));
        assert!(line.starts_with("FAIL (image_scan) [service] FAILURE_TIMEOUT"));
    }
}
