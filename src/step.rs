//! Step entry point: prepare artifacts, fetch the script, scan.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::classify::ErrorClassifier;
use crate::config::DetectConfig;
use crate::error::StepError;
use crate::exec::CommandRunner;
use crate::outcome::StepStatus;
use crate::prepare::{BuildTools, prepare_artifacts};
use crate::scan::{BlackDuckSystem, ScanRunner, build_scan_args, version_name};
use crate::script::{ScriptFetcher, acquire_script, script_path};

/// One Detect scan step with its collaborators.
pub struct DetectStep<'a, R: CommandRunner> {
    runner: &'a R,
    tools: &'a dyn BuildTools,
    fetcher: &'a dyn ScriptFetcher,
    classifier: ErrorClassifier,
}

impl<'a, R: CommandRunner> DetectStep<'a, R> {
    pub fn new(runner: &'a R, tools: &'a dyn BuildTools, fetcher: &'a dyn ScriptFetcher) -> Self {
        Self {
            runner,
            tools,
            fetcher,
            classifier: ErrorClassifier::new(),
        }
    }

    /// Replace the default failure classifier.
    pub fn with_classifier(mut self, classifier: ErrorClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Run the whole step in `workspace`.
    ///
    /// `status` is marked completed only when every phase succeeded; on
    /// failure it receives the error category. The script is gone from the
    /// workspace when this returns, whatever the result.
    pub fn run(
        &self,
        config: &DetectConfig,
        workspace: &Path,
        status: &StepStatus,
    ) -> Result<(), StepError> {
        let result = self.execute(config, workspace);
        match &result {
            Ok(()) => {
                status.mark_completed();
                info!(project = %config.project_name, "Detect scan completed");
            }
            Err(e) => status.set_category(e.category()),
        }
        result
    }

    fn execute(&self, config: &DetectConfig, workspace: &Path) -> Result<(), StepError> {
        config.validate()?;
        info!(
            project = %config.project_name,
            version = %version_name(config),
            workspace = %workspace.display(),
            "Starting Detect scan step"
        );

        // Everything that can be rejected without a subprocess is checked
        // before the build tools run.
        let system = BlackDuckSystem::from_config(config)?;
        let target = script_path(workspace)?;
        let scanner = ScanRunner::new(self.runner, &self.classifier, workspace, &target);
        let args = build_scan_args(scanner.base_args(), config, workspace, &system, None, None)?;

        prepare_artifacts(config, self.tools)?;

        let script = acquire_script(self.fetcher, config.script_source(), workspace)?;
        let result = scanner.run(&args, config, &system, self.tools);

        let path = script.path().display().to_string();
        match script.remove() {
            Ok(()) => debug!(script = %path, "Removed Detect script"),
            Err(e) => warn!(script = %path, error = %e, "Failed to remove Detect script"),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ErrorCategory;
    use crate::script::SCRIPT_FILE_NAME;
    use crate::test_utils::fakes::{CountingTools, RecordingRunner, ScriptedResult, StaticFetcher};
    use crate::test_utils::fixtures::valid_config;
    use tempfile::TempDir;

    fn all_stages() -> DetectConfig {
        DetectConfig {
            install_artifacts: true,
            build_maven: true,
            install_npm: true,
            build_mta: true,
            ..valid_config()
        }
    }

    #[test]
    fn test_successful_run() {
        let ws = TempDir::new().unwrap();
        let runner = RecordingRunner::succeeding();
        let tools = CountingTools::new();
        let fetcher = StaticFetcher::new("#!/bin/sh\n");
        let status = StepStatus::new();

        DetectStep::new(&runner, &tools, &fetcher)
            .run(&valid_config(), ws.path(), &status)
            .unwrap();

        assert!(status.scan_completed());
        assert_eq!(tools.total_calls(), 0);
        let calls = runner.invocations();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].program.ends_with(SCRIPT_FILE_NAME));
        assert!(calls[0].program.is_absolute());
        assert!(!ws.path().join(SCRIPT_FILE_NAME).exists());
    }

    #[test]
    fn test_script_exists_while_scanning() {
        let ws = TempDir::new().unwrap();
        let runner = RecordingRunner::succeeding().checking_program_exists();
        let tools = CountingTools::new();
        let fetcher = StaticFetcher::new("#!/bin/sh\n");

        DetectStep::new(&runner, &tools, &fetcher)
            .run(&valid_config(), ws.path(), &StepStatus::new())
            .unwrap();
        assert_eq!(runner.program_existed(), vec![true]);
    }

    #[test]
    fn test_stage_failure_stops_everything() {
        let ws = TempDir::new().unwrap();
        let runner = RecordingRunner::succeeding();
        let tools = CountingTools::new().failing_at("maven-build");
        let fetcher = StaticFetcher::new("#!/bin/sh\n");
        let status = StepStatus::new();

        let err = DetectStep::new(&runner, &tools, &fetcher)
            .run(&all_stages(), ws.path(), &status)
            .unwrap_err();

        assert_eq!(err.to_string(), CountingTools::failure_for("maven-build").to_string());
        assert!(matches!(err, StepError::ArtifactPrep(_)));
        assert_eq!(tools.call_log(), vec!["install-artifacts", "maven-build"]);
        assert_eq!(fetcher.fetches(), 0);
        assert!(runner.invocations().is_empty());
        assert!(!status.scan_completed());
    }

    #[test]
    fn test_invalid_config_runs_nothing() {
        let ws = TempDir::new().unwrap();
        let runner = RecordingRunner::succeeding();
        let tools = CountingTools::new();
        let fetcher = StaticFetcher::new("#!/bin/sh\n");
        let status = StepStatus::new();
        let config = DetectConfig {
            token: String::new(),
            ..all_stages()
        };

        let err = DetectStep::new(&runner, &tools, &fetcher)
            .run(&config, ws.path(), &status)
            .unwrap_err();

        assert!(matches!(err, StepError::Config(_)));
        assert_eq!(tools.total_calls(), 0);
        assert_eq!(status.category(), Some(ErrorCategory::Configuration));
    }

    #[test]
    fn test_unsupported_server_scheme_runs_nothing() {
        let ws = TempDir::new().unwrap();
        let runner = RecordingRunner::succeeding();
        let tools = CountingTools::new();
        let fetcher = StaticFetcher::new("#!/bin/sh\n");
        let status = StepStatus::new();
        let config = DetectConfig {
            server_url: "ftp://blackduck".into(),
            ..all_stages()
        };

        let err = DetectStep::new(&runner, &tools, &fetcher)
            .run(&config, ws.path(), &status)
            .unwrap_err();

        assert!(matches!(err, StepError::Config(_)));
        assert_eq!(tools.total_calls(), 0);
        assert_eq!(fetcher.fetches(), 0);
        assert!(runner.invocations().is_empty());
        assert_eq!(status.category(), Some(ErrorCategory::Configuration));
    }

    #[test]
    fn test_fetch_failure() {
        let ws = TempDir::new().unwrap();
        let runner = RecordingRunner::succeeding();
        let tools = CountingTools::new();
        let fetcher = StaticFetcher::failing();
        let status = StepStatus::new();

        let err = DetectStep::new(&runner, &tools, &fetcher)
            .run(&valid_config(), ws.path(), &status)
            .unwrap_err();

        assert!(matches!(err, StepError::ScriptAcquisition(_)));
        assert!(runner.invocations().is_empty());
        assert!(!ws.path().join(SCRIPT_FILE_NAME).exists());
        assert!(!status.scan_completed());
    }

    #[test]
    fn test_scan_failure_cleans_up_and_reports_category() {
        let ws = TempDir::new().unwrap();
        let runner = RecordingRunner::scripted(vec![ScriptedResult::exit(
            3,
            "FAILURE_POLICY_VIOLATION - Detect found policy violations.",
        )]);
        let tools = CountingTools::new();
        let fetcher = StaticFetcher::new("#!/bin/sh\n");
        let status = StepStatus::new();

        let err = DetectStep::new(&runner, &tools, &fetcher)
            .run(&valid_config(), ws.path(), &status)
            .unwrap_err();

        assert!(matches!(err, StepError::PrimaryScan(_)));
        assert!(!ws.path().join(SCRIPT_FILE_NAME).exists());
        assert!(!status.scan_completed());
        assert_eq!(status.category(), Some(ErrorCategory::Compliance));
    }

    #[test]
    fn test_custom_classifier() {
        let ws = TempDir::new().unwrap();
        let runner = RecordingRunner::scripted(vec![ScriptedResult::exit(1, "QUOTA_EXCEEDED")]);
        let tools = CountingTools::new();
        let fetcher = StaticFetcher::new("#!/bin/sh\n");
        let status = StepStatus::new();
        let classifier =
            ErrorClassifier::new().with_signature(ErrorCategory::Service, "QUOTA_EXCEEDED");

        DetectStep::new(&runner, &tools, &fetcher)
            .with_classifier(classifier)
            .run(&valid_config(), ws.path(), &status)
            .unwrap_err();
        assert_eq!(status.category(), Some(ErrorCategory::Service));
    }

    #[test]
    fn test_all_stages_run_in_order_before_scan() {
        let ws = TempDir::new().unwrap();
        let runner = RecordingRunner::succeeding();
        let tools = CountingTools::new();
        let fetcher = StaticFetcher::new("#!/bin/sh\n");

        DetectStep::new(&runner, &tools, &fetcher)
            .run(&all_stages(), ws.path(), &StepStatus::new())
            .unwrap();

        assert_eq!(
            tools.call_log(),
            vec!["install-artifacts", "maven-build", "npm-install", "mta-build"]
        );
        assert_eq!(fetcher.fetches(), 1);
    }
}
