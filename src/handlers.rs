//! CLI command handlers
//!
//! Kept out of main.rs so the exit code policy can be unit tested.

use crate::{
    Cli, CommandBuildTools, ConfigError, DetectConfig, DetectStep, HttpScriptFetcher,
    JsonReporter, Reporter, ScanOutcome, StepError, StepStatus, SystemRunner, TerminalReporter,
};
use std::fs;
use std::process::ExitCode;
use tracing::{debug, error, info};

/// Result type for handler functions that can be tested
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerResult {
    Success,
    Error(u8),
}

impl From<HandlerResult> for ExitCode {
    fn from(result: HandlerResult) -> Self {
        match result {
            HandlerResult::Success => ExitCode::SUCCESS,
            HandlerResult::Error(code) => ExitCode::from(code),
        }
    }
}

impl HandlerResult {
    /// 0 on success, 2 when the configuration is unusable, 1 otherwise.
    pub fn of(result: &Result<(), StepError>) -> Self {
        match result {
            Ok(()) => HandlerResult::Success,
            Err(StepError::Config(_)) => HandlerResult::Error(2),
            Err(_) => HandlerResult::Error(1),
        }
    }
}

/// Load the configuration named on the command line, or discover one in the
/// project root, then apply the command line overrides.
pub fn load_config(cli: &Cli) -> Result<DetectConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => DetectConfig::from_file(path)?,
        None => DetectConfig::load(&cli.project_root)?,
    };

    if let Some(token) = &cli.token {
        config.token = token.clone();
    }
    if let Some(url) = &cli.server_url {
        config.server_url = url.clone();
    }
    if let Some(name) = &cli.project_name {
        config.project_name = name.clone();
    }
    if let Some(version) = &cli.project_version {
        config.version = version.clone();
    }
    Ok(config)
}

/// Run the scan step for the project root named on the command line.
pub fn run_scan_mode(cli: &Cli) -> ExitCode {
    let config = match load_config(cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return ExitCode::from(2);
        }
    };

    let workspace = cli.project_root.as_path();
    info!(workspace = %workspace.display(), "Starting scan");

    let runner = SystemRunner::new();
    let tools = CommandBuildTools::new(&runner, workspace);
    let fetcher = HttpScriptFetcher::new();
    let status = StepStatus::new();

    let result = DetectStep::new(&runner, &tools, &fetcher).run(&config, workspace, &status);
    if let Err(e) = &result {
        error!(error = %e, category = ?e.category(), "Detect scan step failed");
    }
    debug!(
        scan_completed = status.scan_completed(),
        category = ?status.category(),
        "Step status"
    );

    let outcome = ScanOutcome::from_result(&result);
    println!(
        "{}",
        TerminalReporter::new(config.project_name.as_str()).report(&outcome)
    );

    if let Some(report_path) = &cli.report {
        let json = JsonReporter::new().report(&outcome);
        if let Err(e) = fs::write(report_path, json) {
            eprintln!("Failed to write report to {}: {}", report_path.display(), e);
            return ExitCode::from(2);
        }
        info!(path = %report_path.display(), "Report written");
    }

    HandlerResult::of(&result).into()
}
