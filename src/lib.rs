pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod exec;
pub mod handlers;
pub mod outcome;
pub mod prepare;
pub mod reporter;
pub mod scan;
pub mod script;
pub mod step;

#[cfg(test)]
pub mod test_utils;

pub use classify::{ErrorCategory, ErrorClassifier, describe_exit_code};
pub use cli::Cli;
pub use config::{ConfigError, DetectConfig, VersioningModel};
pub use error::{Result, StepError};
pub use exec::{CommandRunner, Invocation, ProcessOutput, SystemRunner};
pub use outcome::{FailurePhase, ScanOutcome, StepStatus};
pub use prepare::{BuildError, BuildTools, CommandBuildTools, prepare_artifacts};
pub use reporter::{Reporter, json::JsonReporter, terminal::TerminalReporter};
pub use scan::{ArgumentError, BlackDuckSystem, ScanFailure, merge_scan_errors};
pub use script::{AcquireError, HttpScriptFetcher, ScriptFetcher, acquire_script};
pub use step::DetectStep;
