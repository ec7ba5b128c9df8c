//! Scanner process execution.

use std::path::{Path, PathBuf};

use tempfile::TempPath;
use tracing::{debug, error, info, warn};

use super::aggregate::merge_scan_errors;
use super::args::build_image_args;
use super::error::ScanFailure;
use super::system::BlackDuckSystem;
use crate::classify::{ErrorCategory, ErrorClassifier, describe_exit_code};
use crate::config::DetectConfig;
use crate::error::StepError;
use crate::exec::{CommandRunner, Invocation};
use crate::prepare::{BuildTools, ImageSaveOptions};

/// Environment entry that stops Detect from reporting usage data.
pub const PHONE_HOME_DISABLE: &str = "BLACKDUCK_SKIP_PHONE_HOME=true";

/// Scanner environment: the phone-home switch first, then the configured
/// entries in their given order. Later entries win, so a custom entry can
/// re-enable phone-home.
pub fn scan_environment(config: &DetectConfig) -> Vec<String> {
    let mut env = vec![PHONE_HOME_DISABLE.to_string()];
    env.extend(config.custom_environment_variables.iter().cloned());
    env
}

/// Tarball name for an image reference: repository part before the tag,
/// with path separators flattened.
pub fn image_tar_name(image: &str) -> String {
    let name = image.split(':').next().unwrap_or(image);
    format!("{}.tar", name.replace('/', "_"))
}

/// Runs the Detect script for the primary pass and, when a container distro
/// is configured, for each image.
pub struct ScanRunner<'a, R: CommandRunner> {
    runner: &'a R,
    classifier: &'a ErrorClassifier,
    workspace: PathBuf,
    script: PathBuf,
}

impl<'a, R: CommandRunner> ScanRunner<'a, R> {
    pub fn new(
        runner: &'a R,
        classifier: &'a ErrorClassifier,
        workspace: &Path,
        script: &Path,
    ) -> Self {
        Self {
            runner,
            classifier,
            workspace: workspace.to_path_buf(),
            script: script.to_path_buf(),
        }
    }

    /// Base invocation: the script path alone.
    pub fn base_args(&self) -> Vec<String> {
        vec![self.script.display().to_string()]
    }

    /// Run one scanner invocation and classify its failure, if any.
    pub fn invoke(&self, args: &[String], env: &[String]) -> Option<ScanFailure> {
        let Some((program, rest)) = args.split_first() else {
            return Some(ScanFailure::from_exit(None, "empty scanner invocation".into(), None));
        };

        let invocation = Invocation::new(program.as_str(), &self.workspace)
            .args(rest.iter().cloned())
            .env(env.to_vec());
        info!(command = %invocation.display_line(), "Running Detect");

        let result = match self.runner.run(&invocation) {
            Ok(result) => result,
            Err(e) => {
                error!(error = %e, "Failed to start Detect");
                return Some(ScanFailure::spawn(&e));
            }
        };

        if result.success() {
            debug!("Detect finished successfully");
            return None;
        }

        let category = self
            .classifier
            .classify_with_exit_code(&result.output, result.exit_code);
        match result.exit_code {
            Some(code) => warn!(
                code,
                description = %describe_exit_code(code),
                category = ?category,
                "Detect failed"
            ),
            None => warn!(category = ?category, "Detect was terminated"),
        }

        Some(ScanFailure::from_exit(
            result.exit_code,
            result.status_text(),
            category,
        ))
    }

    /// Run the primary scan and, if configured, the image scan pass, merging
    /// both outcomes.
    pub fn run(
        &self,
        primary_args: &[String],
        config: &DetectConfig,
        system: &BlackDuckSystem,
        tools: &dyn BuildTools,
    ) -> Result<(), StepError> {
        let env = scan_environment(config);
        let primary = self.invoke(primary_args, &env);

        let image = match config.container_distro() {
            Some(distro) => {
                info!(distro, images = config.image_name_tags.len(), "Scanning container images");
                self.run_images(config, system, tools, &env)
            }
            None => None,
        };

        match merge_scan_errors(primary, image) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Scan each configured image, stopping at the first failure.
    fn run_images(
        &self,
        config: &DetectConfig,
        system: &BlackDuckSystem,
        tools: &dyn BuildTools,
        env: &[String],
    ) -> Option<ScanFailure> {
        for image in &config.image_name_tags {
            debug!(image = %image, "Scanning image");
            let tar_name = image_tar_name(image);
            let tar_path = self.workspace.join(&tar_name);

            let save = ImageSaveOptions {
                image: image.clone(),
                registry_url: config.container_registry_url.clone(),
                registry_user: config.container_registry_user.clone(),
                registry_password: config.container_registry_password.clone(),
                tar_path: tar_path.clone(),
            };
            // Armed before the export so a partial tarball is removed too.
            let _tarball = TempPath::from_path(tar_path);
            if let Err(e) = tools.save_container_image(&save) {
                return Some(ScanFailure::from_exit(None, e.to_string(), None));
            }

            let args = match build_image_args(self.base_args(), config, system, &tar_name) {
                Ok(args) => args,
                Err(e) => {
                    return Some(ScanFailure::from_exit(
                        None,
                        e.to_string(),
                        Some(ErrorCategory::Configuration),
                    ));
                }
            };

            if let Some(failure) = self.invoke(&args, env) {
                return Some(failure);
            }
        }
        None
    }
}
