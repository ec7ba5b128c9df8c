//! Build collaborators and their command-line implementation.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::error::BuildError;
use crate::config::DetectConfig;
use crate::exec::{CommandRunner, Invocation};

/// Options for installing already built Maven artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MavenInstallOptions {
    pub pom_path: String,
    pub project_settings_file: Option<String>,
    pub global_settings_file: Option<String>,
    pub m2_path: Option<String>,
}

/// Options for a full Maven build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MavenBuildOptions {
    pub pom_path: String,
    pub goals: Vec<String>,
    pub defines: Vec<String>,
    pub project_settings_file: Option<String>,
    pub global_settings_file: Option<String>,
    pub m2_path: Option<String>,
}

/// Options for installing NPM dependencies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NpmInstallOptions {
    pub descriptors: Vec<String>,
    pub registry: Option<String>,
}

/// Options for a multi-target application build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MtaBuildOptions {
    pub platform: String,
    pub target: Option<String>,
}

/// Options for exporting a container image to a tarball.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSaveOptions {
    pub image: String,
    pub registry_url: Option<String>,
    pub registry_user: Option<String>,
    pub registry_password: Option<String>,
    pub tar_path: PathBuf,
}

impl From<&DetectConfig> for MavenInstallOptions {
    fn from(config: &DetectConfig) -> Self {
        Self {
            pom_path: config.pom_path.clone(),
            project_settings_file: config.project_settings_file.clone(),
            global_settings_file: config.global_settings_file.clone(),
            m2_path: config.m2_path.clone(),
        }
    }
}

impl From<&DetectConfig> for MavenBuildOptions {
    fn from(config: &DetectConfig) -> Self {
        Self {
            pom_path: config.pom_path.clone(),
            goals: config.maven_goals.clone(),
            defines: config.maven_defines.clone(),
            project_settings_file: config.project_settings_file.clone(),
            global_settings_file: config.global_settings_file.clone(),
            m2_path: config.m2_path.clone(),
        }
    }
}

impl From<&DetectConfig> for NpmInstallOptions {
    fn from(config: &DetectConfig) -> Self {
        Self {
            descriptors: config.npm_descriptors(),
            registry: config.default_npm_registry.clone(),
        }
    }
}

impl From<&DetectConfig> for MtaBuildOptions {
    fn from(config: &DetectConfig) -> Self {
        Self {
            platform: config.mta_platform.clone(),
            target: config.mta_build_target.clone(),
        }
    }
}

/// The independently specified build steps this scan step may trigger.
///
/// Each call runs once and reports success or a stage error.
pub trait BuildTools {
    fn install_maven_artifacts(&self, options: &MavenInstallOptions) -> Result<(), BuildError>;
    fn run_maven_build(&self, options: &MavenBuildOptions) -> Result<(), BuildError>;
    fn install_npm_dependencies(&self, options: &NpmInstallOptions) -> Result<(), BuildError>;
    fn run_mta_build(&self, options: &MtaBuildOptions) -> Result<(), BuildError>;
    fn save_container_image(&self, options: &ImageSaveOptions) -> Result<(), BuildError>;
}

/// [`BuildTools`] that shells out to mvn, npm, mbt and docker.
pub struct CommandBuildTools<'a, R: CommandRunner> {
    runner: &'a R,
    workspace: PathBuf,
}

impl<'a, R: CommandRunner> CommandBuildTools<'a, R> {
    pub fn new(runner: &'a R, workspace: &Path) -> Self {
        Self {
            runner,
            workspace: workspace.to_path_buf(),
        }
    }

    fn execute(&self, stage: &'static str, invocation: Invocation) -> Result<(), BuildError> {
        let program = invocation.program.display().to_string();
        info!(stage, command = %invocation.display_line(), "Running build tool");

        let result = self
            .runner
            .run(&invocation)
            .map_err(|source| BuildError::Spawn {
                stage,
                program: program.clone(),
                source,
            })?;

        if result.success() {
            Ok(())
        } else {
            Err(BuildError::Failed {
                stage,
                program,
                status: result.status_text(),
            })
        }
    }

    fn maven_settings_args(
        &self,
        project_settings: &Option<String>,
        global_settings: &Option<String>,
        m2_path: &Option<String>,
    ) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(global) = global_settings {
            args.push("--global-settings".to_string());
            args.push(global.clone());
        }
        if let Some(project) = project_settings {
            args.push("--settings".to_string());
            args.push(project.clone());
        }
        if let Some(m2) = m2_path {
            args.push(format!("-Dmaven.repo.local={}", self.workspace.join(m2).display()));
        }
        args
    }
}

impl<R: CommandRunner> BuildTools for CommandBuildTools<'_, R> {
    fn install_maven_artifacts(&self, options: &MavenInstallOptions) -> Result<(), BuildError> {
        const STAGE: &str = "maven artifact install";
        let pom = self.workspace.join(&options.pom_path);
        if !pom.exists() {
            return Err(BuildError::Input {
                stage: STAGE,
                message: format!("build descriptor {} not found", pom.display()),
            });
        }

        let invocation = Invocation::new("mvn", &self.workspace)
            .args(["--batch-mode", "--file"])
            .arg(options.pom_path.clone())
            .args(self.maven_settings_args(
                &options.project_settings_file,
                &options.global_settings_file,
                &options.m2_path,
            ))
            .args(["-DskipTests", "-Dmaven.test.skip=true", "install"]);
        self.execute(STAGE, invocation)
    }

    fn run_maven_build(&self, options: &MavenBuildOptions) -> Result<(), BuildError> {
        let invocation = Invocation::new("mvn", &self.workspace)
            .args(["--batch-mode", "--file"])
            .arg(options.pom_path.clone())
            .args(self.maven_settings_args(
                &options.project_settings_file,
                &options.global_settings_file,
                &options.m2_path,
            ))
            .args(options.defines.iter().cloned())
            .args(options.goals.iter().cloned());
        self.execute("maven build", invocation)
    }

    fn install_npm_dependencies(&self, options: &NpmInstallOptions) -> Result<(), BuildError> {
        const STAGE: &str = "npm install";
        for descriptor in &options.descriptors {
            let descriptor_path = self.workspace.join(descriptor);
            let dir = descriptor_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| self.workspace.clone());

            if !descriptor_path.exists() {
                return Err(BuildError::Input {
                    stage: STAGE,
                    message: format!("build descriptor {} not found", descriptor_path.display()),
                });
            }

            // `npm ci` needs a lockfile; fall back to a plain install without one
            let command = if dir.join("package-lock.json").exists() {
                "ci"
            } else {
                "install"
            };
            debug!(descriptor = %descriptor, command, "Installing npm dependencies");

            let mut invocation = Invocation::new("npm", &dir).arg(command);
            if let Some(registry) = &options.registry {
                invocation = invocation.arg(format!("--registry={}", registry));
            }
            self.execute(STAGE, invocation)?;
        }
        Ok(())
    }

    fn run_mta_build(&self, options: &MtaBuildOptions) -> Result<(), BuildError> {
        let mut invocation = Invocation::new("mbt", &self.workspace)
            .arg("build")
            .arg(format!("--platform={}", options.platform));
        if let Some(target) = &options.target {
            invocation = invocation.arg(format!("--target={}", target));
        }
        self.execute("mta build", invocation)
    }

    fn save_container_image(&self, options: &ImageSaveOptions) -> Result<(), BuildError> {
        const STAGE: &str = "container image export";
        let reference = match &options.registry_url {
            Some(registry) if !registry.is_empty() => {
                let host = registry
                    .trim_start_matches("https://")
                    .trim_start_matches("http://")
                    .trim_end_matches('/');
                format!("{}/{}", host, options.image)
            }
            _ => options.image.clone(),
        };

        if let (Some(user), Some(password), Some(registry)) = (
            &options.registry_user,
            &options.registry_password,
            &options.registry_url,
        ) {
            let login = Invocation::new("docker", &self.workspace)
                .args(["login", "--username"])
                .arg(user.clone())
                .arg("--password-stdin")
                .arg(registry.clone())
                .stdin(password.clone());
            self.execute(STAGE, login)?;
        }

        self.execute(
            STAGE,
            Invocation::new("docker", &self.workspace)
                .arg("pull")
                .arg(reference.clone()),
        )?;
        self.execute(
            STAGE,
            Invocation::new("docker", &self.workspace)
                .args(["save", "--output"])
                .arg(options.tar_path.display().to_string())
                .arg(reference),
        )
    }
}
