//! Artifact preparation before the scan.
//!
//! Up to four build stages run in a fixed order, each gated by its own
//! configuration flag. The first failing stage stops the sequence and its
//! error is returned unchanged.

mod error;
mod tools;

pub use error::BuildError;
pub use tools::{
    BuildTools, CommandBuildTools, ImageSaveOptions, MavenBuildOptions, MavenInstallOptions,
    MtaBuildOptions, NpmInstallOptions,
};

use tracing::{debug, info};

use crate::config::DetectConfig;

/// One conditional preparation stage.
pub struct Stage {
    pub name: &'static str,
    pub enabled: fn(&DetectConfig) -> bool,
    pub run: fn(&DetectConfig, &dyn BuildTools) -> Result<(), BuildError>,
}

impl std::fmt::Debug for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stage").field("name", &self.name).finish()
    }
}

/// Preparation stages in execution order. Later stages may consume what
/// earlier ones produced.
pub const STAGES: &[Stage] = &[
    Stage {
        name: "install-artifacts",
        enabled: |config| config.install_artifacts,
        run: |config, tools| tools.install_maven_artifacts(&MavenInstallOptions::from(config)),
    },
    Stage {
        name: "maven-build",
        enabled: |config| config.build_maven,
        run: |config, tools| tools.run_maven_build(&MavenBuildOptions::from(config)),
    },
    Stage {
        name: "npm-install",
        enabled: |config| config.install_npm,
        run: |config, tools| tools.install_npm_dependencies(&NpmInstallOptions::from(config)),
    },
    Stage {
        name: "mta-build",
        enabled: |config| config.build_mta,
        run: |config, tools| tools.run_mta_build(&MtaBuildOptions::from(config)),
    },
];

/// Run `stages` in order, stopping at the first error.
pub fn run_stages(
    stages: &[Stage],
    config: &DetectConfig,
    tools: &dyn BuildTools,
) -> Result<(), BuildError> {
    for stage in stages {
        if !(stage.enabled)(config) {
            debug!(stage = stage.name, "Stage disabled, skipping");
            continue;
        }

        info!(stage = stage.name, "Running preparation stage");
        (stage.run)(config, tools)?;
        debug!(stage = stage.name, "Stage finished");
    }
    Ok(())
}

/// Run the standard preparation stages for `config`.
pub fn prepare_artifacts(config: &DetectConfig, tools: &dyn BuildTools) -> Result<(), BuildError> {
    run_stages(STAGES, config, tools)
}
