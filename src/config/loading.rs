//! Configuration loading and validation.

use std::fs;
use std::path::{Path, PathBuf};

use url::Url;

use super::error::ConfigError;
use super::types::{DetectConfig, SUPPORTED_DISTROS};
use super::versioning::VersioningModel;

/// Project-level config file names, in search order.
pub const CONFIG_FILE_NAMES: &[&str] = &[
    ".detect-scan.yaml",
    ".detect-scan.yml",
    ".detect-scan.json",
    ".detect-scan.toml",
];

impl DetectConfig {
    /// Load configuration from a file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.display().to_string(),
            source: e,
        })?;

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "yaml" | "yml" => serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseYaml {
                path: path.display().to_string(),
                source: e,
            }),
            "json" => serde_json::from_str(&content).map_err(|e| ConfigError::ParseJson {
                path: path.display().to_string(),
                source: e,
            }),
            "toml" => toml::from_str(&content).map_err(|e| ConfigError::ParseToml {
                path: path.display().to_string(),
                source: e,
            }),
            _ => Err(ConfigError::UnsupportedFormat(
                path.display().to_string(),
                ext,
            )),
        }
    }

    /// Find the config file that [`DetectConfig::load`] would use.
    ///
    /// Search order:
    /// 1. `.detect-scan.{yaml,yml,json,toml}` in the project root
    /// 2. `~/.config/detect-scan/config.yaml`
    pub fn discover(project_root: &Path) -> Option<PathBuf> {
        for filename in CONFIG_FILE_NAMES {
            let path = project_root.join(filename);
            if path.exists() {
                return Some(path);
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let global_config = config_dir.join("detect-scan").join("config.yaml");
            if global_config.exists() {
                return Some(global_config);
            }
        }

        None
    }

    /// Load configuration for a project, falling back to defaults when no
    /// config file exists. A config file that exists but cannot be parsed is
    /// an error.
    pub fn load(project_root: &Path) -> Result<Self, ConfigError> {
        match Self::discover(project_root) {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// Check that the configuration can drive a scan.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server_url.trim().is_empty() {
            return Err(ConfigError::Missing("server_url"));
        }
        let server_url = Url::parse(self.server_url.trim()).map_err(|e| ConfigError::Invalid {
            field: "server_url",
            message: format!("{}: {}", self.server_url, e),
        })?;
        if !matches!(server_url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                field: "server_url",
                message: format!("unsupported scheme {:?}", server_url.scheme()),
            });
        }

        if self.token.trim().is_empty() {
            return Err(ConfigError::Missing("token"));
        }

        if self.project_name.trim().is_empty() {
            return Err(ConfigError::Missing("project_name"));
        }

        self.versioning_model
            .parse::<VersioningModel>()
            .map_err(|message| ConfigError::Invalid {
                field: "versioning_model",
                message,
            })?;

        if let Some(distro) = self.container_distro()
            && !SUPPORTED_DISTROS.contains(&distro)
        {
            return Err(ConfigError::Invalid {
                field: "scan_container_distro",
                message: format!(
                    "unknown container distro {:?} (expected one of {})",
                    distro,
                    SUPPORTED_DISTROS.join(", ")
                ),
            });
        }

        if let Some(entry) = self
            .custom_environment_variables
            .iter()
            .find(|entry| !entry.contains('='))
        {
            return Err(ConfigError::Invalid {
                field: "custom_environment_variables",
                message: format!("expected KEY=VALUE, got {:?}", entry),
            });
        }

        Ok(())
    }
}
