//! Configuration type definitions.

use serde::{Deserialize, Serialize};

/// Default location of the Detect launcher script.
pub const DEFAULT_DETECT_SCRIPT_URL: &str = "https://detect.synopsys.com/detect8.sh";

/// Legacy Detect 7 launcher script.
pub const DETECT7_SCRIPT_URL: &str = "https://detect.synopsys.com/detect7.sh";

/// Build descriptor used for `npm install` when none is declared.
pub const DEFAULT_NPM_DESCRIPTOR: &str = "package.json";

/// Container distros supported by the image inspector services.
pub const SUPPORTED_DISTROS: &[&str] = &["ubuntu", "centos", "alpine"];

/// Complete configuration of one scan step.
///
/// Boolean stage flags are independent; any subset may be enabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectConfig {
    // ============ Black Duck connection ============
    /// Black Duck server URL.
    pub server_url: String,
    /// Black Duck API token.
    pub token: String,
    /// Additional CA certificates (PEM paths) for the Black Duck connection.
    pub custom_tls_certificates: Vec<String>,
    /// Location of the Detect launcher script (URL, `file://` URL or local path).
    pub detect_script_url: Option<String>,
    /// Use the Detect 7 launcher when no explicit script URL is set.
    pub use_detect7: bool,

    // ============ Project / version ============
    pub project_name: String,
    /// Version of the scanned artifact, shaped by `versioning_model`.
    pub version: String,
    /// Version name used verbatim instead of the versioning model.
    pub custom_scan_version: Option<String>,
    /// One of "full", "semantic", "major-minor", "major".
    pub versioning_model: String,
    /// Code location name; defaults to `<project>/<version>`.
    pub code_location: Option<String>,
    /// Black Duck user groups to assign to the project.
    pub groups: Vec<String>,
    /// Policy severities that fail the scan.
    pub fail_on: Vec<String>,

    // ============ Scan scoping ============
    pub scanners: Vec<String>,
    pub scan_paths: Vec<String>,
    pub dependency_path: Option<String>,
    /// Additional Detect properties, space separated.
    pub scan_properties: Vec<String>,
    pub unmap: bool,
    pub scan_on_changes: bool,
    pub min_scan_interval: u32,
    pub included_package_managers: Vec<String>,
    pub excluded_package_managers: Vec<String>,
    pub maven_excluded_scopes: Vec<String>,
    pub detect_tools: Vec<String>,
    pub excluded_directories: Vec<String>,
    /// Build tool of the project ("maven", "npm", "mta", ...).
    pub build_tool: Option<String>,

    // ============ Maven ============
    pub install_artifacts: bool,
    pub build_maven: bool,
    pub pom_path: String,
    pub project_settings_file: Option<String>,
    pub global_settings_file: Option<String>,
    pub m2_path: Option<String>,
    pub maven_goals: Vec<String>,
    pub maven_defines: Vec<String>,

    // ============ NPM ============
    pub install_npm: bool,
    pub default_npm_registry: Option<String>,
    /// package.json files to install; empty means the root `package.json`.
    pub build_descriptor_list: Vec<String>,

    // ============ MTA ============
    pub build_mta: bool,
    pub mta_platform: String,
    pub mta_build_target: Option<String>,

    // ============ Container image scan ============
    /// Enables the image scan pass: "ubuntu", "centos" or "alpine".
    pub scan_container_distro: Option<String>,
    pub image_name_tags: Vec<String>,
    pub container_registry_url: Option<String>,
    pub container_registry_user: Option<String>,
    pub container_registry_password: Option<String>,

    // ============ Environment ============
    /// `KEY=VALUE` entries appended to the scanner environment.
    pub custom_environment_variables: Vec<String>,
}

impl Default for DetectConfig {
    fn default() -> Self {
        Self {
            server_url: String::new(),
            token: String::new(),
            custom_tls_certificates: Vec::new(),
            detect_script_url: None,
            use_detect7: false,
            project_name: String::new(),
            version: String::new(),
            custom_scan_version: None,
            versioning_model: "major".to_string(),
            code_location: None,
            groups: Vec::new(),
            fail_on: vec!["BLOCKER".to_string()],
            scanners: vec!["signature".to_string()],
            scan_paths: vec![".".to_string()],
            dependency_path: None,
            scan_properties: Vec::new(),
            unmap: false,
            scan_on_changes: false,
            min_scan_interval: 0,
            included_package_managers: Vec::new(),
            excluded_package_managers: Vec::new(),
            maven_excluded_scopes: Vec::new(),
            detect_tools: Vec::new(),
            excluded_directories: Vec::new(),
            build_tool: None,
            install_artifacts: false,
            build_maven: false,
            pom_path: "pom.xml".to_string(),
            project_settings_file: None,
            global_settings_file: None,
            m2_path: None,
            maven_goals: vec!["install".to_string()],
            maven_defines: Vec::new(),
            install_npm: false,
            default_npm_registry: None,
            build_descriptor_list: Vec::new(),
            build_mta: false,
            mta_platform: "CF".to_string(),
            mta_build_target: None,
            scan_container_distro: None,
            image_name_tags: Vec::new(),
            container_registry_url: None,
            container_registry_user: None,
            container_registry_password: None,
            custom_environment_variables: Vec::new(),
        }
    }
}

impl DetectConfig {
    /// Where the launcher script is fetched from.
    pub fn script_source(&self) -> &str {
        match self.detect_script_url.as_deref() {
            Some(url) if !url.is_empty() => url,
            _ if self.use_detect7 => DETECT7_SCRIPT_URL,
            _ => DEFAULT_DETECT_SCRIPT_URL,
        }
    }

    /// Descriptors for `npm install`, defaulting to the root `package.json`.
    pub fn npm_descriptors(&self) -> Vec<String> {
        if self.build_descriptor_list.is_empty() {
            vec![DEFAULT_NPM_DESCRIPTOR.to_string()]
        } else {
            self.build_descriptor_list.clone()
        }
    }

    /// Container distro when the image scan pass is enabled.
    pub fn container_distro(&self) -> Option<&str> {
        self.scan_container_distro
            .as_deref()
            .filter(|distro| !distro.is_empty())
    }

    /// True if `name` appears in any pass-through scan property.
    pub fn scan_properties_mention(&self, name: &str) -> bool {
        self.scan_properties.iter().any(|p| p.contains(name))
    }
}
