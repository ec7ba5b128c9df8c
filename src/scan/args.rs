//! Scanner argument composition.
//!
//! Arguments are only ever appended: script path, connectivity, project and
//! version, scoping, then the pass-through properties from the configuration.
//! Nothing is reordered or deduplicated.

use std::path::Path;

use super::error::ArgumentError;
use super::system::BlackDuckSystem;
use crate::config::{DetectConfig, VersioningModel};

const UNMAP_TRUE: &str = "--detect.project.codelocation.unmap=true";
const UNMAP_FALSE: &str = "--detect.project.codelocation.unmap=false";

const IMAGE_INSPECTOR_SHARED_LOCAL: &str = "/opt/blackduck/blackduck-imageinspector/shared/";
const IMAGE_INSPECTOR_SHARED_REMOTE: &str = "/opt/blackduck/blackduck-imageinspector/shared";

/// Project version name: the custom scan version, or the version shaped by
/// the versioning model.
pub fn version_name(config: &DetectConfig) -> String {
    if let Some(custom) = config
        .custom_scan_version
        .as_deref()
        .filter(|v| !v.is_empty())
    {
        return custom.to_string();
    }

    let model = config
        .versioning_model
        .parse::<VersioningModel>()
        .unwrap_or(VersioningModel::Major);
    model.apply(&config.version)
}

/// Image inspector service URL for a container distro.
pub fn inspector_service_url(distro: &str) -> Result<&'static str, ArgumentError> {
    match distro {
        "ubuntu" => Ok("http://localhost:8082"),
        "centos" => Ok("http://localhost:8081"),
        "alpine" => Ok("http://localhost:8080"),
        other => Err(ArgumentError::UnknownDistro(other.to_string())),
    }
}

/// Pass-through properties, one entry per whitespace separated token.
fn split_properties(config: &DetectConfig) -> Vec<String> {
    config
        .scan_properties
        .iter()
        .flat_map(|p| p.split_whitespace())
        .map(str::to_string)
        .collect()
}

fn non_empty(list: &[String]) -> bool {
    list.first().is_some_and(|first| !first.is_empty())
}

fn uses_scanner(config: &DetectConfig, scanner: &str) -> bool {
    config
        .scanners
        .iter()
        .any(|s| s.trim().eq_ignore_ascii_case(scanner))
}

/// Build the primary scan arguments.
///
/// `version_suffix` and `location_suffix` scope the scan to a sub-version or
/// module; pass `None` to scan the whole project.
pub fn build_scan_args(
    mut args: Vec<String>,
    config: &DetectConfig,
    workspace: &Path,
    system: &BlackDuckSystem,
    version_suffix: Option<&str>,
    location_suffix: Option<&str>,
) -> Result<Vec<String>, ArgumentError> {
    let mut version = version_name(config);
    if let Some(suffix) = version_suffix.filter(|s| !s.is_empty()) {
        version = format!("{}-{}", version, suffix);
    }

    args.extend(system.connection_args());
    args.push(format!("--detect.project.name={}", system.project_name()));
    args.push(format!("--detect.project.version.name={}", version));

    if non_empty(&config.groups) {
        args.push(format!(
            "--detect.project.user.groups={}",
            config.groups.join(",")
        ));
    }

    if non_empty(&config.fail_on) {
        args.push(format!(
            "--detect.policy.check.fail.on.severities={}",
            config.fail_on.join(",")
        ));
    }

    let mut code_location = config
        .code_location
        .clone()
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| format!("{}/{}", system.project_name(), version));
    if let Some(suffix) = location_suffix.filter(|s| !s.is_empty()) {
        code_location = format!("{}-{}", code_location, suffix);
    }
    args.push(format!("--detect.code.location.name={}", code_location));

    if uses_scanner(config, "signature") && non_empty(&config.scan_paths) {
        args.push(format!(
            "--detect.blackduck.signature.scanner.paths={}",
            config.scan_paths.join(",")
        ));
    }
    if uses_scanner(config, "source") {
        args.push("--detect.blackduck.signature.scanner.upload.source.mode=true".to_string());
    }

    let source_path = config
        .dependency_path
        .as_deref()
        .filter(|p| !p.is_empty())
        .unwrap_or(".");
    args.push(format!("--detect.source.path={}", source_path));

    if !config.included_package_managers.is_empty() {
        args.push(format!(
            "--detect.included.detector.types={}",
            config.included_package_managers.join(",").to_uppercase()
        ));
    }
    if !config.excluded_package_managers.is_empty() {
        args.push(format!(
            "--detect.excluded.detector.types={}",
            config.excluded_package_managers.join(",").to_uppercase()
        ));
    }
    if !config.maven_excluded_scopes.is_empty() {
        args.push(format!(
            "--detect.maven.excluded.scopes={}",
            config.maven_excluded_scopes.join(",").to_lowercase()
        ));
    }
    if !config.detect_tools.is_empty() {
        args.push(format!("--detect.tools={}", config.detect_tools.join(",")));
    }

    let maven_args = maven_parameters(config, workspace)?;
    if !maven_args.is_empty() && !config.scan_properties_mention("detect.maven.build.command") {
        args.push(format!(
            "--detect.maven.build.command={}",
            maven_args.join(" ")
        ));
    }

    if !config.excluded_directories.is_empty()
        && !config.scan_properties_mention("detect.excluded.directories")
    {
        args.push(format!(
            "--detect.excluded.directories={}",
            config.excluded_directories.join(",")
        ));
    }

    let mut unmap = config.unmap;
    if config.scan_on_changes {
        args.push("--report".to_string());
        unmap = false;
    }
    if config.min_scan_interval > 0 {
        // unmap would drop all but the latest scan data
        unmap = false;
        args.push(format!(
            "--detect.blackduck.signature.scanner.arguments=--min-scan-interval={}",
            config.min_scan_interval
        ));
    }

    let mut properties = split_properties(config);
    if unmap {
        if !properties.iter().any(|p| p == UNMAP_TRUE) {
            args.push(UNMAP_TRUE.to_string());
        }
        properties.retain(|p| p != UNMAP_FALSE);
    } else {
        properties.retain(|p| p != UNMAP_TRUE);
    }

    if config.build_tool.as_deref() == Some("mta") {
        properties.push("--detect.detector.search.depth=100".to_string());
        properties.push("--detect.detector.search.continue=true".to_string());
    }

    args.extend(properties);
    Ok(args)
}

/// Maven settings and local repository passed to Detect's maven detector.
fn maven_parameters(config: &DetectConfig, workspace: &Path) -> Result<Vec<String>, ArgumentError> {
    let mut params = Vec::new();
    if let Some(global) = config.global_settings_file.as_deref().filter(|s| !s.is_empty()) {
        params.push(format!("--global-settings {}", global));
    }
    if let Some(project) = config.project_settings_file.as_deref().filter(|s| !s.is_empty()) {
        params.push(format!("--settings {}", project));
    }
    if let Some(m2) = config.m2_path.as_deref().filter(|s| !s.is_empty()) {
        let absolute = std::path::absolute(workspace.join(m2)).map_err(|source| {
            ArgumentError::Path {
                path: m2.to_string(),
                source,
            }
        })?;
        params.push(format!("-Dmaven.repo.local={}", absolute.display()));
    }
    Ok(params)
}

/// Build the arguments scanning one exported container image.
pub fn build_image_args(
    mut args: Vec<String>,
    config: &DetectConfig,
    system: &BlackDuckSystem,
    image_tar: &str,
) -> Result<Vec<String>, ArgumentError> {
    let distro = config
        .container_distro()
        .ok_or_else(|| ArgumentError::UnknownDistro(String::new()))?;
    let inspector_url = inspector_service_url(distro)?;
    let version = version_name(config);

    args.push(format!("--detect.docker.tar=./{}", image_tar));
    args.push("--detect.target.type=IMAGE".to_string());
    args.push("--detect.tools.excluded=DETECTOR".to_string());
    args.push(format!(
        "--detect.docker.passthrough.shared.dir.path.local={}",
        IMAGE_INSPECTOR_SHARED_LOCAL
    ));
    args.push(format!(
        "--detect.docker.passthrough.shared.dir.path.imageinspector={}",
        IMAGE_INSPECTOR_SHARED_REMOTE
    ));
    args.push(format!(
        "--detect.docker.passthrough.imageinspector.service.distro.default={}",
        distro
    ));
    args.push("--detect.docker.passthrough.imageinspector.service.start=false".to_string());
    args.push("--detect.docker.passthrough.output.include.squashedimage=false".to_string());
    args.push(format!(
        "--detect.docker.passthrough.imageinspector.service.url={}",
        inspector_url
    ));

    args.extend(system.connection_args());
    args.push(format!("--detect.project.name={}", system.project_name()));
    args.push(format!("--detect.project.version.name={}", version));
    args.push(format!(
        "--detect.code.location.name={}/{}-{}",
        system.project_name(),
        version,
        image_tar
    ));
    Ok(args)
}
