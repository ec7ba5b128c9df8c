//! Detect script acquisition.
//!
//! The script lands in the workspace as `detect.sh` and is owned by a
//! [`ScriptFile`] guard that deletes it when dropped.

mod error;

pub use error::AcquireError;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::TempPath;
use tracing::{debug, info};
use url::Url;

use crate::error::IoOperation;

/// File name of the script inside the workspace.
pub const SCRIPT_FILE_NAME: &str = "detect.sh";

const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(120);

/// Places the script found at `source` at `target`.
pub trait ScriptFetcher {
    fn fetch(&self, source: &str, target: &Path) -> Result<(), AcquireError>;
}

/// Fetcher for `http(s)://` URLs, `file://` URLs and plain paths.
#[derive(Debug, Clone)]
pub struct HttpScriptFetcher {
    timeout: Duration,
}

impl Default for HttpScriptFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpScriptFetcher {
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_DOWNLOAD_TIMEOUT,
        }
    }

    fn download(&self, url: &str, target: &Path) -> Result<(), AcquireError> {
        let download_error = |source: reqwest::Error| AcquireError::Download {
            url: url.to_string(),
            source,
        };

        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(download_error)?;
        let response = client.get(url).send().map_err(download_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AcquireError::Http {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().map_err(download_error)?;
        debug!(bytes = body.len(), "Downloaded Detect script");
        fs::write(target, &body).map_err(|e| AcquireError::io(target, IoOperation::Write, e))
    }

    fn copy(&self, source: &Path, target: &Path) -> Result<(), AcquireError> {
        fs::copy(source, target)
            .map(|_| ())
            .map_err(|e| AcquireError::io(source, IoOperation::Read, e))
    }
}

impl ScriptFetcher for HttpScriptFetcher {
    fn fetch(&self, source: &str, target: &Path) -> Result<(), AcquireError> {
        if source.starts_with("http://") || source.starts_with("https://") {
            return self.download(source, target);
        }
        if source.starts_with("file://") {
            let path = Url::parse(source)
                .ok()
                .and_then(|url| url.to_file_path().ok())
                .ok_or_else(|| AcquireError::InvalidSource(source.to_string()))?;
            return self.copy(&path, target);
        }
        if source.contains("://") || source.trim().is_empty() {
            return Err(AcquireError::InvalidSource(source.to_string()));
        }
        self.copy(Path::new(source), target)
    }
}

/// The scanner script in the workspace. Deleted on drop.
#[derive(Debug)]
pub struct ScriptFile {
    path: TempPath,
}

impl ScriptFile {
    /// Absolute path of the script.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the script now, reporting failures instead of ignoring them.
    pub fn remove(self) -> std::io::Result<()> {
        self.path.close()
    }
}

/// Absolute location of the script for `workspace`.
pub fn script_path(workspace: &Path) -> Result<PathBuf, AcquireError> {
    std::path::absolute(workspace.join(SCRIPT_FILE_NAME))
        .map_err(|e| AcquireError::io(workspace, IoOperation::Read, e))
}

/// Fetch the script into `workspace` and make it executable.
///
/// The guard is armed before the fetch, so a partially written file is
/// removed when any later step fails.
pub fn acquire_script(
    fetcher: &dyn ScriptFetcher,
    source: &str,
    workspace: &Path,
) -> Result<ScriptFile, AcquireError> {
    let target = script_path(workspace)?;
    info!(source, target = %target.display(), "Fetching Detect script");

    let guard = ScriptFile {
        path: TempPath::from_path(target.clone()),
    };
    fetcher.fetch(source, &target)?;
    make_executable(&target)?;
    Ok(guard)
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<(), AcquireError> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o700))
        .map_err(|e| AcquireError::io(path, IoOperation::SetPermissions, e))
}

#[cfg(not(unix))]
fn make_executable(path: &Path) -> Result<(), AcquireError> {
    fs::metadata(path)
        .map(|_| ())
        .map_err(|e| AcquireError::io(path, IoOperation::SetPermissions, e))
}
