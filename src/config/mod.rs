//! Configuration layer for detect-scan.
//!
//! ## Layers
//! - `types`: the `DetectConfig` definition and its defaults
//! - `loading`: file discovery, parsing and validation
//! - `versioning`: project version naming

mod error;
mod loading;
mod types;
mod versioning;

pub use error::ConfigError;
pub use loading::CONFIG_FILE_NAMES;
pub use types::{
    DEFAULT_DETECT_SCRIPT_URL, DEFAULT_NPM_DESCRIPTOR, DETECT7_SCRIPT_URL, DetectConfig,
    SUPPORTED_DISTROS,
};
pub use versioning::VersioningModel;
