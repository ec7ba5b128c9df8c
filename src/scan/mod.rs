//! Detect invocation: argument composition, process execution and merging of
//! the primary and image scan results.

mod aggregate;
mod args;
mod error;
mod runner;
mod system;

pub use aggregate::merge_scan_errors;
pub use args::{build_image_args, build_scan_args, inspector_service_url, version_name};
pub use error::{ArgumentError, ScanFailure};
pub use runner::{PHONE_HOME_DISABLE, ScanRunner, image_tar_name, scan_environment};
pub use system::BlackDuckSystem;
