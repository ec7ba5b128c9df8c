use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "detect-scan",
    version,
    about = "Prepare build artifacts and run a Black Duck Detect scan",
    long_about = "detect-scan optionally builds the project (Maven, NPM, MTA), downloads the Detect script, scans the project and configured container images, and reports one classified outcome."
)]
pub struct Cli {
    /// Project root: workspace for builds and the scan
    #[arg(default_value = ".")]
    pub project_root: PathBuf,

    /// Configuration file (yaml, yml, json or toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Black Duck API token
    #[arg(long, env = "DETECT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Black Duck server URL
    #[arg(long)]
    pub server_url: Option<String>,

    /// Black Duck project name
    #[arg(long)]
    pub project_name: Option<String>,

    /// Project version before the versioning model is applied
    #[arg(long)]
    pub project_version: Option<String>,

    /// Write the outcome as JSON to this file
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}
