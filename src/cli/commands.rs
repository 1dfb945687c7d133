use clap::{Parser, Subcommand, Args};

#[derive(Parser)]
#[command(name = "scangate", version, about = "Upload build artifacts and launch remote static-analysis scans")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Decide whether a scan is due and, if so, upload and launch it
    Scan(ScanArgs),
    /// Validate a configuration file
    Validate(ValidateArgs),
}

#[derive(Args, Clone)]
pub struct ScanArgs {
    /// YAML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Build workspace root
    #[arg(short, long, default_value = ".")]
    pub workspace: String,

    /// Treat the workspace as living on another node
    #[arg(long)]
    pub remote_workspace: bool,

    /// Comma-separated causes of this build: manual, scm, timer
    #[arg(long, env = "SCANGATE_BUILD_CAUSE", default_value = "manual")]
    pub cause: String,

    /// Comma-separated include globs, relative to the workspace
    #[arg(long)]
    pub includes: Option<String>,

    /// Application name registered with the scanning service
    #[arg(long)]
    pub application: Option<String>,

    /// Only scan the first module whose platform contains this text
    #[arg(long)]
    pub platform: Option<String>,

    /// Custom scan name
    #[arg(long)]
    pub scan_name: Option<String>,

    /// Minimum days between scans
    #[arg(long)]
    pub frequency: Option<u32>,

    /// Minutes to wait for prescan results
    #[arg(long)]
    pub prescan_timeout: Option<u32>,

    /// Freshness strategy: marker, remote
    #[arg(long)]
    pub freshness: Option<String>,

    /// Module selection mode: legacy, strict
    #[arg(long)]
    pub module_selection: Option<String>,

    /// Scanning service API base URL
    #[arg(long)]
    pub service_url: Option<String>,

    /// Scanning service user
    #[arg(long, env = "SCANGATE_USERNAME")]
    pub username: Option<String>,

    /// Scanning service password
    #[arg(long, env = "SCANGATE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Args, Clone)]
pub struct ValidateArgs {
    /// Config file to validate
    pub config: String,
}
