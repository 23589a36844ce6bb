use clap::{Args, Parser, Subcommand};

use crate::models::Severity;

#[derive(Parser)]
#[command(name = "auditdeck", version, about = "Terminal dashboard for a web application security audit backend")]
pub struct Cli {
    /// Runs the interactive shell when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Increase log verbosity (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Write logs to stderr as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// YAML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Backend API base URL (overrides the config file)
    #[arg(long, env = "AUDITDECK_API_URL", global = true)]
    pub api_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive dashboard shell
    Shell,
    /// Overview: totals, severity distribution and recent scans
    Dashboard(DashboardArgs),
    /// Manage web applications
    #[command(subcommand)]
    Apps(AppsCommand),
    /// Inspect and start scans
    #[command(subcommand)]
    Scans(ScansCommand),
    /// List vulnerabilities
    Vulns(VulnsArgs),
    /// Validate a configuration file
    Validate(ValidateArgs),
}

#[derive(Args, Clone)]
pub struct DashboardArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Clone)]
pub enum AppsCommand {
    /// List web applications with their latest scan
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Register a web application
    Add(AddArgs),
    /// Start a scan for a web application
    Scan {
        /// Web application id
        id: u64,
    },
}

#[derive(Args, Clone)]
pub struct AddArgs {
    /// Display name
    #[arg(short, long, default_value = "")]
    pub name: String,

    /// Base URL, http:// or https://
    #[arg(short, long, default_value = "")]
    pub url: String,

    /// Free-text description
    #[arg(short, long, default_value = "")]
    pub description: String,

    /// Start a scan right after creating it
    #[arg(long)]
    pub scan: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Clone)]
pub enum ScansCommand {
    /// List scan results
    List {
        /// Only scans of this web application
        #[arg(long)]
        app: Option<u64>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one scan result with its vulnerabilities
    Show(ShowArgs),
    /// Start a scan for a web application
    Trigger {
        /// Web application id
        app_id: u64,
    },
}

#[derive(Args, Clone)]
pub struct ShowArgs {
    /// Scan result id
    pub id: u64,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Keep polling until the scan finishes
    #[arg(long)]
    pub follow: bool,

    /// Poll interval in seconds
    #[arg(long, default_value = "10")]
    pub interval: u64,
}

#[derive(Args, Clone)]
pub struct VulnsArgs {
    /// critical, high, medium, low or info
    #[arg(long)]
    pub severity: Option<Severity>,

    /// Only findings of this scan result
    #[arg(long)]
    pub scan: Option<u64>,

    /// Only findings of this web application
    #[arg(long)]
    pub app: Option<u64>,

    /// Only findings of this type, e.g. sql_injection
    #[arg(long = "type")]
    pub vuln_type: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Clone)]
pub struct ValidateArgs {
    /// Config file to validate
    pub config: String,
}
