//! CLI argument definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Reproducibility test runner for browser tile-matching games
#[derive(Parser, Debug)]
#[command(name = "rejugador")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Execute a test suite against a game URL and write a report
    Run(RunArgs),

    /// Parse a test suite and show what would be executed
    Check(CheckArgs),
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Game URL to test
    #[arg(short, long)]
    pub url: String,

    /// Test suite file (pipe format, or JSON with a .json extension)
    #[arg(short, long)]
    pub tests: PathBuf,

    /// Game analysis JSON to echo into the report
    #[arg(long)]
    pub game_info: Option<PathBuf>,

    /// Directory receiving screenshots
    #[arg(long, default_value = "artifacts")]
    pub artifacts: PathBuf,

    /// Directory receiving the report JSON
    #[arg(long, default_value = "reports")]
    pub reports: PathBuf,

    /// Attempt deadline in milliseconds
    #[arg(long, default_value = "30000")]
    pub attempt_timeout: u64,

    /// Path to the chromium executable (auto-detected when omitted)
    #[arg(long, env = "CHROMIUM_PATH")]
    pub chromium_path: Option<String>,

    /// Run the browser with a visible window
    #[arg(long)]
    pub headful: bool,

    /// Disable the browser sandbox (for containers)
    #[arg(long)]
    pub no_sandbox: bool,
}

/// Arguments for the check command
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Test suite file (pipe format, or JSON with a .json extension)
    #[arg(short, long)]
    pub tests: PathBuf,
}
