//! Rejugar CLI: replay a generated test suite against a live game page
//!
//! ## Usage
//!
//! ```bash
//! rejugador run --url http://localhost:8080 --tests suite.txt
//! rejugador check --tests suite.txt       # parse only
//! ```

mod commands;
mod error;
mod output;

use clap::Parser;
use commands::{CheckArgs, Cli, Commands, RunArgs};
use error::{CliError, CliResult};
use rejugar::{
    parse_json_suite, parse_pipe_suite, BrowserConfig, ChromiumFactory, ClassifiedResult,
    Executor, ExecutorConfig, GameInfo, Report, RunContext, RunPhase, TestDefinition,
};
use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(cli: &Cli) {
    let default = if cli.quiet {
        "warn"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> CliResult<()> {
    match cli.command {
        Commands::Run(args) => run_suite(&args).await,
        Commands::Check(args) => check_suite(&args),
    }
}

async fn run_suite(args: &RunArgs) -> CliResult<()> {
    let mut ctx = RunContext::new();

    ctx.advance(RunPhase::Analyzing)?;
    let game_info = load_game_info(args)?;
    ctx.game_info = Some(game_info.clone());
    ctx.advance(RunPhase::Analyzed)?;

    let tests = load_suite(&args.tests)?;
    if tests.is_empty() {
        return Err(CliError::suite(format!(
            "no tests found in {}",
            args.tests.display()
        )));
    }
    tracing::info!(count = tests.len(), "suite loaded");
    ctx.tests = tests;
    ctx.advance(RunPhase::TestsGenerated)?;

    ctx.advance(RunPhase::Executing)?;
    let executor = Executor::new(
        ChromiumFactory::new(browser_config(args)),
        ExecutorConfig::default()
            .with_artifacts_dir(args.artifacts.clone())
            .with_attempt_timeout(Duration::from_millis(args.attempt_timeout)),
    );
    let results = executor.execute_suite(&args.url, &ctx.tests).await?;

    let classified = results.into_iter().map(ClassifiedResult::from_result).collect();
    let report = Report::build(game_info, classified);
    let path = report.persist(&args.reports)?;
    output::print_report(&report);
    ctx.report = Some(report);
    ctx.advance(RunPhase::Completed)?;

    println!();
    println!("Report: {}", path.display());
    Ok(())
}

fn check_suite(args: &CheckArgs) -> CliResult<()> {
    let tests = load_suite(&args.tests)?;
    output::print_suite(&tests);
    Ok(())
}

fn browser_config(args: &RunArgs) -> BrowserConfig {
    let mut config = BrowserConfig::default().with_headless(!args.headful);
    if args.no_sandbox {
        config = config.with_no_sandbox();
    }
    if let Some(ref path) = args.chromium_path {
        config = config.with_chromium_path(path.clone());
    }
    config
}

/// Load a suite file, dispatching on extension
fn load_suite(path: &Path) -> CliResult<Vec<TestDefinition>> {
    let text = std::fs::read_to_string(path)?;

    if path.extension().is_some_and(|ext| ext == "json") {
        Ok(parse_json_suite(&text)?)
    } else {
        Ok(parse_pipe_suite(&text))
    }
}

/// Load game analysis if provided; the URL under test always wins
fn load_game_info(args: &RunArgs) -> CliResult<GameInfo> {
    let mut info = match &args.game_info {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            serde_json::from_str(&text)
                .map_err(|e| CliError::config(format!("{}: {e}", path.display())))?
        }
        None => GameInfo::default(),
    };
    info.url = args.url.clone();
    Ok(info)
}
