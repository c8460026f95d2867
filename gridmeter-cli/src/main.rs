// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! Gridmeter CLI - Dominion Energy usage monitoring from the command line.
//!
//! # Examples
//!
//! ```bash
//! # Run one refresh cycle and print the snapshot
//! gridmeter
//!
//! # JSON output
//! gridmeter --format json --pretty
//!
//! # Poll on the configured interval (12 hours by default)
//! gridmeter watch
//!
//! # Poll hourly instead
//! gridmeter watch --interval 3600
//!
//! # Validate the configured credentials
//! gridmeter check
//!
//! # Inspect configuration
//! gridmeter config show
//! ```

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use gridmeter_core::CoreError;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{check, config, usage, watch};

// ============================================================================
// CLI Definition
// ============================================================================

/// Gridmeter CLI - Dominion Energy usage monitoring.
#[derive(Parser)]
#[command(name = "gridmeter")]
#[command(about = "Dominion Energy usage and billing monitor")]
#[command(long_about = r"
Gridmeter authenticates against the Dominion Energy customer portal,
fetches usage and billing data for one account, and prints it as text
or JSON. The `watch` subcommand polls on a fixed interval and keeps
serving the last good snapshot through transient failures.

The portal updates usage data roughly once a day; the default poll
interval of 12 hours is deliberate. Lower it with care.
")]
#[command(version)]
pub struct Cli {
    /// Subcommand to run. If none, runs 'usage' by default.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Path to the configuration file.
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Run one refresh cycle and print the snapshot (default).
    #[command(visible_alias = "u")]
    Usage,

    /// Poll on an interval and print every snapshot.
    #[command(visible_alias = "w")]
    Watch(watch::WatchArgs),

    /// Validate the configured credentials against the portal.
    Check,

    /// Manage configuration.
    Config(config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// Credentials or configuration rejected; operator action required.
    AuthFailed = 2,
    /// Refresh failed; no fresh data this cycle.
    NoData = 3,
}

fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<CoreError>() {
        Some(core) if core.is_fatal() => ExitCode::AuthFailed,
        Some(_) => ExitCode::NoData,
        None => ExitCode::Error,
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(cli: &Cli, config_level: &str) {
    if cli.quiet {
        return; // No logging in quiet mode
    }

    let filter = if cli.verbose {
        EnvFilter::new("gridmeter=debug,info")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("gridmeter={config_level}")))
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let cfg = config::load(&cli)?;
    setup_logging(&cli, &cfg.general.log_level);

    let result = match &cli.command {
        Some(Commands::Usage) | None => usage::run(&cli, &cfg).await,
        Some(Commands::Watch(args)) => watch::run(args, &cli, &cfg).await,
        Some(Commands::Check) => check::run(&cli, &cfg).await,
        Some(Commands::Config(args)) => config::run(args, &cli, &cfg),
    };

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e:#}");
        }
        std::process::exit(exit_code_for(&e) as i32);
    }

    Ok(())
}
