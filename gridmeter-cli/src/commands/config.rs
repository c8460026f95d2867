//! Config command - inspect and initialize the configuration file.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use gridmeter_store::Config;
use std::path::PathBuf;

use crate::Cli;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the active configuration with secrets redacted.
    Show,
    /// Print the configuration file path.
    Path,
    /// Write a default configuration file if none exists.
    Init,
}

/// Resolves the configuration file path from the CLI flags.
pub fn config_path(cli: &Cli) -> PathBuf {
    cli.config.clone().unwrap_or_else(Config::default_path)
}

/// Loads the configuration honoring the `--config` flag.
pub fn load(cli: &Cli) -> Result<Config> {
    let path = config_path(cli);
    Config::load_from(&path)
        .with_context(|| format!("loading configuration from {}", path.display()))
}

/// Runs the config command.
pub fn run(args: &ConfigArgs, cli: &Cli, config: &Config) -> Result<()> {
    let path = config_path(cli);

    match args.action {
        ConfigAction::Show => {
            println!("{}", serde_json::to_string_pretty(&config.redacted())?);
        }
        ConfigAction::Path => {
            println!("{}", path.display());
        }
        ConfigAction::Init => {
            if path.exists() {
                anyhow::bail!("configuration file already exists at {}", path.display());
            }
            Config::default().save_to(&path)?;
            println!("wrote default configuration to {}", path.display());
        }
    }
    Ok(())
}
