//! Check command - prove the configured credentials work.

use anyhow::Result;
use gridmeter_core::EnergySource;
use gridmeter_store::Config;
use tracing::info;

use crate::commands::usage::build_client;
use crate::Cli;

/// Runs the check command.
pub async fn run(cli: &Cli, config: &Config) -> Result<()> {
    let mut client = build_client(config)?;
    info!(account = %client.account_number(), "validating credentials");

    EnergySource::validate_credentials(&mut client).await?;

    if !cli.quiet {
        println!(
            "credentials accepted for account {}",
            client.account_number()
        );
    }
    Ok(())
}
