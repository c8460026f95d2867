//! Usage command - run one refresh cycle and print the snapshot.

use anyhow::Result;
use gridmeter_core::{CoreError, EnergySource, UsageSnapshot};
use gridmeter_providers::DominionClient;
use gridmeter_store::Config;
use std::time::Duration;
use tracing::info;

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Runs the usage command.
pub async fn run(cli: &Cli, config: &Config) -> Result<()> {
    let mut client = build_client(config)?;
    info!(account = %client.account_number(), "running one refresh cycle");
    refresh_and_print(&mut client, cli).await
}

/// Builds the provider client from configuration.
pub(crate) fn build_client(config: &Config) -> Result<DominionClient> {
    let credentials = config
        .account
        .credentials()
        .map_err(|e| CoreError::InvalidConfig(e.to_string()))?;
    let timeout = Duration::from_secs(config.general.request_timeout);
    Ok(DominionClient::with_timeout(credentials, timeout).map_err(CoreError::from)?)
}

/// Runs one cycle on any energy source and prints the result.
pub(crate) async fn refresh_and_print<S: EnergySource>(source: &mut S, cli: &Cli) -> Result<()> {
    source.refresh().await?;

    let Some(snapshot) = source.latest() else {
        anyhow::bail!("refresh reported success but no snapshot is cached");
    };
    print_snapshot(source.display_name(), source.account_number(), snapshot, cli)
}

/// Prints a snapshot in the selected format.
pub(crate) fn print_snapshot(
    provider: &str,
    account_number: &str,
    snapshot: &UsageSnapshot,
    cli: &Cli,
) -> Result<()> {
    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_snapshot(provider, account_number, snapshot));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_snapshot(provider, account_number, snapshot)?);
        }
    }
    Ok(())
}
