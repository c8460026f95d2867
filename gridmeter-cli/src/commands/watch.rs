//! Watch command - the host-side poll scheduler.
//!
//! The provider client never schedules itself; this loop owns the
//! cross-cycle cadence. Successful cycles sleep the full poll interval,
//! retryable failures back off exponentially (capped at the interval),
//! and a fatal failure stops the loop so the operator can fix the
//! configuration.

use anyhow::Result;
use clap::Args;
use gridmeter_core::EnergySource;
use gridmeter_fetch::RetryStrategy;
use gridmeter_store::Config;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::commands::usage::{build_client, print_snapshot};
use crate::Cli;

/// Arguments for the watch command.
#[derive(Args, Default)]
pub struct WatchArgs {
    /// Seconds between refresh cycles (defaults to the configured value).
    #[arg(long, short)]
    pub interval: Option<u64>,

    /// Stop after this many cycles (default: run until interrupted).
    #[arg(long)]
    pub cycles: Option<u64>,
}

/// Runs the watch command.
pub async fn run(args: &WatchArgs, cli: &Cli, config: &Config) -> Result<()> {
    let interval = Duration::from_secs(args.interval.unwrap_or(config.general.refresh_interval));
    let mut client = build_client(config)?;

    info!(
        account = %client.account_number(),
        interval_secs = interval.as_secs(),
        "starting watch loop"
    );
    watch_loop(&mut client, args.cycles, interval, cli).await
}

/// The poll loop, generic over the energy source so it can be driven by
/// a fake in tests.
pub(crate) async fn watch_loop<S: EnergySource>(
    source: &mut S,
    cycles: Option<u64>,
    interval: Duration,
    cli: &Cli,
) -> Result<()> {
    let backoff = RetryStrategy::default().with_max_delay(interval.as_secs().max(1));
    let mut consecutive_failures: u32 = 0;
    let mut completed: u64 = 0;

    loop {
        match source.refresh().await {
            Ok(()) => {
                consecutive_failures = 0;
                if let Some(snapshot) = source.latest() {
                    print_snapshot(
                        source.display_name(),
                        source.account_number(),
                        snapshot,
                        cli,
                    )?;
                }
            }
            Err(err) => {
                if err.is_fatal() {
                    warn!(error = %err, "fatal failure, stopping watch");
                    return Err(err.into());
                }
                consecutive_failures += 1;
                warn!(
                    error = %err,
                    consecutive_failures,
                    "refresh failed, last snapshot still stands"
                );
            }
        }

        completed += 1;
        if let Some(limit) = cycles {
            if completed >= limit {
                return Ok(());
            }
        }

        let delay = if consecutive_failures == 0 {
            interval
        } else {
            backoff
                .delay_for_attempt(consecutive_failures)
                .min(interval)
        };
        debug!(delay_secs = delay.as_secs(), "sleeping until next cycle");
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use gridmeter_core::{CoreError, UsageSnapshot};
    use std::collections::VecDeque;

    /// Scripted energy source for driving the loop without a network.
    struct ScriptedSource {
        results: VecDeque<Result<(), CoreError>>,
        latest: Option<UsageSnapshot>,
        refreshes: usize,
    }

    impl ScriptedSource {
        fn new(results: Vec<Result<(), CoreError>>) -> Self {
            Self {
                results: results.into(),
                latest: None,
                refreshes: 0,
            }
        }
    }

    impl EnergySource for ScriptedSource {
        fn display_name(&self) -> &str {
            "Scripted"
        }

        fn account_number(&self) -> &str {
            "0000000000"
        }

        async fn refresh(&mut self) -> Result<(), CoreError> {
            self.refreshes += 1;
            let result = self
                .results
                .pop_front()
                .unwrap_or_else(|| Err(CoreError::Transient("script exhausted".into())));
            if result.is_ok() {
                let mut snapshot = UsageSnapshot::new();
                snapshot.current_bill = Some(10.0);
                self.latest = Some(snapshot);
            }
            result
        }

        fn latest(&self) -> Option<&UsageSnapshot> {
            self.latest.as_ref()
        }

        async fn validate_credentials(&mut self) -> Result<(), CoreError> {
            Ok(())
        }
    }

    fn cli() -> Cli {
        Cli::parse_from(["gridmeter", "--quiet", "--format", "json"])
    }

    #[tokio::test]
    async fn test_loop_stops_after_cycle_limit() {
        let mut source = ScriptedSource::new(vec![Ok(()), Ok(()), Ok(())]);

        watch_loop(&mut source, Some(3), Duration::ZERO, &cli())
            .await
            .unwrap();

        assert_eq!(source.refreshes, 3);
    }

    #[tokio::test]
    async fn test_loop_survives_retryable_failures() {
        let mut source = ScriptedSource::new(vec![
            Ok(()),
            Err(CoreError::Transient("outage".into())),
            Ok(()),
        ]);

        watch_loop(&mut source, Some(3), Duration::ZERO, &cli())
            .await
            .unwrap();

        assert_eq!(source.refreshes, 3);
        assert!(source.latest.is_some());
    }

    #[tokio::test]
    async fn test_loop_stops_on_fatal_error() {
        let mut source = ScriptedSource::new(vec![
            Err(CoreError::InvalidCredentials("rejected".into())),
            Ok(()),
        ]);

        let err = watch_loop(&mut source, Some(5), Duration::ZERO, &cli())
            .await
            .unwrap_err();

        // One attempt only: bad credentials never auto-retry.
        assert_eq!(source.refreshes, 1);
        assert!(err.downcast_ref::<CoreError>().unwrap().is_fatal());
    }
}
