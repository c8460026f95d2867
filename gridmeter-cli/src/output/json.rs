//! JSON output formatting.

use anyhow::Result;
use chrono::{DateTime, Utc};
use gridmeter_core::UsageSnapshot;
use serde::Serialize;
use serde_json::Value;

/// JSON document printed for one snapshot.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotOutput<'a> {
    pub provider: &'a str,
    pub account_number: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid_consumption_kwh: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid_return_kwh: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month_to_date_kwh: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_bill: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_period_start: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_period_end: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_usage: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_return: Option<&'a Value>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> SnapshotOutput<'a> {
    /// Builds the output document from a snapshot.
    pub fn new(provider: &'a str, account_number: &'a str, snapshot: &'a UsageSnapshot) -> Self {
        Self {
            provider,
            account_number,
            grid_consumption_kwh: snapshot.grid_consumption_kwh,
            grid_return_kwh: snapshot.grid_return_kwh,
            month_to_date_kwh: snapshot.month_to_date_kwh,
            current_bill: snapshot.current_bill,
            billing_period_start: snapshot.billing_period_start,
            billing_period_end: snapshot.billing_period_end,
            current_rate: snapshot.current_rate,
            daily_cost: snapshot.daily_cost,
            daily_usage: snapshot.daily_usage.as_ref(),
            daily_return: snapshot.daily_return.as_ref(),
            updated_at: snapshot.updated_at,
        }
    }
}

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats a snapshot as a JSON document.
    pub fn format_snapshot(
        &self,
        provider: &str,
        account_number: &str,
        snapshot: &UsageSnapshot,
    ) -> Result<String> {
        let output = SnapshotOutput::new(provider, account_number, snapshot);
        let text = if self.pretty {
            serde_json::to_string_pretty(&output)?
        } else {
            serde_json::to_string(&output)?
        };
        Ok(text)
    }
}
