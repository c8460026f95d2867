//! Response normalization.
//!
//! Field extraction is lenient: a missing field becomes null, and a field
//! present in an unexpected shape becomes null with a warning. Only a
//! response without the expected envelope, or one yielding no usable
//! field at all, aborts the cycle.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use gridmeter_core::UsageSnapshot;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::api::RawAccountData;
use super::error::DominionError;

/// Normalizes one fetch pass into a snapshot.
///
/// `now` stamps the snapshot and anchors the daily-cost estimate; the
/// caller passes the wall clock.
pub fn normalize(raw: &RawAccountData, now: DateTime<Utc>) -> Result<UsageSnapshot, DominionError> {
    let forecast = raw
        .bill_forecast
        .get("data")
        .and_then(Value::as_object)
        .ok_or_else(|| {
            DominionError::Parse("bill forecast response has no data object".to_string())
        })?;

    // The portal reports month-to-date consumption as one figure; it is
    // also what feeds the grid-consumption reading.
    let month_to_date = number_field(forecast, "currentUsageKwh");

    let current_bill = number_field(forecast, "currentBillAmount")
        .or_else(|| number_field(forecast, "projectedBillAmount"));

    let billing_period_start = date_field(forecast, "billingPeriodStartDate");
    let billing_period_end = date_field(forecast, "billingPeriodEndDate");

    // Solar accounts report net metering export; everyone else omits the
    // field entirely, which maps to null rather than zero.
    let grid_return = number_field(forecast, "netMeteringExportKwh")
        .or_else(|| number_field(forecast, "gridReturnKwh"));

    let current_rate = derive_rate(current_bill, month_to_date)
        .or_else(|| rate_from_bill_history(raw.bill_history.as_ref()));

    let daily_cost = derive_daily_cost(current_bill, billing_period_start, now);

    let (daily_usage, daily_return) = match raw.usage_history.as_ref() {
        Some(history) => (
            history_list(history, "dailyUsage"),
            history_list(history, "dailyReturn"),
        ),
        None => (None, None),
    };

    let mut snapshot = UsageSnapshot {
        grid_consumption_kwh: month_to_date,
        grid_return_kwh: grid_return,
        month_to_date_kwh: month_to_date,
        current_bill,
        billing_period_start,
        billing_period_end,
        current_rate,
        daily_cost,
        daily_usage,
        daily_return,
        updated_at: now,
    };
    snapshot.sanitize();

    if !snapshot.has_data() {
        return Err(DominionError::Parse(
            "no usable field in bill forecast response".to_string(),
        ));
    }

    debug!(
        consumption = ?snapshot.grid_consumption_kwh,
        bill = ?snapshot.current_bill,
        "normalized snapshot"
    );
    Ok(snapshot)
}

/// Effective rate from this period's figures, four decimals.
fn derive_rate(bill: Option<f64>, usage: Option<f64>) -> Option<f64> {
    match (bill, usage) {
        (Some(bill), Some(usage)) if usage > 0.0 => Some(round_to(bill / usage, 4)),
        _ => None,
    }
}

/// Rate fallback from the most recent settled bill.
fn rate_from_bill_history(history: Option<&Value>) -> Option<f64> {
    let latest = history?.pointer("/data/bills")?.as_array()?.first()?;
    let amount = latest.get("totalAmount")?.as_f64()?;
    let usage = latest.get("totalUsageKwh")?.as_f64()?;
    if usage > 0.0 {
        Some(round_to(amount / usage, 4))
    } else {
        None
    }
}

/// Bill spread over the days elapsed in the current period, two decimals.
#[allow(clippy::cast_precision_loss)]
fn derive_daily_cost(
    bill: Option<f64>,
    period_start: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<f64> {
    let bill = bill?;
    let start = period_start?;
    let days = (now.date_naive() - start.date_naive()).num_days();
    if days > 0 {
        Some(round_to(bill / days as f64, 2))
    } else {
        None
    }
}

fn number_field(obj: &Map<String, Value>, key: &str) -> Option<f64> {
    match obj.get(key) {
        None | Some(Value::Null) => None,
        Some(value) => match value.as_f64() {
            Some(n) => Some(n),
            None => {
                warn!(field = key, "field has unexpected shape, ignoring");
                None
            }
        },
    }
}

fn date_field(obj: &Map<String, Value>, key: &str) -> Option<DateTime<Utc>> {
    match obj.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => match parse_portal_date(text) {
            Some(date) => Some(date),
            None => {
                warn!(field = key, value = %text, "could not parse date, ignoring");
                None
            }
        },
        Some(_) => {
            warn!(field = key, "field has unexpected shape, ignoring");
            None
        }
    }
}

/// The portal sends RFC 3339 timestamps, occasionally trimmed to a plain
/// calendar date.
fn parse_portal_date(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()?;
    Some(date.and_time(NaiveTime::MIN).and_utc())
}

/// Non-empty history list from the usage-history response.
fn history_list(history: &Value, key: &str) -> Option<Value> {
    match history.pointer(&format!("/data/{key}")) {
        Some(Value::Array(items)) if !items.is_empty() => Some(Value::Array(items.clone())),
        _ => None,
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 31, 6, 0, 0).unwrap()
    }

    fn raw(forecast: Value) -> RawAccountData {
        RawAccountData {
            bill_forecast: forecast,
            usage_history: None,
            bill_history: None,
        }
    }

    fn full_forecast() -> Value {
        json!({
            "status": {"code": 200},
            "data": {
                "currentUsageKwh": 412.5,
                "currentBillAmount": 61.88,
                "billingPeriodStartDate": "2024-03-01T00:00:00Z",
                "billingPeriodEndDate": "2024-03-31T00:00:00Z",
                "netMeteringExportKwh": 120.2
            }
        })
    }

    #[test]
    fn test_full_payload_populates_everything() {
        let snapshot = normalize(&raw(full_forecast()), fixed_now()).unwrap();

        assert_eq!(snapshot.grid_consumption_kwh, Some(412.5));
        assert_eq!(snapshot.month_to_date_kwh, Some(412.5));
        assert_eq!(snapshot.grid_return_kwh, Some(120.2));
        assert_eq!(snapshot.current_bill, Some(61.88));
        assert_eq!(
            snapshot.billing_period_start,
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap())
        );
        // 61.88 / 412.5 rounded to four decimals.
        assert_eq!(snapshot.current_rate, Some(0.15));
        // 30 days into the period: 61.88 / 30.
        assert_eq!(snapshot.daily_cost, Some(2.06));
        assert_eq!(snapshot.updated_at, fixed_now());
    }

    #[test]
    fn test_missing_grid_return_is_null_not_zero() {
        let forecast = json!({
            "data": {
                "currentUsageKwh": 412.5,
                "currentBillAmount": 61.88
            }
        });
        let snapshot = normalize(&raw(forecast), fixed_now()).unwrap();
        assert_eq!(snapshot.grid_return_kwh, None);
    }

    #[test]
    fn test_grid_return_fallback_key() {
        let forecast = json!({
            "data": {
                "currentUsageKwh": 412.5,
                "gridReturnKwh": 55.0
            }
        });
        let snapshot = normalize(&raw(forecast), fixed_now()).unwrap();
        assert_eq!(snapshot.grid_return_kwh, Some(55.0));
    }

    #[test]
    fn test_projected_bill_fallback() {
        let forecast = json!({
            "data": {
                "currentUsageKwh": 412.5,
                "projectedBillAmount": 70.0
            }
        });
        let snapshot = normalize(&raw(forecast), fixed_now()).unwrap();
        assert_eq!(snapshot.current_bill, Some(70.0));
    }

    #[test]
    fn test_wrong_shape_field_becomes_null() {
        let forecast = json!({
            "data": {
                "currentUsageKwh": "a lot",
                "currentBillAmount": 61.88
            }
        });
        let snapshot = normalize(&raw(forecast), fixed_now()).unwrap();

        assert_eq!(snapshot.grid_consumption_kwh, None);
        assert_eq!(snapshot.current_bill, Some(61.88));
    }

    #[test]
    fn test_unparsable_date_becomes_null() {
        let forecast = json!({
            "data": {
                "currentUsageKwh": 412.5,
                "billingPeriodStartDate": "last tuesday"
            }
        });
        let snapshot = normalize(&raw(forecast), fixed_now()).unwrap();

        assert_eq!(snapshot.billing_period_start, None);
        assert_eq!(snapshot.daily_cost, None);
    }

    #[test]
    fn test_plain_date_is_accepted() {
        let forecast = json!({
            "data": {
                "currentUsageKwh": 412.5,
                "billingPeriodStartDate": "2024-03-01"
            }
        });
        let snapshot = normalize(&raw(forecast), fixed_now()).unwrap();
        assert_eq!(
            snapshot.billing_period_start,
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_missing_data_object_is_parse_error() {
        let err = normalize(&raw(json!({"status": {"code": 200}})), fixed_now()).unwrap_err();
        assert!(matches!(err, DominionError::Parse(_)));

        let err = normalize(&raw(json!({"data": "nope"})), fixed_now()).unwrap_err();
        assert!(matches!(err, DominionError::Parse(_)));
    }

    #[test]
    fn test_empty_data_object_is_parse_error() {
        let err = normalize(&raw(json!({"data": {}})), fixed_now()).unwrap_err();
        assert!(matches!(err, DominionError::Parse(_)));
    }

    #[test]
    fn test_rate_fallback_from_bill_history() {
        let mut data = raw(json!({
            "data": {
                "currentUsageKwh": 412.5
            }
        }));
        data.bill_history = Some(json!({
            "data": {
                "bills": [
                    {"totalAmount": 90.0, "totalUsageKwh": 600.0},
                    {"totalAmount": 80.0, "totalUsageKwh": 500.0}
                ]
            }
        }));

        let snapshot = normalize(&data, fixed_now()).unwrap();
        assert_eq!(snapshot.current_rate, Some(0.15));
    }

    #[test]
    fn test_forecast_rate_wins_over_history() {
        let mut data = raw(full_forecast());
        data.bill_history = Some(json!({
            "data": {"bills": [{"totalAmount": 100.0, "totalUsageKwh": 100.0}]}
        }));

        let snapshot = normalize(&data, fixed_now()).unwrap();
        assert_eq!(snapshot.current_rate, Some(0.15));
    }

    #[test]
    fn test_history_lists_pass_through() {
        let mut data = raw(full_forecast());
        data.usage_history = Some(json!({
            "data": {
                "dailyUsage": [{"date": "2024-03-30", "usageKwh": 13.2}],
                "dailyReturn": []
            }
        }));

        let snapshot = normalize(&data, fixed_now()).unwrap();
        assert!(snapshot.daily_usage.is_some());
        // Empty lists are treated as absent, matching the other fields.
        assert!(snapshot.daily_return.is_none());
    }

    #[test]
    fn test_daily_cost_requires_elapsed_days() {
        let forecast = json!({
            "data": {
                "currentUsageKwh": 10.0,
                "currentBillAmount": 5.0,
                "billingPeriodStartDate": "2024-03-31T00:00:00Z"
            }
        });
        // Period started today; no elapsed day to spread the bill over.
        let snapshot = normalize(&raw(forecast), fixed_now()).unwrap();
        assert_eq!(snapshot.daily_cost, None);
    }

    #[test]
    fn test_non_finite_numbers_are_dropped() {
        // as_f64 never yields NaN from JSON, but the derivation can: a
        // subnormal usage value makes the rate blow up.
        let forecast = json!({
            "data": {
                "currentUsageKwh": 5e-324,
                "currentBillAmount": 61.88
            }
        });
        let snapshot = normalize(&raw(forecast), fixed_now()).unwrap();
        assert!(snapshot.current_rate.is_none_or(f64::is_finite));
    }
}
