//! Usage and billing snapshot types.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// The normalized result of one successful refresh cycle.
///
/// Every value field is optional because the provider omits data freely:
/// non-solar accounts have no grid return, a fresh billing period has no
/// bill amount yet, and individual fields may arrive in unexpected shapes.
/// A snapshot is immutable once constructed; the owning client replaces
/// its cached snapshot wholesale, never field by field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageSnapshot {
    /// Grid consumption in kWh, as reported by the provider.
    pub grid_consumption_kwh: Option<f64>,
    /// Grid return in kWh (solar accounts only).
    pub grid_return_kwh: Option<f64>,
    /// Month-to-date usage in kWh.
    pub month_to_date_kwh: Option<f64>,
    /// Current bill amount in USD.
    pub current_bill: Option<f64>,
    /// Start of the current billing period.
    pub billing_period_start: Option<DateTime<Utc>>,
    /// End of the current billing period.
    pub billing_period_end: Option<DateTime<Utc>>,
    /// Effective rate in USD per kWh.
    pub current_rate: Option<f64>,
    /// Estimated cost per day in USD.
    pub daily_cost: Option<f64>,
    /// Daily usage history, passed through as the provider sent it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_usage: Option<serde_json::Value>,
    /// Daily return history, passed through as the provider sent it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_return: Option<serde_json::Value>,
    /// When this snapshot was taken.
    pub updated_at: DateTime<Utc>,
}

impl UsageSnapshot {
    /// Creates a new empty snapshot stamped with the current time.
    pub fn new() -> Self {
        Self::empty_at(Utc::now())
    }

    /// Creates a new empty snapshot stamped with the given time.
    pub fn empty_at(updated_at: DateTime<Utc>) -> Self {
        Self {
            grid_consumption_kwh: None,
            grid_return_kwh: None,
            month_to_date_kwh: None,
            current_bill: None,
            billing_period_start: None,
            billing_period_end: None,
            current_rate: None,
            daily_cost: None,
            daily_usage: None,
            daily_return: None,
            updated_at,
        }
    }

    /// Returns true if any value field is present.
    pub fn has_data(&self) -> bool {
        self.grid_consumption_kwh.is_some()
            || self.grid_return_kwh.is_some()
            || self.month_to_date_kwh.is_some()
            || self.current_bill.is_some()
            || self.billing_period_start.is_some()
            || self.billing_period_end.is_some()
            || self.current_rate.is_some()
            || self.daily_cost.is_some()
    }

    /// Returns true if this snapshot is older than the given threshold.
    pub fn is_stale(&self, threshold: Duration) -> bool {
        Utc::now() - self.updated_at > threshold
    }

    /// Drops non-finite numbers.
    ///
    /// API responses occasionally carry NaN or infinity through float
    /// conversion; a null field is preferable to propagating those into
    /// consumer math.
    pub fn sanitize(&mut self) {
        for field in [
            &mut self.grid_consumption_kwh,
            &mut self.grid_return_kwh,
            &mut self.month_to_date_kwh,
            &mut self.current_bill,
            &mut self.current_rate,
            &mut self.daily_cost,
        ] {
            if field.is_some_and(|v| !v.is_finite()) {
                *field = None;
            }
        }
    }
}

impl Default for UsageSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_snapshot_has_no_data() {
        let snapshot = UsageSnapshot::new();
        assert!(!snapshot.has_data());
    }

    #[test]
    fn test_has_data_with_single_field() {
        let mut snapshot = UsageSnapshot::new();
        snapshot.current_bill = Some(61.88);
        assert!(snapshot.has_data());
    }

    #[test]
    fn test_history_alone_is_not_data() {
        let mut snapshot = UsageSnapshot::new();
        snapshot.daily_usage = Some(serde_json::json!([{"date": "2024-03-01"}]));
        assert!(!snapshot.has_data());
    }

    #[test]
    fn test_staleness() {
        let mut snapshot = UsageSnapshot::new();
        assert!(!snapshot.is_stale(Duration::hours(12)));

        snapshot.updated_at = Utc::now() - Duration::hours(13);
        assert!(snapshot.is_stale(Duration::hours(12)));
    }

    #[test]
    fn test_sanitize_drops_non_finite() {
        let mut snapshot = UsageSnapshot::new();
        snapshot.grid_consumption_kwh = Some(f64::NAN);
        snapshot.current_rate = Some(f64::INFINITY);
        snapshot.current_bill = Some(61.88);

        snapshot.sanitize();

        assert_eq!(snapshot.grid_consumption_kwh, None);
        assert_eq!(snapshot.current_rate, None);
        assert_eq!(snapshot.current_bill, Some(61.88));
    }
}
