//! Text output formatting with colors.

use chrono::{DateTime, Utc};
use gridmeter_core::UsageSnapshot;

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const CYAN: &str = "\x1b[36m";

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// Formats a snapshot as aligned label/value lines.
    pub fn format_snapshot(
        &self,
        provider: &str,
        account_number: &str,
        snapshot: &UsageSnapshot,
    ) -> String {
        let mut lines = Vec::new();

        lines.push(format!(
            "{} (account {})",
            self.bold(provider),
            self.cyan(account_number)
        ));

        lines.push(self.line("Grid consumption", self.kwh(snapshot.grid_consumption_kwh)));
        lines.push(self.line("Grid return", self.kwh(snapshot.grid_return_kwh)));
        lines.push(self.line("Month to date", self.kwh(snapshot.month_to_date_kwh)));
        lines.push(self.line("Current bill", self.usd(snapshot.current_bill)));
        lines.push(self.line(
            "Billing period",
            self.period(snapshot.billing_period_start, snapshot.billing_period_end),
        ));
        lines.push(self.line("Current rate", self.rate(snapshot.current_rate)));
        lines.push(self.line("Daily cost", self.usd(snapshot.daily_cost)));

        lines.push(self.dim(&format!(
            "Updated {}",
            snapshot.updated_at.format("%Y-%m-%d %H:%M UTC")
        )));

        lines.join("\n")
    }

    fn line(&self, label: &str, value: String) -> String {
        format!("{:<18} {}", format!("{label}:"), value)
    }

    fn kwh(&self, value: Option<f64>) -> String {
        match value {
            Some(v) => format!("{v:.1} kWh"),
            None => self.missing(),
        }
    }

    fn usd(&self, value: Option<f64>) -> String {
        match value {
            Some(v) => format!("${v:.2}"),
            None => self.missing(),
        }
    }

    fn rate(&self, value: Option<f64>) -> String {
        match value {
            Some(v) => format!("${v:.4}/kWh"),
            None => self.missing(),
        }
    }

    fn period(&self, start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> String {
        match (start, end) {
            (Some(start), Some(end)) => format!(
                "{} to {}",
                start.format("%Y-%m-%d"),
                end.format("%Y-%m-%d")
            ),
            (Some(start), None) => format!("from {}", start.format("%Y-%m-%d")),
            (None, Some(end)) => format!("until {}", end.format("%Y-%m-%d")),
            (None, None) => self.missing(),
        }
    }

    fn missing(&self) -> String {
        self.dim("n/a")
    }

    // Color helpers

    fn bold(&self, text: &str) -> String {
        self.wrap(text, BOLD)
    }

    fn dim(&self, text: &str) -> String {
        self.wrap(text, DIM)
    }

    fn cyan(&self, text: &str) -> String {
        self.wrap(text, CYAN)
    }

    fn wrap(&self, text: &str, code: &str) -> String {
        if self.use_colors {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }
}
