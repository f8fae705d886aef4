//! Presentation seams shared by renderers of projection output.

use chrono::NaiveDate;

/// Formats money for calendar cells.
pub trait CurrencyFormatter: Send + Sync {
    fn format_amount(&self, amount: f64, currency: &str) -> String;

    /// Like [`format_amount`](Self::format_amount) but always shows the sign, for net columns.
    fn format_signed(&self, amount: f64, currency: &str) -> String {
        let body = self.format_amount(amount.abs(), currency);
        if amount < 0.0 {
            format!("-{body}")
        } else {
            format!("+{body}")
        }
    }
}

/// Formats calendar days.
pub trait DateFormatter: Send + Sync {
    fn format_date(&self, date: NaiveDate) -> String;
}
