use cashflow_config::Config;
use cashflow_core::{CurrencyFormatter, DateFormatter};
use chrono::NaiveDate;

/// Formatter implementations backed by the active CLI configuration.
#[derive(Debug, Clone)]
pub struct CliFormatters {
    currency: String,
    precision: usize,
}

impl CliFormatters {
    pub fn from_config(config: &Config) -> Self {
        Self {
            currency: config.currency.clone(),
            precision: usize::from(config.currency_precision),
        }
    }

    /// Amount in the configured currency.
    pub fn money(&self, amount: f64) -> String {
        self.format_amount(amount, "")
    }

    pub fn signed(&self, amount: f64) -> String {
        if amount == 0.0 {
            return self.money(0.0);
        }
        self.format_signed(amount, "")
    }
}

impl CurrencyFormatter for CliFormatters {
    fn format_amount(&self, amount: f64, currency: &str) -> String {
        let code = if currency.is_empty() {
            self.currency.as_str()
        } else {
            currency
        };
        format!("{amount:.prec$} {code}", prec = self.precision)
    }
}

impl DateFormatter for CliFormatters {
    fn format_date(&self, date: NaiveDate) -> String {
        date.format("%a %Y-%m-%d").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uses_configured_currency_and_precision() {
        let mut config = Config::default();
        config.currency = "EUR".into();
        config.currency_precision = 1;
        let formatters = CliFormatters::from_config(&config);

        assert_eq!(formatters.money(1234.56), "1234.6 EUR");
        assert_eq!(formatters.signed(-20.0), "-20.0 EUR");
        assert_eq!(formatters.signed(0.0), "0.0 EUR");
        assert_eq!(formatters.format_amount(3.0, "USD"), "3.0 USD");
    }

    #[test]
    fn dates_include_weekday() {
        let formatters = CliFormatters::from_config(&Config::default());
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(formatters.format_date(date), "Fri 2024-03-01");
    }
}
