//! Seam for the external payment-date predictor.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};

use cashflow_domain::Invoice;

pub const DEFAULT_HEURISTIC_DELAY_DAYS: i64 = 5;

/// Supplies a predicted payment date for an invoice, or nothing.
///
/// Implementations must be pure lookups: all model inference happens before the projection runs.
pub trait PaymentPredictor {
    fn predict(&self, invoice: &Invoice) -> Option<NaiveDate>;
}

/// Predictor used when no prediction source is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPredictor;

impl PaymentPredictor for NoPredictor {
    fn predict(&self, _invoice: &Invoice) -> Option<NaiveDate> {
        None
    }
}

/// Batch predictions computed ahead of time, keyed by invoice id.
#[derive(Debug, Clone, Default)]
pub struct PredictionTable {
    dates: BTreeMap<String, NaiveDate>,
}

impl PredictionTable {
    pub fn new(dates: BTreeMap<String, NaiveDate>) -> Self {
        Self { dates }
    }

    pub fn insert(&mut self, invoice_id: impl Into<String>, date: NaiveDate) {
        self.dates.insert(invoice_id.into(), date);
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

impl PaymentPredictor for PredictionTable {
    fn predict(&self, invoice: &Invoice) -> Option<NaiveDate> {
        self.dates.get(&invoice.id).copied()
    }
}

/// Assumes customers pay a fixed number of days after the due date.
#[derive(Debug, Clone, Copy)]
pub struct LatePaymentHeuristic {
    pub delay_days: i64,
}

impl Default for LatePaymentHeuristic {
    fn default() -> Self {
        Self {
            delay_days: DEFAULT_HEURISTIC_DELAY_DAYS,
        }
    }
}

impl PaymentPredictor for LatePaymentHeuristic {
    fn predict(&self, invoice: &Invoice) -> Option<NaiveDate> {
        let delay = Duration::try_days(self.delay_days)?;
        invoice.due_date?.checked_add_signed(delay)
    }
}

/// Tries the table first, then the heuristic.
#[derive(Debug, Clone, Default)]
pub struct TableWithHeuristic {
    pub table: PredictionTable,
    pub heuristic: LatePaymentHeuristic,
}

impl PaymentPredictor for TableWithHeuristic {
    fn predict(&self, invoice: &Invoice) -> Option<NaiveDate> {
        self.table
            .predict(invoice)
            .or_else(|| self.heuristic.predict(invoice))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn table_looks_up_by_invoice_id() {
        let mut table = PredictionTable::default();
        table.insert("A", date(2024, 4, 2));
        let hit = Invoice::new("A", date(2024, 3, 1), 10.0);
        let miss = Invoice::new("B", date(2024, 3, 1), 10.0);
        assert_eq!(table.predict(&hit), Some(date(2024, 4, 2)));
        assert_eq!(table.predict(&miss), None);
    }

    #[test]
    fn heuristic_adds_delay_to_due_date() {
        let invoice = Invoice::new("A", date(2024, 2, 27), 10.0);
        assert_eq!(
            LatePaymentHeuristic::default().predict(&invoice),
            Some(date(2024, 3, 3))
        );
    }

    #[test]
    fn combined_predictor_prefers_table() {
        let mut combined = TableWithHeuristic::default();
        combined.table.insert("A", date(2024, 5, 1));
        let listed = Invoice::new("A", date(2024, 3, 1), 10.0);
        let unlisted = Invoice::new("B", date(2024, 3, 1), 10.0);
        assert_eq!(combined.predict(&listed), Some(date(2024, 5, 1)));
        assert_eq!(combined.predict(&unlisted), Some(date(2024, 3, 6)));
    }
}
