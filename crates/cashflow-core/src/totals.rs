use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use cashflow_domain::DailyBucket;

/// Aggregates over a finished bucket sequence.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProjectionTotals {
    pub days: usize,
    pub entries: usize,
    pub total_inflow: f64,
    pub total_outflow: f64,
    pub net_change: f64,
    pub final_balance: f64,
    pub lowest_balance: f64,
    pub lowest_balance_date: Option<NaiveDate>,
}

impl ProjectionTotals {
    pub fn from_buckets(initial_balance: f64, buckets: &[DailyBucket]) -> Self {
        let mut totals = ProjectionTotals {
            days: buckets.len(),
            final_balance: initial_balance,
            lowest_balance: initial_balance,
            ..ProjectionTotals::default()
        };
        for bucket in buckets {
            totals.entries += bucket.inflows.len() + bucket.outflows.len();
            totals.total_inflow += bucket.inflow_total();
            totals.total_outflow += bucket.outflow_total();
            totals.net_change += bucket.net;
            totals.final_balance = bucket.running_balance;
            let first = totals.lowest_balance_date.is_none();
            if first || bucket.running_balance < totals.lowest_balance {
                totals.lowest_balance = bucket.running_balance;
                totals.lowest_balance_date = Some(bucket.date);
            }
        }
        totals
    }

    /// True when the balance dips below zero on any day.
    pub fn goes_negative(&self) -> bool {
        self.lowest_balance < 0.0
    }
}
