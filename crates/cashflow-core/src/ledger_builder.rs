//! Per-day ledger with a running balance.

use tracing::trace;

use cashflow_domain::{DailyBucket, DateWindow, FlowEntry, WINDOW_DAYS_LIMIT};

use crate::ProjectionError;

/// Three years plus a leap day.
pub const DEFAULT_MAX_WINDOW_DAYS: i64 = 1096;

/// Merges dated flows into one bucket per calendar day of a window.
#[derive(Debug, Clone, Copy)]
pub struct DailyLedgerBuilder {
    max_window_days: i64,
}

impl Default for DailyLedgerBuilder {
    fn default() -> Self {
        Self {
            max_window_days: DEFAULT_MAX_WINDOW_DAYS,
        }
    }
}

impl DailyLedgerBuilder {
    /// `max_window_days` is clamped to `1..=WINDOW_DAYS_LIMIT`.
    pub fn new(max_window_days: i64) -> Self {
        Self {
            max_window_days: max_window_days.clamp(1, WINDOW_DAYS_LIMIT),
        }
    }

    pub fn max_window_days(&self) -> i64 {
        self.max_window_days
    }

    /// Checks the request parameters shared by every projection entry point.
    pub fn validate(
        &self,
        initial_balance: f64,
        window: DateWindow,
    ) -> Result<(), ProjectionError> {
        if window.start > window.end {
            return Err(ProjectionError::Validation(format!(
                "window start {} is after window end {}",
                window.start, window.end
            )));
        }
        if window.len_days() > self.max_window_days {
            return Err(ProjectionError::Validation(format!(
                "window {window} spans {} days, the maximum is {}",
                window.len_days(),
                self.max_window_days
            )));
        }
        if !initial_balance.is_finite() {
            return Err(ProjectionError::Validation(format!(
                "initial balance must be a finite number, got {initial_balance}"
            )));
        }
        Ok(())
    }

    /// Builds the complete, chronologically ordered bucket sequence for `window`.
    ///
    /// Every day of the window gets a bucket, including days without flows. Flows dated
    /// outside the window are ignored.
    pub fn build(
        &self,
        initial_balance: f64,
        window: DateWindow,
        flows: &[FlowEntry],
    ) -> Result<Vec<DailyBucket>, ProjectionError> {
        self.validate(initial_balance, window)?;
        if let Some(flow) = flows.iter().find(|flow| !flow.amount.is_finite()) {
            return Err(ProjectionError::Validation(format!(
                "flow `{}` from {} has a non-finite amount",
                flow.description, flow.source_id
            )));
        }

        let mut buckets: Vec<DailyBucket> = window.days().map(DailyBucket::empty).collect();
        for flow in flows {
            if !window.contains(flow.date) {
                trace!(source = %flow.source_id, date = %flow.date, "flow outside window");
                continue;
            }
            let offset = (flow.date - window.start).num_days() as usize;
            let bucket = &mut buckets[offset];
            bucket.net += flow.amount;
            if flow.is_inflow() {
                bucket.inflows.push(flow.clone());
            } else {
                bucket.outflows.push(flow.clone());
            }
        }

        let mut running = initial_balance;
        for bucket in &mut buckets {
            bucket.opening_balance = running;
            running += bucket.net;
            bucket.running_balance = running;
        }

        Ok(buckets)
    }
}
