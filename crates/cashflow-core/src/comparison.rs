//! Side-by-side projection of two independent periods.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use cashflow_domain::{DateWindow, ProjectionSnapshot};

use crate::projection_service::Placed;
use crate::{PaymentPredictor, Projection, ProjectionError, ProjectionOptions, ProjectionService};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ComparisonPeriod {
    pub initial_balance: f64,
    pub window: DateWindow,
}

impl ComparisonPeriod {
    pub fn new(initial_balance: f64, window: DateWindow) -> Self {
        Self {
            initial_balance,
            window,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComparisonReport {
    pub period_a: Projection,
    pub period_b: Projection,
}

impl ComparisonReport {
    /// Final balance of B minus final balance of A.
    pub fn final_balance_delta(&self) -> f64 {
        self.period_b.final_balance() - self.period_a.final_balance()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ComparisonService {
    projection: ProjectionService,
}

impl ComparisonService {
    pub fn new(options: ProjectionOptions) -> Self {
        Self {
            projection: ProjectionService::new(options),
        }
    }

    /// Projects both periods against the same snapshot.
    ///
    /// Each invoice and bill lands in at most one period, chosen by its date: the
    /// period whose window contains it (A when both do). An invoice dated before both
    /// windows is carried into the earlier-starting one under
    /// [`OverduePolicy::CarryForward`](cashflow_domain::OverduePolicy::CarryForward).
    /// Custom flows are expanded separately for each window.
    pub fn compare(
        &self,
        snapshot: &ProjectionSnapshot,
        predictor: &dyn PaymentPredictor,
        a: ComparisonPeriod,
        b: ComparisonPeriod,
    ) -> Result<ComparisonReport, ProjectionError> {
        self.projection.validate(a.initial_balance, a.window)?;
        self.projection.validate(b.initial_balance, b.window)?;

        let payments = self.projection.resolve(snapshot, predictor)?;
        let mut placed_a: Vec<Placed> = Vec::new();
        let mut placed_b: Vec<Placed> = Vec::new();
        for payment in payments {
            let target = Period::for_date(payment.date, a.window, b.window);
            let placed = target.and_then(|period| {
                let window = period.pick(a.window, b.window);
                let entry = self.projection.place_invoice(&payment, window)?;
                Some((period, entry))
            });
            match placed {
                Some((Period::A, entry)) => placed_a.push((payment, entry)),
                Some((Period::B, entry)) => placed_b.push((payment, entry)),
                None => debug!(
                    invoice = %payment.invoice_id,
                    date = %payment.date,
                    "invoice outside both periods"
                ),
            }
        }

        let mut bills_a = Vec::new();
        let mut bills_b = Vec::new();
        for bill in ProjectionService::bill_entries(&snapshot.bills)? {
            if a.window.contains(bill.date) {
                bills_a.push(bill);
            } else if b.window.contains(bill.date) {
                bills_b.push(bill);
            }
        }

        let service = &self.projection;
        Ok(ComparisonReport {
            period_a: service.assemble(snapshot, a.initial_balance, a.window, placed_a, bills_a)?,
            period_b: service.assemble(snapshot, b.initial_balance, b.window, placed_b, bills_b)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Period {
    A,
    B,
}

impl Period {
    /// Period an invoice dated `date` belongs to, if any.
    ///
    /// Containment decides first. Otherwise the date must precede a window to be carried
    /// into it, and the earlier-starting window takes it.
    fn for_date(date: NaiveDate, a: DateWindow, b: DateWindow) -> Option<Period> {
        if a.contains(date) {
            return Some(Period::A);
        }
        if b.contains(date) {
            return Some(Period::B);
        }
        match (date < a.start, date < b.start) {
            (true, true) if b.start < a.start => Some(Period::B),
            (true, _) => Some(Period::A),
            (false, true) => Some(Period::B),
            (false, false) => None,
        }
    }

    fn pick(self, a: DateWindow, b: DateWindow) -> DateWindow {
        match self {
            Period::A => a,
            Period::B => b,
        }
    }
}
