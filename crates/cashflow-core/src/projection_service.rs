//! Single-window projection over a snapshot.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use cashflow_domain::{
    Bill, DailyBucket, DateWindow, FlowCategory, FlowEntry, OverduePolicy, ProjectionSnapshot,
};

use crate::{
    DailyLedgerBuilder, PaymentDateResolver, PaymentPredictor, ProjectionError, ProjectionTotals,
    RecurrenceExpander, ResolvedPayment, DEFAULT_MAX_WINDOW_DAYS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectionOptions {
    pub max_window_days: i64,
    pub overdue_policy: OverduePolicy,
}

impl Default for ProjectionOptions {
    fn default() -> Self {
        Self {
            max_window_days: DEFAULT_MAX_WINDOW_DAYS,
            overdue_policy: OverduePolicy::default(),
        }
    }
}

/// Result of projecting one window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Projection {
    pub window: DateWindow,
    pub initial_balance: f64,
    pub buckets: Vec<DailyBucket>,
    pub totals: ProjectionTotals,
    /// Invoices that landed in this window, with the signal that placed them.
    pub resolutions: Vec<ResolvedPayment>,
}

impl Projection {
    pub fn final_balance(&self) -> f64 {
        self.totals.final_balance
    }

    pub fn bucket(&self, date: NaiveDate) -> Option<&DailyBucket> {
        if !self.window.contains(date) {
            return None;
        }
        let offset = usize::try_from((date - self.window.start).num_days()).ok()?;
        self.buckets.get(offset)
    }
}

/// An invoice payment already placed on a day of some window.
pub(crate) type Placed = (ResolvedPayment, FlowEntry);

#[derive(Debug, Clone, Default)]
pub struct ProjectionService {
    options: ProjectionOptions,
    ledger: DailyLedgerBuilder,
}

impl ProjectionService {
    pub fn new(options: ProjectionOptions) -> Self {
        Self {
            options,
            ledger: DailyLedgerBuilder::new(options.max_window_days),
        }
    }

    pub fn options(&self) -> ProjectionOptions {
        self.options
    }

    /// Projects `snapshot` over `window`, starting from `initial_balance`.
    pub fn project(
        &self,
        snapshot: &ProjectionSnapshot,
        predictor: &dyn PaymentPredictor,
        window: DateWindow,
        initial_balance: f64,
    ) -> Result<Projection, ProjectionError> {
        self.validate(initial_balance, window)?;
        let payments = self.resolve(snapshot, predictor)?;
        let bills = Self::bill_entries(&snapshot.bills)?;

        let placed = payments
            .into_iter()
            .filter_map(|payment| {
                let entry = self.place_invoice(&payment, window)?;
                Some((payment, entry))
            })
            .collect();
        let bills = bills
            .into_iter()
            .filter(|bill| window.contains(bill.date))
            .collect();

        self.assemble(snapshot, initial_balance, window, placed, bills)
    }

    pub fn validate(
        &self,
        initial_balance: f64,
        window: DateWindow,
    ) -> Result<(), ProjectionError> {
        self.ledger.validate(initial_balance, window)
    }

    pub(crate) fn resolve(
        &self,
        snapshot: &ProjectionSnapshot,
        predictor: &dyn PaymentPredictor,
    ) -> Result<Vec<ResolvedPayment>, ProjectionError> {
        PaymentDateResolver::resolve_all(&snapshot.invoices, &snapshot.metadata, predictor)
    }

    /// Where a resolved payment lands in `window`, if anywhere.
    ///
    /// Payments resolved before the window start are moved onto its first day under
    /// [`OverduePolicy::CarryForward`] and dropped under [`OverduePolicy::Exclude`].
    pub fn place_invoice(
        &self,
        payment: &ResolvedPayment,
        window: DateWindow,
    ) -> Option<FlowEntry> {
        let entry = |date| {
            FlowEntry::new(
                date,
                payment.invoice_id.clone(),
                FlowCategory::ProjectedInflow,
                payment.description.clone(),
                payment.amount,
            )
        };
        if window.contains(payment.date) {
            return Some(entry(payment.date));
        }
        let carry = self.options.overdue_policy == OverduePolicy::CarryForward;
        if carry && payment.date < window.start {
            debug!(
                invoice = %payment.invoice_id,
                resolved = %payment.date,
                carried_to = %window.start,
                "overdue invoice carried forward"
            );
            let mut carried = entry(window.start);
            carried.carried_forward = true;
            return Some(carried);
        }
        None
    }

    /// Outflow entries for every bill that has a due date.
    pub fn bill_entries(bills: &[Bill]) -> Result<Vec<FlowEntry>, ProjectionError> {
        let mut entries = Vec::with_capacity(bills.len());
        for bill in bills {
            if !bill.amount.is_finite() {
                return Err(ProjectionError::Validation(format!(
                    "bill {} has a non-finite amount",
                    bill.id
                )));
            }
            let Some(due) = bill.due_date else {
                warn!(bill = %bill.id, "bill without due date skipped");
                continue;
            };
            entries.push(FlowEntry::new(
                due,
                bill.id.clone(),
                FlowCategory::ProjectedOutflow,
                bill.label(),
                -bill.amount.abs(),
            ));
        }
        Ok(entries)
    }

    /// Builds one period from invoice and bill entries already attributed to it.
    pub(crate) fn assemble(
        &self,
        snapshot: &ProjectionSnapshot,
        initial_balance: f64,
        window: DateWindow,
        placed: Vec<Placed>,
        bills: Vec<FlowEntry>,
    ) -> Result<Projection, ProjectionError> {
        let mut flows = Vec::with_capacity(placed.len() + bills.len());
        let mut resolutions = Vec::with_capacity(placed.len());
        for (payment, entry) in placed {
            flows.push(entry);
            resolutions.push(payment);
        }
        flows.extend(bills);
        for custom in &snapshot.custom_flows {
            flows.extend(RecurrenceExpander::expand_flow(custom, window)?);
        }

        let buckets = self.ledger.build(initial_balance, window, &flows)?;
        let totals = ProjectionTotals::from_buckets(initial_balance, &buckets);
        info!(
            %window,
            days = totals.days,
            entries = totals.entries,
            invoices = resolutions.len(),
            final_balance = totals.final_balance,
            "projection built"
        );

        Ok(Projection {
            window,
            initial_balance,
            buckets,
            totals,
            resolutions,
        })
    }
}
