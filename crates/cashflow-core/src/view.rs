//! Display filtering applied after a projection is built.
//!
//! Hiding a category removes its entries from the rendered rows only. Net and
//! running balance are copied from the computed buckets untouched.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use cashflow_domain::{DailyBucket, FlowCategory, FlowEntry};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FlowVisibility {
    pub projected_inflows: bool,
    pub projected_outflows: bool,
    pub custom_inflows: bool,
    pub custom_outflows: bool,
}

impl Default for FlowVisibility {
    fn default() -> Self {
        Self {
            projected_inflows: true,
            projected_outflows: true,
            custom_inflows: true,
            custom_outflows: true,
        }
    }
}

impl FlowVisibility {
    pub fn shows(&self, category: FlowCategory) -> bool {
        match category {
            FlowCategory::ProjectedInflow => self.projected_inflows,
            FlowCategory::ProjectedOutflow => self.projected_outflows,
            FlowCategory::CustomInflow => self.custom_inflows,
            FlowCategory::CustomOutflow => self.custom_outflows,
        }
    }

    pub fn set(&mut self, category: FlowCategory, visible: bool) {
        let slot = match category {
            FlowCategory::ProjectedInflow => &mut self.projected_inflows,
            FlowCategory::ProjectedOutflow => &mut self.projected_outflows,
            FlowCategory::CustomInflow => &mut self.custom_inflows,
            FlowCategory::CustomOutflow => &mut self.custom_outflows,
        };
        *slot = visible;
    }

    pub fn hidden(&self) -> Vec<FlowCategory> {
        FlowCategory::ALL
            .into_iter()
            .filter(|category| !self.shows(*category))
            .collect()
    }
}

/// One displayed calendar day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarRow {
    pub date: NaiveDate,
    pub opening_balance: f64,
    pub inflows: Vec<FlowEntry>,
    pub outflows: Vec<FlowEntry>,
    pub net: f64,
    pub running_balance: f64,
}

pub struct CalendarView;

impl CalendarView {
    pub fn render(buckets: &[DailyBucket], visibility: &FlowVisibility) -> Vec<CalendarRow> {
        let visible = |entries: &[FlowEntry]| -> Vec<FlowEntry> {
            entries
                .iter()
                .filter(|entry| visibility.shows(entry.category))
                .cloned()
                .collect()
        };
        buckets
            .iter()
            .map(|bucket| CalendarRow {
                date: bucket.date,
                opening_balance: bucket.opening_balance,
                inflows: visible(&bucket.inflows),
                outflows: visible(&bucket.outflows),
                net: bucket.net,
                running_balance: bucket.running_balance,
            })
            .collect()
    }
}
