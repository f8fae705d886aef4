//! Dated flow entries and the per-day buckets a projection is made of.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
/// Presentation category of a flow. Only renderers look at it.
pub enum FlowCategory {
    ProjectedInflow,
    ProjectedOutflow,
    CustomInflow,
    CustomOutflow,
}

impl FlowCategory {
    pub const ALL: [FlowCategory; 4] = [
        FlowCategory::ProjectedInflow,
        FlowCategory::ProjectedOutflow,
        FlowCategory::CustomInflow,
        FlowCategory::CustomOutflow,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "projected-inflows" | "projected-inflow" | "invoices" => {
                Some(FlowCategory::ProjectedInflow)
            }
            "projected-outflows" | "projected-outflow" | "bills" => {
                Some(FlowCategory::ProjectedOutflow)
            }
            "custom-inflows" | "custom-inflow" => Some(FlowCategory::CustomInflow),
            "custom-outflows" | "custom-outflow" => Some(FlowCategory::CustomOutflow),
            _ => None,
        }
    }
}

impl fmt::Display for FlowCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FlowCategory::ProjectedInflow => "projected-inflows",
            FlowCategory::ProjectedOutflow => "projected-outflows",
            FlowCategory::CustomInflow => "custom-inflows",
            FlowCategory::CustomOutflow => "custom-outflows",
        };
        f.write_str(label)
    }
}

/// One dated cash movement. `amount` is signed: positive for money in, negative for money out.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlowEntry {
    pub date: NaiveDate,
    pub source_id: String,
    pub category: FlowCategory,
    pub description: String,
    pub amount: f64,
    /// Set when an overdue invoice was moved onto the first day of the window.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub carried_forward: bool,
}

impl FlowEntry {
    pub fn new(
        date: NaiveDate,
        source_id: impl Into<String>,
        category: FlowCategory,
        description: impl Into<String>,
        amount: f64,
    ) -> Self {
        Self {
            date,
            source_id: source_id.into(),
            category,
            description: description.into(),
            amount,
            carried_forward: false,
        }
    }

    /// Sign-based, so a zero outflow (`-0.0`) stays an outflow.
    pub fn is_inflow(&self) -> bool {
        self.amount.is_sign_positive()
    }

    pub fn magnitude(&self) -> f64 {
        self.amount.abs()
    }
}

/// Cash position of a single day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyBucket {
    pub date: NaiveDate,
    pub opening_balance: f64,
    pub inflows: Vec<FlowEntry>,
    pub outflows: Vec<FlowEntry>,
    pub net: f64,
    pub running_balance: f64,
}

impl DailyBucket {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            opening_balance: 0.0,
            inflows: Vec::new(),
            outflows: Vec::new(),
            net: 0.0,
            running_balance: 0.0,
        }
    }

    pub fn inflow_total(&self) -> f64 {
        self.inflows.iter().map(FlowEntry::magnitude).sum()
    }

    pub fn outflow_total(&self) -> f64 {
        self.outflows.iter().map(FlowEntry::magnitude).sum()
    }

    pub fn is_quiet(&self) -> bool {
        self.inflows.is_empty() && self.outflows.is_empty()
    }
}
