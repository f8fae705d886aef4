//! Manually entered cash flows, their recurrence rules, and payable bills.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FlowType {
    Inflow,
    Outflow,
}

impl FlowType {
    /// Applies the direction of the flow to a magnitude.
    pub fn signed(self, amount: f64) -> f64 {
        match self {
            FlowType::Inflow => amount.abs(),
            FlowType::Outflow => -amount.abs(),
        }
    }
}

impl fmt::Display for FlowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FlowType::Inflow => "inflow",
            FlowType::Outflow => "outflow",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceKind {
    Weekly,
    Monthly,
    CustomDays,
}

impl fmt::Display for RecurrenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RecurrenceKind::Weekly => "weekly",
            RecurrenceKind::Monthly => "monthly",
            RecurrenceKind::CustomDays => "custom_days",
        };
        f.write_str(label)
    }
}

/// Describes how a custom flow repeats.
///
/// `interval` multiplies the base step of `kind` (weeks, months or days). It is signed so
/// that a malformed rule can be reported instead of failing to load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecurrenceRule {
    #[serde(rename = "type")]
    pub kind: RecurrenceKind,
    #[serde(default = "RecurrenceRule::default_interval")]
    pub interval: i32,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

impl RecurrenceRule {
    pub fn new(kind: RecurrenceKind, start_date: NaiveDate) -> Self {
        Self {
            kind,
            interval: Self::default_interval(),
            start_date,
            end_date: None,
        }
    }

    pub fn weekly(start_date: NaiveDate) -> Self {
        Self::new(RecurrenceKind::Weekly, start_date)
    }

    pub fn monthly(start_date: NaiveDate) -> Self {
        Self::new(RecurrenceKind::Monthly, start_date)
    }

    pub fn every_days(days: i32, start_date: NaiveDate) -> Self {
        Self::new(RecurrenceKind::CustomDays, start_date).with_interval(days)
    }

    pub fn with_interval(mut self, interval: i32) -> Self {
        self.interval = interval;
        self
    }

    pub fn until(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    pub fn default_interval() -> i32 {
        1
    }

    pub fn label(&self) -> String {
        match (self.interval, self.kind) {
            (1, RecurrenceKind::Weekly) => "Weekly".into(),
            (1, RecurrenceKind::Monthly) => "Monthly".into(),
            (1, RecurrenceKind::CustomDays) => "Daily".into(),
            (n, RecurrenceKind::Weekly) => format!("Every {n} weeks"),
            (n, RecurrenceKind::Monthly) => format!("Every {n} months"),
            (n, RecurrenceKind::CustomDays) => format!("Every {n} days"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FlowSchedule {
    OneTime { date: NaiveDate },
    Recurring { rule: RecurrenceRule },
}

/// A manually entered inflow or outflow not derived from an invoice.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomCashFlow {
    pub id: Uuid,
    pub flow_type: FlowType,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub schedule: FlowSchedule,
}

impl CustomCashFlow {
    pub fn one_time(flow_type: FlowType, amount: f64, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            flow_type,
            amount,
            description: None,
            schedule: FlowSchedule::OneTime { date },
        }
    }

    pub fn recurring(flow_type: FlowType, amount: f64, rule: RecurrenceRule) -> Self {
        Self {
            id: Uuid::new_v4(),
            flow_type,
            amount,
            description: None,
            schedule: FlowSchedule::Recurring { rule },
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn label(&self) -> String {
        self.description.clone().unwrap_or_else(|| match self.flow_type {
            FlowType::Inflow => "Custom Inflow".into(),
            FlowType::Outflow => "Custom Outflow".into(),
        })
    }

    pub fn rule(&self) -> Option<&RecurrenceRule> {
        match &self.schedule {
            FlowSchedule::Recurring { rule } => Some(rule),
            FlowSchedule::OneTime { .. } => None,
        }
    }
}

/// Accounts-payable bill expected to leave the bank on its due date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bill {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    pub amount: f64,
}

impl Bill {
    pub fn new(id: impl Into<String>, due_date: NaiveDate, amount: f64) -> Self {
        Self {
            id: id.into(),
            doc_number: None,
            vendor: None,
            due_date: Some(due_date),
            amount,
        }
    }

    pub fn with_vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = Some(vendor.into());
        self
    }

    pub fn label(&self) -> String {
        let number = self.doc_number.as_deref().unwrap_or(&self.id);
        match &self.vendor {
            Some(vendor) => format!("Bill #{number} - {vendor}"),
            None => format!("Bill #{number}"),
        }
    }
}
