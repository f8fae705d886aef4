//! Materialized inputs for one projection request.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Bill, CustomCashFlow, Invoice, InvoiceMetadata};

/// Everything a projection reads, fetched up front by the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProjectionSnapshot {
    #[serde(default)]
    pub initial_balance: f64,
    #[serde(default)]
    pub invoices: Vec<Invoice>,
    #[serde(default)]
    pub metadata: Vec<InvoiceMetadata>,
    /// Predicted payment dates keyed by invoice id.
    #[serde(default)]
    pub predictions: BTreeMap<String, NaiveDate>,
    #[serde(default)]
    pub custom_flows: Vec<CustomCashFlow>,
    #[serde(default)]
    pub bills: Vec<Bill>,
}

impl ProjectionSnapshot {
    pub fn new(initial_balance: f64) -> Self {
        Self {
            initial_balance,
            ..Self::default()
        }
    }

    pub fn metadata_for(&self, invoice_id: &str) -> Option<&InvoiceMetadata> {
        self.metadata
            .iter()
            .find(|meta| meta.invoice_id == invoice_id)
    }

    pub fn open_invoice_count(&self) -> usize {
        self.invoices.iter().filter(|inv| inv.is_open()).count()
    }
}
