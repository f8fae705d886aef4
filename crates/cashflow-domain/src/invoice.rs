//! Receivable invoices and the metadata that influences their expected payment date.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    #[default]
    Open,
    Paid,
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            InvoiceStatus::Open => "open",
            InvoiceStatus::Paid => "paid",
        };
        f.write_str(label)
    }
}

/// Read-only snapshot of a receivable invoice owned by the accounting provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Invoice {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<String>,
    /// Required for open invoices; kept optional so a gap in the source data can be reported.
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub txn_date: Option<NaiveDate>,
    pub balance_due: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms: Option<String>,
    #[serde(default)]
    pub status: InvoiceStatus,
}

impl Invoice {
    pub fn new(id: impl Into<String>, due_date: NaiveDate, balance_due: f64) -> Self {
        Self {
            id: id.into(),
            doc_number: None,
            customer: None,
            due_date: Some(due_date),
            txn_date: None,
            balance_due,
            terms: None,
            status: InvoiceStatus::Open,
        }
    }

    pub fn with_terms(mut self, terms: impl Into<String>) -> Self {
        self.terms = Some(terms.into());
        self
    }

    pub fn with_customer(mut self, customer: impl Into<String>) -> Self {
        self.customer = Some(customer.into());
        self
    }

    pub fn with_doc_number(mut self, doc_number: impl Into<String>) -> Self {
        self.doc_number = Some(doc_number.into());
        self
    }

    pub fn paid(mut self) -> Self {
        self.status = InvoiceStatus::Paid;
        self
    }

    pub fn is_open(&self) -> bool {
        self.status == InvoiceStatus::Open
    }

    /// Human readable label used for calendar entries.
    pub fn label(&self) -> String {
        let number = self.doc_number.as_deref().unwrap_or(&self.id);
        match &self.customer {
            Some(customer) => format!("Invoice #{number} - {customer}"),
            None => format!("Invoice #{number}"),
        }
    }
}

/// User-maintained hints attached to an invoice.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InvoiceMetadata {
    pub invoice_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manual_override_pay_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portal_submission_date: Option<NaiveDate>,
}

impl InvoiceMetadata {
    pub fn new(invoice_id: impl Into<String>) -> Self {
        Self {
            invoice_id: invoice_id.into(),
            manual_override_pay_date: None,
            portal_submission_date: None,
        }
    }

    pub fn with_override(mut self, date: NaiveDate) -> Self {
        self.manual_override_pay_date = Some(date);
        self
    }

    pub fn with_portal_submission(mut self, date: NaiveDate) -> Self {
        self.portal_submission_date = Some(date);
        self
    }
}
