//! Expected payment date resolution for open invoices.
//!
//! Each signal is a tier function returning an optional date. Tiers are tried
//! in priority order and the first one that produces a date wins.

use std::collections::{HashMap, HashSet};
use std::fmt;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use cashflow_domain::{Invoice, InvoiceMetadata};

use crate::{parse_terms_days, PaymentPredictor, ProjectionError};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
/// Which signal produced the resolved date.
pub enum ResolutionSource {
    ManualOverride,
    PortalSubmission,
    Predictor,
    DueDate,
}

impl fmt::Display for ResolutionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ResolutionSource::ManualOverride => "manual override",
            ResolutionSource::PortalSubmission => "portal submission + terms",
            ResolutionSource::Predictor => "predictor",
            ResolutionSource::DueDate => "due date",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "reason", rename_all = "snake_case")]
/// A tier that had data but could not produce a date, so resolution moved on.
pub enum ResolutionFallback {
    UnparseableTerms { terms: String },
    MissingTerms,
    TermsOutOfRange { days: u32 },
    NoPrediction,
}

impl fmt::Display for ResolutionFallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionFallback::UnparseableTerms { terms } => {
                write!(f, "terms `{terms}` not understood")
            }
            ResolutionFallback::MissingTerms => f.write_str("no payment terms"),
            ResolutionFallback::TermsOutOfRange { days } => {
                write!(f, "{days} day terms run past the last representable date")
            }
            ResolutionFallback::NoPrediction => f.write_str("no predicted date"),
        }
    }
}

/// Outcome of the cascade for one invoice.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResolvedPayment {
    pub invoice_id: String,
    pub description: String,
    pub amount: f64,
    pub date: NaiveDate,
    pub source: ResolutionSource,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fallbacks: Vec<ResolutionFallback>,
}

/// Signals available for one invoice. `terms_days` is the already-parsed payment term.
#[derive(Debug, Clone, Copy)]
pub struct PaymentSignals<'a> {
    pub invoice: &'a Invoice,
    pub metadata: Option<&'a InvoiceMetadata>,
    pub predicted: Option<NaiveDate>,
    pub terms_days: Option<u32>,
}

impl<'a> PaymentSignals<'a> {
    pub fn new(invoice: &'a Invoice) -> Self {
        Self {
            invoice,
            metadata: None,
            predicted: None,
            terms_days: invoice.terms.as_deref().and_then(parse_terms_days),
        }
    }

    pub fn with_metadata(mut self, metadata: Option<&'a InvoiceMetadata>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_prediction(mut self, predicted: Option<NaiveDate>) -> Self {
        self.predicted = predicted;
        self
    }

    pub fn with_terms_days(mut self, terms_days: Option<u32>) -> Self {
        self.terms_days = terms_days;
        self
    }
}

type Tier = fn(&PaymentSignals<'_>, &mut Vec<ResolutionFallback>) -> Option<NaiveDate>;

const CASCADE: [(ResolutionSource, Tier); 4] = [
    (ResolutionSource::ManualOverride, manual_override),
    (ResolutionSource::PortalSubmission, portal_submission),
    (ResolutionSource::Predictor, predicted),
    (ResolutionSource::DueDate, due_date),
];

fn manual_override(
    signals: &PaymentSignals<'_>,
    _: &mut Vec<ResolutionFallback>,
) -> Option<NaiveDate> {
    signals.metadata?.manual_override_pay_date
}

fn portal_submission(
    signals: &PaymentSignals<'_>,
    fallbacks: &mut Vec<ResolutionFallback>,
) -> Option<NaiveDate> {
    let submitted = signals.metadata?.portal_submission_date?;
    let Some(days) = signals.terms_days else {
        let fallback = match signals.invoice.terms.as_deref() {
            Some(terms) if !terms.trim().is_empty() => ResolutionFallback::UnparseableTerms {
                terms: terms.to_string(),
            },
            _ => ResolutionFallback::MissingTerms,
        };
        warn!(
            invoice = %signals.invoice.id,
            %submitted,
            reason = %fallback,
            "portal submission date ignored, falling back to next signal"
        );
        fallbacks.push(fallback);
        return None;
    };
    let paid_on = submitted.checked_add_signed(Duration::days(i64::from(days)));
    if paid_on.is_none() {
        let fallback = ResolutionFallback::TermsOutOfRange { days };
        warn!(
            invoice = %signals.invoice.id,
            %submitted,
            reason = %fallback,
            "portal submission date ignored, falling back to next signal"
        );
        fallbacks.push(fallback);
    }
    paid_on
}

fn predicted(
    signals: &PaymentSignals<'_>,
    fallbacks: &mut Vec<ResolutionFallback>,
) -> Option<NaiveDate> {
    if signals.predicted.is_none() {
        debug!(invoice = %signals.invoice.id, "no predicted date, falling back to due date");
        fallbacks.push(ResolutionFallback::NoPrediction);
    }
    signals.predicted
}

fn due_date(signals: &PaymentSignals<'_>, _: &mut Vec<ResolutionFallback>) -> Option<NaiveDate> {
    signals.invoice.due_date
}

pub struct PaymentDateResolver;

impl PaymentDateResolver {
    /// Runs the cascade for a single open invoice.
    pub fn resolve(signals: &PaymentSignals<'_>) -> Result<ResolvedPayment, ProjectionError> {
        let invoice = signals.invoice;
        if !invoice.is_open() {
            return Err(ProjectionError::Validation(format!(
                "invoice {} is paid and cannot be projected",
                invoice.id
            )));
        }
        if invoice.due_date.is_none() {
            return Err(ProjectionError::DataIntegrity(format!(
                "open invoice {} has no due date",
                invoice.id
            )));
        }

        let mut fallbacks = Vec::new();
        for (source, tier) in CASCADE {
            if let Some(date) = tier(signals, &mut fallbacks) {
                debug!(invoice = %invoice.id, %date, %source, "resolved payment date");
                return Ok(ResolvedPayment {
                    invoice_id: invoice.id.clone(),
                    description: invoice.label(),
                    amount: invoice.balance_due,
                    date,
                    source,
                    fallbacks,
                });
            }
        }

        Err(ProjectionError::DataIntegrity(format!(
            "no payment date could be resolved for invoice {}",
            invoice.id
        )))
    }

    /// Resolves every open invoice of a snapshot.
    ///
    /// Paid invoices and invoices with no positive balance left are skipped before the cascade.
    pub fn resolve_all(
        invoices: &[Invoice],
        metadata: &[InvoiceMetadata],
        predictor: &dyn PaymentPredictor,
    ) -> Result<Vec<ResolvedPayment>, ProjectionError> {
        let metadata_by_id: HashMap<&str, &InvoiceMetadata> = metadata
            .iter()
            .map(|meta| (meta.invoice_id.as_str(), meta))
            .collect();

        let mut seen = HashSet::new();
        let mut resolved = Vec::new();
        for invoice in invoices.iter().filter(|inv| inv.is_open()) {
            if !seen.insert(invoice.id.as_str()) {
                return Err(ProjectionError::DataIntegrity(format!(
                    "open invoice {} appears more than once in the snapshot",
                    invoice.id
                )));
            }
            if !invoice.balance_due.is_finite() {
                return Err(ProjectionError::Validation(format!(
                    "invoice {} has a non-finite balance",
                    invoice.id
                )));
            }
            if invoice.balance_due <= 0.0 {
                debug!(
                    invoice = %invoice.id,
                    balance = invoice.balance_due,
                    "nothing left to collect, invoice skipped"
                );
                continue;
            }
            let signals = PaymentSignals::new(invoice)
                .with_metadata(metadata_by_id.get(invoice.id.as_str()).copied())
                .with_prediction(predictor.predict(invoice));
            resolved.push(Self::resolve(&signals)?);
        }
        Ok(resolved)
    }
}
