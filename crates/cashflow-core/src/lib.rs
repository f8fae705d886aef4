//! cashflow-core
//!
//! Projection logic: payment-date resolution, recurrence expansion, the daily
//! ledger builder and the comparison orchestrator.
//! Depends on cashflow-domain. No CLI, no terminal I/O, no storage interactions.

pub mod comparison;
pub mod error;
pub mod format;
pub mod ledger_builder;
pub mod predictor;
pub mod projection_service;
pub mod recurrence;
pub mod resolver;
pub mod terms;
pub mod totals;
pub mod view;

pub use comparison::*;
pub use error::ProjectionError;
pub use format::*;
pub use ledger_builder::*;
pub use predictor::*;
pub use projection_service::*;
pub use recurrence::*;
pub use resolver::*;
pub use terms::*;
pub use totals::*;
pub use view::*;
