//! cashflow-domain
//!
//! Pure domain models (Invoice, CustomCashFlow, Bill, DailyBucket, etc.).
//! No I/O, no CLI, no storage. Only data types, calendar helpers and core enums.

pub mod calendar;
pub mod common;
pub mod flow;
pub mod invoice;
pub mod snapshot;

pub use calendar::*;
pub use common::*;
pub use flow::*;
pub use invoice::*;
pub use snapshot::*;
