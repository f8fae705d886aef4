//! Cash Flow Calendar projects expected cash movements onto a daily calendar
//! and compares two periods side by side.
//!
//! The projection engine lives in the `cashflow-*` workspace crates; this crate
//! wires them into the `cashflow_cli` shell.

pub mod cli;
pub mod errors;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup debug log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::debug!("cashflow calendar tracing initialized");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_is_idempotent() {
        super::init();
        super::init();
    }
}
