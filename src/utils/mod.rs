pub mod build_info;

use std::sync::Once;

use tracing_subscriber::{filter::Directive, fmt, EnvFilter};

static TRACING_INIT: Once = Once::new();

/// Info level for this crate and every workspace crate it drives.
pub(crate) const DEFAULT_DIRECTIVES: [&str; 5] = [
    "cashflow_calendar=info",
    "cashflow_core=info",
    "cashflow_domain=info",
    "cashflow_config=info",
    "cashflow_storage_json=info",
];

/// Installs the global subscriber. `RUST_LOG` directives are added on top of the defaults.
///
/// Logs go to stderr so script-mode stdout stays clean.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let filter = default_filter(EnvFilter::from_default_env());
        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}

pub(crate) fn default_filter(mut filter: EnvFilter) -> EnvFilter {
    for raw in DEFAULT_DIRECTIVES {
        if let Ok(directive) = raw.parse::<Directive>() {
            filter = filter.add_directive(directive);
        }
    }
    filter
}
