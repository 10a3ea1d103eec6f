//! Tracing subscriber setup.
//!
//! Logging is off unless `MUNG_LOG` is set. Its value is an `EnvFilter`
//! directive list, e.g. `MUNG_LOG=mung_cache=debug,mung_eval=trace`.
//! Output is an indented span tree on stderr.

use std::sync::Once;

use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;
use tracing_tree::HierarchicalLayer;

/// Environment variable holding the filter directives.
pub const LOG_ENV: &str = "MUNG_LOG";

static TRACING_INIT: Once = Once::new();

/// Install the global subscriber. Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let Ok(directives) = std::env::var(LOG_ENV) else {
            return;
        };
        let layer = HierarchicalLayer::new(2)
            .with_targets(true)
            .with_bracketed_fields(true);
        let installed = tracing_subscriber::registry()
            .with(EnvFilter::new(directives))
            .with(layer)
            .try_init();
        if installed.is_err() {
            tracing::warn!("a global tracing subscriber is already installed");
        }
    });
}
