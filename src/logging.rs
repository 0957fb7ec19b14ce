//! Diagnostic logging
//!
//! Diagnostics always go to stderr: stdout may be carrying the event stream.

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_DIRECTIVE: &str = "warn";

/// Install a stderr `tracing` subscriber filtered by `RUST_LOG`
///
/// Returns `false` if a global subscriber was already set (the existing one
/// is kept).
pub fn init() -> bool {
    init_with_default(DEFAULT_DIRECTIVE)
}

pub fn init_with_default(directive: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}
