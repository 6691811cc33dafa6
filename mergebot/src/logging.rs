//! Diagnostic tracing for the command core.
//!
//! # Separation of Concerns
//!
//! - **Tracing (this module)**: handler decisions via `RUST_LOG`, output to
//!   stderr. Not part of the bot's product output.
//!
//! - **Outbox (`io/review_store`)**: comments and label events a command
//!   produced. Always emitted, unaffected by `RUST_LOG`.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing subscriber for diagnostics.
///
/// Reads `RUST_LOG` env var. Defaults to `warn` if unset.
/// Output: stderr, compact format.
///
/// # Example
/// ```bash
/// RUST_LOG=mergebot=debug mergebot apply --state pr.json --caller bors --author me ping
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
