use std::io;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global subscriber. `RUST_LOG` overrides the level picked
/// from `verbose`. Output goes to stderr so stdout only carries results.
pub fn configure_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("langstore={}", level)));

    let console_layer = fmt::layer()
        .compact()
        .with_target(verbose)
        .with_writer(io::stderr);

    // A subscriber may already be set when running under a test harness
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .try_init();
}
