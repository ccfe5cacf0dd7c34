//! Logging setup
//!
//! Diagnostics go to stderr through `tracing`; command results are printed
//! by the binary's `ui` module and never pass through here.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter directive for a `-v` count
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "microzoo=warn",
        1 => "microzoo=info",
        2 => "microzoo=debug",
        _ => "microzoo=trace",
    }
}

/// Install the global subscriber. `RUST_LOG` wins over `verbosity`.
///
/// A second call is a no-op.
pub fn init_cli_logger(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .try_init();
}
