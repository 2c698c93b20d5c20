//! Diagnostics on stderr.
//!
//! stdout carries the SQL script, so every log line goes to stderr.
//! `RUST_LOG` overrides the default filter.

use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber. `verbose` lowers the default level to debug.
pub fn init(verbose: bool) {
    let default = if verbose { "railsql=debug" } else { "railsql=info" };
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // A second call (e.g. from tests) keeps the first subscriber.
    let _ = fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
