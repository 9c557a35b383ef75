//! Tracing setup shared by the CLI and the stdio server.

use std::io;
use std::sync::OnceLock;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

static TRACING_INIT: OnceLock<()> = OnceLock::new();

pub const LOG_FORMAT_ENV: &str = "DOCUMENT_TOOLS_LOG_FORMAT";

/// Installs the process-wide subscriber on first call.
///
/// Logs always go to stderr; stdout carries tool output and NDJSON responses.
/// Filter comes from `RUST_LOG` (default `info`), and
/// `DOCUMENT_TOOLS_LOG_FORMAT=json` switches to JSON lines.
pub fn init_tracing() {
    TRACING_INIT.get_or_init(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let json = std::env::var(LOG_FORMAT_ENV)
            .map(|value| value.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let result = if json {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(io::stderr))
                .try_init()
        } else {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().compact().with_writer(io::stderr))
                .try_init()
        };

        if let Err(err) = result {
            eprintln!("tracing init skipped: {err}");
        }
    });
}
