//! Diagnostic logging on stderr via `tracing`
//!
//! User-facing progress goes through [`crate::traits::Output`]; this is for
//! per-pass and per-line diagnostics. `RUST_LOG` takes precedence over the
//! level derived from `-v` flags and the configuration file.

use tracing_subscriber::EnvFilter;

const DEFAULT_LEVEL: &str = "warn";

/// Level name for a `-v` count, falling back to the configured level
pub fn level_for(verbosity: u8, configured: Option<&str>) -> String {
    match verbosity {
        0 => configured.unwrap_or(DEFAULT_LEVEL).to_string(),
        1 => "info".to_string(),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

pub fn init(verbosity: u8, configured: Option<&str>) {
    let level = level_for(verbosity, configured);
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(format!("tfclean={}", level))
            .unwrap_or_else(|_| EnvFilter::new(format!("tfclean={}", DEFAULT_LEVEL))),
    };

    // A subscriber may already be installed (tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
