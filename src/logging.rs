//! Diagnostic logging for the binary.
//!
//! Diagnostics go to stderr so they never mix with replies on stdout.
//! `RUST_LOG` takes precedence over the default filter.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "cllm=warn";
const VERBOSE_FILTER: &str = "cllm=debug,info";

pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        VERBOSE_FILTER
    } else {
        DEFAULT_FILTER
    }
}

/// Installs the global subscriber. Calling it twice is harmless.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
