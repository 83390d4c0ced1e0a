#![forbid(unsafe_code)]

//! Log filter selection and subscriber setup for the playground.
//!
//! The filter comes from `PB_LOG`, then `RUST_LOG`, then [`DEFAULT_FILTER`].
//! Blank values are ignored so `PB_LOG=` falls through to the next source.

use std::env;

use tracing_subscriber::EnvFilter;

/// Filter used when neither environment variable is set.
pub const DEFAULT_FILTER: &str = "info";

/// Install a compact stderr subscriber using the filter from the environment.
pub fn init() {
    let pb_log = env::var("PB_LOG").ok();
    let rust_log = env::var("RUST_LOG").ok();
    let directives = filter_from(pb_log.as_deref(), rust_log.as_deref());
    let filter = EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

fn filter_from<'a>(pb_log: Option<&'a str>, rust_log: Option<&'a str>) -> &'a str {
    pb_log
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .or_else(|| rust_log.map(str::trim).filter(|s| !s.is_empty()))
        .unwrap_or(DEFAULT_FILTER)
}
