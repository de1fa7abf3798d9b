//! Logger module
//!
//! `tracing` subscriber setup plus the access-log line formatter.

mod format;

pub use format::AccessLogEntry;

use std::net::SocketAddr;

use tracing_subscriber::EnvFilter;

use crate::config::{Config, LoggingConfig};

/// Target used for access log lines, so they can be filtered separately
pub const ACCESS_TARGET: &str = "access";

/// Install the global subscriber
///
/// `RUST_LOG` takes precedence over `logging.level`. Calling this twice is harmless.
pub fn init(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_err()
    {
        tracing::debug!("tracing subscriber already installed");
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    tracing::info!(
        %addr,
        level = %config.logging.level,
        workers = ?config.server.workers,
        access_log = config.logging.access_log,
        templates = %config.app.templates_dir,
        static_dir = %config.app.static_dir,
        static_prefix = %config.app.static_prefix,
        "server started, listening on http://{addr}"
    );
}

/// Emit a formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    tracing::info!(target: ACCESS_TARGET, "{}", entry.format(format));
}
