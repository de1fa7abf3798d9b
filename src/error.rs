//! Error types
//!
//! Setup-time failures (route registration, templates, configuration, binding) are
//! [`Error`] values. Failures raised by user handlers are [`HandlerError`]s and travel
//! through the exception boundary instead.

use thiserror::Error;

/// Error raised by a route handler while populating a response.
///
/// Any error type converts into it with `?`, so handlers can mix serde, io and
/// their own errors freely.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Result returned by route handlers.
pub type HandlerResult = Result<(), HandlerError>;

/// Framework error
#[derive(Debug, Error)]
pub enum Error {
    /// A route with the same raw pattern is already registered
    #[error("route already exists: {0}")]
    DuplicateRoute(String),

    /// Route pattern could not be compiled
    #[error("invalid route pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn invalid_pattern(pattern: &str, reason: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
