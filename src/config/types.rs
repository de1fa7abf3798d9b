// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub app: AppConfig,
}

/// Transport configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Tokio worker threads; CPU count when unset
    #[serde(default)]
    pub workers: Option<usize>,
    /// Upper bound on one connection's lifetime, in seconds
    pub connection_timeout: u64,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `brainweb=debug,access=info`
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    pub access_log_format: String,
}

/// Application resources
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub templates_dir: String,
    pub static_dir: String,
    pub static_prefix: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            templates_dir: "templates".to_string(),
            static_dir: "static".to_string(),
            static_prefix: "/static".to_string(),
        }
    }
}
