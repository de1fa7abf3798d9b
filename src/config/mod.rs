// Configuration module entry point
// Loads layered settings: defaults, optional config file, environment overrides

mod types;

use std::net::SocketAddr;

use crate::error::{Error, Result};

pub use types::{AppConfig, Config, LoggingConfig, ServerConfig};

/// Config file looked up when no path is given (any extension `config` supports)
pub const DEFAULT_CONFIG_FILE: &str = "brainweb";

/// Prefix of environment overrides, e.g. `BRAINWEB_SERVER__PORT=9000`
pub const ENV_PREFIX: &str = "BRAINWEB";

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load configuration from specified file path (extension optional)
    pub fn load_from(config_path: &str) -> Result<Self> {
        let settings = Self::defaults()?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        let app = AppConfig::default();
        Ok(config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.connection_timeout", 30)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("app.templates_dir", app.templates_dir)?
            .set_default("app.static_dir", app.static_dir)?
            .set_default("app.static_prefix", app.static_prefix)?)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| Error::InvalidAddress(format!("{}:{} ({e})", self.server.host, self.server.port)))
    }
}
