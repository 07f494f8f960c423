//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Values are read with the `PICONTROL`
//! prefix and nested keys use double underscores as separators, e.g.
//! `PICONTROL__SERVER__PORT=3000` -> `server.port = 3000`.

mod error;
mod heartbeat;
mod modules;
mod server;

pub use error::{ConfigError, ValidationError};
pub use heartbeat::HeartbeatConfig;
pub use modules::ModulesConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment, log filter)
    #[serde(default)]
    pub server: ServerConfig,

    /// Module source configuration (where modules are discovered)
    #[serde(default)]
    pub modules: ModulesConfig,

    /// Heartbeat scheduler configuration (broadcast interval)
    #[serde(default)]
    pub heartbeat: HeartbeatConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Loads `.env` if present (development), then reads variables with the
    /// `PICONTROL` prefix into the typed sections.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into the expected
    /// types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("PICONTROL")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.modules.validate()?;
        self.heartbeat.validate()?;
        Ok(())
    }
}
