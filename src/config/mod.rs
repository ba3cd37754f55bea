//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `CARD_UNLOCK` prefix and nested values use double underscores as separators.
//! The conventional `PORT` variable, when set, overrides `server.port`.
//!
//! # Example
//!
//! ```no_run
//! use card_unlock::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {}", config.server.bind_address());
//! ```

mod error;
mod ledger;
mod payment;
mod server;

pub use error::{ConfigError, ValidationError};
pub use ledger::{LedgerBackend, LedgerConfig};
pub use payment::PaymentConfig;
pub use server::{Environment, ServerConfig, DEFAULT_PORT, MAX_REQUEST_TIMEOUT_SECS};

use serde::Deserialize;

/// Environment variable prefix for all settings.
pub const ENV_PREFIX: &str = "CARD_UNLOCK";

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Payment configuration (Stripe)
    pub payment: PaymentConfig,

    /// Unlock ledger backend
    #[serde(default)]
    pub ledger: LedgerConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `CARD_UNLOCK` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Applies `PORT` over `server.port` if present
    /// 5. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `CARD_UNLOCK__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `CARD_UNLOCK__PAYMENT__PRICE_ID=price_...` -> `payment.price_id = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Required environment variables are missing
    /// - Values cannot be parsed into expected types
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let port_override = std::env::var("PORT").ok().filter(|p| !p.is_empty());

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix(ENV_PREFIX)
                    .separator("__"),
            )
            .set_override_option("server.port", port_override)?
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// Performs semantic validation of configuration:
    /// - Port and timeout ranges
    /// - Required Stripe key prefixes and redirect URLs
    /// - Ledger backend requirements
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.payment.validate()?;
        self.ledger.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
