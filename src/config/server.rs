//! HTTP listener settings: bind address, environment, log filter, timeout, CORS.

use std::time::Duration;

use serde::Deserialize;

use super::error::ValidationError;

/// Port used when neither `PORT` nor `CARD_UNLOCK__SERVER__PORT` is set.
pub const DEFAULT_PORT: u16 = 3000;

/// Upper bound accepted for `request_timeout_secs`.
pub const MAX_REQUEST_TIMEOUT_SECS: u64 = 300;

/// Listener and HTTP-layer settings. Every field has a default, so an empty
/// `server` section is valid.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    /// `EnvFilter` directive; `RUST_LOG` takes precedence.
    pub log_level: String,
    pub request_timeout_secs: u64,
    /// Comma-separated allowed origins. Unset, empty or `*` allows any origin.
    pub cors_origins: Option<String>,
}

/// Deployment environment; production switches logs to JSON.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            environment: Environment::Development,
            log_level: "info,card_unlock=debug".to_string(),
            request_timeout_secs: 30,
            cors_origins: None,
        }
    }
}

impl ServerConfig {
    /// `host:port` for the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Configured origins, trimmed, with empty entries dropped.
    pub fn cors_origins_list(&self) -> Vec<String> {
        self.cors_origins
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(String::from)
            .collect()
    }

    /// Validate server configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        if !(1..=MAX_REQUEST_TIMEOUT_SECS).contains(&self.request_timeout_secs) {
            return Err(ValidationError::InvalidTimeout);
        }
        if let Some(bad) = self.cors_origins_list().into_iter().find(|o| {
            o != "*" && !o.starts_with("http://") && !o.starts_with("https://")
        }) {
            return Err(ValidationError::InvalidCorsOrigin(bad));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_origins(origins: &str) -> ServerConfig {
        ServerConfig {
            cors_origins: Some(origins.to_string()),
            ..ServerConfig::default()
        }
    }

    #[test]
    fn defaults_listen_on_3000_and_validate() {
        let config = ServerConfig::default();

        assert_eq!(config.bind_address(), "0.0.0.0:3000");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(!config.is_production());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_section_deserializes_to_defaults() {
        let config: ServerConfig = serde_json::from_str("{}").unwrap();

        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.log_level, "info,card_unlock=debug");
        assert!(config.cors_origins.is_none());
    }

    #[test]
    fn production_environment_is_detected() {
        let config: ServerConfig = serde_json::from_str(r#"{"environment":"production"}"#).unwrap();
        assert!(config.is_production());
    }

    #[test]
    fn cors_list_drops_blank_entries() {
        let config = with_origins(" http://localhost:5173, ,https://game.example,");

        assert_eq!(
            config.cors_origins_list(),
            vec!["http://localhost:5173", "https://game.example"]
        );
        assert!(ServerConfig::default().cors_origins_list().is_empty());
    }

    #[test]
    fn wildcard_origin_is_valid() {
        assert!(with_origins("*").validate().is_ok());
    }

    #[test]
    fn origin_without_scheme_is_rejected() {
        assert_eq!(
            with_origins("https://game.example,game.example").validate(),
            Err(ValidationError::InvalidCorsOrigin("game.example".to_string()))
        );
    }

    #[test]
    fn port_zero_is_rejected() {
        let config = ServerConfig {
            port: 0,
            ..ServerConfig::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidPort));
    }

    #[test]
    fn timeout_must_be_within_bounds() {
        for secs in [0, MAX_REQUEST_TIMEOUT_SECS + 1] {
            let config = ServerConfig {
                request_timeout_secs: secs,
                ..ServerConfig::default()
            };
            assert_eq!(config.validate(), Err(ValidationError::InvalidTimeout));
        }
    }
}
