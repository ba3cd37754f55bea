//! Unlock ledger configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Which ledger backend holds unlock flags
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LedgerBackend {
    /// Process memory; flags vanish on restart.
    #[default]
    Memory,
    /// Redis; flags are shared and survive restarts.
    Redis,
}

/// Unlock ledger configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Backend selection
    #[serde(default)]
    pub backend: LedgerBackend,

    /// Redis connection URL (required for the redis backend)
    pub redis_url: Option<String>,

    /// Namespace prepended to every Redis key
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

impl LedgerConfig {
    /// Validate ledger configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.backend != LedgerBackend::Redis {
            return Ok(());
        }

        let url = self
            .redis_url
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or(ValidationError::MissingRequired("LEDGER__REDIS_URL"))?;

        if !url.starts_with("redis://") && !url.starts_with("rediss://") {
            return Err(ValidationError::InvalidRedisUrl);
        }
        Ok(())
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            backend: LedgerBackend::default(),
            redis_url: None,
            key_prefix: default_key_prefix(),
        }
    }
}

fn default_key_prefix() -> String {
    "card-unlock:".to_string()
}
