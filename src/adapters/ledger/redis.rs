//! Redis-backed unlock ledger for production deployments.
//!
//! One key per user, written with `SETNX` so the first completion event
//! wins atomically and redeliveries are no-ops. Flags survive restarts and
//! are visible to every instance sharing the Redis database.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use crate::domain::foundation::UserId;
use crate::ports::{LedgerError, UnlockLedger, UnlockOutcome};

/// Default namespace for ledger keys.
pub const DEFAULT_KEY_PREFIX: &str = "card-unlock:";

/// Redis-backed unlock ledger.
#[derive(Clone)]
pub struct RedisUnlockLedger {
    conn: MultiplexedConnection,
    key_prefix: String,
}

impl RedisUnlockLedger {
    /// Create a ledger over an existing connection.
    pub fn new(conn: MultiplexedConnection, key_prefix: impl Into<String>) -> Self {
        Self {
            conn,
            key_prefix: key_prefix.into(),
        }
    }

    /// Open a multiplexed connection to `url` and wrap it.
    pub async fn connect(url: &str, key_prefix: impl Into<String>) -> Result<Self, LedgerError> {
        let client = redis::Client::open(url)
            .map_err(|e: redis::RedisError| LedgerError::Unavailable(e.to_string()))?;
        let conn = client
            .get_multiplexed_tokio_connection()
            .await
            .map_err(|e: redis::RedisError| LedgerError::Unavailable(e.to_string()))?;
        Ok(Self::new(conn, key_prefix))
    }

    fn key_for(&self, user_id: &str) -> String {
        ledger_key(&self.key_prefix, user_id)
    }
}

fn ledger_key(prefix: &str, user_id: &str) -> String {
    format!("{}{}", prefix, user_id)
}

#[async_trait]
impl UnlockLedger for RedisUnlockLedger {
    async fn is_unlocked(&self, user_id: &str) -> Result<bool, LedgerError> {
        let mut conn = self.conn.clone();

        conn.exists(self.key_for(user_id))
            .await
            .map_err(|e: redis::RedisError| LedgerError::Unavailable(e.to_string()))
    }

    async fn mark_unlocked(&self, user_id: &UserId) -> Result<UnlockOutcome, LedgerError> {
        let mut conn = self.conn.clone();

        let inserted: bool = conn
            .set_nx(self.key_for(user_id.as_str()), 1_i32)
            .await
            .map_err(|e: redis::RedisError| LedgerError::Unavailable(e.to_string()))?;

        Ok(if inserted {
            UnlockOutcome::NewlyUnlocked
        } else {
            UnlockOutcome::AlreadyUnlocked
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_includes_prefix_and_raw_user_id() {
        assert_eq!(ledger_key(DEFAULT_KEY_PREFIX, "abc"), "card-unlock:abc");
        assert_eq!(ledger_key("game:", "a b:c"), "game:a b:c");
    }

    #[tokio::test]
    async fn connect_reports_invalid_url_as_unavailable() {
        let result = RedisUnlockLedger::connect("not-a-redis-url", DEFAULT_KEY_PREFIX).await;
        assert!(matches!(result, Err(LedgerError::Unavailable(_))));
    }

    // Requires a running Redis instance. Run with: cargo test -- --ignored
    #[tokio::test]
    #[ignore]
    async fn set_nx_makes_unlock_idempotent() {
        let prefix = format!("card-unlock-test:{}:", uuid::Uuid::new_v4().simple());
        let ledger = RedisUnlockLedger::connect("redis://127.0.0.1/", prefix)
            .await
            .unwrap();
        let user = UserId::new("u1").unwrap();

        assert!(!ledger.is_unlocked("u1").await.unwrap());
        assert_eq!(
            ledger.mark_unlocked(&user).await.unwrap(),
            UnlockOutcome::NewlyUnlocked
        );
        assert_eq!(
            ledger.mark_unlocked(&user).await.unwrap(),
            UnlockOutcome::AlreadyUnlocked
        );
        assert!(ledger.is_unlocked("u1").await.unwrap());
        assert!(!ledger.is_unlocked("u2").await.unwrap());
    }
}
