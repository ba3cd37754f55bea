//! In-memory unlock ledger for testing and single-instance development.
//!
//! Flags live only as long as the process. Writes are serialized by the
//! map's write lock, so the absent-to-set transition is observed once.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::UserId;
use crate::ports::{LedgerError, UnlockLedger, UnlockOutcome};

/// In-memory unlock ledger.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUnlockLedger {
    /// Purchase flag per user identifier.
    flags: Arc<RwLock<HashMap<String, bool>>>,
}

impl InMemoryUnlockLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every stored flag.
    pub async fn snapshot(&self) -> HashMap<String, bool> {
        self.flags.read().await.clone()
    }

    /// Number of users with a stored flag.
    pub async fn len(&self) -> usize {
        self.flags.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.flags.read().await.is_empty()
    }
}

#[async_trait]
impl UnlockLedger for InMemoryUnlockLedger {
    async fn is_unlocked(&self, user_id: &str) -> Result<bool, LedgerError> {
        Ok(self.flags.read().await.get(user_id).copied().unwrap_or(false))
    }

    async fn mark_unlocked(&self, user_id: &UserId) -> Result<UnlockOutcome, LedgerError> {
        let mut flags = self.flags.write().await;
        let previous = flags.insert(user_id.as_str().to_string(), true);

        Ok(match previous {
            Some(true) => UnlockOutcome::AlreadyUnlocked,
            _ => UnlockOutcome::NewlyUnlocked,
        })
    }
}
