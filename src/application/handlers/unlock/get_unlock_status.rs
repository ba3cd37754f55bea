//! GetUnlockStatusHandler - Query handler for a user's unlock flag.

use std::sync::Arc;

use crate::ports::UnlockLedger;

/// Query for whether a user has unlocked the card.
#[derive(Debug, Clone)]
pub struct GetUnlockStatusQuery {
    pub user_id: Option<String>,
}

/// Handler for unlock status lookups.
///
/// Never fails: unknown, missing and empty identifiers read as `false`, and
/// a ledger outage is logged and reported as `false` so clients keep the
/// card locked rather than erroring.
pub struct GetUnlockStatusHandler {
    ledger: Arc<dyn UnlockLedger>,
}

impl GetUnlockStatusHandler {
    pub fn new(ledger: Arc<dyn UnlockLedger>) -> Self {
        Self { ledger }
    }

    pub async fn handle(&self, query: GetUnlockStatusQuery) -> bool {
        let user_id = match query.user_id.as_deref() {
            Some(id) if !id.is_empty() => id,
            _ => return false,
        };

        match self.ledger.is_unlocked(user_id).await {
            Ok(purchased) => purchased,
            Err(e) => {
                tracing::error!(user_id = %user_id, error = %e, "Unlock status lookup failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ledger::InMemoryUnlockLedger;
    use crate::domain::foundation::UserId;
    use crate::ports::{LedgerError, UnlockOutcome};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // ════════════════════════════════════════════════════════════════════════════
    // Mock Implementations
    // ════════════════════════════════════════════════════════════════════════════

    #[derive(Default)]
    struct CountingFailingLedger {
        lookups: AtomicUsize,
    }

    #[async_trait]
    impl UnlockLedger for CountingFailingLedger {
        async fn is_unlocked(&self, _user_id: &str) -> Result<bool, LedgerError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Err(LedgerError::Unavailable("timeout".to_string()))
        }

        async fn mark_unlocked(&self, _user_id: &UserId) -> Result<UnlockOutcome, LedgerError> {
            Err(LedgerError::Unavailable("timeout".to_string()))
        }
    }

    fn query(user_id: Option<&str>) -> GetUnlockStatusQuery {
        GetUnlockStatusQuery {
            user_id: user_id.map(String::from),
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn unknown_user_is_not_purchased() {
        let handler = GetUnlockStatusHandler::new(Arc::new(InMemoryUnlockLedger::new()));

        assert!(!handler.handle(query(Some("zzz"))).await);
    }

    #[tokio::test]
    async fn unlocked_user_is_purchased() {
        let ledger = InMemoryUnlockLedger::new();
        ledger.mark_unlocked(&UserId::new("abc").unwrap()).await.unwrap();
        let handler = GetUnlockStatusHandler::new(Arc::new(ledger));

        assert!(handler.handle(query(Some("abc"))).await);
        assert!(!handler.handle(query(Some("ABC"))).await);
    }

    #[tokio::test]
    async fn missing_or_empty_id_skips_lookup() {
        let ledger = Arc::new(CountingFailingLedger::default());
        let handler = GetUnlockStatusHandler::new(ledger.clone());

        assert!(!handler.handle(query(None)).await);
        assert!(!handler.handle(query(Some(""))).await);
        assert_eq!(ledger.lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn ledger_failure_reads_as_not_purchased() {
        let ledger = Arc::new(CountingFailingLedger::default());
        let handler = GetUnlockStatusHandler::new(ledger.clone());

        assert!(!handler.handle(query(Some("abc"))).await);
        assert_eq!(ledger.lookups.load(Ordering::SeqCst), 1);
    }
}
