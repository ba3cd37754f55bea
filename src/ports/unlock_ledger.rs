//! Unlock ledger port - record of which users have purchased the feature.
//!
//! The ledger holds one boolean flag per user identifier. A flag that is
//! absent reads as `false`; once set it never reverts. Implementations
//! must make `mark_unlocked` an atomic set-if-absent so that redelivered
//! or concurrent completion events converge on the same state.

use async_trait::async_trait;

use crate::domain::foundation::UserId;

/// Port for reading and flipping unlock flags.
#[async_trait]
pub trait UnlockLedger: Send + Sync {
    /// Whether the user has completed a qualifying purchase.
    ///
    /// Takes a raw string because lookups accept any identifier, including
    /// ones that could never be unlocked.
    async fn is_unlocked(&self, user_id: &str) -> Result<bool, LedgerError>;

    /// Mark the user as unlocked.
    ///
    /// Idempotent: repeated calls leave the flag set and report
    /// `AlreadyUnlocked`. Exactly one caller observes `NewlyUnlocked`.
    async fn mark_unlocked(&self, user_id: &UserId) -> Result<UnlockOutcome, LedgerError>;
}

/// Result of marking a user as unlocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockOutcome {
    /// The flag moved from absent to set.
    NewlyUnlocked,

    /// The flag was already set; nothing changed.
    AlreadyUnlocked,
}

impl UnlockOutcome {
    pub fn is_new(&self) -> bool {
        matches!(self, UnlockOutcome::NewlyUnlocked)
    }
}

/// Errors that can occur during ledger operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LedgerError {
    /// Ledger backend is unavailable.
    #[error("unlock ledger unavailable: {0}")]
    Unavailable(String),
}
