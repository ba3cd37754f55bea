//! Unlock ledger adapters.
//!
//! - `InMemoryUnlockLedger` - process-lifetime map for development and tests
//! - `RedisUnlockLedger` - shared, restart-surviving flags for production

mod in_memory;
mod redis;

pub use in_memory::InMemoryUnlockLedger;
pub use self::redis::{RedisUnlockLedger, DEFAULT_KEY_PREFIX};
