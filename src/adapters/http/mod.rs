//! HTTP adapters - REST API implementations.

pub mod unlock;

// Re-export key types for convenience
pub use unlock::{build_router, UnlockAppState};
