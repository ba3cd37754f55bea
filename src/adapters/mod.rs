//! Adapters - Implementations of ports for external systems.
//!
//! - `http` - Axum routes and handlers
//! - `ledger` - Unlock ledger backends (in-memory, Redis)
//! - `stripe` - Stripe Checkout and webhook verification

pub mod http;
pub mod ledger;
pub mod stripe;
