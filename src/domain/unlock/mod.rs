//! Unlock module - the purchasable feature gate.
//!
//! A user is "unlocked" once a verified checkout completion names them.
//! The flag only ever moves from locked to unlocked.

mod errors;

pub use errors::UnlockError;
