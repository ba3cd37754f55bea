//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (user identifier, errors)
//! - `unlock` - Feature unlock error taxonomy

pub mod foundation;
pub mod unlock;
