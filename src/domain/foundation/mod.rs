//! Foundation module - Shared domain primitives.
//!
//! Contains the identifier value object and error vocabulary shared by
//! every layer of the service.

mod errors;
mod ids;

pub use errors::{ErrorCode, ValidationError};
pub use ids::{UserId, MAX_USER_ID_LEN};
