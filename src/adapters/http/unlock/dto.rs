//! Data Transfer Objects for the unlock HTTP endpoints.
//!
//! Field names follow the wire contract used by the game client
//! (`userID`, `url`, `purchased`), not Rust conventions.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ErrorCode;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Body of `POST /create-checkout-session`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCheckoutSessionRequest {
    #[serde(rename = "userID", default)]
    pub user_id: Option<String>,
}

/// Query string of `GET /card-status`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CardStatusQuery {
    #[serde(rename = "userID", default)]
    pub user_id: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Response with the hosted checkout page URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSessionResponse {
    pub url: String,
}

/// Response with a user's unlock flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardStatusResponse {
    pub purchased: bool,
}

/// Error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
    /// Error code for programmatic handling.
    pub error_code: String,
}

impl ErrorResponse {
    pub fn new(error_code: ErrorCode, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            error_code: error_code.to_string(),
        }
    }
}
