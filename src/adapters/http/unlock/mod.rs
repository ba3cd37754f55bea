//! HTTP adapter for unlock endpoints.
//!
//! Exposes the unlock flow via REST API:
//! - `GET /` - Liveness check
//! - `POST /create-checkout-session` - Start a purchase, returns the checkout URL
//! - `POST /webhook` - Handle Stripe webhooks
//! - `GET /card-status?userID=...` - Check whether a user has unlocked the card

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::*;
pub use handlers::{UnlockApiError, UnlockAppState, LIVENESS_MESSAGE, SIGNATURE_HEADER};
pub use routes::{build_router, cors_layer, unlock_routes};
