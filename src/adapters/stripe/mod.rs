//! Stripe payment provider adapter.
//!
//! Implements the `PaymentProvider` port for Stripe integration:
//! - One-off Checkout Sessions for the unlock product
//! - Webhook signature verification and event parsing
//!
//! # Security
//!
//! - Webhook signatures use HMAC-SHA256 over the raw body with constant-time comparison
//! - Timestamps are validated to prevent replay attacks (5-minute window by default)
//! - All secrets are handled via `secrecy::SecretString`

mod mock_payment_provider;
mod stripe_adapter;
mod webhook_types;

pub use mock_payment_provider::{MethodCall, MockPaymentProvider};
pub use stripe_adapter::{
    compute_signature, sign_payload, StripeConfig, StripePaymentAdapter,
    DEFAULT_WEBHOOK_TOLERANCE_SECS,
};
pub use webhook_types::{
    SignatureHeader, SignatureParseError, StripeCheckoutSession, StripeWebhookEvent,
    USER_ID_METADATA_KEY,
};
