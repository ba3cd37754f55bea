//! Unlock command and query handlers.

mod create_checkout_session;
mod get_unlock_status;
mod handle_payment_webhook;

// Commands
pub use create_checkout_session::{
    CheckoutSettings, CreateCheckoutSessionCommand, CreateCheckoutSessionHandler,
    CreateCheckoutSessionResult,
};
pub use handle_payment_webhook::{
    HandlePaymentWebhookCommand, HandlePaymentWebhookHandler, WebhookOutcome,
};

// Queries
pub use get_unlock_status::{GetUnlockStatusHandler, GetUnlockStatusQuery};
