//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the application handlers and the outside world. Adapters implement
//! these ports.
//!
//! - `PaymentProvider` - Checkout creation and webhook verification
//! - `UnlockLedger` - Per-user unlock flags

mod payment_provider;
mod unlock_ledger;

pub use payment_provider::{
    CheckoutSession, CreateCheckoutRequest, PaymentError, PaymentErrorCode, PaymentProvider,
    WebhookEvent, WebhookEventData, WebhookEventType,
};
pub use unlock_ledger::{LedgerError, UnlockLedger, UnlockOutcome};
