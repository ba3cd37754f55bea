//! CreateCheckoutSessionHandler - Command handler for starting an unlock purchase.

use std::sync::Arc;

use crate::config::PaymentConfig;
use crate::domain::foundation::UserId;
use crate::domain::unlock::UnlockError;
use crate::ports::{CreateCheckoutRequest, PaymentProvider};

/// Fixed product and redirect targets used for every checkout.
#[derive(Debug, Clone)]
pub struct CheckoutSettings {
    pub price_id: String,
    pub success_url: String,
    pub cancel_url: String,
}

impl CheckoutSettings {
    pub fn from_payment_config(config: &PaymentConfig) -> Self {
        Self {
            price_id: config.price_id.clone(),
            success_url: config.success_url.clone(),
            cancel_url: config.cancel_url.clone(),
        }
    }
}

/// Command to create a checkout session for a user.
#[derive(Debug, Clone)]
pub struct CreateCheckoutSessionCommand {
    /// Caller-supplied user identifier, unvalidated.
    pub user_id: Option<String>,
}

/// Result of successful checkout creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCheckoutSessionResult {
    pub session_id: String,
    pub url: String,
}

/// Handler for starting a checkout.
///
/// Validates the user identifier, then asks the payment provider for a
/// one-item, quantity-one session whose metadata carries the identifier.
/// Nothing is written locally; the unlock happens when the webhook arrives.
pub struct CreateCheckoutSessionHandler {
    payment_provider: Arc<dyn PaymentProvider>,
    settings: CheckoutSettings,
}

impl CreateCheckoutSessionHandler {
    pub fn new(payment_provider: Arc<dyn PaymentProvider>, settings: CheckoutSettings) -> Self {
        Self {
            payment_provider,
            settings,
        }
    }

    pub async fn handle(
        &self,
        cmd: CreateCheckoutSessionCommand,
    ) -> Result<CreateCheckoutSessionResult, UnlockError> {
        // 1. Validate before any upstream call
        let raw = cmd
            .user_id
            .ok_or_else(|| UnlockError::validation("userID", "userID is required"))?;
        let user_id = UserId::new(raw).map_err(|e| {
            tracing::warn!(error = %e, "Rejected checkout request");
            UnlockError::from(e)
        })?;

        // 2. Ask the provider for a session
        let session = self
            .payment_provider
            .create_checkout_session(CreateCheckoutRequest {
                user_id: user_id.clone(),
                price_id: self.settings.price_id.clone(),
                quantity: 1,
                success_url: self.settings.success_url.clone(),
                cancel_url: self.settings.cancel_url.clone(),
            })
            .await
            .map_err(|e| {
                tracing::error!(
                    user_id = %user_id,
                    code = %e.code,
                    error = %e.message,
                    "Checkout session creation failed"
                );
                UnlockError::upstream(e.to_string())
            })?;

        tracing::info!(
            user_id = %user_id,
            session_id = %session.id,
            "Checkout session created"
        );

        Ok(CreateCheckoutSessionResult {
            session_id: session.id,
            url: session.url,
        })
    }
}
