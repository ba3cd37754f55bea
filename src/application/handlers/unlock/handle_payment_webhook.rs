//! HandlePaymentWebhookHandler - Command handler for payment provider webhooks.
//!
//! Verifies the delivery, then flips the unlock flag for completed checkouts.
//! Every other verified event is acknowledged without side effects so the
//! provider stops redelivering it.

use std::sync::Arc;

use crate::domain::foundation::UserId;
use crate::domain::unlock::UnlockError;
use crate::ports::{
    PaymentErrorCode, PaymentProvider, UnlockLedger, WebhookEvent, WebhookEventData,
    WebhookEventType,
};

/// Command carrying an undecoded webhook delivery.
#[derive(Debug, Clone)]
pub struct HandlePaymentWebhookCommand {
    /// Raw request body, byte-for-byte as received.
    pub payload: Vec<u8>,
    /// Signature header value, if the request had one.
    pub signature: Option<String>,
}

/// What happened to an acknowledged webhook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// A completed checkout unlocked the user.
    Unlocked {
        user_id: UserId,
        /// False when the flag was already set by an earlier delivery.
        newly_unlocked: bool,
    },

    /// A completed checkout carried no usable user identifier.
    MissingUserId { event_id: String },

    /// The event does not affect unlock state.
    Ignored { event_id: String, event_type: String },
}

/// Handler for webhook deliveries.
pub struct HandlePaymentWebhookHandler {
    ledger: Arc<dyn UnlockLedger>,
    payment_provider: Arc<dyn PaymentProvider>,
}

impl HandlePaymentWebhookHandler {
    pub fn new(ledger: Arc<dyn UnlockLedger>, payment_provider: Arc<dyn PaymentProvider>) -> Self {
        Self {
            ledger,
            payment_provider,
        }
    }

    pub async fn handle(
        &self,
        cmd: HandlePaymentWebhookCommand,
    ) -> Result<WebhookOutcome, UnlockError> {
        let signature = cmd.signature.ok_or_else(|| {
            tracing::warn!("Webhook rejected: missing signature header");
            UnlockError::authentication("missing signature header")
        })?;

        // 1. Verify signature and decode
        let event = match self
            .payment_provider
            .verify_webhook(&cmd.payload, &signature)
            .await
        {
            Ok(event) => event,
            Err(e) if e.code == PaymentErrorCode::MalformedEvent => {
                // Authentic but undecodable; redelivery would not help.
                tracing::warn!(error = %e.message, "Ignoring undecodable webhook event");
                return Ok(WebhookOutcome::Ignored {
                    event_id: String::new(),
                    event_type: "unparseable".to_string(),
                });
            }
            Err(e) => {
                tracing::warn!(code = %e.code, error = %e.message, "Webhook rejected");
                return Err(UnlockError::authentication(e.message));
            }
        };

        tracing::debug!(
            event_id = %event.id,
            event_type = %event.event_type.as_str(),
            "Webhook verified"
        );

        // 2. Route by event type
        if event.event_type == WebhookEventType::CheckoutSessionCompleted {
            return self.handle_checkout_completed(event).await;
        }

        tracing::debug!(
            event_id = %event.id,
            event_type = %event.event_type.as_str(),
            "Webhook acknowledged without action"
        );
        Ok(WebhookOutcome::Ignored {
            event_type: event.event_type.as_str().to_string(),
            event_id: event.id,
        })
    }

    async fn handle_checkout_completed(
        &self,
        event: WebhookEvent,
    ) -> Result<WebhookOutcome, UnlockError> {
        let (session_id, raw_user_id) = match &event.data {
            WebhookEventData::Checkout {
                session_id,
                user_id,
                ..
            } => (session_id.as_str(), user_id.clone()),
            WebhookEventData::Raw { .. } => ("", None),
        };

        let user_id = match raw_user_id.map(UserId::new) {
            Some(Ok(user_id)) => user_id,
            Some(Err(e)) => {
                tracing::warn!(
                    event_id = %event.id,
                    session_id = %session_id,
                    error = %e,
                    "Completed checkout has an unusable user id"
                );
                return Ok(WebhookOutcome::MissingUserId { event_id: event.id });
            }
            None => {
                tracing::warn!(
                    event_id = %event.id,
                    session_id = %session_id,
                    "Completed checkout has no user id"
                );
                return Ok(WebhookOutcome::MissingUserId { event_id: event.id });
            }
        };

        let outcome = self.ledger.mark_unlocked(&user_id).await.map_err(|e| {
            tracing::error!(
                event_id = %event.id,
                user_id = %user_id,
                error = %e,
                "Failed to record unlock"
            );
            UnlockError::infrastructure(e.to_string())
        })?;

        if outcome.is_new() {
            tracing::info!(
                event_id = %event.id,
                session_id = %session_id,
                user_id = %user_id,
                "Card unlocked"
            );
        } else {
            tracing::info!(
                event_id = %event.id,
                user_id = %user_id,
                "Duplicate completion, user already unlocked"
            );
        }

        Ok(WebhookOutcome::Unlocked {
            user_id,
            newly_unlocked: outcome.is_new(),
        })
    }
}
