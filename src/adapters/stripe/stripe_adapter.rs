//! Stripe payment provider adapter.
//!
//! Implements the `PaymentProvider` trait against the Stripe REST API:
//! one-off Checkout Sessions and webhook signature verification.
//!
//! # Security
//!
//! - HMAC-SHA256 signature verification with constant-time comparison
//! - Timestamp validation (5-minute window by default) for replay protection
//! - Secrets handled via `secrecy::SecretString`
//!
//! # Configuration
//!
//! ```ignore
//! let config = StripeConfig::new(api_key, webhook_secret);
//! let adapter = StripePaymentAdapter::new(config);
//! ```

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::config::PaymentConfig;
use crate::ports::{
    CheckoutSession, CreateCheckoutRequest, PaymentError, PaymentErrorCode, PaymentProvider,
    WebhookEvent, WebhookEventData, WebhookEventType,
};

use super::webhook_types::{
    SignatureHeader, StripeApiErrorBody, StripeCheckoutSession, StripeWebhookEvent,
    USER_ID_METADATA_KEY,
};

type HmacSha256 = Hmac<Sha256>;

/// Default maximum age for webhook deliveries (5 minutes).
pub const DEFAULT_WEBHOOK_TOLERANCE_SECS: i64 = 300;

/// Clock skew tolerance for future timestamps (60 seconds).
const MAX_FUTURE_TOLERANCE_SECS: i64 = 60;

const DEFAULT_API_BASE_URL: &str = "https://api.stripe.com";

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Stripe secret API key (sk_live_... or sk_test_...).
    api_key: SecretString,

    /// Webhook signing secret (whsec_...).
    webhook_secret: SecretString,

    /// Base URL for Stripe API (default: https://api.stripe.com).
    api_base_url: String,

    /// Oldest signed timestamp accepted, in seconds.
    webhook_tolerance_secs: i64,
}

impl StripeConfig {
    /// Create a new Stripe configuration.
    pub fn new(api_key: impl Into<String>, webhook_secret: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            webhook_secret: SecretString::new(webhook_secret.into()),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            webhook_tolerance_secs: DEFAULT_WEBHOOK_TOLERANCE_SECS,
        }
    }

    /// Build from the loaded application payment settings.
    pub fn from_payment_config(config: &PaymentConfig) -> Self {
        Self {
            api_key: config.stripe_api_key.clone(),
            webhook_secret: config.stripe_webhook_secret.clone(),
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            webhook_tolerance_secs: config.webhook_tolerance_secs as i64,
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Set how old a signed delivery may be before it is rejected.
    pub fn with_webhook_tolerance(mut self, secs: i64) -> Self {
        self.webhook_tolerance_secs = secs;
        self
    }
}

impl std::fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeConfig")
            .field("api_key", &"[REDACTED]")
            .field("webhook_secret", &"[REDACTED]")
            .field("api_base_url", &self.api_base_url)
            .field("webhook_tolerance_secs", &self.webhook_tolerance_secs)
            .finish()
    }
}

/// Compute the Stripe v1 signature: HMAC-SHA256 over `"<timestamp>." ++ payload`.
///
/// The payload is fed as raw bytes; it is never decoded as text.
pub fn compute_signature(
    secret: &str,
    timestamp: i64,
    payload: &[u8],
) -> Result<Vec<u8>, PaymentError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| PaymentError::new(PaymentErrorCode::Unknown, e.to_string()))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Build a complete `Stripe-Signature` header value for a payload.
///
/// Used by tests and local tooling to simulate Stripe deliveries.
pub fn sign_payload(secret: &str, timestamp: i64, payload: &[u8]) -> Result<String, PaymentError> {
    let signature = compute_signature(secret, timestamp, payload)?;
    Ok(format!("t={},v1={}", timestamp, hex::encode(signature)))
}

/// Stripe payment provider adapter.
///
/// Implements `PaymentProvider` for Stripe API integration.
pub struct StripePaymentAdapter {
    config: StripeConfig,
    http_client: reqwest::Client,
}

impl StripePaymentAdapter {
    /// Create a new Stripe adapter with the given configuration.
    pub fn new(config: StripeConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    /// Verify webhook signature using HMAC-SHA256.
    ///
    /// Accepts the delivery if any `v1` entry matches.
    fn verify_signature(&self, payload: &[u8], header: &SignatureHeader) -> Result<(), PaymentError> {
        let now = chrono::Utc::now().timestamp();
        let age = now
            .checked_sub(header.timestamp)
            .ok_or_else(|| PaymentError::invalid_webhook("Invalid timestamp"))?;

        if age > self.config.webhook_tolerance_secs {
            tracing::warn!(
                event_timestamp = header.timestamp,
                current_time = now,
                age_secs = age,
                "Webhook event too old - possible replay attack"
            );
            return Err(PaymentError::invalid_webhook(format!(
                "Event too old ({} seconds)",
                age
            )));
        }

        if age < -MAX_FUTURE_TOLERANCE_SECS {
            tracing::warn!(
                event_timestamp = header.timestamp,
                current_time = now,
                "Webhook event from future - clock skew or manipulation"
            );
            return Err(PaymentError::invalid_webhook("Event timestamp in future"));
        }

        let expected = compute_signature(
            self.config.webhook_secret.expose_secret(),
            header.timestamp,
            payload,
        )?;

        let matched = header
            .v1_signatures
            .iter()
            .any(|candidate| bool::from(expected.as_slice().ct_eq(candidate.as_slice())));

        if !matched {
            tracing::warn!(
                candidates = header.v1_signatures.len(),
                "Invalid webhook signature"
            );
            return Err(PaymentError::invalid_webhook("Invalid signature"));
        }

        Ok(())
    }

    /// Parse an authenticated Stripe event into the port's event type.
    fn parse_event(&self, payload: &[u8]) -> Result<WebhookEvent, PaymentError> {
        let stripe_event: StripeWebhookEvent = serde_json::from_slice(payload).map_err(|e| {
            tracing::warn!(error = %e, "Failed to parse webhook payload");
            PaymentError::malformed_event(format!("Invalid JSON: {}", e))
        })?;

        let event_type = WebhookEventType::from_provider(&stripe_event.event_type);
        let data = self.extract_event_data(&stripe_event)?;

        Ok(WebhookEvent {
            id: stripe_event.id,
            event_type,
            data,
            created_at: stripe_event.created,
        })
    }

    /// Extract event data from Stripe event into port format.
    fn extract_event_data(&self, event: &StripeWebhookEvent) -> Result<WebhookEventData, PaymentError> {
        if event.event_type.starts_with("checkout.session.") {
            let session: StripeCheckoutSession =
                serde_json::from_value(event.data.object.clone()).map_err(|e| {
                    PaymentError::malformed_event(format!("Invalid checkout session: {}", e))
                })?;

            let user_id = session.user_id();
            return Ok(WebhookEventData::Checkout {
                session_id: session.id,
                payment_status: session.payment_status,
                user_id,
            });
        }

        Ok(WebhookEventData::Raw {
            json: event.data.object.to_string(),
        })
    }

    /// Turn a non-2xx Stripe response into a categorized error.
    async fn error_from_response(response: reqwest::Response) -> PaymentError {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        let Ok(body) = serde_json::from_str::<StripeApiErrorBody>(&text) else {
            let code = match status {
                reqwest::StatusCode::UNAUTHORIZED => PaymentErrorCode::AuthenticationError,
                reqwest::StatusCode::TOO_MANY_REQUESTS => PaymentErrorCode::RateLimitExceeded,
                _ => PaymentErrorCode::ProviderError,
            };
            return PaymentError::new(code, format!("Stripe API error ({}): {}", status, text));
        };

        let code = match body.error.error_type.as_str() {
            "authentication_error" => PaymentErrorCode::AuthenticationError,
            "invalid_request_error" => PaymentErrorCode::InvalidRequest,
            "rate_limit_error" => PaymentErrorCode::RateLimitExceeded,
            "api_connection_error" => PaymentErrorCode::NetworkError,
            _ if status == reqwest::StatusCode::UNAUTHORIZED => PaymentErrorCode::AuthenticationError,
            _ if status == reqwest::StatusCode::TOO_MANY_REQUESTS => {
                PaymentErrorCode::RateLimitExceeded
            }
            _ => PaymentErrorCode::ProviderError,
        };

        let message = body
            .error
            .message
            .unwrap_or_else(|| format!("Stripe API error ({})", status));
        let err = PaymentError::new(code, message);
        match body.error.code {
            Some(provider_code) => err.with_provider_code(provider_code),
            None => err,
        }
    }
}

#[async_trait]
impl PaymentProvider for StripePaymentAdapter {
    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        let url = format!("{}/v1/checkout/sessions", self.config.api_base_url);
        let user_id = request.user_id.to_string();
        let metadata_key = format!("metadata[{}]", USER_ID_METADATA_KEY);

        let params = vec![
            ("mode", "payment".to_string()),
            ("payment_method_types[0]", "card".to_string()),
            ("line_items[0][price]", request.price_id),
            ("line_items[0][quantity]", request.quantity.to_string()),
            ("success_url", request.success_url),
            ("cancel_url", request.cancel_url),
            ("client_reference_id", user_id.clone()),
            (metadata_key.as_str(), user_id),
        ];

        let response = self
            .http_client
            .post(&url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .form(&params)
            .send()
            .await
            .map_err(|e| PaymentError::network(e.to_string()))?;

        if !response.status().is_success() {
            let err = Self::error_from_response(response).await;
            tracing::error!(
                code = %err.code,
                provider_code = err.provider_code.as_deref().unwrap_or(""),
                error = %err.message,
                "Stripe create_checkout_session failed"
            );
            return Err(err);
        }

        let stripe_session: StripeCheckoutSession = response.json().await.map_err(|e| {
            PaymentError::new(
                PaymentErrorCode::ProviderError,
                format!("Failed to parse Stripe response: {}", e),
            )
        })?;

        let url = stripe_session.url.ok_or_else(|| {
            PaymentError::new(
                PaymentErrorCode::ProviderError,
                "Stripe response missing checkout URL",
            )
        })?;

        Ok(CheckoutSession {
            id: stripe_session.id,
            url,
        })
    }

    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<WebhookEvent, PaymentError> {
        // 1. Parse signature header
        let header = SignatureHeader::parse(signature).map_err(|e| {
            tracing::warn!(error = %e, "Failed to parse Stripe-Signature header");
            PaymentError::invalid_webhook(e.to_string())
        })?;

        // 2. Verify signature (includes timestamp validation)
        self.verify_signature(payload, &header)?;

        // 3. Only now is the body trusted enough to parse
        let webhook_event = self.parse_event(payload)?;

        tracing::info!(
            event_id = %webhook_event.id,
            event_type = webhook_event.event_type.as_str(),
            "Webhook signature verified"
        );

        Ok(webhook_event)
    }
}
