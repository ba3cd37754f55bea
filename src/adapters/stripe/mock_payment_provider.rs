//! Mock payment provider for testing.
//!
//! Provides a configurable mock implementation of `PaymentProvider` for unit
//! and integration tests. Supports:
//! - Pre-configured responses
//! - Error injection
//! - Call tracking
//! - Webhook event simulation

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::ports::{
    CheckoutSession, CreateCheckoutRequest, PaymentError, PaymentProvider, WebhookEvent,
    WebhookEventData, WebhookEventType,
};

use super::webhook_types::USER_ID_METADATA_KEY;

/// Mock payment provider for testing.
///
/// # Example
///
/// ```ignore
/// let mock = MockPaymentProvider::new();
///
/// // Inject errors
/// mock.set_method_error("create_checkout_session", PaymentError::network("down"));
///
/// // Simulate a delivery
/// mock.set_webhook_event(MockPaymentProvider::checkout_completed_event("abc"));
/// ```
#[derive(Default, Clone)]
pub struct MockPaymentProvider {
    /// Inner state (thread-safe for async tests).
    inner: Arc<Mutex<MockState>>,
}

/// Internal mutable state.
#[derive(Default)]
struct MockState {
    /// Next checkout session to return.
    next_checkout: Option<CheckoutSession>,

    /// Webhook event to return on every verification.
    webhook_event: Option<WebhookEvent>,

    /// Error to return on next call.
    next_error: Option<PaymentError>,

    /// Specific errors by method name.
    method_errors: HashMap<String, PaymentError>,

    /// Track method calls for assertions.
    call_log: Vec<MethodCall>,

    /// Checkout requests exactly as received.
    checkout_requests: Vec<CreateCheckoutRequest>,

    /// Webhook verification behavior.
    webhook_verify_mode: WebhookVerifyMode,
}

/// Recorded method call for assertions.
#[derive(Debug, Clone)]
pub struct MethodCall {
    pub method: String,
    pub args: Vec<String>,
}

/// How to handle webhook verification.
#[derive(Default, Clone)]
enum WebhookVerifyMode {
    /// Accept any payload.
    #[default]
    AcceptAll,

    /// Accept only this exact signature header value.
    RequireSignature(String),

    /// Always fail verification.
    AlwaysFail,
}

impl MockPaymentProvider {
    /// Create a new mock provider with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock that fails all webhook verifications.
    pub fn rejecting_webhooks() -> Self {
        let mock = Self::new();
        mock.state().webhook_verify_mode = WebhookVerifyMode::AlwaysFail;
        mock
    }

    /// Create a mock that only accepts the given signature header.
    pub fn requiring_signature(signature: impl Into<String>) -> Self {
        let mock = Self::new();
        mock.state().webhook_verify_mode = WebhookVerifyMode::RequireSignature(signature.into());
        mock
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration Methods
    // ════════════════════════════════════════════════════════════════════════════

    /// Set the checkout session to return.
    pub fn set_checkout_session(&self, session: CheckoutSession) {
        self.state().next_checkout = Some(session);
    }

    /// Set the webhook event to return on verification.
    pub fn set_webhook_event(&self, event: WebhookEvent) {
        self.state().webhook_event = Some(event);
    }

    /// Set an error to return on the next call to any method.
    pub fn set_error(&self, error: PaymentError) {
        self.state().next_error = Some(error);
    }

    /// Set an error for a specific method.
    pub fn set_method_error(&self, method: &str, error: PaymentError) {
        self.state().method_errors.insert(method.to_string(), error);
    }

    /// Clear all configured errors.
    pub fn clear_errors(&self) {
        let mut state = self.state();
        state.next_error = None;
        state.method_errors.clear();
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Call Tracking
    // ════════════════════════════════════════════════════════════════════════════

    /// Get all recorded method calls.
    pub fn calls(&self) -> Vec<MethodCall> {
        self.state().call_log.clone()
    }

    /// Check if a method was called.
    pub fn was_called(&self, method: &str) -> bool {
        self.state().call_log.iter().any(|c| c.method == method)
    }

    /// Get count of calls to a method.
    pub fn call_count(&self, method: &str) -> usize {
        self.state()
            .call_log
            .iter()
            .filter(|c| c.method == method)
            .count()
    }

    /// Checkout requests received so far.
    pub fn checkout_requests(&self) -> Vec<CreateCheckoutRequest> {
        self.state().checkout_requests.clone()
    }

    /// Clear the call log.
    pub fn clear_calls(&self) {
        let mut state = self.state();
        state.call_log.clear();
        state.checkout_requests.clear();
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Internal Helpers
    // ════════════════════════════════════════════════════════════════════════════

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record_call(&self, method: &str, args: Vec<String>) {
        self.state().call_log.push(MethodCall {
            method: method.to_string(),
            args,
        });
    }

    fn check_error(&self, method: &str) -> Result<(), PaymentError> {
        let mut state = self.state();

        // Check method-specific error first
        if let Some(error) = state.method_errors.get(method) {
            return Err(error.clone());
        }

        // Check global error (consumes it)
        if let Some(error) = state.next_error.take() {
            return Err(error);
        }

        Ok(())
    }

    /// Build an event from a JSON payload shaped like a Stripe event.
    fn event_from_payload(payload: &[u8]) -> Result<WebhookEvent, PaymentError> {
        let parsed: serde_json::Value = serde_json::from_slice(payload)
            .map_err(|e| PaymentError::malformed_event(format!("Invalid JSON: {}", e)))?;

        let id = parsed["id"].as_str().unwrap_or("evt_mock").to_string();
        let event_type = WebhookEventType::from_provider(parsed["type"].as_str().unwrap_or("unknown"));
        let created_at = parsed["created"]
            .as_i64()
            .unwrap_or_else(|| chrono::Utc::now().timestamp());

        let object = &parsed["data"]["object"];
        let data = match event_type {
            WebhookEventType::CheckoutSessionCompleted | WebhookEventType::CheckoutSessionExpired => {
                let user_id = object["metadata"][USER_ID_METADATA_KEY]
                    .as_str()
                    .or_else(|| object["client_reference_id"].as_str())
                    .filter(|s| !s.is_empty())
                    .map(String::from);
                WebhookEventData::Checkout {
                    session_id: object["id"].as_str().unwrap_or("cs_mock").to_string(),
                    payment_status: object["payment_status"].as_str().map(String::from),
                    user_id,
                }
            }
            WebhookEventType::Unknown(_) => WebhookEventData::Raw {
                json: object.to_string(),
            },
        };

        Ok(WebhookEvent {
            id,
            event_type,
            data,
            created_at,
        })
    }
}

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        self.record_call(
            "create_checkout_session",
            vec![request.user_id.to_string(), request.price_id.clone()],
        );
        self.state().checkout_requests.push(request);
        self.check_error("create_checkout_session")?;

        let session = self.state().next_checkout.take().unwrap_or_else(|| {
            let id = format!("cs_mock_{}", uuid::Uuid::new_v4().simple());
            CheckoutSession {
                url: format!("https://checkout.stripe.com/c/pay/{}", id),
                id,
            }
        });

        Ok(session)
    }

    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<WebhookEvent, PaymentError> {
        self.record_call(
            "verify_webhook",
            vec![
                String::from_utf8_lossy(payload).chars().take(50).collect(),
                signature.chars().take(20).collect(),
            ],
        );
        self.check_error("verify_webhook")?;

        let configured = {
            let state = self.state();
            match &state.webhook_verify_mode {
                WebhookVerifyMode::AcceptAll => {}
                WebhookVerifyMode::RequireSignature(required) => {
                    if signature != required {
                        return Err(PaymentError::invalid_webhook("Invalid signature"));
                    }
                }
                WebhookVerifyMode::AlwaysFail => {
                    return Err(PaymentError::invalid_webhook("Verification disabled"));
                }
            }
            state.webhook_event.clone()
        };

        match configured {
            Some(event) => Ok(event),
            None => Self::event_from_payload(payload),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Test Helpers
// ════════════════════════════════════════════════════════════════════════════════

impl MockPaymentProvider {
    /// Create a checkout completed webhook event for a user.
    pub fn checkout_completed_event(user_id: &str) -> WebhookEvent {
        WebhookEvent {
            id: format!("evt_checkout_{}", uuid::Uuid::new_v4().simple()),
            event_type: WebhookEventType::CheckoutSessionCompleted,
            data: WebhookEventData::Checkout {
                session_id: format!("cs_{}", uuid::Uuid::new_v4().simple()),
                payment_status: Some("paid".to_string()),
                user_id: Some(user_id.to_string()),
            },
            created_at: chrono::Utc::now().timestamp(),
        }
    }

    /// Create a checkout completed event whose session carries no user id.
    pub fn checkout_completed_without_user_event() -> WebhookEvent {
        WebhookEvent {
            id: format!("evt_checkout_{}", uuid::Uuid::new_v4().simple()),
            event_type: WebhookEventType::CheckoutSessionCompleted,
            data: WebhookEventData::Checkout {
                session_id: format!("cs_{}", uuid::Uuid::new_v4().simple()),
                payment_status: Some("paid".to_string()),
                user_id: None,
            },
            created_at: chrono::Utc::now().timestamp(),
        }
    }

    /// Create a checkout expired webhook event for a user.
    pub fn checkout_expired_event(user_id: &str) -> WebhookEvent {
        WebhookEvent {
            id: format!("evt_expired_{}", uuid::Uuid::new_v4().simple()),
            event_type: WebhookEventType::CheckoutSessionExpired,
            data: WebhookEventData::Checkout {
                session_id: format!("cs_{}", uuid::Uuid::new_v4().simple()),
                payment_status: Some("unpaid".to_string()),
                user_id: Some(user_id.to_string()),
            },
            created_at: chrono::Utc::now().timestamp(),
        }
    }

    /// Create an event of a type the unlock flow does not act on.
    pub fn unrelated_event(event_type: &str) -> WebhookEvent {
        WebhookEvent {
            id: format!("evt_other_{}", uuid::Uuid::new_v4().simple()),
            event_type: WebhookEventType::Unknown(event_type.to_string()),
            data: WebhookEventData::Raw {
                json: "{}".to_string(),
            },
            created_at: chrono::Utc::now().timestamp(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::UserId;
    use crate::ports::PaymentErrorCode;

    fn checkout_request(user_id: &str) -> CreateCheckoutRequest {
        CreateCheckoutRequest {
            user_id: UserId::new(user_id).unwrap(),
            price_id: "price_123".to_string(),
            quantity: 1,
            success_url: "https://game.example/success".to_string(),
            cancel_url: "https://game.example/cancel".to_string(),
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Checkout Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn create_checkout_session_generates_url() {
        let mock = MockPaymentProvider::new();

        let session = mock.create_checkout_session(checkout_request("abc")).await.unwrap();

        assert!(session.id.starts_with("cs_mock_"));
        assert!(session.url.ends_with(&session.id));
    }

    #[tokio::test]
    async fn set_checkout_session_returns_configured() {
        let mock = MockPaymentProvider::new();
        mock.set_checkout_session(CheckoutSession {
            id: "cs_fixed".to_string(),
            url: "https://pay.example/cs_fixed".to_string(),
        });

        let session = mock.create_checkout_session(checkout_request("abc")).await.unwrap();

        assert_eq!(session.id, "cs_fixed");
        assert_eq!(session.url, "https://pay.example/cs_fixed");
    }

    #[tokio::test]
    async fn records_checkout_requests_verbatim() {
        let mock = MockPaymentProvider::new();
        mock.create_checkout_session(checkout_request(" spaced id "))
            .await
            .unwrap();

        let requests = mock.checkout_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].user_id.as_str(), " spaced id ");
        assert_eq!(requests[0].quantity, 1);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Error Injection Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn set_error_returns_error_once() {
        let mock = MockPaymentProvider::new();
        mock.set_error(PaymentError::network("Connection failed"));

        let first = mock.create_checkout_session(checkout_request("abc")).await;
        assert_eq!(first.unwrap_err().code, PaymentErrorCode::NetworkError);

        let second = mock.create_checkout_session(checkout_request("abc")).await;
        assert!(second.is_ok());
    }

    #[tokio::test]
    async fn set_method_error_only_affects_method() {
        let mock = MockPaymentProvider::new();
        mock.set_method_error(
            "create_checkout_session",
            PaymentError::invalid_request("No such price"),
        );

        assert!(mock.create_checkout_session(checkout_request("abc")).await.is_err());
        assert!(mock.verify_webhook(b"{}", "sig").await.is_ok());

        mock.clear_errors();
        assert!(mock.create_checkout_session(checkout_request("abc")).await.is_ok());
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Call Tracking Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn tracks_method_calls() {
        let mock = MockPaymentProvider::new();
        assert!(!mock.was_called("create_checkout_session"));

        mock.create_checkout_session(checkout_request("a")).await.unwrap();
        mock.create_checkout_session(checkout_request("b")).await.unwrap();

        assert!(mock.was_called("create_checkout_session"));
        assert_eq!(mock.call_count("create_checkout_session"), 2);
        assert_eq!(mock.calls()[1].args[0], "b");

        mock.clear_calls();
        assert_eq!(mock.call_count("create_checkout_session"), 0);
        assert!(mock.checkout_requests().is_empty());
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Webhook Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn verify_webhook_returns_configured_event() {
        let mock = MockPaymentProvider::new();
        let event = MockPaymentProvider::checkout_completed_event("usr_789");
        mock.set_webhook_event(event.clone());

        let result = mock.verify_webhook(b"{}", "signature").await.unwrap();

        assert_eq!(result.id, event.id);
        assert_eq!(result.event_type, WebhookEventType::CheckoutSessionCompleted);
    }

    #[tokio::test]
    async fn verify_webhook_parses_payload_when_no_event_set() {
        let mock = MockPaymentProvider::new();

        let payload = r#"{
            "id": "evt_test",
            "type": "checkout.session.completed",
            "created": 1704067200,
            "data": {"object": {"id": "cs_1", "metadata": {"userID": "abc"}}}
        }"#;
        let result = mock.verify_webhook(payload.as_bytes(), "sig").await.unwrap();

        assert_eq!(result.id, "evt_test");
        assert_eq!(result.created_at, 1704067200);
        match result.data {
            WebhookEventData::Checkout { user_id, .. } => {
                assert_eq!(user_id, Some("abc".to_string()))
            }
            _ => panic!("Expected Checkout data"),
        }
    }

    #[tokio::test]
    async fn verify_webhook_reports_bad_json_as_malformed() {
        let mock = MockPaymentProvider::new();

        let err = mock.verify_webhook(b"not json", "sig").await.unwrap_err();

        assert_eq!(err.code, PaymentErrorCode::MalformedEvent);
    }

    #[tokio::test]
    async fn rejecting_webhooks_fails_verification() {
        let mock = MockPaymentProvider::rejecting_webhooks();

        let err = mock.verify_webhook(b"{}", "signature").await.unwrap_err();

        assert_eq!(err.code, PaymentErrorCode::InvalidWebhook);
        assert!(err.message.contains("disabled"));
    }

    #[tokio::test]
    async fn requiring_signature_checks_exact_value() {
        let mock = MockPaymentProvider::requiring_signature("t=1,v1=ok");

        assert!(mock.verify_webhook(b"{}", "t=1,v1=ok").await.is_ok());
        let err = mock.verify_webhook(b"{}", "t=1,v1=bad").await.unwrap_err();
        assert_eq!(err.code, PaymentErrorCode::InvalidWebhook);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Helper Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn checkout_completed_event_has_correct_structure() {
        let event = MockPaymentProvider::checkout_completed_event("usr_3");

        assert!(event.id.starts_with("evt_checkout_"));
        assert_eq!(event.event_type, WebhookEventType::CheckoutSessionCompleted);
        match event.data {
            WebhookEventData::Checkout { user_id, .. } => {
                assert_eq!(user_id, Some("usr_3".to_string()));
            }
            _ => panic!("Expected Checkout data"),
        }
    }

    #[test]
    fn unrelated_event_keeps_type_name() {
        let event = MockPaymentProvider::unrelated_event("invoice.paid");
        assert_eq!(event.event_type.as_str(), "invoice.paid");
        assert!(matches!(event.data, WebhookEventData::Raw { .. }));
    }
}
