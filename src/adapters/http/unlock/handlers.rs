//! HTTP handlers for unlock endpoints.
//!
//! These handlers connect Axum routes to application layer command/query handlers.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;

use crate::application::handlers::unlock::{
    CheckoutSettings, CreateCheckoutSessionCommand, CreateCheckoutSessionHandler,
    GetUnlockStatusHandler, GetUnlockStatusQuery, HandlePaymentWebhookCommand,
    HandlePaymentWebhookHandler,
};
use crate::domain::unlock::UnlockError;
use crate::ports::{PaymentProvider, UnlockLedger};

use super::dto::{
    CardStatusQuery, CardStatusResponse, CheckoutSessionResponse, CreateCheckoutSessionRequest,
    ErrorResponse,
};

/// Header carrying the provider's webhook signature.
pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// Body of the liveness endpoint.
pub const LIVENESS_MESSAGE: &str = "card unlock service is running";

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies.
///
/// Cloned per request; every dependency is behind an `Arc`.
#[derive(Clone)]
pub struct UnlockAppState {
    pub ledger: Arc<dyn UnlockLedger>,
    pub payment_provider: Arc<dyn PaymentProvider>,
    pub checkout: CheckoutSettings,
}

impl UnlockAppState {
    pub fn new(
        ledger: Arc<dyn UnlockLedger>,
        payment_provider: Arc<dyn PaymentProvider>,
        checkout: CheckoutSettings,
    ) -> Self {
        Self {
            ledger,
            payment_provider,
            checkout,
        }
    }

    /// Create handlers on demand from the shared state.
    pub fn create_checkout_session_handler(&self) -> CreateCheckoutSessionHandler {
        CreateCheckoutSessionHandler::new(self.payment_provider.clone(), self.checkout.clone())
    }

    pub fn webhook_handler(&self) -> HandlePaymentWebhookHandler {
        HandlePaymentWebhookHandler::new(self.ledger.clone(), self.payment_provider.clone())
    }

    pub fn unlock_status_handler(&self) -> GetUnlockStatusHandler {
        GetUnlockStatusHandler::new(self.ledger.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Query Handlers (GET endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// GET / - Liveness check
pub async fn liveness() -> &'static str {
    LIVENESS_MESSAGE
}

/// GET /card-status?userID=... - Whether the user has unlocked the card
///
/// Always 200; an unparseable query string reads the same as a missing id.
pub async fn card_status(
    State(state): State<UnlockAppState>,
    query: Option<Query<CardStatusQuery>>,
) -> impl IntoResponse {
    let user_id = query.and_then(|Query(q)| q.user_id);

    let handler = state.unlock_status_handler();
    let purchased = handler.handle(GetUnlockStatusQuery { user_id }).await;

    Json(CardStatusResponse { purchased })
}

// ════════════════════════════════════════════════════════════════════════════════
// Command Handlers (POST endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// POST /create-checkout-session - Start a purchase for a user
pub async fn create_checkout_session(
    State(state): State<UnlockAppState>,
    request: Result<Json<CreateCheckoutSessionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, UnlockApiError> {
    let Json(request) = request.map_err(|rejection| {
        tracing::warn!(error = %rejection.body_text(), "Rejected checkout request body");
        UnlockError::validation("body", rejection.body_text())
    })?;

    let handler = state.create_checkout_session_handler();
    let cmd = CreateCheckoutSessionCommand {
        user_id: request.user_id,
    };

    let result = handler.handle(cmd).await?;

    Ok(Json(CheckoutSessionResponse { url: result.url }))
}

/// POST /webhook - Handle Stripe webhook events
///
/// Takes the body as raw bytes; the signature covers the exact bytes sent.
pub async fn handle_webhook(
    State(state): State<UnlockAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, UnlockApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    let handler = state.webhook_handler();
    let cmd = HandlePaymentWebhookCommand {
        payload: body.to_vec(),
        signature,
    };

    handler.handle(cmd).await?;

    Ok(StatusCode::OK)
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts domain errors to HTTP responses.
#[derive(Debug)]
pub struct UnlockApiError(UnlockError);

impl From<UnlockError> for UnlockApiError {
    fn from(err: UnlockError) -> Self {
        Self(err)
    }
}

impl UnlockApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            UnlockError::ValidationFailed { .. } | UnlockError::Authentication(_) => {
                StatusCode::BAD_REQUEST
            }
            UnlockError::Upstream(_) | UnlockError::Infrastructure(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for UnlockApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let body = ErrorResponse::new(self.0.code(), self.0.message());
        (status, Json(body)).into_response()
    }
}
