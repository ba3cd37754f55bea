//! Axum router configuration for unlock endpoints.
//!
//! Defines the route table and wraps it in the cross-cutting HTTP layers
//! (request ids, tracing, timeout, CORS).

use axum::body::Body;
use axum::{
    routing::{get, post},
    Router,
};
use http::{HeaderValue, Request};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;

use super::handlers::{
    card_status, create_checkout_session, handle_webhook, liveness, UnlockAppState,
};

/// Create the unlock API router.
///
/// # Routes
/// - `GET /` - Liveness check
/// - `POST /create-checkout-session` - Start a purchase
/// - `POST /webhook` - Stripe webhook (signature verified, raw body)
/// - `GET /card-status` - Whether a user has unlocked the card
pub fn unlock_routes() -> Router<UnlockAppState> {
    Router::new()
        .route("/", get(liveness))
        .route("/create-checkout-session", post(create_checkout_session))
        .route("/webhook", post(handle_webhook))
        .route("/card-status", get(card_status))
}

/// Create the complete application router with state and HTTP layers applied.
///
/// # Example
///
/// ```ignore
/// let state = UnlockAppState::new(ledger, provider, checkout);
/// let app = build_router(state, &config.server);
/// axum::serve(listener, app).await?;
/// ```
pub fn build_router(state: UnlockAppState, server: &ServerConfig) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TimeoutLayer::new(server.request_timeout()))
        .layer(cors_layer(&server.cors_origins_list()));

    unlock_routes().layer(middleware).with_state(state)
}

/// Build the CORS layer.
///
/// An empty list or a `*` entry allows any origin; otherwise only the listed
/// origins are allowed. Entries that are not valid header values are skipped.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return base.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!(origin = %o, error = %e, "Skipping invalid CORS origin");
                None
            }
        })
        .collect();

    base.allow_origin(AllowOrigin::list(allowed))
}
