//! Axum router configuration for payment endpoints.
//!
//! This module defines the route structure for payment-related API endpoints
//! and wires them to their corresponding handlers.

use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use crate::adapters::http::middleware::{auth_middleware, AuthState};

use super::handlers::{
    create_manual_payment, create_payment_intent, get_payment, list_lease_payments,
    receive_processor_webhook, PaymentAppState,
};

/// Create the payment API router.
///
/// # Routes (require authentication)
/// - `POST /payments/intent` - Open a processor payment intent
/// - `POST /payments/manual` - Record an off-processor payment
/// - `GET /payments/:id` - Fetch one payment
/// - `GET /leases/:lease_id/payments` - Payment history of a lease
pub fn payment_routes() -> Router<PaymentAppState> {
    Router::new()
        .route("/payments/intent", post(create_payment_intent))
        .route("/payments/manual", post(create_manual_payment))
        .route("/payments/:id", get(get_payment))
        .route("/leases/:lease_id/payments", get(list_lease_payments))
}

/// Create the processor webhook router.
///
/// Webhooks carry no bearer token; they are verified via signature.
///
/// # Routes
/// - `POST /processor` - Receive processor webhooks
pub fn webhook_routes() -> Router<PaymentAppState> {
    Router::new().route("/processor", post(receive_processor_webhook))
}

/// Create the complete payment service router.
///
/// Mounts authenticated routes under `/api`, webhooks under `/api/webhooks`
/// and a liveness probe at `/health`.
///
/// # Example
///
/// ```ignore
/// let app = payment_router(app_state, Arc::new(validator));
/// axum::serve(listener, app).await?;
/// ```
pub fn payment_router(state: PaymentAppState, auth: AuthState) -> Router {
    let authenticated =
        payment_routes().layer(middleware::from_fn_with_state(auth, auth_middleware));

    Router::new()
        .nest("/api", authenticated)
        .nest("/api/webhooks", webhook_routes())
        .route("/health", get(health))
        .with_state(state)
}

/// GET /health - Liveness probe
async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
