//! HTTP handlers for payment endpoints.
//!
//! These handlers connect Axum routes to application layer command/query handlers.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Json, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::adapters::http::middleware::RequireActor;
use crate::application::handlers::payment::{
    CreateManualPaymentCommand, CreateManualPaymentHandler, CreatePaymentIntentCommand,
    CreatePaymentIntentHandler, GetPaymentHandler, GetPaymentQuery, ListLeasePaymentsHandler,
    ListLeasePaymentsQuery, PaymentSettings, ReceiveProcessorWebhookCommand,
    ReceiveProcessorWebhookHandler,
};
use crate::domain::foundation::{LeaseId, PaymentId, Timestamp};
use crate::domain::payment::{PaymentError, ReconciliationError};
use crate::ports::{LeaseRegistry, PaymentRepository, ProcessorClient, ProcessorEventQueue};

use super::dto::{
    CreateManualPaymentRequest, CreatePaymentIntentRequest, ErrorResponse,
    LeasePaymentsResponse, PaymentDetailsResponse, PaymentIntentResponse, PaymentResponse,
    WebhookAck,
};

/// Header carrying the processor's webhook signature.
pub const SIGNATURE_HEADER: &str = "Stripe-Signature";

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies.
///
/// Cloned for each request; handlers are built on demand from it.
#[derive(Clone)]
pub struct PaymentAppState {
    pub leases: Arc<dyn LeaseRegistry>,
    pub payments: Arc<dyn PaymentRepository>,
    pub processor: Arc<dyn ProcessorClient>,
    pub event_queue: Arc<dyn ProcessorEventQueue>,
    pub settings: PaymentSettings,
}

impl PaymentAppState {
    pub fn create_intent_handler(&self) -> CreatePaymentIntentHandler {
        CreatePaymentIntentHandler::new(
            self.leases.clone(),
            self.payments.clone(),
            self.processor.clone(),
            self.settings.clone(),
        )
    }

    pub fn create_manual_handler(&self) -> CreateManualPaymentHandler {
        CreateManualPaymentHandler::new(
            self.leases.clone(),
            self.payments.clone(),
            self.settings.clone(),
        )
    }

    pub fn get_payment_handler(&self) -> GetPaymentHandler {
        GetPaymentHandler::new(self.leases.clone(), self.payments.clone())
    }

    pub fn list_lease_payments_handler(&self) -> ListLeasePaymentsHandler {
        ListLeasePaymentsHandler::new(self.leases.clone(), self.payments.clone())
    }

    pub fn webhook_handler(&self) -> ReceiveProcessorWebhookHandler {
        ReceiveProcessorWebhookHandler::new(self.processor.clone(), self.event_queue.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Command Handlers (POST endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/payments/intent - Open a processor payment intent for a lease
pub async fn create_payment_intent(
    State(state): State<PaymentAppState>,
    RequireActor(actor): RequireActor,
    Json(request): Json<CreatePaymentIntentRequest>,
) -> Result<impl IntoResponse, PaymentApiError> {
    let cmd = CreatePaymentIntentCommand {
        lease_id: request.lease_id,
        tenant_id: actor.user_id,
        amount: request.amount,
        payment_type: request.payment_type,
        due_date: request.due_date.map(Timestamp::from_datetime),
        description: request.description,
    };

    let result = state.create_intent_handler().handle(cmd).await?;

    Ok(Json(PaymentIntentResponse::from(result)))
}

/// POST /api/payments/manual - Record a payment received outside the processor
pub async fn create_manual_payment(
    State(state): State<PaymentAppState>,
    RequireActor(actor): RequireActor,
    Json(request): Json<CreateManualPaymentRequest>,
) -> Result<impl IntoResponse, PaymentApiError> {
    let cmd = CreateManualPaymentCommand {
        lease_id: request.lease_id,
        landlord_id: actor.user_id,
        amount: request.amount,
        paid_at: request.paid_at.map(Timestamp::from_datetime),
        payment_type: request.payment_type,
        description: request.description,
    };

    let payment = state.create_manual_handler().handle(cmd).await?;

    Ok(Json(PaymentResponse::created(payment)))
}

/// POST /api/webhooks/processor - Accept a processor webhook delivery
///
/// Only signature failures are reported as errors. Every authenticated
/// delivery is acknowledged, even when its payload cannot be used.
pub async fn receive_processor_webhook(
    State(state): State<PaymentAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let cmd = ReceiveProcessorWebhookCommand {
        payload: body.to_vec(),
        signature,
    };

    match state.webhook_handler().handle(cmd).await {
        Ok(_) => (StatusCode::OK, Json(WebhookAck { received: true })).into_response(),
        Err(err) if err.is_acknowledged() => {
            tracing::warn!(error = %err, "Acknowledging unusable processor webhook");
            (StatusCode::OK, Json(WebhookAck { received: true })).into_response()
        }
        Err(err) => WebhookApiError(err).into_response(),
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Query Handlers (GET endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/payments/:id - Fetch a payment with its lease summary
pub async fn get_payment(
    State(state): State<PaymentAppState>,
    RequireActor(actor): RequireActor,
    Path(payment_id): Path<String>,
) -> Result<impl IntoResponse, PaymentApiError> {
    let payment_id: PaymentId = payment_id
        .parse()
        .map_err(|_| PaymentError::validation("id", "Payment id must be a UUID"))?;

    let details = state
        .get_payment_handler()
        .handle(GetPaymentQuery { payment_id, actor })
        .await?;

    Ok(Json(PaymentDetailsResponse::from(details)))
}

/// GET /api/leases/:lease_id/payments - Payment history of a lease, newest first
pub async fn list_lease_payments(
    State(state): State<PaymentAppState>,
    RequireActor(actor): RequireActor,
    Path(lease_id): Path<String>,
) -> Result<impl IntoResponse, PaymentApiError> {
    let lease_id: LeaseId = lease_id
        .parse()
        .map_err(|_| PaymentError::validation("lease_id", "Lease id must be a UUID"))?;

    let history = state
        .list_lease_payments_handler()
        .handle(ListLeasePaymentsQuery { lease_id, actor })
        .await?;

    Ok(Json(LeasePaymentsResponse::from(history)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts payment errors to HTTP responses.
#[derive(Debug)]
pub struct PaymentApiError(PaymentError);

impl From<PaymentError> for PaymentApiError {
    fn from(err: PaymentError) -> Self {
        Self(err)
    }
}

impl PaymentApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            PaymentError::ValidationFailed { .. } => StatusCode::BAD_REQUEST,
            PaymentError::Forbidden { .. } => StatusCode::FORBIDDEN,
            PaymentError::LeaseNotFound(_) | PaymentError::PaymentNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            PaymentError::ProcessorRejected { .. } => StatusCode::BAD_REQUEST,
            PaymentError::ProcessorUnavailable { .. } => StatusCode::BAD_GATEWAY,
            PaymentError::ProcessorTimeout => StatusCode::GATEWAY_TIMEOUT,
            PaymentError::Infrastructure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PaymentApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Payment request failed");
        }

        let mut body = ErrorResponse::new(self.0.code().to_string(), self.0.message());
        match &self.0 {
            PaymentError::ValidationFailed { field, .. } => {
                body = body.with_detail("field", field.as_str());
            }
            PaymentError::LeaseNotFound(id) => {
                body = body.with_detail("leaseId", id.to_string());
            }
            PaymentError::PaymentNotFound(id) => {
                body = body.with_detail("paymentId", id.to_string());
            }
            _ => {}
        }

        (status, Json(body)).into_response()
    }
}

/// Rejection of a webhook delivery.
struct WebhookApiError(ReconciliationError);

impl IntoResponse for WebhookApiError {
    fn into_response(self) -> Response {
        let code = match &self.0 {
            ReconciliationError::MissingSignature => "MISSING_SIGNATURE",
            ReconciliationError::InvalidSignature => "INVALID_SIGNATURE",
            ReconciliationError::QueueClosed | ReconciliationError::QueueFull => {
                "SERVICE_UNAVAILABLE"
            }
            _ => "WEBHOOK_ERROR",
        };
        let body = ErrorResponse::new(code, self.0.to_string());
        (self.0.status_code(), Json(body)).into_response()
    }
}
