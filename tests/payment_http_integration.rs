//! Integration tests for payment HTTP endpoints.
//!
//! These tests drive the full router with in-memory adapters:
//! 1. Bearer tokens resolve to actors through the auth middleware
//! 2. Intents and manual payments are persisted through the handlers
//! 3. Signed webhooks are queued and applied by the reconciliation worker

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tokio::sync::watch;
use tower::ServiceExt;

use rent_payments::adapters::http::{payment_router, PaymentAppState};
use rent_payments::adapters::{
    reconciliation_channel, InMemoryLeaseRegistry, InMemoryPaymentRepository,
    MockProcessorClient, MockSessionValidator, MOCK_WEBHOOK_SIGNATURE,
};
use rent_payments::application::{PaymentSettings, ReconcilePaymentHandler, ReconcilerConfig};
use rent_payments::domain::foundation::{LeaseId, PropertyId, UserId};
use rent_payments::domain::payment::{LeaseSummary, ProcessorEvent, TenantSummary};

// =============================================================================
// Test Infrastructure
// =============================================================================

const TENANT_TOKEN: &str = "tenant-token";
const OTHER_TENANT_TOKEN: &str = "other-tenant-token";
const LANDLORD_TOKEN: &str = "landlord-token";

struct TestApp {
    router: Router,
    lease: LeaseSummary,
    processor: MockProcessorClient,
    _shutdown: watch::Sender<bool>,
}

fn lease() -> LeaseSummary {
    LeaseSummary {
        id: LeaseId::new(),
        tenant: TenantSummary {
            id: UserId::new("tenant-1").unwrap(),
            name: "Tina Tenant".to_string(),
            email: "tina@example.com".to_string(),
        },
        property_id: PropertyId::new(),
        landlord_id: UserId::new("landlord-1").unwrap(),
        monthly_rent: "1200.00".parse().unwrap(),
        status: "active".to_string(),
    }
}

fn setup() -> TestApp {
    let lease = lease();
    let leases = Arc::new(InMemoryLeaseRegistry::with_leases([lease.clone()]));
    let payments = Arc::new(InMemoryPaymentRepository::new());
    let processor = MockProcessorClient::new();

    let reconciler = Arc::new(ReconcilePaymentHandler::with_config(
        payments.clone(),
        ReconcilerConfig::default()
            .with_max_attempts(2)
            .with_initial_backoff(Duration::from_millis(5)),
    ));
    let (queue, worker) = reconciliation_channel(16, reconciler);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(worker.run(shutdown_rx));

    let state = PaymentAppState {
        leases,
        payments,
        processor: Arc::new(processor.clone()),
        event_queue: Arc::new(queue),
        settings: PaymentSettings::default(),
    };
    let validator = MockSessionValidator::new()
        .with_tenant(TENANT_TOKEN, "tenant-1")
        .with_tenant(OTHER_TENANT_TOKEN, "tenant-2")
        .with_landlord(LANDLORD_TOKEN, "landlord-1");

    TestApp {
        router: payment_router(state, Arc::new(validator)),
        lease,
        processor,
        _shutdown: shutdown_tx,
    }
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::post(uri).header("Content-Type", "application/json");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, token: &str) -> Request<Body> {
    Request::get(uri)
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

fn webhook(event: &ProcessorEvent, signature: Option<&str>) -> Request<Body> {
    let mut builder = Request::post("/api/webhooks/processor");
    if let Some(signature) = signature {
        builder = builder.header("Stripe-Signature", signature);
    }
    builder
        .body(Body::from(serde_json::to_vec(event).unwrap()))
        .unwrap()
}

fn decimal(value: &Value) -> Decimal {
    value.as_str().unwrap().parse().unwrap()
}

/// Polls a payment until its status matches; the worker applies events asynchronously.
async fn wait_for_status(app: &TestApp, payment_id: &str, expected: &str) -> Value {
    for _ in 0..100 {
        let (status, body) = send(
            &app.router,
            get(&format!("/api/payments/{}", payment_id), TENANT_TOKEN),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        if body["status"] == expected {
            return body;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("payment {} never reached {}", payment_id, expected);
}

// =============================================================================
// Payment lifecycle
// =============================================================================

#[tokio::test]
async fn intent_is_settled_by_webhook_and_redelivery_is_harmless() {
    let app = setup();

    let (status, intent) = send(
        &app.router,
        post_json(
            "/api/payments/intent",
            Some(TENANT_TOKEN),
            json!({ "leaseId": app.lease.id, "amount": "1200.00" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal(&intent["amount"]), "1200".parse::<Decimal>().unwrap());
    assert!(intent["clientToken"].as_str().unwrap().starts_with("pi_mock_"));
    let payment_id = intent["paymentId"].as_str().unwrap().to_string();

    let (_, pending) = send(
        &app.router,
        get(&format!("/api/payments/{}", payment_id), TENANT_TOKEN),
    )
    .await;
    assert_eq!(pending["status"], "PENDING");
    assert_eq!(pending["provider"], "processor");
    assert_eq!(decimal(&pending["feeAmount"]), "30".parse::<Decimal>().unwrap());
    assert_eq!(decimal(&pending["netAmount"]), "1170".parse::<Decimal>().unwrap());
    assert_eq!(pending["lease"]["tenant"]["name"], "Tina Tenant");
    let intent_id = pending["providerIntentId"].as_str().unwrap().to_string();

    let event = ProcessorEvent::succeeded("evt_1", intent_id.as_str());
    let (status, ack) = send(&app.router, webhook(&event, Some(MOCK_WEBHOOK_SIGNATURE))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack, json!({ "received": true }));

    let paid = wait_for_status(&app, &payment_id, "PAID").await;
    assert!(paid["paidDate"].is_string());

    // Redelivery and a late failure both leave the paid record untouched
    let (status, _) = send(&app.router, webhook(&event, Some(MOCK_WEBHOOK_SIGNATURE))).await;
    assert_eq!(status, StatusCode::OK);
    let late_failure = ProcessorEvent::failed("evt_2", intent_id.as_str());
    let (status, _) = send(
        &app.router,
        webhook(&late_failure, Some(MOCK_WEBHOOK_SIGNATURE)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    tokio::time::sleep(Duration::from_millis(50)).await;

    let after = wait_for_status(&app, &payment_id, "PAID").await;
    assert_eq!(after["paidDate"], paid["paidDate"]);
    assert_eq!(after["updatedAt"], paid["updatedAt"]);

    // Manual payment by the landlord shows up next to the settled intent
    let (status, manual) = send(
        &app.router,
        post_json(
            "/api/payments/manual",
            Some(LANDLORD_TOKEN),
            json!({
                "leaseId": app.lease.id,
                "amount": 75,
                "type": "FEE",
                "description": "Cash"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(manual["status"], "PAID");
    assert_eq!(manual["provider"], "manual");
    assert!(manual["providerIntentId"].is_null());

    let (status, history) = send(
        &app.router,
        get(&format!("/api/leases/{}/payments", app.lease.id), LANDLORD_TOKEN),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let payments = history["payments"].as_array().unwrap();
    assert_eq!(payments.len(), 2);
    assert!(payments.iter().all(|p| p["status"] == "PAID"));
}

#[tokio::test]
async fn failed_webhook_marks_payment_failed() {
    let app = setup();

    let (_, intent) = send(
        &app.router,
        post_json(
            "/api/payments/intent",
            Some(TENANT_TOKEN),
            json!({ "leaseId": app.lease.id, "amount": 600 }),
        ),
    )
    .await;
    let payment_id = intent["paymentId"].as_str().unwrap().to_string();
    let request = app.processor.last_create_request().unwrap();
    assert_eq!(request.idempotency_key, format!("payment-intent-{}", payment_id));

    let (_, pending) = send(
        &app.router,
        get(&format!("/api/payments/{}", payment_id), TENANT_TOKEN),
    )
    .await;
    let intent_id = pending["providerIntentId"].as_str().unwrap();

    let event = ProcessorEvent::failed("evt_9", intent_id);
    let (status, _) = send(&app.router, webhook(&event, Some(MOCK_WEBHOOK_SIGNATURE))).await;
    assert_eq!(status, StatusCode::OK);

    let failed = wait_for_status(&app, &payment_id, "FAILED").await;
    assert!(failed["paidDate"].is_null());
}

// =============================================================================
// Authentication and authorization
// =============================================================================

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let app = setup();

    let (status, body) = send(
        &app.router,
        post_json(
            "/api/payments/intent",
            None,
            json!({ "leaseId": app.lease.id, "amount": 100 }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
    assert_eq!(app.processor.create_calls(), 0);
}

#[tokio::test]
async fn unknown_token_is_unauthorized() {
    let app = setup();

    let (status, _) = send(
        &app.router,
        get(&format!("/api/leases/{}/payments", app.lease.id), "forged"),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn other_tenant_cannot_pay_or_read() {
    let app = setup();

    let (status, body) = send(
        &app.router,
        post_json(
            "/api/payments/intent",
            Some(OTHER_TENANT_TOKEN),
            json!({ "leaseId": app.lease.id, "amount": 100 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
    assert_eq!(app.processor.create_calls(), 0);

    let (status, _) = send(
        &app.router,
        get(&format!("/api/leases/{}/payments", app.lease.id), OTHER_TENANT_TOKEN),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn tenant_cannot_record_manual_payment() {
    let app = setup();

    let (status, _) = send(
        &app.router,
        post_json(
            "/api/payments/manual",
            Some(TENANT_TOKEN),
            json!({ "leaseId": app.lease.id, "amount": 100 }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

// =============================================================================
// Validation and lookups
// =============================================================================

#[tokio::test]
async fn non_positive_amount_is_rejected() {
    let app = setup();

    let (status, body) = send(
        &app.router,
        post_json(
            "/api/payments/intent",
            Some(TENANT_TOKEN),
            json!({ "leaseId": app.lease.id, "amount": 0 }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_FAILED");
    assert_eq!(body["details"]["field"], "amount");
    assert_eq!(app.processor.create_calls(), 0);
}

#[tokio::test]
async fn oversized_amount_is_rejected_not_panicking() {
    let app = setup();

    for (uri, token) in [
        ("/api/payments/intent", TENANT_TOKEN),
        ("/api/payments/manual", LANDLORD_TOKEN),
    ] {
        let (status, body) = send(
            &app.router,
            post_json(
                uri,
                Some(token),
                json!({ "leaseId": app.lease.id, "amount": "79228162514264337593543950335" }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_FAILED");
        assert_eq!(body["details"]["field"], "amount");
    }
    assert_eq!(app.processor.create_calls(), 0);
}

#[tokio::test]
async fn unknown_lease_and_payment_are_not_found() {
    let app = setup();

    let (status, body) = send(
        &app.router,
        post_json(
            "/api/payments/intent",
            Some(TENANT_TOKEN),
            json!({ "leaseId": LeaseId::new(), "amount": 100 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "LEASE_NOT_FOUND");

    let (status, body) = send(
        &app.router,
        get(
            "/api/payments/00000000-0000-0000-0000-000000000000",
            TENANT_TOKEN,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "PAYMENT_NOT_FOUND");
}

#[tokio::test]
async fn malformed_payment_id_is_bad_request() {
    let app = setup();

    let (status, _) = send(&app.router, get("/api/payments/not-a-uuid", TENANT_TOKEN)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Webhook intake
// =============================================================================

#[tokio::test]
async fn webhook_without_signature_is_bad_request() {
    let app = setup();

    let event = ProcessorEvent::succeeded("evt_1", "pi_mock_1");
    let (status, body) = send(&app.router, webhook(&event, None)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "MISSING_SIGNATURE");
}

#[tokio::test]
async fn webhook_with_bad_signature_is_unauthorized() {
    let app = setup();

    let event = ProcessorEvent::succeeded("evt_1", "pi_mock_1");
    let (status, body) = send(&app.router, webhook(&event, Some("t=1,v1=forged"))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "INVALID_SIGNATURE");
}

#[tokio::test]
async fn signed_webhook_for_unknown_intent_is_acknowledged() {
    let app = setup();

    let event = ProcessorEvent::succeeded("evt_1", "pi_unknown");
    let (status, body) = send(&app.router, webhook(&event, Some(MOCK_WEBHOOK_SIGNATURE))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["received"], true);
}

#[tokio::test]
async fn health_needs_no_token() {
    let app = setup();

    let request = Request::get("/health").body(Body::empty()).unwrap();
    let (status, body) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
