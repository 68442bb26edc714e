//! Rent Payments API server
//!
//! Wires configuration, PostgreSQL, Stripe and the reconciliation worker
//! into the axum router and serves it until ctrl-c.

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use secrecy::ExposeSecret;
use tokio::sync::watch;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing_subscriber::EnvFilter;

use rent_payments::adapters::http::{payment_router, PaymentAppState};
use rent_payments::adapters::{
    reconciliation_channel, JwtSessionValidator, PostgresLeaseRegistry,
    PostgresPaymentRepository, StripeConfig, StripeProcessorClient,
};
use rent_payments::application::{PaymentSettings, ReconcilePaymentHandler, ReconcilerConfig};
use rent_payments::config::{AppConfig, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    init_tracing(&config);
    config.validate()?;

    tracing::info!(
        "Starting rent-payments v{} ({:?})",
        env!("CARGO_PKG_VERSION"),
        config.server.environment
    );
    if config.is_production() && config.payment.is_test_mode() {
        tracing::warn!("Production environment is using a Stripe test key");
    }

    tracing::info!("Connecting to database...");
    let pool = config
        .database
        .pool_options()
        .connect(&config.database.url)
        .await?;
    tracing::info!("Database connection established");

    let payments = Arc::new(PostgresPaymentRepository::new(pool.clone()));
    let leases = Arc::new(PostgresLeaseRegistry::new(pool));

    let payment = &config.payment;
    let mut stripe = StripeConfig::new(
        payment.stripe_api_key.expose_secret().as_str(),
        payment.stripe_webhook_secret.expose_secret().as_str(),
    )
    .with_require_livemode(payment.require_livemode);
    if let Some(url) = &payment.stripe_api_base_url {
        stripe = stripe.with_base_url(url.as_str());
    }
    let processor = Arc::new(StripeProcessorClient::new(stripe));

    let reconciler = Arc::new(ReconcilePaymentHandler::with_config(
        payments.clone(),
        ReconcilerConfig::default()
            .with_max_attempts(payment.reconcile_max_attempts)
            .with_initial_backoff(payment.reconcile_backoff()),
    ));
    let (queue, worker) = reconciliation_channel(payment.queue_capacity, reconciler);
    let worker = worker.with_max_in_flight(payment.reconcile_concurrency);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let worker_task = tokio::spawn(worker.run(shutdown_rx));
    tracing::info!(
        capacity = payment.queue_capacity,
        concurrency = payment.reconcile_concurrency,
        "Reconciliation worker started"
    );

    let state = PaymentAppState {
        leases,
        payments,
        processor,
        event_queue: Arc::new(queue),
        settings: PaymentSettings::default()
            .with_currency(payment.currency.as_str())
            .with_platform_fee_bps(payment.platform_fee_bps)
            .with_processor_timeout(payment.processor_timeout()),
    };
    let validator = Arc::new(JwtSessionValidator::new(
        &config.auth.jwt_secret,
        config.auth.jwt_issuer.as_deref(),
    ));

    let app = payment_router(state, validator)
        .layer(TimeoutLayer::new(config.server.request_timeout()))
        .layer(cors_layer(&config.server))
        .layer(TraceLayer::new_for_http());

    let addr = config.server.socket_addr()?;
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router, and with it every queue handle, is gone; let the worker drain
    shutdown_tx.send(true).ok();
    match worker_task.await {
        Ok(processed) => tracing::info!(processed, "Shutdown complete"),
        Err(e) => tracing::error!(error = %e, "Reconciliation worker panicked"),
    }

    Ok(())
}

/// JSON logs in production, human-readable output elsewhere.
fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.is_production() {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    tracing::info!(allowed_origins = ?origins, "CORS configured");

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
