//! sms-optin-service HTTP Server
//!
//! Axum-based server providing the consent-capture and
//! subscription-checkout endpoints. Stripe is optional at startup:
//! without a secret key the checkout routes answer 503, but when the key
//! is present every tier must have a price mapping or startup fails.

mod handlers;
mod ip;
mod notify;
mod state;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use optin_payments::{BillingConfig, StripeGateway};
use optin_store::{JsonFileConsentLog, MemoryCheckoutStore, MemoryUserStore};

use crate::handlers::{
    confirm_subscription, create_checkout, health_check, method_not_allowed, opt_in,
};
use crate::notify::LogNotifier;
use crate::state::{AppState, BillingState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    // Consent log: whole-collection JSON rewrite, a placeholder for a
    // store with atomic appends
    let consent_log_path =
        std::env::var("CONSENT_LOG_PATH").unwrap_or_else(|_| "/tmp/sms_optins.json".into());
    tracing::info!(path = %consent_log_path, "Consent log");

    // Billing: optional, but fail fast on a partial configuration
    let billing = match StripeGateway::from_env() {
        Ok(gateway) => {
            let config = BillingConfig::from_env()?;
            tracing::info!("✓ Stripe configured");
            Some(BillingState {
                config,
                gateway: Arc::new(gateway),
            })
        }
        Err(_) => {
            tracing::warn!("⚠ Stripe not configured - checkout disabled");
            tracing::warn!("  Set STRIPE_SECRET_KEY and STRIPE_PRICE_LITE/PLUS/PRO in .env");
            None
        }
    };

    let state = AppState {
        consent_log: Arc::new(JsonFileConsentLog::new(consent_log_path)),
        checkout_store: Arc::new(MemoryCheckoutStore::new()),
        user_store: Arc::new(MemoryUserStore::new()),
        billing,
        notifier: Arc::new(LogNotifier),
        public_origin: std::env::var("PUBLIC_ORIGIN").ok(),
    };

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router; unsupported methods on API paths answer 405 with a
    // JSON body
    let app = Router::new()
        .route("/health", get(health_check))
        .route("/api/opt-in", post(opt_in).fallback(method_not_allowed))
        .route(
            "/api/checkout",
            post(create_checkout).fallback(method_not_allowed),
        )
        .route(
            "/api/checkout/confirm",
            post(confirm_subscription).fallback(method_not_allowed),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("sms-optin-service running on http://{}", addr);
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health                - Health check");
    tracing::info!("  POST /api/opt-in            - Record SMS consent");
    tracing::info!("  POST /api/checkout          - Create Stripe checkout");
    tracing::info!("  POST /api/checkout/confirm  - Confirm subscription");

    axum::serve(listener, app).await?;

    Ok(())
}
