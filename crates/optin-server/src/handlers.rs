//! HTTP Handlers
//!
//! Three POST endpoints: consent capture, checkout creation, checkout
//! confirmation. Validation and ownership checks always run before any
//! external side effect; upstream failures surface as 500 with no
//! rollback of earlier side effects in the same request.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header::HOST},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use optin_core::{CoachSubscription, ConsentRecord, OptInSubmission, Tier, validate::is_safe_user_id};
use optin_payments::{CheckoutIntent, SessionRequest};
use optin_store::CheckoutRecord;

use crate::ip::client_ip;
use crate::state::{AppState, BillingState};

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,

    /// Per-field validation messages, in form order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl ErrorResponse {
    fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    fn validation(details: Vec<String>) -> Self {
        Self {
            error: "Validation failed".into(),
            details: Some(details),
        }
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub stripe_configured: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptInResponse {
    pub ok: bool,
    pub message: &'static str,

    /// Server receipt time
    pub timestamp: DateTime<Utc>,

    /// Set when all four structured consent flags were confirmed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consent_confirmed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutCreateRequest {
    #[serde(default)]
    pub tier: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub checkout_id: Option<String>,
    #[serde(default)]
    pub consent: bool,
}

#[derive(Debug, Serialize)]
pub struct CheckoutCreateResponse {
    /// Hosted checkout page to redirect the user to
    pub url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmRequest {
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub tier: String,
    #[serde(default)]
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct ConfirmResponse {
    pub success: bool,

    /// Customer email from the processor session; null when Stripe has
    /// none on file
    pub email: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        stripe_configured: state.billing.is_some(),
    })
}

/// JSON body for unsupported methods on the API paths
pub async fn method_not_allowed() -> ApiError {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorResponse::new("Method not allowed")),
    )
}

/// Record an SMS opt-in consent submission
pub async fn opt_in(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(submission): Json<OptInSubmission>,
) -> Result<Json<OptInResponse>, ApiError> {
    let errors = submission.validation_errors();
    if !errors.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::validation(errors)),
        ));
    }

    // IP is derived server-side from transport headers; body values are
    // never trusted for the audited identity
    let ip = client_ip(&headers);
    let now = Utc::now();

    let mut record = ConsentRecord::build(submission, ip, now).map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::validation(e.details())),
        )
    })?;

    // Best-effort welcome message; the outcome lands on the record but a
    // failure never fails the opt-in
    record.welcome_message_sent = Some(state.notifier.send_welcome(&record).await);

    // Audit trail, emitted before the success response
    tracing::info!(
        timestamp = %record.received_at_utc_iso,
        phone = %record.phone_e164,
        name = %record.name,
        ip = %record.ip,
        user_agent = %record.user_agent_summary(),
        "SMS consent record received"
    );
    if let Ok(full) = serde_json::to_string(&record) {
        tracing::info!(record = %full, "Complete consent record");
    }

    state.consent_log.append(&record).await.map_err(|e| {
        tracing::error!("Failed to persist consent record: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new("Internal server error")),
        )
    })?;

    Ok(Json(OptInResponse {
        ok: true,
        message: "SMS consent recorded successfully",
        timestamp: record.received_at_utc_iso,
        consent_confirmed_at: record.consent_confirmed_at_utc_iso,
    }))
}

/// Create a subscription checkout session and a pending shadow record
pub async fn create_checkout(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CheckoutCreateRequest>,
) -> Result<Json<CheckoutCreateResponse>, ApiError> {
    let billing = require_billing(&state)?;

    let mut errors = Vec::new();
    if payload.tier.is_empty() || payload.email.is_empty() || payload.user_id.is_empty() {
        errors.push("Missing required fields: tier, email, userId".to_string());
    }
    if !is_safe_user_id(&payload.user_id) {
        errors.push("Invalid userId".to_string());
    }
    let tier = match Tier::parse(&payload.tier) {
        Ok(tier) => Some(tier),
        Err(e) => {
            if !payload.tier.is_empty() {
                errors.push(e.to_string());
            }
            None
        }
    };
    if !errors.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::validation(errors)),
        ));
    }
    // errors is empty, so the tier parsed
    let tier = tier.ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::validation(vec![
                "Missing required fields: tier, email, userId".to_string(),
            ])),
        )
    })?;

    let intent = CheckoutIntent {
        tier,
        email: payload.email,
        user_id: payload.user_id,
        checkout_id: payload.checkout_id,
        consent: payload.consent,
    };
    let request = SessionRequest::build(&billing.config, &intent, &request_origin(&state, &headers));

    let session = billing.gateway.create_session(request).await.map_err(|e| {
        tracing::error!("create-checkout error: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(e.user_message())),
        )
    })?;

    let shadow = CheckoutRecord::pending(
        session.id.clone(),
        tier,
        intent.email.clone(),
        intent.user_id.clone(),
        intent.checkout_id.clone(),
        intent.consent,
        Utc::now(),
    );
    state.checkout_store.put_pending(&shadow).await.map_err(|e| {
        // The processor session exists but the shadow record does not;
        // no rollback, the session is simply never confirmed
        tracing::error!(session_id = %session.id, "Failed to write pending checkout: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new("Internal server error")),
        )
    })?;

    Ok(Json(CheckoutCreateResponse { url: session.url }))
}

/// Confirm a completed checkout: verify payment and caller identity
/// against the processor session, then write the subscription and mark
/// the shadow record completed
pub async fn confirm_subscription(
    State(state): State<AppState>,
    Json(payload): Json<ConfirmRequest>,
) -> Result<Json<ConfirmResponse>, ApiError> {
    let billing = require_billing(&state)?;

    let mut errors = Vec::new();
    if payload.session_id.is_empty() || payload.tier.is_empty() || payload.user_id.is_empty() {
        errors.push("Missing required fields: sessionId, tier, userId".to_string());
    }
    if !is_safe_user_id(&payload.user_id) {
        errors.push("Invalid userId".to_string());
    }
    let tier = match Tier::parse(&payload.tier) {
        Ok(tier) => Some(tier),
        Err(e) => {
            if !payload.tier.is_empty() {
                errors.push(e.to_string());
            }
            None
        }
    };
    if !errors.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::validation(errors)),
        ));
    }
    let tier = tier.ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::validation(vec![
                "Missing required fields: sessionId, tier, userId".to_string(),
            ])),
        )
    })?;

    // Checkpoint 1: payment verification against the processor, not the
    // redirect. Trial-only sign-ups report no_payment_required.
    let session = billing
        .gateway
        .retrieve_session(&payload.session_id)
        .await
        .map_err(|e| {
            tracing::error!("confirm-subscription error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(e.user_message())),
            )
        })?;

    if !session.payment_verified() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Payment not completed")),
        ));
    }

    // Checkpoint 2: the caller must be the user the session was created
    // for. Mismatch writes nothing.
    if session.metadata_user_id() != Some(payload.user_id.as_str()) {
        return Err((
            StatusCode::FORBIDDEN,
            Json(ErrorResponse::new("User mismatch")),
        ));
    }

    let now = Utc::now();
    let subscription = CoachSubscription::activate(tier, &payload.session_id, now);

    // Two sequential, non-transactional writes. A failure between them
    // leaves the user subscribed with the shadow record still pending,
    // which is detectable and recoverable by replaying confirmation.
    state
        .user_store
        .apply_subscription(&payload.user_id, &subscription)
        .await
        .map_err(|e| {
            tracing::error!("Failed to write subscription: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Internal server error")),
            )
        })?;

    state
        .checkout_store
        .mark_completed(&payload.session_id, now)
        .await
        .map_err(|e| {
            tracing::error!(
                session_id = %payload.session_id,
                "Subscription written but checkout still pending: {}",
                e
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Internal server error")),
            )
        })?;

    tracing::info!(
        session_id = %payload.session_id,
        user_id = %payload.user_id,
        tier = %tier,
        "Checkout confirmed"
    );

    Ok(Json(ConfirmResponse {
        success: true,
        email: session.customer_email,
    }))
}

// ============================================================================
// Helpers
// ============================================================================

fn require_billing(state: &AppState) -> Result<&BillingState, ApiError> {
    state.billing.as_ref().ok_or_else(|| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse::new("Payments not configured")),
        )
    })
}

/// Origin for redirect URLs: configured override, else the Host header
fn request_origin(state: &AppState, headers: &HeaderMap) -> String {
    if let Some(origin) = &state.public_origin {
        return origin.clone();
    }
    let host = headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    format!("https://{host}")
}
