//! Application State

use std::sync::Arc;

use optin_payments::{BillingConfig, CheckoutGateway};
use optin_store::{CheckoutStore, ConsentLog, UserStore};

use crate::notify::Notifier;

/// Billing wiring, present only when Stripe is configured
#[derive(Clone)]
pub struct BillingState {
    /// Immutable tier-to-price mapping, validated at startup
    pub config: BillingConfig,

    /// Payment-processor client
    pub gateway: Arc<dyn CheckoutGateway>,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Append-only consent record log
    pub consent_log: Arc<dyn ConsentLog>,

    /// Checkout shadow records, keyed by processor session id
    pub checkout_store: Arc<dyn CheckoutStore>,

    /// User records carrying the embedded subscription
    pub user_store: Arc<dyn UserStore>,

    /// Billing (None if Stripe is not configured - checkout disabled)
    pub billing: Option<BillingState>,

    /// Best-effort welcome notification stub
    pub notifier: Arc<dyn Notifier>,

    /// Fixed origin for redirect URLs; falls back to the Host header
    pub public_origin: Option<String>,
}
