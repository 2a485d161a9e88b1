//! Checkout Gateway
//!
//! Abstraction over the payment processor's hosted-checkout API, plus a
//! mock implementation for tests. The Stripe implementation lives in
//! `stripe_gateway`.

mod mock;

pub use mock::MockCheckoutGateway;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use optin_core::Tier;

use crate::config::BillingConfig;
use crate::error::Result;

/// Processor-reported payment status of a checkout session
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaymentStatus {
    Paid,
    Unpaid,
    /// Zero due today, e.g. a trial-only sign-up
    NoPaymentRequired,
}

/// What a caller wants to buy
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CheckoutIntent {
    pub tier: Tier,
    pub email: String,
    pub user_id: String,

    /// Optional caller-supplied correlation id
    pub checkout_id: Option<String>,

    /// Whether the caller granted marketing consent alongside checkout
    pub consent: bool,
}

/// Fully resolved session-creation request sent to the processor
#[derive(Clone, Debug)]
pub struct SessionRequest {
    pub tier: Tier,
    pub customer_email: String,
    pub price_id: String,
    pub success_url: String,
    pub cancel_url: String,

    /// Zero means no trial on this session
    pub trial_days: u32,

    /// Session metadata; the processor constrains values to strings
    pub metadata: HashMap<String, String>,
}

impl SessionRequest {
    /// Resolve an intent against billing config and the request origin.
    ///
    /// The user id is percent-encoded into the redirect URLs; the
    /// `{CHECKOUT_SESSION_ID}` placeholder is substituted by the
    /// processor on redirect.
    pub fn build(config: &BillingConfig, intent: &CheckoutIntent, origin: &str) -> Self {
        let tier = intent.tier;
        let encoded_user_id = urlencoding::encode(&intent.user_id);

        let success_url = format!(
            "{origin}/subscribe/success?tier={tier}&userId={encoded_user_id}&session_id={{CHECKOUT_SESSION_ID}}"
        );
        let cancel_url = format!("{origin}/subscribe?tier={tier}&userId={encoded_user_id}");

        let mut metadata = HashMap::new();
        metadata.insert("tier".to_string(), tier.as_str().to_string());
        metadata.insert("userId".to_string(), intent.user_id.clone());
        metadata.insert(
            "checkoutId".to_string(),
            intent.checkout_id.clone().unwrap_or_default(),
        );
        metadata.insert(
            "consent".to_string(),
            if intent.consent { "true" } else { "false" }.to_string(),
        );

        Self {
            tier,
            customer_email: intent.email.clone(),
            price_id: config.price_id(tier).to_string(),
            success_url,
            cancel_url,
            trial_days: tier.trial_days(),
            metadata,
        }
    }
}

/// Session created at the processor
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreatedSession {
    /// Processor-issued opaque id
    pub id: String,

    /// Hosted checkout page to redirect the user to
    pub url: String,
}

/// Session state retrieved from the processor during confirmation
#[derive(Clone, Debug)]
pub struct SessionDetails {
    pub id: String,
    pub payment_status: PaymentStatus,

    /// A subscription object attached to the session also counts as
    /// payment evidence
    pub has_subscription: bool,

    pub metadata: HashMap<String, String>,
    pub customer_email: Option<String>,
}

impl SessionDetails {
    /// First confirmation checkpoint: paid, or a subscription attached,
    /// or nothing was due today (trial-only sign-up).
    pub fn payment_verified(&self) -> bool {
        matches!(
            self.payment_status,
            PaymentStatus::Paid | PaymentStatus::NoPaymentRequired
        ) || self.has_subscription
    }

    /// User id stored in session metadata at creation time
    pub fn metadata_user_id(&self) -> Option<&str> {
        self.metadata.get("userId").map(String::as_str)
    }
}

/// Payment-processor checkout API
#[async_trait]
pub trait CheckoutGateway: Send + Sync {
    /// Create a hosted checkout session
    async fn create_session(&self, request: SessionRequest) -> Result<CreatedSession>;

    /// Retrieve a session's current state for verification
    async fn retrieve_session(&self, session_id: &str) -> Result<SessionDetails>;
}
