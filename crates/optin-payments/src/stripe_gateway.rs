//! Stripe Checkout Integration
//!
//! Implements the "Stripe Checkout (Hosted)" approach: the service
//! creates a session, redirects the user to Stripe's hosted page, and
//! later verifies the session server-side during confirmation.

use async_trait::async_trait;
use std::collections::HashMap;
use stripe::{
    CheckoutSession as StripeCheckoutSession, CheckoutSessionId, CheckoutSessionMode,
    CheckoutSessionPaymentStatus, Client, CreateCheckoutSession, CreateCheckoutSessionLineItems,
    CreateCheckoutSessionPaymentMethodTypes, CreateCheckoutSessionSubscriptionData,
};

use crate::error::{PaymentError, Result};
use crate::gateway::{
    CheckoutGateway, CreatedSession, PaymentStatus, SessionDetails, SessionRequest,
};

/// Stripe client wrapper
pub struct StripeGateway {
    client: Client,
}

impl StripeGateway {
    /// Create a new Stripe gateway
    pub fn new(secret_key: &str) -> Self {
        Self {
            client: Client::new(secret_key),
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        let secret_key = std::env::var("STRIPE_SECRET_KEY")
            .map_err(|_| PaymentError::Config("STRIPE_SECRET_KEY not set".into()))?;
        Ok(Self::new(&secret_key))
    }
}

#[async_trait]
impl CheckoutGateway for StripeGateway {
    async fn create_session(&self, request: SessionRequest) -> Result<CreatedSession> {
        let mut params = CreateCheckoutSession::new();
        params.mode = Some(CheckoutSessionMode::Subscription);
        params.payment_method_types = Some(vec![CreateCheckoutSessionPaymentMethodTypes::Card]);
        params.customer_email = Some(&request.customer_email);
        params.success_url = Some(&request.success_url);
        params.cancel_url = Some(&request.cancel_url);

        params.line_items = Some(vec![CreateCheckoutSessionLineItems {
            price: Some(request.price_id.clone()),
            quantity: Some(1),
            ..Default::default()
        }]);

        params.metadata = Some(request.metadata.clone());

        // Trial tiers carry the trial and a metadata copy on the
        // subscription itself
        if request.trial_days > 0 {
            let mut subscription_metadata = HashMap::new();
            subscription_metadata
                .insert("tier".to_string(), request.tier.as_str().to_string());
            subscription_metadata.insert(
                "userId".to_string(),
                request
                    .metadata
                    .get("userId")
                    .cloned()
                    .unwrap_or_default(),
            );

            params.subscription_data = Some(CreateCheckoutSessionSubscriptionData {
                trial_period_days: Some(request.trial_days),
                metadata: Some(subscription_metadata),
                ..Default::default()
            });
        }

        let session = StripeCheckoutSession::create(&self.client, params)
            .await
            .map_err(|e| PaymentError::Stripe(e.to_string()))?;

        let url = session
            .url
            .ok_or_else(|| PaymentError::Stripe("No checkout URL returned".into()))?;

        tracing::info!(
            session_id = %session.id,
            tier = %request.tier,
            trial_days = request.trial_days,
            "Created Stripe checkout session"
        );

        Ok(CreatedSession {
            id: session.id.to_string(),
            url,
        })
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<SessionDetails> {
        let id: CheckoutSessionId = session_id
            .parse()
            .map_err(|_| PaymentError::SessionNotFound(session_id.to_string()))?;

        let session = StripeCheckoutSession::retrieve(&self.client, &id, &[])
            .await
            .map_err(|e| PaymentError::Stripe(e.to_string()))?;

        let payment_status = match session.payment_status {
            CheckoutSessionPaymentStatus::Paid => PaymentStatus::Paid,
            CheckoutSessionPaymentStatus::Unpaid => PaymentStatus::Unpaid,
            CheckoutSessionPaymentStatus::NoPaymentRequired => PaymentStatus::NoPaymentRequired,
        };

        Ok(SessionDetails {
            id: session.id.to_string(),
            payment_status,
            has_subscription: session.subscription.is_some(),
            metadata: session.metadata.clone().unwrap_or_default(),
            customer_email: session.customer_email.clone(),
        })
    }
}
