//! Mock Checkout Gateway
//!
//! For testing and demo purposes. Sessions live in memory; tests can
//! preload session state or flip the gateway into a failing mode to
//! exercise upstream-error paths.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use super::{CheckoutGateway, CreatedSession, PaymentStatus, SessionDetails, SessionRequest};
use crate::error::{PaymentError, Result};

/// In-memory checkout gateway
#[derive(Default)]
pub struct MockCheckoutGateway {
    sessions: RwLock<HashMap<String, SessionDetails>>,
    last_request: RwLock<Option<SessionRequest>>,
    last_created_id: RwLock<Option<String>>,
    failing: AtomicBool,
}

impl MockCheckoutGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preload session state for retrieval tests
    pub fn insert_session(&self, details: SessionDetails) {
        self.sessions
            .write()
            .unwrap()
            .insert(details.id.clone(), details);
    }

    /// Make every call fail with a simulated processor outage
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// The last session-creation request, for assertions
    pub fn last_request(&self) -> Option<SessionRequest> {
        self.last_request.read().unwrap().clone()
    }

    /// Id of the most recently created session
    pub fn last_created_id(&self) -> Option<String> {
        self.last_created_id.read().unwrap().clone()
    }

    fn check_available(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(PaymentError::Stripe("simulated processor outage".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl CheckoutGateway for MockCheckoutGateway {
    async fn create_session(&self, request: SessionRequest) -> Result<CreatedSession> {
        self.check_available()?;

        let id = format!("cs_test_{}", uuid::Uuid::new_v4().simple());
        let url = format!("https://checkout.stripe.test/c/pay/{id}");

        self.sessions.write().unwrap().insert(
            id.clone(),
            SessionDetails {
                id: id.clone(),
                // Freshly created sessions have not been paid yet
                payment_status: PaymentStatus::Unpaid,
                has_subscription: false,
                metadata: request.metadata.clone(),
                customer_email: Some(request.customer_email.clone()),
            },
        );
        *self.last_request.write().unwrap() = Some(request);
        *self.last_created_id.write().unwrap() = Some(id.clone());

        Ok(CreatedSession { id, url })
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<SessionDetails> {
        self.check_available()?;

        self.sessions
            .read()
            .unwrap()
            .get(session_id)
            .cloned()
            .ok_or_else(|| PaymentError::SessionNotFound(session_id.to_string()))
    }
}
