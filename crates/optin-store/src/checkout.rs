//! Checkout Shadow Records
//!
//! Local mirror of payment-processor checkout sessions, keyed by session
//! id. Tracks local status independent of the processor's own state:
//! `pending` at creation, `completed` after the confirmation flow passes
//! both verification checkpoints. There is no failed or canceled state;
//! a confirmation that never passes leaves the record `pending`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;

use optin_core::Tier;

use crate::error::{Result, StoreError};

/// Checkout lifecycle status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutStatus {
    Pending,
    Completed,
}

/// Shadow record of an externally owned checkout session
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRecord {
    pub session_id: String,
    pub tier: Tier,
    pub email: String,
    pub user_id: String,

    /// Caller-supplied correlation id, if any
    #[serde(default)]
    pub checkout_id: Option<String>,

    pub consent: bool,
    pub status: CheckoutStatus,
    pub created_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl CheckoutRecord {
    /// New shadow record in `pending` status
    pub fn pending(
        session_id: impl Into<String>,
        tier: Tier,
        email: impl Into<String>,
        user_id: impl Into<String>,
        checkout_id: Option<String>,
        consent: bool,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            tier,
            email: email.into(),
            user_id: user_id.into(),
            checkout_id,
            consent,
            status: CheckoutStatus::Pending,
            created_at: now,
            completed_at: None,
        }
    }
}

/// Checkout shadow record store
#[async_trait]
pub trait CheckoutStore: Send + Sync {
    /// Write a new `pending` record keyed by session id
    async fn put_pending(&self, record: &CheckoutRecord) -> Result<()>;

    /// Fetch a record by session id
    async fn get(&self, session_id: &str) -> Result<Option<CheckoutRecord>>;

    /// Transition a record to `completed`. Errors with
    /// `CheckoutNotFound` when no record exists for the session id.
    async fn mark_completed(&self, session_id: &str, completed_at: DateTime<Utc>) -> Result<()>;
}

/// In-memory checkout store (for development and tests)
#[derive(Default)]
pub struct MemoryCheckoutStore {
    records: RwLock<HashMap<String, CheckoutRecord>>,
}

impl MemoryCheckoutStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CheckoutStore for MemoryCheckoutStore {
    async fn put_pending(&self, record: &CheckoutRecord) -> Result<()> {
        self.records
            .write()
            .unwrap()
            .insert(record.session_id.clone(), record.clone());
        Ok(())
    }

    async fn get(&self, session_id: &str) -> Result<Option<CheckoutRecord>> {
        Ok(self.records.read().unwrap().get(session_id).cloned())
    }

    async fn mark_completed(&self, session_id: &str, completed_at: DateTime<Utc>) -> Result<()> {
        let mut records = self.records.write().unwrap();
        let record = records
            .get_mut(session_id)
            .ok_or_else(|| StoreError::CheckoutNotFound(session_id.to_string()))?;

        record.status = CheckoutStatus::Completed;
        record.completed_at = Some(completed_at);
        Ok(())
    }
}
