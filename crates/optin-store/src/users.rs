//! User Records
//!
//! Minimal view of the externally owned user document: an embedded
//! subscription plus whatever other fields the document already carries.
//! Applying a subscription is an additive merge and must not clobber
//! unrelated fields.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;

use optin_core::CoachSubscription;

use crate::error::Result;

/// User document shadow
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coach_subscription: Option<CoachSubscription>,

    /// Fields owned by other parts of the system, preserved verbatim
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// User record store
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Merge the subscription into the user's record, creating the
    /// record if absent. Unrelated fields are left untouched.
    async fn apply_subscription(
        &self,
        user_id: &str,
        subscription: &CoachSubscription,
    ) -> Result<()>;

    /// Fetch a user record
    async fn get(&self, user_id: &str) -> Result<Option<UserRecord>>;
}

/// In-memory user store (for development and tests)
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record, e.g. to simulate fields written by other systems
    pub fn insert(&self, user_id: impl Into<String>, record: UserRecord) {
        self.users.write().unwrap().insert(user_id.into(), record);
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn apply_subscription(
        &self,
        user_id: &str,
        subscription: &CoachSubscription,
    ) -> Result<()> {
        let mut users = self.users.write().unwrap();
        let record = users.entry(user_id.to_string()).or_default();
        record.coach_subscription = Some(subscription.clone());
        Ok(())
    }

    async fn get(&self, user_id: &str) -> Result<Option<UserRecord>> {
        Ok(self.users.read().unwrap().get(user_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use optin_core::Tier;

    #[tokio::test]
    async fn test_apply_creates_record() {
        let store = MemoryUserStore::new();
        let sub = CoachSubscription::activate(Tier::Lite, "cs_1", Utc::now());

        store.apply_subscription("user-123", &sub).await.unwrap();

        let record = store.get("user-123").await.unwrap().unwrap();
        assert_eq!(record.coach_subscription.unwrap().tier, Tier::Lite);
    }

    #[tokio::test]
    async fn test_merge_preserves_unrelated_fields() {
        let store = MemoryUserStore::new();
        let mut existing = UserRecord::default();
        existing
            .extra
            .insert("displayName".into(), serde_json::json!("Ada"));
        store.insert("user-123", existing);

        let sub = CoachSubscription::activate(Tier::Pro, "cs_2", Utc::now());
        store.apply_subscription("user-123", &sub).await.unwrap();

        let record = store.get("user-123").await.unwrap().unwrap();
        assert_eq!(record.extra["displayName"], serde_json::json!("Ada"));
        assert_eq!(record.coach_subscription.unwrap().price, 29);
    }

    #[test]
    fn test_subscription_nested_under_wire_key() {
        let mut record = UserRecord::default();
        record.coach_subscription =
            Some(CoachSubscription::activate(Tier::Plus, "cs_3", Utc::now()));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["coachSubscription"]["tier"], "plus");
    }
}
