//! Coach Subscriptions
//!
//! The subscription object embedded in a user record after a verified
//! checkout. Built server-side only; the client never supplies price or
//! trial eligibility.

use chrono::{DateTime, Days, Months, Utc};
use serde::{Deserialize, Serialize};

use crate::tier::Tier;

/// Active subscription embedded in the user's record
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoachSubscription {
    pub tier: Tier,

    /// Always "active" at creation; lifecycle transitions are owned by
    /// the payment processor
    pub status: String,

    pub started_at: DateTime<Utc>,

    /// Start plus one calendar month
    pub renews_at: DateTime<Utc>,

    pub stripe_session_id: String,

    /// Monthly price in whole dollars, from the fixed tier table
    pub price: u32,

    /// Start plus 30 days, only for trial-eligible tiers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trial_ends_at: Option<DateTime<Utc>>,
}

impl CoachSubscription {
    /// Build the subscription written after checkout confirmation passes
    /// both verification checkpoints.
    pub fn activate(tier: Tier, session_id: &str, now: DateTime<Utc>) -> Self {
        let renews_at = now
            .checked_add_months(Months::new(1))
            .unwrap_or(now);
        let trial_ends_at = tier
            .has_trial()
            .then(|| now.checked_add_days(Days::new(30)))
            .flatten();

        Self {
            tier,
            status: "active".to_string(),
            started_at: now,
            renews_at,
            stripe_session_id: session_id.to_string(),
            price: tier.monthly_price_dollars(),
            trial_ends_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_lite_gets_trial_and_monthly_renewal() {
        let start = Utc.with_ymd_and_hms(2025, 9, 15, 12, 0, 0).unwrap();
        let sub = CoachSubscription::activate(Tier::Lite, "cs_test_123", start);

        assert_eq!(sub.status, "active");
        assert_eq!(sub.price, 9);
        assert_eq!(
            sub.renews_at,
            Utc.with_ymd_and_hms(2025, 10, 15, 12, 0, 0).unwrap()
        );
        assert_eq!(
            sub.trial_ends_at,
            Some(Utc.with_ymd_and_hms(2025, 10, 15, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_pro_has_no_trial() {
        let start = Utc.with_ymd_and_hms(2025, 1, 31, 0, 0, 0).unwrap();
        let sub = CoachSubscription::activate(Tier::Pro, "cs_test_456", start);

        assert_eq!(sub.price, 29);
        assert_eq!(sub.trial_ends_at, None);
        // Jan 31 + 1 month clamps to the end of February
        assert_eq!(
            sub.renews_at,
            Utc.with_ymd_and_hms(2025, 2, 28, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_wire_field_names() {
        let start = Utc.with_ymd_and_hms(2025, 9, 15, 12, 0, 0).unwrap();
        let sub = CoachSubscription::activate(Tier::Plus, "cs_test_789", start);
        let json = serde_json::to_value(&sub).unwrap();

        assert_eq!(json["tier"], "plus");
        assert_eq!(json["price"], 19);
        assert!(json.get("startedAt").is_some());
        assert!(json.get("renewsAt").is_some());
        assert!(json.get("stripeSessionId").is_some());
        assert!(json.get("trialEndsAt").is_some());

        let pro = CoachSubscription::activate(Tier::Pro, "cs_test_789", start);
        let json = serde_json::to_value(&pro).unwrap();
        assert!(json.get("trialEndsAt").is_none());
    }
}
