//! Subscription Tiers
//!
//! Tier-to-price and tier-to-trial lookups are fixed tables here, never
//! client-supplied. The Stripe price-id mapping lives in billing
//! configuration; everything else about a tier is intrinsic.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, Result};

/// Subscription tier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Lite,
    Plus,
    Pro,
}

impl Tier {
    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Lite => "lite",
            Tier::Plus => "plus",
            Tier::Pro => "pro",
        }
    }

    /// Parse a client-supplied tier name. Unknown tiers are rejected, not
    /// defaulted; a typo must never buy the wrong plan.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "lite" => Ok(Tier::Lite),
            "plus" => Ok(Tier::Plus),
            "pro" => Ok(Tier::Pro),
            other => Err(DomainError::UnknownTier(other.to_string())),
        }
    }

    /// Monthly price in whole dollars
    pub fn monthly_price_dollars(self) -> u32 {
        match self {
            Tier::Lite => 9,
            Tier::Plus => 19,
            Tier::Pro => 29,
        }
    }

    /// Free-trial length attached to checkout sessions for this tier
    pub fn trial_days(self) -> u32 {
        match self {
            Tier::Lite | Tier::Plus => 30,
            Tier::Pro => 0,
        }
    }

    /// Trial-eligible tiers get a `trialEndsAt` on their subscription
    pub fn has_trial(self) -> bool {
        self.trial_days() > 0
    }

    pub const ALL: [Tier; 3] = [Tier::Lite, Tier::Plus, Tier::Pro];
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_tiers() {
        assert_eq!(Tier::parse("lite").unwrap(), Tier::Lite);
        assert_eq!(Tier::parse("plus").unwrap(), Tier::Plus);
        assert_eq!(Tier::parse("pro").unwrap(), Tier::Pro);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!(Tier::parse("free").is_err());
        assert!(Tier::parse("Lite").is_err());
        assert!(Tier::parse("").is_err());
    }

    #[test]
    fn test_fixed_tables() {
        assert_eq!(Tier::Lite.monthly_price_dollars(), 9);
        assert_eq!(Tier::Plus.monthly_price_dollars(), 19);
        assert_eq!(Tier::Pro.monthly_price_dollars(), 29);
        assert!(Tier::Lite.has_trial());
        assert!(Tier::Plus.has_trial());
        assert!(!Tier::Pro.has_trial());
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Tier::Lite).unwrap(), "\"lite\"");
        let tier: Tier = serde_json::from_str("\"pro\"").unwrap();
        assert_eq!(tier, Tier::Pro);
    }
}
