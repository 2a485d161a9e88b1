//! Billing Configuration
//!
//! Immutable tier-to-price-id mapping resolved once at startup. Missing
//! mappings fail here, at construction, not on the first checkout.

use optin_core::Tier;

use crate::error::{PaymentError, Result};

/// Tier-to-Stripe-price mapping
#[derive(Clone, Debug)]
pub struct BillingConfig {
    lite_price_id: String,
    plus_price_id: String,
    pro_price_id: String,
}

impl BillingConfig {
    pub fn new(
        lite_price_id: impl Into<String>,
        plus_price_id: impl Into<String>,
        pro_price_id: impl Into<String>,
    ) -> Self {
        Self {
            lite_price_id: lite_price_id.into(),
            plus_price_id: plus_price_id.into(),
            pro_price_id: pro_price_id.into(),
        }
    }

    /// Create from environment variables, failing fast if any tier lacks
    /// a price mapping
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(
            require_env("STRIPE_PRICE_LITE")?,
            require_env("STRIPE_PRICE_PLUS")?,
            require_env("STRIPE_PRICE_PRO")?,
        ))
    }

    /// Stripe price id for a tier
    pub fn price_id(&self, tier: Tier) -> &str {
        match tier {
            Tier::Lite => &self.lite_price_id,
            Tier::Plus => &self.plus_price_id,
            Tier::Pro => &self.pro_price_id,
        }
    }
}

fn require_env(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(PaymentError::Config(format!("{name} not set"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_lookup_per_tier() {
        let config = BillingConfig::new("price_lite", "price_plus", "price_pro");
        assert_eq!(config.price_id(Tier::Lite), "price_lite");
        assert_eq!(config.price_id(Tier::Plus), "price_plus");
        assert_eq!(config.price_id(Tier::Pro), "price_pro");
    }
}
