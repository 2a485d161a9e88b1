//! # optin-payments
//!
//! Stripe hosted-checkout integration for the subscription flow.
//!
//! **Flow:** Your site → Redirect to Stripe's hosted page → Redirect back
//!
//! ```text
//! ┌─────────────┐     ┌─────────────────┐     ┌──────────────────┐
//! │  Your Site  │────▶│  Stripe Hosted  │────▶│  Your Site       │
//! │ (subscribe) │     │  Checkout Page  │     │ (confirm + write)│
//! └─────────────┘     └─────────────────┘     └──────────────────┘
//! ```
//!
//! Confirmation never trusts the redirect alone: the server re-retrieves
//! the session from Stripe, checks payment status, and matches the
//! stored metadata user id against the caller before any write.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use optin_payments::{BillingConfig, CheckoutGateway, CheckoutIntent, SessionRequest, StripeGateway};
//! use optin_core::Tier;
//!
//! let config = BillingConfig::from_env()?;
//! let gateway = StripeGateway::from_env()?;
//!
//! let intent = CheckoutIntent {
//!     tier: Tier::Lite,
//!     email: "user@example.com".into(),
//!     user_id: "user-123".into(),
//!     checkout_id: None,
//!     consent: true,
//! };
//! let request = SessionRequest::build(&config, &intent, "https://app.example.com");
//! let session = gateway.create_session(request).await?;
//!
//! // Redirect user to: session.url
//! ```

mod config;
mod error;
mod gateway;
mod stripe_gateway;

pub use config::BillingConfig;
pub use error::{PaymentError, Result};
pub use gateway::{
    CheckoutGateway, CheckoutIntent, CreatedSession, MockCheckoutGateway, PaymentStatus,
    SessionDetails, SessionRequest,
};
pub use stripe_gateway::StripeGateway;
