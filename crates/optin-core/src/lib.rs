//! # optin-core
//!
//! Domain model for the SMS consent-collection and subscription-checkout
//! service: pure validators, the consent record and its builder, the
//! subscription tier tables, and the subscription object written after a
//! verified checkout.
//!
//! Everything here is side-effect free. Storage lives in `optin-store`,
//! payment-processor plumbing in `optin-payments`, HTTP in
//! `optin-server`.

mod consent;
mod error;
mod subscription;
mod tier;
pub mod validate;

pub use consent::{Consent, ConsentFlags, ConsentRecord, OptInSubmission};
pub use error::{DomainError, Result};
pub use subscription::CoachSubscription;
pub use tier::Tier;
