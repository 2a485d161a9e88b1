//! # optin-store
//!
//! Storage traits and placeholder backends for the consent log, the
//! checkout shadow records, and the user records. The real system owns
//! none of this data durably; these backends stand in for a document
//! store with atomic appends and transactional updates.
//!
//! Known limitation, by construction: `JsonFileConsentLog` rewrites the
//! whole collection per append and loses updates under concurrent
//! writers, and the confirmation flow's two writes (user subscription,
//! checkout status) are not transactional across stores.

mod checkout;
mod consent_log;
mod error;
mod users;

pub use checkout::{CheckoutRecord, CheckoutStatus, CheckoutStore, MemoryCheckoutStore};
pub use consent_log::{ConsentLog, JsonFileConsentLog, MemoryConsentLog};
pub use error::{Result, StoreError};
pub use users::{MemoryUserStore, UserRecord, UserStore};
