//! Welcome Notification Stub
//!
//! After a consent record is built, a first confirmation message may be
//! attempted. Delivery is out of scope; the stub only logs. The outcome
//! is recorded on the consent record and never blocks or fails the
//! opt-in request.

use async_trait::async_trait;

use optin_core::ConsentRecord;

/// Outbound notification hook
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Attempt the first confirmation message. Returns whether the
    /// attempt succeeded; callers must not propagate a failure.
    async fn send_welcome(&self, record: &ConsentRecord) -> bool;
}

/// Notifier that only logs the attempt
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_welcome(&self, record: &ConsentRecord) -> bool {
        tracing::info!(
            phone = %record.phone_e164,
            "Welcome message queued (delivery not configured)"
        );
        true
    }
}
