//! Payment Error Types

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, PaymentError>;

/// Payment-related errors
#[derive(Error, Debug)]
pub enum PaymentError {
    /// Stripe API error
    #[error("Stripe error: {0}")]
    Stripe(String),

    /// Configuration error (missing price mapping, missing secret key)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Checkout session missing at the processor
    #[error("Checkout session not found: {0}")]
    SessionNotFound(String),
}

impl PaymentError {
    /// Get user-friendly message
    pub fn user_message(&self) -> &str {
        match self {
            PaymentError::Stripe(message) => message,
            PaymentError::Config(_) => "Service configuration error.",
            PaymentError::SessionNotFound(_) => "Checkout session not found.",
        }
    }
}
