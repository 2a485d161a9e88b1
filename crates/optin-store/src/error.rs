//! Storage Error Types

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, StoreError>;

/// Storage-related errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// I/O failure talking to the backing file
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Record could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Checkout shadow record missing for a session id
    #[error("Checkout session not found: {0}")]
    CheckoutNotFound(String),
}
