//! Domain Error Types

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, DomainError>;

/// Consent and subscription domain errors
#[derive(Error, Debug)]
pub enum DomainError {
    /// One or more fields failed validation; messages are ordered and
    /// human-readable so the client can fix everything in one round trip
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Unknown subscription tier
    #[error("Invalid tier. Must be lite, plus, or pro.")]
    UnknownTier(String),
}

impl DomainError {
    /// The per-field messages for a validation failure
    pub fn details(&self) -> Vec<String> {
        match self {
            DomainError::Validation(messages) => messages.clone(),
            DomainError::UnknownTier(_) => vec![self.to_string()],
        }
    }
}
