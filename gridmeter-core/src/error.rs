//! Core error types for Gridmeter.

use thiserror::Error;

/// Core error type for refresh cycles.
///
/// The taxonomy matters more than the messages: fatal errors require the
/// operator to fix the configuration, while everything else is expected to
/// resolve itself by the next scheduled cycle.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The provider rejected the configured credentials.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// Network failure or provider-side outage.
    #[error("provider unavailable: {0}")]
    Transient(String),

    /// The response could not be normalized into a snapshot.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl CoreError {
    /// Returns true if this error requires operator action and must never
    /// be auto-retried by a scheduler.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CoreError::InvalidCredentials(_) | CoreError::InvalidConfig(_)
        )
    }
}
