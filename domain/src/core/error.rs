//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Topic cannot be empty")]
    EmptyTopic,

    #[error("Topic is too short: at least {min} characters required, got {actual}")]
    TopicTooShort { min: usize, actual: usize },

    #[error("Unknown persona: {0}")]
    UnknownPersona(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl DomainError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DomainError::Cancelled)
    }

    /// Whether the error was caused by what the user typed (as opposed to a
    /// failure inside the system)
    pub fn is_user_input(&self) -> bool {
        matches!(
            self,
            DomainError::EmptyTopic | DomainError::TopicTooShort { .. }
        )
    }
}
