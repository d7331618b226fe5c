//! Topic value object

use super::error::DomainError;
use serde::{Deserialize, Serialize};

/// Minimum number of characters (after trimming) a topic must have by default
pub const DEFAULT_MIN_TOPIC_CHARS: usize = 5;

/// The subject of a collaboration run (Value Object)
///
/// Stored trimmed. Immutable for the duration of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    content: String,
}

impl Topic {
    /// Create a topic, rejecting empty input.
    ///
    /// Length policy (see [`Topic::parse`]) is a user-facing concern; the
    /// engine itself only requires a non-empty subject.
    pub fn try_new(content: impl Into<String>) -> Result<Self, DomainError> {
        let content = content.into();
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(DomainError::EmptyTopic);
        }
        Ok(Self {
            content: trimmed.to_string(),
        })
    }

    /// Parse user-typed text into a topic, enforcing a minimum length
    /// counted in characters.
    pub fn parse(content: &str, min_chars: usize) -> Result<Self, DomainError> {
        let topic = Self::try_new(content)?;
        let actual = topic.content.chars().count();
        if actual < min_chars {
            return Err(DomainError::TopicTooShort {
                min: min_chars,
                actual,
            });
        }
        Ok(topic)
    }

    /// Get the topic text
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Consume and return the inner text
    pub fn into_content(self) -> String {
        self.content
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}
