//! Application-level configuration.
//!
//! This module provides configuration types that control how use cases behave,
//! such as pacing between provider calls.

use std::time::Duration;

/// Default pause after every persona turn and every vote.
pub const DEFAULT_TURN_DELAY: Duration = Duration::from_millis(1000);

/// Application behavior configuration.
#[derive(Debug, Clone)]
pub struct BehaviorConfig {
    /// Pause after each persona turn and each vote, to avoid hammering the
    /// text provider.
    pub turn_delay: Duration,
    /// Minimum length (in characters, trimmed) of a topic typed in chat.
    pub min_topic_chars: usize,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            turn_delay: DEFAULT_TURN_DELAY,
            min_topic_chars: conclave_domain::core::topic::DEFAULT_MIN_TOPIC_CHARS,
        }
    }
}

impl BehaviorConfig {
    /// No pacing at all. Used by tests and offline runs.
    pub fn immediate() -> Self {
        Self {
            turn_delay: Duration::ZERO,
            ..Self::default()
        }
    }

    pub fn with_turn_delay_ms(mut self, millis: u64) -> Self {
        self.turn_delay = Duration::from_millis(millis);
        self
    }

    pub fn with_min_topic_chars(mut self, chars: usize) -> Self {
        self.min_topic_chars = chars;
        self
    }
}
