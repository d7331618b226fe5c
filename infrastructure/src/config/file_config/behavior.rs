//! Behavior configuration from TOML (`[behavior]` section)

use conclave_application::BehaviorConfig;
use conclave_domain::core::topic::DEFAULT_MIN_TOPIC_CHARS;
use serde::{Deserialize, Serialize};

/// Raw behavior configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBehaviorConfig {
    /// Pause after every persona turn and vote, in milliseconds
    pub turn_delay_ms: u64,
    /// Minimum topic length accepted from chat
    pub min_topic_chars: usize,
}

impl Default for FileBehaviorConfig {
    fn default() -> Self {
        Self {
            turn_delay_ms: 1000,
            min_topic_chars: DEFAULT_MIN_TOPIC_CHARS,
        }
    }
}

impl FileBehaviorConfig {
    pub fn to_behavior_config(&self) -> BehaviorConfig {
        BehaviorConfig::default()
            .with_turn_delay_ms(self.turn_delay_ms)
            .with_min_topic_chars(self.min_topic_chars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_to_behavior_config() {
        let file = FileBehaviorConfig {
            turn_delay_ms: 0,
            min_topic_chars: 10,
        };
        let behavior = file.to_behavior_config();
        assert_eq!(behavior.turn_delay, Duration::ZERO);
        assert_eq!(behavior.min_topic_chars, 10);
    }
}
