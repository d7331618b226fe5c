//! Presentation-level configuration
//!
//! Settings for how notifications are written to the terminal.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Console output configuration for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Longest piece of text written at once; longer notifications are split
    pub max_message_chars: usize,
    /// Pause between the pieces of one split notification
    #[serde(with = "millis")]
    pub chunk_delay: Duration,
    /// Enable colored terminal output
    pub color: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            max_message_chars: 4096,
            chunk_delay: Duration::from_millis(500),
            color: true,
        }
    }
}

impl ConsoleConfig {
    /// Unsplit, unpaced, uncolored output
    pub fn plain() -> Self {
        Self {
            max_message_chars: usize::MAX,
            chunk_delay: Duration::ZERO,
            color: false,
        }
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_delay_is_milliseconds() {
        let config: ConsoleConfig =
            serde_json::from_str(r#"{"chunk_delay": 250, "color": false}"#).unwrap();
        assert_eq!(config.chunk_delay, Duration::from_millis(250));
        assert_eq!(config.max_message_chars, 4096);
        assert!(!config.color);
    }
}
