//! Chat output configuration from TOML (`[chat]` section)

use serde::{Deserialize, Serialize};

/// Raw chat configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileChatConfig {
    /// Longest single message; longer text is split into chunks
    pub max_message_chars: usize,
    /// Pause between chunks of one long message, in milliseconds
    pub chunk_delay_ms: u64,
    /// Enable colored terminal output
    pub color: bool,
}

impl Default for FileChatConfig {
    fn default() -> Self {
        Self {
            max_message_chars: 4096,
            chunk_delay_ms: 500,
            color: true,
        }
    }
}
