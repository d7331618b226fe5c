//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into domain and application
//! types, collecting [`ConfigIssue`]s along the way.

mod behavior;
mod chat;
mod discussion;
mod logging;
mod provider;

pub use behavior::FileBehaviorConfig;
pub use chat::FileChatConfig;
pub use discussion::{FileCustomPersona, FileDiscussionConfig};
pub use logging::FileLoggingConfig;
pub use provider::{FileCommandConfig, FileOpenAiConfig, FileProviderConfig};

use conclave_domain::{ConfigIssue, ConfigIssueCode, DiscussionConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Discussion defaults for new sessions
    pub discussion: FileDiscussionConfig,
    /// System prompt overrides, persona id -> prompt
    pub prompts: BTreeMap<String, String>,
    /// User-defined personas keyed by id
    pub custom_personas: BTreeMap<String, FileCustomPersona>,
    /// Pacing and input limits
    pub behavior: FileBehaviorConfig,
    /// Reply provider selection
    pub provider: FileProviderConfig,
    /// Chat output settings
    pub chat: FileChatConfig,
    /// Structured conversation log
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// This is the single entry point for config validation. It checks:
    /// 1. The discussion section (personas, language, iterations, rule)
    /// 2. The provider section for the selected adapter
    /// 3. Chat limits
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        // 1. Discussion
        issues.extend(self.to_discussion_config().1);

        // 2. Provider
        issues.extend(self.provider.validate());

        // 3. Chat
        if self.chat.max_message_chars == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::OutOfRange {
                    field: "chat.max_message_chars".to_string(),
                    value: "0".to_string(),
                },
                "chat.max_message_chars must be greater than zero",
            ));
        }

        issues
    }

    /// Initial configuration of every new session
    pub fn to_discussion_config(&self) -> (DiscussionConfig, Vec<ConfigIssue>) {
        self.discussion
            .to_discussion_config(&self.prompts, &self.custom_personas)
    }
}
