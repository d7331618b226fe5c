//! Provider configuration from TOML (`[provider]` section)

use crate::providers::ProviderKind;
use conclave_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};

/// Raw provider configuration from TOML
///
/// # Example
///
/// ```toml
/// [provider]
/// kind = "command"              # "offline", "command", "openai"
/// timeout_seconds = 60
/// max_retries = 1
/// retry_backoff_ms = 500
///
/// [provider.command]
/// program = "llm"
/// args = ["-m", "gpt-4o-mini"]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProviderConfig {
    /// Which adapter produces replies
    pub kind: String,
    /// Per-call timeout
    pub timeout_seconds: u64,
    /// Extra attempts after a failed call
    pub max_retries: u32,
    /// Pause before the first retry; doubles on each further retry
    pub retry_backoff_ms: u64,
    /// External program settings
    pub command: FileCommandConfig,
    /// OpenAI-compatible API settings
    pub openai: FileOpenAiConfig,
}

impl Default for FileProviderConfig {
    fn default() -> Self {
        Self {
            kind: "offline".to_string(),
            timeout_seconds: 60,
            max_retries: 1,
            retry_backoff_ms: 500,
            command: FileCommandConfig::default(),
            openai: FileOpenAiConfig::default(),
        }
    }
}

/// External text-generation program. The prompt goes to stdin, the reply
/// is read from stdout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCommandConfig {
    pub program: Option<String>,
    pub args: Vec<String>,
}

/// OpenAI API provider configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOpenAiConfig {
    /// Environment variable name for the API key (default: "OPENAI_API_KEY").
    pub api_key_env: String,
    /// Direct API key (not recommended, use the env var instead).
    pub api_key: Option<String>,
    /// Base URL of an OpenAI-compatible API.
    pub base_url: String,
    /// Model name sent with every request.
    pub model: String,
    /// Max tokens per response.
    pub max_tokens: u32,
}

impl Default for FileOpenAiConfig {
    fn default() -> Self {
        Self {
            api_key_env: "OPENAI_API_KEY".to_string(),
            api_key: None,
            base_url: "https://api.openai.com".to_string(),
            model: "gpt-4o-mini".to_string(),
            max_tokens: 1500,
        }
    }
}

impl FileOpenAiConfig {
    /// Explicit key first, then the configured environment variable
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|k| !k.trim().is_empty())
    }
}

impl FileProviderConfig {
    /// Parse kind string into ProviderKind, returning warnings on failure.
    pub fn parse_kind(&self) -> (ProviderKind, Vec<ConfigIssue>) {
        match self.kind.parse::<ProviderKind>() {
            Ok(kind) => (kind, vec![]),
            Err(_) => {
                let issue = ConfigIssue::warning(
                    ConfigIssueCode::InvalidEnumValue {
                        field: "provider.kind".to_string(),
                        value: self.kind.clone(),
                        valid_values: vec![
                            "offline".to_string(),
                            "command".to_string(),
                            "openai".to_string(),
                        ],
                    },
                    format!(
                        "provider.kind: unknown value '{}', falling back to 'offline'",
                        self.kind
                    ),
                );
                (ProviderKind::default(), vec![issue])
            }
        }
    }

    /// Check that the selected adapter has what it needs
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let (kind, mut issues) = self.parse_kind();

        if self.timeout_seconds == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::OutOfRange {
                    field: "provider.timeout_seconds".to_string(),
                    value: "0".to_string(),
                },
                "provider.timeout_seconds must be greater than zero",
            ));
        }

        match kind {
            ProviderKind::Offline => {}
            ProviderKind::Command => {
                let missing = self
                    .command
                    .program
                    .as_deref()
                    .is_none_or(|p| p.trim().is_empty());
                if missing {
                    issues.push(ConfigIssue::error(
                        ConfigIssueCode::MissingProviderSetting {
                            field: "provider.command.program".to_string(),
                        },
                        "provider.kind = \"command\" requires provider.command.program",
                    ));
                }
            }
            ProviderKind::OpenAi => {
                if self.openai.model.trim().is_empty() {
                    issues.push(ConfigIssue::error(
                        ConfigIssueCode::MissingProviderSetting {
                            field: "provider.openai.model".to_string(),
                        },
                        "provider.kind = \"openai\" requires provider.openai.model",
                    ));
                }
                if self.openai.resolve_api_key().is_none() {
                    issues.push(ConfigIssue::warning(
                        ConfigIssueCode::MissingProviderSetting {
                            field: "provider.openai.api_key".to_string(),
                        },
                        format!(
                            "no API key found in provider.openai.api_key or ${}",
                            self.openai.api_key_env
                        ),
                    ));
                }
            }
        }

        issues
    }
}
