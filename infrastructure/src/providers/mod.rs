//! Response provider adapters
//!
//! Every adapter implements [`ResponseProvider`]; [`build_provider`] picks one
//! from the `[provider]` config section and wraps it in a
//! [`ResilientProvider`] for timeout and retry handling.

pub mod command;
pub mod offline;
#[cfg(feature = "openai")]
pub mod openai;
pub mod resilient;

pub use command::CommandProvider;
pub use offline::OfflineProvider;
#[cfg(feature = "openai")]
pub use openai::OpenAiProvider;
pub use resilient::{ResilientProvider, RetryPolicy};

use crate::config::FileProviderConfig;
use conclave_application::ResponseProvider;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderKind {
    #[default]
    Offline,
    Command,
    OpenAi,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Offline => "offline",
            ProviderKind::Command => "command",
            ProviderKind::OpenAi => "openai",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "offline" => Ok(ProviderKind::Offline),
            "command" => Ok(ProviderKind::Command),
            "openai" => Ok(ProviderKind::OpenAi),
            other => Err(format!("unknown provider kind: {}", other)),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while constructing a provider
#[derive(Error, Debug)]
pub enum ProviderSetupError {
    #[error("provider.command.program is not set")]
    MissingProgram,

    #[error("No API key in provider.openai.api_key or ${0}")]
    MissingApiKey(String),

    #[error("Provider '{0}' is not compiled in (enable the '{0}' feature)")]
    NotCompiled(ProviderKind),

    #[error("Failed to initialise HTTP client: {0}")]
    Client(String),
}

/// Build the configured provider, wrapped with timeout and retry handling.
pub fn build_provider(
    config: &FileProviderConfig,
) -> Result<Arc<dyn ResponseProvider>, ProviderSetupError> {
    let (kind, issues) = config.parse_kind();
    for issue in &issues {
        tracing::warn!("{}", issue);
    }

    let policy = RetryPolicy {
        timeout: Duration::from_secs(config.timeout_seconds.max(1)),
        max_retries: config.max_retries,
        backoff: Duration::from_millis(config.retry_backoff_ms),
    };
    info!("Using '{}' provider ({:?})", kind, policy);

    let provider: Arc<dyn ResponseProvider> = match kind {
        ProviderKind::Offline => Arc::new(ResilientProvider::new(OfflineProvider::new(), policy)),
        ProviderKind::Command => {
            let provider = CommandProvider::from_config(&config.command)?;
            Arc::new(ResilientProvider::new(provider, policy))
        }
        ProviderKind::OpenAi => build_openai(config, policy)?,
    };

    Ok(provider)
}

#[cfg(feature = "openai")]
fn build_openai(
    config: &FileProviderConfig,
    policy: RetryPolicy,
) -> Result<Arc<dyn ResponseProvider>, ProviderSetupError> {
    let provider = OpenAiProvider::from_config(&config.openai)?;
    Ok(Arc::new(ResilientProvider::new(provider, policy)))
}

#[cfg(not(feature = "openai"))]
fn build_openai(
    _config: &FileProviderConfig,
    _policy: RetryPolicy,
) -> Result<Arc<dyn ResponseProvider>, ProviderSetupError> {
    Err(ProviderSetupError::NotCompiled(ProviderKind::OpenAi))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FileCommandConfig;

    #[test]
    fn test_kind_from_str() {
        assert_eq!("offline".parse::<ProviderKind>(), Ok(ProviderKind::Offline));
        assert_eq!(" Command ".parse::<ProviderKind>(), Ok(ProviderKind::Command));
        assert_eq!("OpenAI".parse::<ProviderKind>(), Ok(ProviderKind::OpenAi));
        assert!("bedrock".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_kind_display_round_trips() {
        for kind in [ProviderKind::Offline, ProviderKind::Command, ProviderKind::OpenAi] {
            assert_eq!(kind.to_string().parse::<ProviderKind>(), Ok(kind));
        }
    }

    #[test]
    fn test_build_default_provider() {
        assert!(build_provider(&FileProviderConfig::default()).is_ok());
    }

    #[test]
    fn test_build_command_without_program_fails() {
        let config = FileProviderConfig {
            kind: "command".into(),
            command: FileCommandConfig::default(),
            ..Default::default()
        };
        assert!(matches!(
            build_provider(&config),
            Err(ProviderSetupError::MissingProgram)
        ));
    }
}
