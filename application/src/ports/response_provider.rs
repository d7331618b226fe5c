//! Response provider port
//!
//! Defines the interface for obtaining a persona's reply text. The engine
//! treats every implementation as an opaque, possibly slow, possibly failing
//! function; adapters live in the infrastructure layer.

use crate::ports::notification::NotificationSink;
use async_trait::async_trait;
use conclave_domain::{DiscussionConfig, Persona, PersonaId, PromptTemplate, resolve_persona};
use std::time::Duration;
use thiserror::Error;

/// Errors a provider can report
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Unknown persona: {0}")]
    UnknownPersona(PersonaId),

    #[error("Provider returned an empty response")]
    EmptyResponse,

    #[error("Provider timed out after {0:?}")]
    Timeout(Duration),

    #[error("Provider unavailable: {0}")]
    Unavailable(String),
}

impl ProviderError {
    /// Whether a provider may try the same request again.
    ///
    /// The engine never retries; this is for provider decorators.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ProviderError::UnknownPersona(_))
    }
}

/// Port producing reply text for a persona
#[async_trait]
pub trait ResponseProvider: Send + Sync {
    /// Generate a reply for `persona` to `prompt` under `config`.
    ///
    /// `progress` is an optional hook for interim status ("thinking...") and
    /// goes to the same sink the engine notifies.
    async fn generate(
        &self,
        persona: &PersonaId,
        prompt: &str,
        config: &DiscussionConfig,
        progress: Option<&dyn NotificationSink>,
    ) -> Result<String, ProviderError>;
}

/// A fully resolved provider call: persona, system prompt and user prompt.
///
/// Adapters build one of these first so persona lookup and the language
/// instruction are handled identically everywhere.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    pub persona: Persona,
    pub system_prompt: String,
    pub prompt: String,
}

impl ProviderRequest {
    pub fn resolve(
        persona: &PersonaId,
        prompt: &str,
        config: &DiscussionConfig,
    ) -> Result<Self, ProviderError> {
        let persona = resolve_persona(persona, config)
            .ok_or_else(|| ProviderError::UnknownPersona(persona.clone()))?;
        let system_prompt = PromptTemplate::system_prompt(&persona.system_prompt, config.language());

        Ok(Self {
            persona,
            system_prompt,
            prompt: prompt.to_string(),
        })
    }

    /// System and user prompt joined, for backends with a single input
    pub fn combined(&self) -> String {
        PromptTemplate::full_prompt(&self.system_prompt, &self.prompt)
    }
}

/// Trim a raw reply, rejecting blank output
pub fn ensure_non_empty(text: &str) -> Result<String, ProviderError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ProviderError::EmptyResponse);
    }
    Ok(trimmed.to_string())
}
