//! Deterministic provider that needs no network or external program.
//!
//! Turns and summaries quote the persona and a slice of the prompt; vote
//! prompts are always answered with the accept keyword of the active
//! language, so every summary passes.

use async_trait::async_trait;
use conclave_application::{
    NotificationSink, ProviderError, ProviderRequest, ResponseProvider, ensure_non_empty,
};
use conclave_domain::core::string::truncate;
use conclave_domain::{DiscussionConfig, PersonaId};

const EXCERPT_CHARS: usize = 80;

#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineProvider;

impl OfflineProvider {
    pub fn new() -> Self {
        Self
    }

    fn reply(request: &ProviderRequest, config: &DiscussionConfig) -> String {
        let keywords = config.vote_keywords();
        let vote_marker = format!("\"{}\" or \"{}\"", keywords.accept, keywords.reject);

        if request.prompt.contains(&vote_marker) {
            return format!(
                "{}. {} finds the summary faithful to the round.",
                keywords.accept, request.persona.name
            );
        }

        let excerpt = truncate(first_line(&request.prompt), EXCERPT_CHARS);
        if request.persona.id.is_summarizer() {
            format!("{} condensed the discussion. Opening: {}", request.persona.name, excerpt)
        } else {
            format!("{} considered: {}", request.persona.name, excerpt)
        }
    }
}

fn first_line(text: &str) -> &str {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("")
}

#[async_trait]
impl ResponseProvider for OfflineProvider {
    async fn generate(
        &self,
        persona: &PersonaId,
        prompt: &str,
        config: &DiscussionConfig,
        _progress: Option<&dyn NotificationSink>,
    ) -> Result<String, ProviderError> {
        let request = ProviderRequest::resolve(persona, prompt, config)?;
        ensure_non_empty(&Self::reply(&request, config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conclave_domain::{PromptTemplate, VoteDecision, classify_with};

    #[tokio::test]
    async fn test_turn_quotes_persona_and_prompt() {
        let config = DiscussionConfig::default();
        let reply = OfflineProvider::new()
            .generate(&"analyst".into(), "Main topic: \"tea\"", &config, None)
            .await
            .unwrap();
        assert!(reply.starts_with("Analytical Network considered:"));
        assert!(reply.contains("tea"));
    }

    #[tokio::test]
    async fn test_votes_accept_in_active_language() {
        let mut config = DiscussionConfig::default();
        config.set_language("French").unwrap();
        let keywords = config.vote_keywords();
        let prompt = PromptTemplate::vote_request("S", "Critic", keywords, "French");

        let reply = OfflineProvider::new()
            .generate(&"creative".into(), &prompt, &config, None)
            .await
            .unwrap();

        assert_eq!(classify_with(&reply, keywords), VoteDecision::Accept);
    }

    #[tokio::test]
    async fn test_unknown_persona() {
        let config = DiscussionConfig::default();
        let err = OfflineProvider::new()
            .generate(&"ghost".into(), "hi", &config, None)
            .await
            .unwrap_err();
        assert_eq!(err, ProviderError::UnknownPersona("ghost".into()));
    }

    #[test]
    fn test_first_line_skips_blank_lines() {
        assert_eq!(first_line("\n\n  hello \nworld"), "hello");
        assert_eq!(first_line(""), "");
    }
}
