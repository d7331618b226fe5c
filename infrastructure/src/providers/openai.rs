//! OpenAI-compatible Chat Completions provider.
//!
//! Sends the persona's system prompt and the engine prompt as two messages.
//! Any server that speaks the same API (local gateways included) works by
//! changing `base_url`.

use super::ProviderSetupError;
use crate::config::FileOpenAiConfig;
use async_trait::async_trait;
use conclave_application::{
    NotificationSink, ProviderError, ProviderRequest, ResponseProvider, ensure_non_empty,
};
use conclave_domain::{DiscussionConfig, PersonaId};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const COMPLETIONS_PATH: &str = "/v1/chat/completions";

#[derive(Clone)]
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
    max_tokens: Option<u32>,
}

impl OpenAiProvider {
    pub fn new(
        api_key: impl Into<String>,
        base_url: &str,
        model: impl Into<String>,
    ) -> Result<Self, ProviderSetupError> {
        let client = Client::builder()
            .build()
            .map_err(|e| ProviderSetupError::Client(e.to_string()))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), COMPLETIONS_PATH),
            model: model.into(),
            max_tokens: None,
        })
    }

    pub fn from_config(config: &FileOpenAiConfig) -> Result<Self, ProviderSetupError> {
        let api_key = config
            .resolve_api_key()
            .ok_or_else(|| ProviderSetupError::MissingApiKey(config.api_key_env.clone()))?;
        Ok(Self::new(api_key, &config.base_url, config.model.clone())?
            .with_max_tokens(config.max_tokens))
    }

    /// Sets the maximum number of tokens to generate (0 leaves it to the server).
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = (max_tokens > 0).then_some(max_tokens);
        self
    }

    fn build_request(&self, request: &ProviderRequest) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: request.system_prompt.clone(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: request.prompt.clone(),
                },
            ],
            max_tokens: self.max_tokens,
        }
    }

    async fn send_request(&self, body: &ChatCompletionRequest) -> Result<String, ProviderError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|err| ProviderError::Unavailable(format!("request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(map_http_error(status, &body_text));
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|err| {
            ProviderError::Unavailable(format!("Failed to parse response: {err}"))
        })?;

        extract_text_response(parsed)
    }
}

#[async_trait]
impl ResponseProvider for OpenAiProvider {
    async fn generate(
        &self,
        persona: &PersonaId,
        prompt: &str,
        config: &DiscussionConfig,
        _progress: Option<&dyn NotificationSink>,
    ) -> Result<String, ProviderError> {
        let request = ProviderRequest::resolve(persona, prompt, config)?;
        debug!("Requesting {} reply for {}", self.model, persona);
        let text = self.send_request(&self.build_request(&request)).await?;
        ensure_non_empty(&text)
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

fn extract_text_response(response: ChatCompletionResponse) -> Result<String, ProviderError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or(ProviderError::EmptyResponse)
}

fn map_http_error(status: StatusCode, body: &str) -> ProviderError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map(|wrapper| wrapper.error.message)
        .unwrap_or_else(|_| body.to_string());
    warn!("Chat Completions API returned {}: {}", status, message);
    ProviderError::Unavailable(format!("HTTP {}: {}", status.as_u16(), message))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> OpenAiProvider {
        OpenAiProvider::new("sk-test", "http://localhost:8080/", "mini").unwrap()
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        assert_eq!(
            provider().endpoint,
            "http://localhost:8080/v1/chat/completions"
        );
    }

    #[test]
    fn test_request_has_system_and_user_messages() {
        let config = DiscussionConfig::default();
        let request = ProviderRequest::resolve(&"analyst".into(), "Go.", &config).unwrap();
        let body = provider().with_max_tokens(0).build_request(&request);

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "mini");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "Go.");
        assert!(json.get("max_tokens").is_none());
    }

    #[test]
    fn test_extract_first_choice() {
        let parsed: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"Hello"}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_text_response(parsed).unwrap(), "Hello");

        let empty: ChatCompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert_eq!(
            extract_text_response(empty),
            Err(ProviderError::EmptyResponse)
        );
    }

    #[test]
    fn test_http_error_uses_api_message() {
        let err = map_http_error(
            StatusCode::TOO_MANY_REQUESTS,
            r#"{"error":{"message":"Rate limit reached","type":"requests"}}"#,
        );
        assert_eq!(
            err,
            ProviderError::Unavailable("HTTP 429: Rate limit reached".into())
        );
        assert!(err.is_retryable());
    }

    #[test]
    fn test_missing_api_key() {
        let config = FileOpenAiConfig {
            api_key: None,
            api_key_env: "CONCLAVE_TEST_NEVER_SET".into(),
            ..Default::default()
        };
        assert!(matches!(
            OpenAiProvider::from_config(&config),
            Err(ProviderSetupError::MissingApiKey(_))
        ));
    }
}
