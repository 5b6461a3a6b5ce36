//! OpenAI chat-completions backend (bearer-token auth).

use std::env;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ProviderError;
use crate::provider::{
    ProviderAdapter, ProviderKind, REQUEST_TIMEOUT, SamplingParams, normalize_transport_error,
};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const API_KEY_VAR: &str = "OPENAI_API_KEY";

const SYSTEM_PROMPT: &str =
    "You are an assistant specialized in generating concise, professional Git commit messages.";

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// Adapter for the OpenAI chat-completions API.
pub struct OpenAiAdapter {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl OpenAiAdapter {
    /// Build the adapter, reading the credential from `OPENAI_API_KEY`.
    pub fn from_env() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Build against a custom endpoint (OpenAI-compatible servers, tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: env::var(API_KEY_VAR).ok().filter(|k| !k.is_empty()),
            base_url: base_url.into(),
        }
    }

    fn name(&self) -> &'static str {
        "OpenAI"
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    async fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn remediation(&self) -> String {
        format!("Set the {} environment variable to your API key", API_KEY_VAR)
    }

    async fn generate(
        &self,
        prompt: &str,
        params: &SamplingParams,
    ) -> Result<String, ProviderError> {
        let api_key = self.api_key.as_deref().unwrap_or_default();
        let url = format!("{}/v1/chat/completions", self.base_url);

        let request = ChatRequest {
            model: &params.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens: params.max_tokens,
            temperature: params.temperature,
        };

        debug!("Calling OpenAI model {}", params.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| normalize_transport_error(self.name(), e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Protocol {
                provider: self.name().to_string(),
                status: status.as_u16().to_string(),
                detail: truncate_detail(&body),
            });
        }

        let parsed: ChatResponse =
            response
                .json()
                .await
                .map_err(|e| ProviderError::Protocol {
                    provider: self.name().to_string(),
                    status: status.as_u16().to_string(),
                    detail: e.to_string(),
                })?;

        let content = parsed
            .choices
            .first()
            .map(|c| c.message.content.trim().to_string())
            .ok_or_else(|| ProviderError::Protocol {
                provider: self.name().to_string(),
                status: status.as_u16().to_string(),
                detail: "response contained no choices".to_string(),
            })?;

        Ok(content)
    }
}

/// Cap error bodies so a misbehaving backend can't flood the terminal.
pub(crate) fn truncate_detail(body: &str) -> String {
    body.chars().take(500).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    // The credential is read at construction, so the adapter can be built
    // inside the env guard and probed outside it.

    #[tokio::test]
    #[serial]
    async fn test_is_configured_requires_api_key() {
        let adapter = temp_env::with_var(API_KEY_VAR, None::<&str>, OpenAiAdapter::from_env);
        assert!(!adapter.is_configured().await);
    }

    #[tokio::test]
    #[serial]
    async fn test_is_configured_rejects_empty_key() {
        let adapter = temp_env::with_var(API_KEY_VAR, Some(""), OpenAiAdapter::from_env);
        assert!(!adapter.is_configured().await);
    }

    #[tokio::test]
    #[serial]
    async fn test_is_configured_with_key() {
        let adapter = temp_env::with_var(API_KEY_VAR, Some("sk-test"), OpenAiAdapter::from_env);
        assert!(adapter.is_configured().await);
    }

    #[test]
    fn test_remediation_names_the_variable() {
        let adapter = OpenAiAdapter::from_env();
        assert!(adapter.remediation().contains(API_KEY_VAR));
    }

    #[test]
    fn test_truncate_detail_caps_length() {
        let long = "x".repeat(2000);
        assert_eq!(truncate_detail(&long).len(), 500);
    }
}
