//! Google Gemini backend (query-string key auth).

use std::env;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ProviderError;
use crate::provider::openai::truncate_detail;
use crate::provider::{
    ProviderAdapter, ProviderKind, REQUEST_TIMEOUT, SamplingParams, normalize_transport_error,
};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const API_KEY_VAR: &str = "GEMINI_API_KEY";
const FALLBACK_KEY_VAR: &str = "GOOGLE_API_KEY";

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: String,
}

/// Adapter for the Gemini `generateContent` API.
///
/// Unlike OpenAI, Gemini authenticates via a `key` query parameter rather
/// than an Authorization header.
pub struct GeminiAdapter {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl GeminiAdapter {
    /// Build the adapter, reading `GEMINI_API_KEY` (or `GOOGLE_API_KEY`).
    pub fn from_env() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Build against a custom endpoint (tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let api_key = env::var(API_KEY_VAR)
            .or_else(|_| env::var(FALLBACK_KEY_VAR))
            .ok()
            .filter(|k| !k.is_empty());
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: base_url.into(),
        }
    }

    fn name(&self) -> &'static str {
        "Gemini"
    }
}

#[async_trait]
impl ProviderAdapter for GeminiAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    async fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn remediation(&self) -> String {
        format!(
            "Set the {} (or {}) environment variable to your API key",
            API_KEY_VAR, FALLBACK_KEY_VAR
        )
    }

    async fn generate(
        &self,
        prompt: &str,
        params: &SamplingParams,
    ) -> Result<String, ProviderError> {
        let api_key = self.api_key.as_deref().unwrap_or_default();
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, params.model
        );

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: params.max_tokens,
                temperature: params.temperature,
            },
        };

        debug!("Calling Gemini model {}", params.model);

        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
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

        let parsed: GenerateContentResponse =
            response
                .json()
                .await
                .map_err(|e| ProviderError::Protocol {
                    provider: self.name().to_string(),
                    status: status.as_u16().to_string(),
                    detail: e.to_string(),
                })?;

        let text = parsed
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.trim().to_string())
            .ok_or_else(|| ProviderError::Protocol {
                provider: self.name().to_string(),
                status: status.as_u16().to_string(),
                detail: "response contained no candidates".to_string(),
            })?;

        Ok(text)
    }
}
