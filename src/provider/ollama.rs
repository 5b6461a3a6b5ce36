//! Ollama backend: a local inference server, no auth.

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ProviderError;
use crate::provider::openai::truncate_detail;
use crate::provider::{
    ProviderAdapter, ProviderKind, REQUEST_TIMEOUT, SamplingParams, normalize_transport_error,
};

const DEFAULT_BASE_URL: &str = "http://localhost:11434";
const HOST_VAR: &str = "OLLAMA_HOST";

/// Short timeout for the reachability probe; the server answers `/api/tags`
/// instantly when it is up at all.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Adapter for a local Ollama server.
///
/// No credential is involved; "configured" means the server answers on its
/// base URL.
pub struct OllamaAdapter {
    client: reqwest::Client,
    base_url: String,
}

impl OllamaAdapter {
    /// Build the adapter, reading the server address from `OLLAMA_HOST`.
    pub fn from_env() -> Self {
        let base_url = env::var(HOST_VAR)
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self::with_base_url(base_url)
    }

    /// Build against a custom server address (tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn name(&self) -> &'static str {
        "Ollama"
    }
}

#[async_trait]
impl ProviderAdapter for OllamaAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Ollama
    }

    async fn is_configured(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);
        match self
            .client
            .get(&url)
            .timeout(PROBE_TIMEOUT)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    fn remediation(&self) -> String {
        format!(
            "Start the Ollama server ('ollama serve') and pull a model \
             ('ollama pull codellama:7b'); expected it at {}",
            self.base_url
        )
    }

    async fn generate(
        &self,
        prompt: &str,
        params: &SamplingParams,
    ) -> Result<String, ProviderError> {
        let url = format!("{}/api/generate", self.base_url);

        let request = GenerateRequest {
            model: &params.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: params.temperature,
                num_predict: params.max_tokens,
            },
        };

        debug!("Calling Ollama model {} at {}", params.model, self.base_url);

        let response = self
            .client
            .post(&url)
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

        let parsed: GenerateResponse =
            response
                .json()
                .await
                .map_err(|e| ProviderError::Protocol {
                    provider: self.name().to_string(),
                    status: status.as_u16().to_string(),
                    detail: e.to_string(),
                })?;

        Ok(parsed.response.trim().to_string())
    }
}
