//! AI provider abstraction: one adapter per backend behind a single trait.
//!
//! Each adapter owns its backend's request construction and response field
//! extraction. Transport failures and unexpected response shapes are
//! normalized into [`ProviderError`] before they leave the adapter.

pub mod gemini;
pub mod ollama;
pub mod openai;
pub mod registry;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

pub use registry::{ProviderDescriptor, create_adapter, descriptor};

/// Bounded timeout applied to every provider HTTP request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Supported AI backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    Gemini,
    Ollama,
}

impl ProviderKind {
    /// Stable identifier used in cache rows, config, and the CLI selector.
    pub fn id(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Gemini => "gemini",
            ProviderKind::Ollama => "ollama",
        }
    }

    /// All registered backends, in listing order.
    pub fn all() -> &'static [ProviderKind] {
        &[ProviderKind::OpenAi, ProviderKind::Gemini, ProviderKind::Ollama]
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "gemini" => Ok(Self::Gemini),
            "ollama" => Ok(Self::Ollama),
            _ => Err(format!(
                "Unknown provider '{}'. Available: openai, gemini, ollama",
                s
            )),
        }
    }
}

/// Sampling parameters controlling generation variability and size.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingParams {
    pub model: String,
    /// Creativity of the response, 0.0-1.0.
    pub temperature: f32,
    /// Maximum output length in tokens.
    pub max_tokens: u32,
}

/// One generation request. Fully determines cache identity; constructed
/// fresh per invocation and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub provider: ProviderKind,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl GenerationRequest {
    /// Resolve the model for a provider, using its default when no explicit
    /// override was given.
    pub fn new(
        provider: ProviderKind,
        model: Option<String>,
        temperature: f32,
        max_tokens: u32,
    ) -> Self {
        let model = model.unwrap_or_else(|| descriptor(provider).default_model.to_string());
        Self {
            provider,
            model,
            temperature,
            max_tokens,
        }
    }

    pub fn sampling_params(&self) -> SamplingParams {
        SamplingParams {
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

/// Capability interface implemented once per backend.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Which backend this adapter drives.
    fn kind(&self) -> ProviderKind;

    /// Whether the backend can be invoked at all: required credential
    /// present, or local service reachable. Consulted before every
    /// invocation so the pipeline can fail fast instead of attempting a
    /// call doomed to fail.
    async fn is_configured(&self) -> bool;

    /// Provider-specific setup instruction shown when `is_configured()` is
    /// false.
    fn remediation(&self) -> String;

    /// Generate raw text for the prompt. Implementations apply
    /// [`REQUEST_TIMEOUT`] and normalize all failures into
    /// [`ProviderError`].
    async fn generate(
        &self,
        prompt: &str,
        params: &SamplingParams,
    ) -> Result<String, ProviderError>;
}

/// Fold a reqwest error into the normalized provider error surface.
///
/// Timeouts and connection failures are `Unavailable`; anything else that
/// reqwest reports (body decode, redirect policy) is a protocol-level
/// surprise from the backend.
pub(crate) fn normalize_transport_error(provider: &str, err: reqwest::Error) -> ProviderError {
    if err.is_timeout() || err.is_connect() || err.is_request() {
        ProviderError::Unavailable {
            provider: provider.to_string(),
            detail: err.to_string(),
        }
    } else {
        ProviderError::Protocol {
            provider: provider.to_string(),
            status: "transport".to_string(),
            detail: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_round_trip() {
        for kind in ProviderKind::all() {
            let parsed: ProviderKind = kind.id().parse().unwrap();
            assert_eq!(parsed, *kind);
        }
    }

    #[test]
    fn test_provider_kind_parse_is_case_insensitive() {
        assert_eq!("OpenAI".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAi);
        assert_eq!("OLLAMA".parse::<ProviderKind>().unwrap(), ProviderKind::Ollama);
    }

    #[test]
    fn test_provider_kind_parse_unknown_lists_available() {
        let err = "claude".parse::<ProviderKind>().unwrap_err();
        assert!(err.contains("openai"));
        assert!(err.contains("gemini"));
        assert!(err.contains("ollama"));
    }

    #[test]
    fn test_generation_request_uses_default_model() {
        let req = GenerationRequest::new(ProviderKind::OpenAi, None, 0.3, 100);
        assert_eq!(req.model, descriptor(ProviderKind::OpenAi).default_model);
    }

    #[test]
    fn test_generation_request_explicit_model_wins() {
        let req = GenerationRequest::new(
            ProviderKind::OpenAi,
            Some("gpt-4-turbo".to_string()),
            0.3,
            100,
        );
        assert_eq!(req.model, "gpt-4-turbo");
    }
}
