//! The commit message generation pipeline.
//!
//! One entry point, [`MessagePipeline::generate`], orchestrating
//! fingerprinting, cache lookup, provider invocation on miss,
//! post-processing, and cache population, strictly in that order. Cache
//! lookup always precedes the provider call, and the store only happens
//! after a complete post-processed message exists, so an interrupted
//! invocation never leaves a partial entry behind.

pub mod cleanup;
pub mod prompt;

use tracing::{debug, info};

use crate::cache::fingerprint;
use crate::classify::classify;
use crate::context::AppContext;
use crate::error::GenerateError;
use crate::git::DiffPayload;
use crate::provider::{GenerationRequest, ProviderAdapter, create_adapter, descriptor};

pub use cleanup::clean_message;
pub use prompt::build_prompt;

pub struct MessagePipeline<'a> {
    ctx: &'a AppContext,
}

impl<'a> MessagePipeline<'a> {
    pub fn new(ctx: &'a AppContext) -> Self {
        Self { ctx }
    }

    /// Generate a commit message for the staged changes.
    ///
    /// Resolves the adapter from the static registry; failures name the
    /// provider and the underlying cause, and no silent fallback to another
    /// backend ever happens.
    pub async fn generate(
        &self,
        payload: &DiffPayload,
        request: &GenerationRequest,
    ) -> Result<String, GenerateError> {
        let adapter = create_adapter(request.provider);
        self.generate_with(payload, request, adapter.as_ref()).await
    }

    async fn generate_with(
        &self,
        payload: &DiffPayload,
        request: &GenerationRequest,
        adapter: &dyn ProviderAdapter,
    ) -> Result<String, GenerateError> {
        // Empty input is rejected before any cache or provider interaction.
        if payload.diff_text.trim().is_empty() {
            return Err(GenerateError::EmptyInput);
        }

        let fp = fingerprint(&payload.diff_text, request);

        if self.ctx.config.cache_enabled {
            if let Some(cache) = &self.ctx.cache {
                if let Some(message) = cache.lookup(&fp).await {
                    return Ok(message);
                }
            }
        }

        if !adapter.is_configured().await {
            let desc = descriptor(request.provider);
            return Err(GenerateError::ProviderNotConfigured {
                provider: desc.name.to_string(),
                remediation: adapter.remediation(),
            });
        }

        let hint = classify(&payload.diff_text);
        let prompt = build_prompt(payload, Some(&hint));
        debug!(
            "Prompt: {} chars, {} staged files",
            prompt.len(),
            payload.changed_files.len()
        );

        let raw = adapter
            .generate(&prompt, &request.sampling_params())
            .await?;

        let message = clean_message(&raw);
        info!("Generated message via {}: {}", request.provider, message);

        if self.ctx.config.cache_enabled {
            if let Some(cache) = &self.ctx.cache {
                cache.store(&fp, &message, request).await;
            }
        }

        Ok(message)
    }
}
