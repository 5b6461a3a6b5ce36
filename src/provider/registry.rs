//! Static provider registry.
//!
//! A fixed allow-list mapping each [`ProviderKind`] to its descriptor and
//! adapter constructor, resolved at startup. Adding a backend means adding
//! one descriptor row and one factory arm.

use crate::provider::gemini::GeminiAdapter;
use crate::provider::ollama::OllamaAdapter;
use crate::provider::openai::OpenAiAdapter;
use crate::provider::{ProviderAdapter, ProviderKind};

/// Static registry entry for one backend.
#[derive(Debug, Clone, Copy)]
pub struct ProviderDescriptor {
    pub id: &'static str,
    pub name: &'static str,
    pub models: &'static [&'static str],
    pub default_model: &'static str,
}

const OPENAI: ProviderDescriptor = ProviderDescriptor {
    id: "openai",
    name: "OpenAI",
    models: &["gpt-4", "gpt-4-turbo", "gpt-4o", "gpt-3.5-turbo"],
    default_model: "gpt-4",
};

const GEMINI: ProviderDescriptor = ProviderDescriptor {
    id: "gemini",
    name: "Google Gemini",
    models: &["gemini-pro", "gemini-1.5-pro", "gemini-1.5-flash"],
    default_model: "gemini-pro",
};

const OLLAMA: ProviderDescriptor = ProviderDescriptor {
    id: "ollama",
    name: "Ollama (local)",
    models: &[
        "codellama:7b",
        "codellama:13b",
        "llama2:7b",
        "mistral:7b",
    ],
    default_model: "codellama:7b",
};

/// Look up the descriptor for a backend.
pub fn descriptor(kind: ProviderKind) -> &'static ProviderDescriptor {
    match kind {
        ProviderKind::OpenAi => &OPENAI,
        ProviderKind::Gemini => &GEMINI,
        ProviderKind::Ollama => &OLLAMA,
    }
}

/// Construct the adapter for a backend.
pub fn create_adapter(kind: ProviderKind) -> Box<dyn ProviderAdapter> {
    match kind {
        ProviderKind::OpenAi => Box::new(OpenAiAdapter::from_env()),
        ProviderKind::Gemini => Box::new(GeminiAdapter::from_env()),
        ProviderKind::Ollama => Box::new(OllamaAdapter::from_env()),
    }
}

/// Whether a model identifier is known for the given backend.
///
/// Unknown models are allowed through (backends add models faster than we
/// ship releases); this is used for a warning, not a gate.
pub fn is_known_model(kind: ProviderKind, model: &str) -> bool {
    descriptor(kind).models.contains(&model)
}
