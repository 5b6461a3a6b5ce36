//! Persistent user configuration.
//!
//! A single JSON file under the per-user state directory. A missing file
//! means defaults; a malformed file is an error that names the path rather
//! than silently resetting the user's settings.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::provider::ProviderKind;

/// Name of the per-user state directory under $HOME.
pub const STATE_DIR_NAME: &str = ".epigram";

const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default backend when the CLI does not select one.
    pub provider: ProviderKind,
    /// Explicit model override; None means the provider default.
    pub model: Option<String>,
    /// Maximum output length in tokens.
    pub max_tokens: u32,
    /// Sampling temperature, 0.0-1.0.
    pub temperature: f32,
    /// Whether generation consults and populates the response cache.
    pub cache_enabled: bool,
    /// Freshness window for cached responses, in hours.
    pub cache_max_age_hours: u64,
    /// Master switch for the hook lifecycle stages.
    pub hooks_enabled: bool,
    /// Apply local heuristic fixes to invalid commit messages.
    pub auto_improve: bool,
    /// Regenerate invalid commit messages via the AI pipeline. Distinct
    /// opt-in on top of `auto_improve`.
    pub auto_improve_ai: bool,
    /// Always stop after printing the message, never commit.
    pub preview_mode: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderKind::OpenAi,
            model: None,
            max_tokens: 100,
            temperature: 0.3,
            cache_enabled: true,
            cache_max_age_hours: 24,
            hooks_enabled: true,
            auto_improve: false,
            auto_improve_ai: false,
            preview_mode: false,
        }
    }
}

impl Config {
    /// Load the config from `dir/config.json`, falling back to defaults
    /// when the file does not exist.
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let text = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Write the config to `dir/config.json`.
    pub fn save(&self, dir: &Path) -> Result<(), ConfigError> {
        let path = dir.join(CONFIG_FILE);
        let text = serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string());
        fs::write(&path, text).map_err(|source| ConfigError::Write {
            path: path.display().to_string(),
            source,
        })
    }
}

/// Per-user state directory (`~/.epigram`), holding the config file, the
/// cache and analytics databases, and the transient hint slot.
pub fn default_state_dir() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|home| home.join(STATE_DIR_NAME))
        .ok_or(ConfigError::NoHomeDir)
}
