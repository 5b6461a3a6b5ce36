//! Per-invocation application context.
//!
//! One `AppContext` is constructed in `main` (or a hook shim entry) and
//! passed by reference into the pipeline and orchestrator, so every
//! dependency is visible at the call site and trivially swappable in tests.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::warn;

use crate::cache::ResponseCache;
use crate::config::Config;

const CACHE_DB: &str = "cache.db";
const ANALYTICS_DB: &str = "analytics.db";

pub struct AppContext {
    pub config: Config,
    pub state_dir: PathBuf,
    /// None when caching is disabled for the invocation or the store could
    /// not be opened (generation then proceeds cache-less).
    pub cache: Option<ResponseCache>,
}

impl AppContext {
    /// Build a context without a cache handle.
    pub fn new(config: Config, state_dir: impl Into<PathBuf>) -> Self {
        let state_dir = state_dir.into();
        if let Err(e) = std::fs::create_dir_all(&state_dir) {
            warn!("Could not create state directory {}: {e}", state_dir.display());
        }
        Self {
            config,
            state_dir,
            cache: None,
        }
    }

    /// Attach the response cache, honoring `cache_enabled`.
    ///
    /// Failure to open the store is not fatal: the invocation degrades to
    /// cache-less generation.
    pub async fn with_cache(mut self) -> Self {
        if !self.config.cache_enabled {
            return self;
        }

        match ResponseCache::open(&self.cache_db_path(), self.cache_max_age()).await {
            Ok(cache) => self.cache = Some(cache),
            Err(e) => warn!("Could not open response cache, continuing without it: {e}"),
        }
        self
    }

    pub fn cache_db_path(&self) -> PathBuf {
        self.state_dir.join(CACHE_DB)
    }

    pub fn analytics_db_path(&self) -> PathBuf {
        self.state_dir.join(ANALYTICS_DB)
    }

    pub fn cache_max_age(&self) -> Duration {
        Duration::from_secs(self.config.cache_max_age_hours * 60 * 60)
    }

    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }
}
