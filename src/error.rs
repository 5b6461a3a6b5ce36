//! Error types for epigram modules using thiserror.

use thiserror::Error;

/// Errors from git operations.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Failed to open repository: {0}")]
    OpenRepository(#[source] git2::Error),

    #[error("Failed to collect staged diff: {0}")]
    DiffFailed(#[source] git2::Error),

    #[error("Failed to create commit: {0}")]
    CommitFailed(#[source] git2::Error),

    #[error("Git config error (missing user.name or user.email): {0}")]
    ConfigError(#[source] git2::Error),

    #[error("Failed to read HEAD commit: {0}")]
    ReadCommit(#[source] git2::Error),
}

/// Normalized provider failures.
///
/// Backend-specific errors (reqwest transport errors, malformed JSON, odd
/// status codes) never cross the adapter boundary; they are folded into one
/// of these two kinds with enough context to diagnose.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("{provider} is unreachable: {detail}")]
    Unavailable { provider: String, detail: String },

    #[error("{provider} returned an unexpected response ({status}): {detail}")]
    Protocol {
        provider: String,
        status: String,
        detail: String,
    },
}

impl ProviderError {
    /// Name of the backend that produced this failure.
    pub fn provider(&self) -> &str {
        match self {
            ProviderError::Unavailable { provider, .. } => provider,
            ProviderError::Protocol { provider, .. } => provider,
        }
    }
}

/// Errors from the message generation pipeline.
///
/// All kinds are terminal for the invocation and propagate to the CLI for
/// user-facing reporting. None are retried automatically.
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("No staged changes to analyze. Stage files with 'git add' first")]
    EmptyInput,

    #[error("{provider} is not configured. {remediation}")]
    ProviderNotConfigured {
        provider: String,
        remediation: String,
    },

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Errors from the cache storage layer.
///
/// These never escape the hot path: lookup and store degrade to miss/skip.
/// Only the maintenance surface (purge, statistics) propagates them.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Failed to open cache database: {0}")]
    Open(#[source] sqlx::Error),

    #[error("Cache query failed: {0}")]
    Query(#[source] sqlx::Error),
}

/// Errors from configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Config file {path} is not valid JSON: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not determine home directory for state files")]
    NoHomeDir,
}

/// Internal hook stage failures.
///
/// These are advisory only: the stage runner converts every one of them into
/// a logged no-op outcome, so they can never block the surrounding commit.
#[derive(Error, Debug)]
pub enum HookError {
    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Generate(#[from] GenerateError),

    #[error("Failed to read commit message file {path}: {source}")]
    MessageFileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write commit message file {path}: {source}")]
    MessageFileWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Hint slot I/O failed: {0}")]
    HintSlot(#[source] std::io::Error),

    #[error("Analytics recording failed: {0}")]
    Analytics(#[source] sqlx::Error),

    #[error("Not inside a git repository")]
    NotARepository,
}

/// Errors from hook shim installation.
#[derive(Error, Debug)]
pub enum InstallError {
    #[error("Not inside a git repository")]
    NotARepository,

    #[error("Failed to write hook shim {path}: {source}")]
    WriteShim {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to back up existing hook {path}: {source}")]
    Backup {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to remove hook shim {path}: {source}")]
    RemoveShim {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
