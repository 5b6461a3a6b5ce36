//! SQLite-backed cache store.
//!
//! One row per fingerprint, transactional per entry (single-statement
//! upserts and deletes, WAL journal), so concurrent invocations sharing the
//! store never observe a half-written row.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Pool, Row, Sqlite};
use tracing::{debug, info, warn};

use crate::error::CacheError;
use crate::provider::GenerationRequest;

/// Default freshness window for cached responses.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);

/// Summary of store contents for the reporting surface.
#[derive(Debug, Clone)]
pub struct CacheStatistics {
    pub total_entries: i64,
    /// Entry counts grouped by provider id.
    pub per_provider: Vec<(String, i64)>,
    pub oldest_entry: Option<DateTime<Utc>>,
}

/// Content-addressed, TTL-bounded response store.
pub struct ResponseCache {
    pool: Pool<Sqlite>,
    max_age: Duration,
}

impl ResponseCache {
    /// Open (creating if needed) the cache database at `db_path`.
    pub async fn open(db_path: &Path, max_age: Duration) -> Result<Self, CacheError> {
        let options =
            SqliteConnectOptions::from_str(&format!("sqlite:{}?mode=rwc", db_path.display()))
                .map_err(CacheError::Open)?
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(CacheError::Open)?;

        let cache = Self { pool, max_age };
        cache.init_schema().await?;
        Ok(cache)
    }

    async fn init_schema(&self) -> Result<(), CacheError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS commit_cache (
                diff_hash      TEXT PRIMARY KEY,
                provider       TEXT NOT NULL,
                model          TEXT NOT NULL,
                temperature    REAL NOT NULL,
                max_tokens     INTEGER NOT NULL,
                commit_message TEXT NOT NULL,
                created_at     INTEGER NOT NULL,
                accessed_at    INTEGER NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(CacheError::Query)?;

        Ok(())
    }

    /// Look up a cached message by fingerprint.
    ///
    /// Returns the message only while it is within the freshness window; an
    /// expired entry is deleted as a side effect and treated as a miss. Any
    /// storage error also degrades to a miss so generation can proceed as if
    /// the cache were absent.
    pub async fn lookup(&self, fingerprint: &str) -> Option<String> {
        let row = match sqlx::query(
            "SELECT commit_message, created_at FROM commit_cache WHERE diff_hash = ?",
        )
        .bind(fingerprint)
        .fetch_optional(&self.pool)
        .await
        {
            Ok(row) => row?,
            Err(e) => {
                warn!("Cache lookup failed, treating as miss: {e}");
                return None;
            }
        };

        let message: String = row.get("commit_message");
        let created_at: i64 = row.get("created_at");
        let age = Utc::now().timestamp() - created_at;

        if age <= self.max_age.as_secs() as i64 {
            if let Err(e) =
                sqlx::query("UPDATE commit_cache SET accessed_at = ? WHERE diff_hash = ?")
                    .bind(Utc::now().timestamp())
                    .bind(fingerprint)
                    .execute(&self.pool)
                    .await
            {
                warn!("Failed to update cache access time: {e}");
            }
            info!("Cache hit for {}...", &fingerprint[..12.min(fingerprint.len())]);
            Some(message)
        } else {
            if let Err(e) = sqlx::query("DELETE FROM commit_cache WHERE diff_hash = ?")
                .bind(fingerprint)
                .execute(&self.pool)
                .await
            {
                warn!("Failed to delete expired cache entry: {e}");
            }
            debug!(
                "Expired cache entry removed: {}...",
                &fingerprint[..12.min(fingerprint.len())]
            );
            None
        }
    }

    /// Store a generated message under its fingerprint.
    ///
    /// Idempotent upsert: re-storing the same fingerprint overwrites the
    /// prior row. Storage errors are logged and swallowed; a failed store
    /// only costs a future cache miss.
    pub async fn store(&self, fingerprint: &str, message: &str, request: &GenerationRequest) {
        let now = Utc::now().timestamp();

        let result = sqlx::query(
            "INSERT OR REPLACE INTO commit_cache
             (diff_hash, provider, model, temperature, max_tokens, commit_message, created_at, accessed_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(fingerprint)
        .bind(request.provider.id())
        .bind(&request.model)
        .bind(request.temperature)
        .bind(request.max_tokens as i64)
        .bind(message)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => debug!(
                "Cached response for {}...",
                &fingerprint[..12.min(fingerprint.len())]
            ),
            Err(e) => warn!("Failed to store cache entry: {e}"),
        }
    }

    /// Delete all entries older than the freshness window. Returns the
    /// number removed.
    pub async fn purge_expired(&self) -> Result<u64, CacheError> {
        let cutoff = Utc::now().timestamp() - self.max_age.as_secs() as i64;

        let result = sqlx::query("DELETE FROM commit_cache WHERE created_at < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(CacheError::Query)?;

        let removed = result.rows_affected();
        if removed > 0 {
            info!("Removed {removed} expired cache entries");
        }
        Ok(removed)
    }

    /// Delete every entry unconditionally. Returns the number removed.
    pub async fn purge_all(&self) -> Result<u64, CacheError> {
        let result = sqlx::query("DELETE FROM commit_cache")
            .execute(&self.pool)
            .await
            .map_err(CacheError::Query)?;

        let removed = result.rows_affected();
        info!("Cache cleared: {removed} entries removed");
        Ok(removed)
    }

    /// Entry count, per-provider breakdown, and oldest entry timestamp.
    /// Reporting surface only; not on the generation hot path.
    pub async fn statistics(&self) -> Result<CacheStatistics, CacheError> {
        let total_entries: i64 = sqlx::query("SELECT COUNT(*) AS n FROM commit_cache")
            .fetch_one(&self.pool)
            .await
            .map_err(CacheError::Query)?
            .get("n");

        let per_provider = sqlx::query(
            "SELECT provider, COUNT(*) AS n FROM commit_cache GROUP BY provider ORDER BY provider",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(CacheError::Query)?
        .into_iter()
        .map(|row| (row.get::<String, _>("provider"), row.get::<i64, _>("n")))
        .collect();

        let oldest: Option<i64> = sqlx::query("SELECT MIN(created_at) AS oldest FROM commit_cache")
            .fetch_one(&self.pool)
            .await
            .map_err(CacheError::Query)?
            .get("oldest");

        let oldest_entry = oldest.and_then(|secs| Utc.timestamp_opt(secs, 0).single());

        Ok(CacheStatistics {
            total_entries,
            per_provider,
            oldest_entry,
        })
    }
}
