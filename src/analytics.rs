//! Commit recording boundary for the external analytics surface.
//!
//! Only recording lives here; aggregation and reporting are owned by an
//! external consumer of the same database.

use std::path::Path;
use std::str::FromStr;

use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Row, Sqlite};
use tracing::debug;

use crate::git::CommitRecord;
use crate::hooks::validate::parse_type_prefix;

/// Append-only store of commit metadata, one row per commit.
pub struct AnalyticsStore {
    pool: Pool<Sqlite>,
}

impl AnalyticsStore {
    /// Open (creating if needed) the analytics database at `db_path`.
    pub async fn open(db_path: &Path) -> Result<Self, sqlx::Error> {
        let options =
            SqliteConnectOptions::from_str(&format!("sqlite:{}?mode=rwc", db_path.display()))?
                .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS commit_metrics (
                hash         TEXT PRIMARY KEY,
                message      TEXT NOT NULL,
                commit_type  TEXT,
                author       TEXT NOT NULL,
                committed_at INTEGER NOT NULL,
                recorded_at  INTEGER NOT NULL
            )",
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }

    /// Record one commit. Re-recording the same hash overwrites the row.
    pub async fn record_commit(&self, record: &CommitRecord) -> Result<(), sqlx::Error> {
        let commit_type = parse_type_prefix(record.summary()).map(|(t, _)| t.to_string());

        sqlx::query(
            "INSERT OR REPLACE INTO commit_metrics
             (hash, message, commit_type, author, committed_at, recorded_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.hash)
        .bind(&record.message)
        .bind(commit_type)
        .bind(&record.author)
        .bind(record.timestamp.timestamp())
        .bind(Utc::now().timestamp())
        .execute(&self.pool)
        .await?;

        debug!("Recorded commit {}", &record.hash[..7.min(record.hash.len())]);
        Ok(())
    }

    /// Number of commits recorded so far.
    pub async fn total_recorded(&self) -> Result<i64, sqlx::Error> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM commit_metrics")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(hash: &str, message: &str) -> CommitRecord {
        CommitRecord {
            hash: hash.to_string(),
            message: message.to_string(),
            author: "Test User".to_string(),
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_record_and_count() {
        let dir = tempfile::tempdir().unwrap();
        let store = AnalyticsStore::open(&dir.path().join("analytics.db"))
            .await
            .unwrap();

        store.record_commit(&record("a1", "feat: Add thing")).await.unwrap();
        store.record_commit(&record("b2", "plain message")).await.unwrap();
        assert_eq!(store.total_recorded().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_recording_same_hash_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = AnalyticsStore::open(&dir.path().join("analytics.db"))
            .await
            .unwrap();

        store.record_commit(&record("a1", "feat: Add thing")).await.unwrap();
        store.record_commit(&record("a1", "feat: Add thing")).await.unwrap();
        assert_eq!(store.total_recorded().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_commit_type_extracted_from_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("analytics.db");
        let store = AnalyticsStore::open(&db).await.unwrap();
        store
            .record_commit(&record("a1", "fix(parser): Handle empty input"))
            .await
            .unwrap();

        let row = sqlx::query("SELECT commit_type FROM commit_metrics WHERE hash = 'a1'")
            .fetch_one(&store.pool)
            .await
            .unwrap();
        let commit_type: Option<String> = row.get("commit_type");
        assert_eq!(commit_type.as_deref(), Some("fix"));
    }
}
