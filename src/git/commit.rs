//! Commit creation and HEAD metadata reads.

use chrono::{DateTime, TimeZone, Utc};
use git2::{Oid, Repository};

use crate::error::GitError;

/// Metadata of an existing commit, as handed to the analytics store after
/// the post-commit lifecycle point.
#[derive(Debug, Clone)]
pub struct CommitRecord {
    pub hash: String,
    pub message: String,
    pub author: String,
    pub timestamp: DateTime<Utc>,
}

impl CommitRecord {
    /// First line of the commit message.
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }
}

/// Commit the index as it stands.
///
/// This tool works on what the user staged; unlike an `add -A` flow, nothing
/// is staged on the user's behalf.
pub fn commit_staged(repo: &Repository, message: &str) -> Result<Oid, GitError> {
    let mut index = repo.index().map_err(GitError::CommitFailed)?;
    let tree_id = index.write_tree().map_err(GitError::CommitFailed)?;
    let tree = repo.find_tree(tree_id).map_err(GitError::CommitFailed)?;

    let sig = repo.signature().map_err(GitError::ConfigError)?;

    // First commit in a fresh repo has no parent.
    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&git2::Commit> = parent.iter().collect();

    let oid = repo
        .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .map_err(GitError::CommitFailed)?;

    Ok(oid)
}

/// Read back the just-made commit's metadata.
pub fn read_head_commit(repo: &Repository) -> Result<CommitRecord, GitError> {
    let commit = repo
        .head()
        .and_then(|h| h.peel_to_commit())
        .map_err(GitError::ReadCommit)?;

    let timestamp = Utc
        .timestamp_opt(commit.time().seconds(), 0)
        .single()
        .unwrap_or_else(Utc::now);

    Ok(CommitRecord {
        hash: commit.id().to_string(),
        message: commit.message().unwrap_or("").to_string(),
        author: commit.author().name().unwrap_or("unknown").to_string(),
        timestamp,
    })
}
