//! Git integration: staged diff capture and commit lifecycle reads.

pub mod commit;
pub mod diff;

pub use commit::{CommitRecord, commit_staged, read_head_commit};
pub use diff::{ChangedFile, DiffPayload, FileStatus, collect_staged_diff, has_staged_changes};
