//! Single-slot persistence for the pre-stage type hint.
//!
//! One JSON file, overwritten each cycle and cleared after the post-commit
//! stage. Writes go through a temp file rename so a concurrent reader never
//! sees a torn slot.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::classify::CommitTypeHint;

const HINT_FILE: &str = "last_hint.json";

fn slot_path(state_dir: &Path) -> PathBuf {
    state_dir.join(HINT_FILE)
}

/// Persist the hint, overwriting any previous one.
pub fn save_hint(state_dir: &Path, hint: &CommitTypeHint) -> io::Result<()> {
    let text = serde_json::to_string(hint)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    let tmp = tempfile::NamedTempFile::new_in(state_dir)?;
    fs::write(tmp.path(), text)?;
    tmp.persist(slot_path(state_dir)).map_err(|e| e.error)?;
    Ok(())
}

/// Read the current hint, if one is stored and parseable.
pub fn load_hint(state_dir: &Path) -> Option<CommitTypeHint> {
    let text = fs::read_to_string(slot_path(state_dir)).ok()?;
    serde_json::from_str(&text).ok()
}

/// Clear the slot. A missing slot is not an error.
pub fn clear_hint(state_dir: &Path) -> io::Result<()> {
    match fs::remove_file(slot_path(state_dir)) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}
