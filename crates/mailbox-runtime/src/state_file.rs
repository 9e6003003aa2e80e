//! JSON persistence of the state snapshot.

use anyhow::{Context, Result};
use mailbox_contract::prelude::StateSnapshot;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Reads the snapshot at `path`. A missing file is an empty state.
///
/// # Errors
///
/// Unreadable or unparsable files.
pub fn load_snapshot(path: &Path) -> Result<StateSnapshot> {
    match fs::read(path) {
        Ok(raw) => serde_json::from_slice(&raw)
            .with_context(|| format!("Failed to parse state file {}", path.display())),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(StateSnapshot::default()),
        Err(e) => {
            Err(e).with_context(|| format!("Failed to read state file {}", path.display()))
        }
    }
}

/// Writes the snapshot to `path`, replacing it atomically.
///
/// # Errors
///
/// Serialization or filesystem failures.
pub fn save_snapshot(path: &Path, snapshot: &StateSnapshot) -> Result<()> {
    let json = serde_json::to_vec_pretty(snapshot).context("Failed to serialize state")?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).with_context(|| format!("Failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("Failed to replace state file {}", path.display()))?;
    Ok(())
}
