//! Path guard and patch applier.
//!
//! The allowed-path set is a full inventory walk of the working tree taken
//! at run start. Every write target must already be a member; a file not in
//! the inventory cannot be a target, so new-file creation requires the path
//! to be pre-declared in the plan-phase file list (which is filtered against
//! the same inventory).

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::Result;

/// Mapping from repository-relative path to full replacement content.
/// Transient: held for one orchestration run, discarded after writing.
pub type ProposedChanges = BTreeMap<String, String>;

/// Walk the working tree and return sorted repository-relative paths.
///
/// Any path with a dot-prefixed component (`.git`, `.github`, hidden files)
/// is excluded. Separators are normalized to `/`.
pub fn file_inventory(root: &Path) -> Result<Vec<String>> {
    let mut out = Vec::new();
    walk(root, &mut Vec::new(), &mut out)?;
    out.sort();
    Ok(out)
}

fn walk(dir: &Path, components: &mut Vec<String>, out: &mut Vec<String>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        let file_type = entry.file_type()?;
        components.push(name);
        if file_type.is_dir() {
            walk(&entry.path(), components, out)?;
        } else if file_type.is_file() {
            out.push(components.join("/"));
        }
        components.pop();
    }
    Ok(())
}

/// Write accepted changes under `root`, creating parent directories as
/// needed and overwriting unconditionally. Returns the written paths.
///
/// Callers must abort the run before any version-control mutation when the
/// change set is empty; this function only writes what it is given.
pub fn apply_patches(root: &Path, changes: &ProposedChanges) -> Result<Vec<String>> {
    let mut written = Vec::with_capacity(changes.len());
    for (path, content) in changes {
        let full = root.join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&full, content)?;
        debug!(path = %path, bytes = content.len(), "wrote patch");
        written.push(path.clone());
    }
    Ok(written)
}
