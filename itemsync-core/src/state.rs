//! Persisted resource state.
//!
//! One JSON document per item at
//! `<home>/.itemsync/state/<workspace_id>/<item_id>.json`.
//! Writes go to `<path>.tmp` and are renamed into place; files are `0600`
//! and directories `0700` on unix.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{io_err, StateError};
use crate::types::{ItemId, ResourceState, WorkspaceId};

pub(crate) fn home() -> Result<PathBuf, StateError> {
    dirs::home_dir().ok_or(StateError::HomeNotFound)
}

/// `~/.itemsync/state`
pub fn state_dir_at(home: &Path) -> PathBuf {
    home.join(".itemsync").join("state")
}

/// `~/.itemsync/state/<workspace_id>/<item_id>.json`
pub fn state_path_at(home: &Path, workspace_id: &WorkspaceId, item_id: &ItemId) -> PathBuf {
    state_dir_at(home)
        .join(workspace_id.as_str())
        .join(format!("{item_id}.json"))
}

/// Load a state record; `None` when the item has never been applied.
pub fn load_at<P: DeserializeOwned>(
    home: &Path,
    workspace_id: &WorkspaceId,
    item_id: &ItemId,
) -> Result<Option<ResourceState<P>>, StateError> {
    let path = state_path_at(home, workspace_id, item_id);
    if !path.exists() {
        return Ok(None);
    }
    read_state(&path).map(Some)
}

pub fn save_at<P: Serialize>(home: &Path, state: &ResourceState<P>) -> Result<(), StateError> {
    let path = state_path_at(home, &state.workspace_id, &state.id);
    let json = serde_json::to_string_pretty(state)?;
    write_atomic(&path, json.as_bytes())
}

pub fn save<P: Serialize>(state: &ResourceState<P>) -> Result<(), StateError> {
    save_at(&home()?, state)
}

/// Remove a state record. Missing records are not an error.
pub fn remove_at(home: &Path, workspace_id: &WorkspaceId, item_id: &ItemId) -> Result<(), StateError> {
    let path = state_path_at(home, workspace_id, item_id);
    match std::fs::remove_file(&path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(io_err(&path, err)),
    }
}

/// All state records, sorted by workspace then item id.
pub fn list_at(home: &Path) -> Result<Vec<ResourceState>, StateError> {
    let root = state_dir_at(home);
    if !root.exists() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for workspace in std::fs::read_dir(&root).map_err(|e| io_err(&root, e))? {
        let workspace = workspace.map_err(|e| io_err(&root, e))?.path();
        if !workspace.is_dir() {
            continue;
        }
        for entry in std::fs::read_dir(&workspace).map_err(|e| io_err(&workspace, e))? {
            let path = entry.map_err(|e| io_err(&workspace, e))?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                files.push(path);
            }
        }
    }
    files.sort();

    files.iter().map(|p| read_state(p)).collect()
}

pub fn list() -> Result<Vec<ResourceState>, StateError> {
    list_at(&home()?)
}

fn read_state<P: DeserializeOwned>(path: &Path) -> Result<ResourceState<P>, StateError> {
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    serde_json::from_str(&contents).map_err(|source| StateError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), StateError> {
    let Some(dir) = path.parent() else {
        return Err(io_err(path, std::io::Error::other("invalid state path")));
    };
    std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
    set_dir_permissions(dir)?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    std::fs::write(&tmp, contents).map_err(|e| io_err(&tmp, e))?;
    set_file_permissions(&tmp)?;
    std::fs::rename(&tmp, path).map_err(|e| io_err(path, e))?;
    Ok(())
}

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), StateError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))
        .map_err(|e| io_err(path, e))
}

#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), StateError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), StateError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| io_err(path, e))
}

#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), StateError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
