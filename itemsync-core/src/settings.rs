//! User settings at `<home>/.itemsync/settings.yaml`.
//!
//! A missing file yields [`Settings::default`]; unknown keys are ignored so
//! older binaries can read newer files.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{io_err, StateError};
use crate::types::Operation;

const DEFAULT_TIMEOUT_SECS: u64 = 600;
const DEFAULT_PAGE_SIZE: usize = 100;

/// Per-operation remote call timeouts, in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    pub create: u64,
    pub read: u64,
    pub update: u64,
    pub delete: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            create: DEFAULT_TIMEOUT_SECS,
            read: DEFAULT_TIMEOUT_SECS,
            update: DEFAULT_TIMEOUT_SECS,
            delete: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Timeouts {
    pub fn for_op(&self, op: Operation) -> Duration {
        let secs = match op {
            Operation::Create => self.create,
            Operation::Read => self.read,
            Operation::Update => self.update,
            Operation::Delete => self.delete,
        };
        Duration::from_secs(secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub timeouts: Timeouts,
    /// Allow resource kinds that are still in preview.
    pub preview: bool,
    /// Page size requested when listing items.
    pub page_size: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timeouts: Timeouts::default(),
            preview: false,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

pub fn settings_path_at(home: &Path) -> PathBuf {
    home.join(".itemsync").join("settings.yaml")
}

pub fn load_at(home: &Path) -> Result<Settings, StateError> {
    let path = settings_path_at(home);
    if !path.exists() {
        return Ok(Settings::default());
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    serde_yaml::from_str(&contents).map_err(|source| StateError::ParseYaml { path, source })
}

pub fn load() -> Result<Settings, StateError> {
    load_at(&crate::state::home()?)
}

pub fn save_at(home: &Path, settings: &Settings) -> Result<(), StateError> {
    let path = settings_path_at(home);
    let yaml = serde_yaml::to_string(settings)?;
    crate::state::write_atomic(&path, yaml.as_bytes())
}
