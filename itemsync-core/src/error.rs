//! Error types for itemsync-core.

use std::path::PathBuf;

use thiserror::Error;

/// Static authoring errors in a kind's format table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("format '{format_type}' is declared more than once")]
    DuplicateFormat { format_type: String },

    #[error("format '{format_type}' declares path '{path}' more than once")]
    DuplicatePath { format_type: String, path: String },
}

/// Errors parsing a `workspaceID/itemID` import key.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImportIdError {
    #[error("unexpected import identifier '{input}'; expected 'WorkspaceID/ItemID'")]
    Malformed { input: String },

    #[error("invalid {field} '{value}': not a UUID")]
    InvalidUuid { field: &'static str, value: String },
}

/// All errors that can arise from settings and state-file operations.
#[derive(Debug, Error)]
pub enum StateError {
    /// I/O failure, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON parse error on load, with the offending file.
    #[error("failed to parse state at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// YAML parse error on settings or manifest load.
    #[error("failed to parse {path}: {source}")]
    ParseYaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// JSON serialization error (save path).
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization error (save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// `dirs::home_dir()` returned `None`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,
}

/// Convenience constructor for [`StateError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> StateError {
    StateError::Io {
        path: path.into(),
        source,
    }
}
