//! Error types for itemsync-compiler.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while compiling a definition part.
///
/// Every variant names the offending key, path or expression.
#[derive(Debug, Error)]
pub enum CompileError {
    /// The part's source file could not be read.
    #[error("failed to read source {path}: {source}")]
    SourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A token key does not match `^[A-Za-z0-9]+([_]?[A-Za-z0-9]+)*$`.
    #[error("invalid token key '{key}': only letters, digits and single inner underscores are allowed")]
    InvalidTokenKey { key: String },

    /// The template references a token that was not supplied.
    #[error("unresolved placeholder '{key}' in {source_path}")]
    UnresolvedPlaceholder { key: String, source_path: PathBuf },

    /// A placeholder could not be parsed.
    #[error("malformed placeholder '{placeholder}' in {source_path}")]
    MalformedPlaceholder {
        placeholder: String,
        source_path: PathBuf,
    },

    /// A JSONPath rule could not be parsed or applied.
    #[error("invalid JSONPath '{expression}': {reason}")]
    InvalidJsonPath { expression: String, reason: String },

    /// A text replacement rule with nothing to find.
    #[error("parameter #{index} has an empty 'find' value")]
    EmptyFind { index: usize },

    /// Template engine failure.
    #[error("template engine error: {0}")]
    Template(#[from] tera::Error),

    /// JSON serialization error while normalizing content.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Payload could not be base64-decoded.
    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// gzip stream error.
    #[error("gzip error: {0}")]
    Gzip(#[source] std::io::Error),
}

pub(crate) fn source_err(path: impl Into<PathBuf>, source: std::io::Error) -> CompileError {
    CompileError::SourceRead {
        path: path.into(),
        source,
    }
}
