//! Definition format registry.
//!
//! Each resource kind declares a static table of [`DefinitionFormat`]s: the
//! externally visible format identifier, the value sent to the remote API, and
//! the definition paths that format allows (paths may contain `*`).
//!
//! | Kind               | Formats                |
//! |--------------------|------------------------|
//! | Notebook           | `ipynb`, `py`          |
//! | Report             | `PBIR`, `PBIR-Legacy`  |
//! | Eventstream        | `Default`              |
//!
//! Lookups for unknown format types return empty results rather than errors;
//! callers treat that as "no restriction".

use std::collections::BTreeSet;

use crate::error::FormatError;

/// Format type used when a kind has a single, unnamed format.
pub const DEFAULT_FORMAT: &str = "Default";

/// One named definition layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefinitionFormat {
    /// Identifier used in manifests (`format:`).
    pub format_type: &'static str,
    /// Value sent in the remote `format` field; `None` omits the field.
    pub wire_format: Option<&'static str>,
    /// Allowed definition paths, in declaration order.
    pub paths: &'static [&'static str],
}

/// Validated, immutable collection of a kind's formats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatRegistry {
    formats: Vec<DefinitionFormat>,
}

impl FormatRegistry {
    /// Build a registry, rejecting duplicate format types and duplicate paths
    /// within one format.
    pub fn new(formats: &[DefinitionFormat]) -> Result<Self, FormatError> {
        let mut seen_types = BTreeSet::new();
        for format in formats {
            if !seen_types.insert(format.format_type) {
                return Err(FormatError::DuplicateFormat {
                    format_type: format.format_type.to_string(),
                });
            }
            let mut seen_paths = BTreeSet::new();
            for path in format.paths {
                if !seen_paths.insert(*path) {
                    return Err(FormatError::DuplicatePath {
                        format_type: format.format_type.to_string(),
                        path: (*path).to_string(),
                    });
                }
            }
        }
        Ok(Self {
            formats: formats.to_vec(),
        })
    }

    pub fn formats(&self) -> &[DefinitionFormat] {
        &self.formats
    }

    pub fn get(&self, format_type: &str) -> Option<&DefinitionFormat> {
        self.formats.iter().find(|f| f.format_type == format_type)
    }

    pub fn contains(&self, format_type: &str) -> bool {
        self.get(format_type).is_some()
    }

    /// Declared paths for `format_type`; empty when the type is unknown.
    pub fn lookup(&self, format_type: &str) -> &'static [&'static str] {
        self.get(format_type).map(|f| f.paths).unwrap_or(&[])
    }

    /// All format types, sorted.
    pub fn all_types(&self) -> Vec<&'static str> {
        let mut types: Vec<_> = self.formats.iter().map(|f| f.format_type).collect();
        types.sort_unstable();
        types
    }

    /// Wire value for `format_type`; `None` when unknown or not sent.
    pub fn wire_format_for(&self, format_type: &str) -> Option<&'static str> {
        self.get(format_type).and_then(|f| f.wire_format)
    }

    /// First declared path of `format_type`, used to place a synthesized
    /// empty definition.
    pub fn first_path(&self, format_type: &str) -> Option<&'static str> {
        self.lookup(format_type).first().copied()
    }

    /// Resolve the active format for an optional manifest selector.
    ///
    /// An explicit selector is looked up as-is; no selector falls back to
    /// [`DEFAULT_FORMAT`].
    pub fn active(&self, format: Option<&str>) -> Option<&DefinitionFormat> {
        self.get(format.unwrap_or(DEFAULT_FORMAT))
    }

    /// Stable `"Type: path, path"` lines, sorted by type.
    pub fn paths_docs(&self) -> Vec<String> {
        self.all_types()
            .into_iter()
            .map(|t| format!("{t}: {}", self.lookup(t).join(", ")))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
