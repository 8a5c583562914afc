//! itemsync core library: domain types, format registry, diagnostics,
//! settings and persisted state.
//!
//! - [`types`]: newtypes, definition parts, manifests and state records
//! - [`format`]: [`FormatRegistry`]
//! - [`diagnostics`]: [`Diagnostic`] / [`Diagnostics`]
//! - [`settings`] / [`state`] / [`manifest`]: files under `~/.itemsync/`

pub mod diagnostics;
pub mod error;
pub mod format;
pub mod manifest;
pub mod settings;
pub mod state;
pub mod types;

pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::{FormatError, ImportIdError, StateError};
pub use format::{DefinitionFormat, FormatRegistry, DEFAULT_FORMAT};
pub use settings::{Settings, Timeouts};
pub use types::{
    CompiledPart, DefinitionConfig, DefinitionPart, DisplayName, Fingerprint, ImportId,
    ItemDefinition, ItemId, ItemIdentity, Operation, ParameterKind, ParameterRule, PayloadType,
    ProcessingMode, ResourceManifest, ResourceState, TokensDelimiter, WorkspaceId,
};
