use std::time::Duration;

use thiserror::Error;

use itemsync_compiler::CompileError;
use itemsync_core::{Diagnostics, FormatError, ImportIdError, Operation, WorkspaceId};
use itemsync_drift::DriftError;

/// Failures reported by an [`ItemsClient`](crate::client::ItemsClient).
///
/// `NotFound` is kept apart from every other failure so callers can treat
/// absence differently per operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    #[error("{item_type} '{id}' not found")]
    NotFound { item_type: String, id: String },

    #[error("transient remote failure: {message}")]
    Transient { message: String },

    #[error("request rejected ({code}): {message}")]
    Rejected { code: String, message: String },
}

/// Error surface of the lifecycle controller.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("{operation} cancelled")]
    Cancelled { operation: Operation },

    #[error("{operation} timed out after {}s", timeout.as_secs())]
    Timeout { operation: Operation, timeout: Duration },

    #[error("invalid configuration:\n{0}")]
    Configuration(Diagnostics),

    #[error("'{name}' is not available without opting in to preview mode")]
    PreviewModeRequired { name: String },

    #[error("workspace_id cannot change ({from} -> {to}); the item must be replaced")]
    WorkspaceChanged { from: WorkspaceId, to: WorkspaceId },

    #[error("manifest kind '{found}' does not match controller kind '{expected}'")]
    KindMismatch { expected: String, found: String },

    #[error("invalid import identifier, expected WorkspaceID/{item_type}ID: {source}")]
    ImportId {
        item_type: String,
        #[source]
        source: ImportIdError,
    },

    #[error("invalid {what}: {source}")]
    Payload {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown item kind '{0}'")]
    UnknownKind(String),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Drift(#[from] DriftError),

    #[error(transparent)]
    Format(#[from] FormatError),
}

impl LifecycleError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, LifecycleError::Remote(RemoteError::NotFound { .. }))
    }
}

pub(crate) fn payload_err(what: &'static str) -> impl FnOnce(serde_json::Error) -> LifecycleError {
    move |source| LifecycleError::Payload { what, source }
}
