//! Error types for itemsync-drift.

use thiserror::Error;

use itemsync_compiler::CompileError;

/// All errors that can arise while describing drift.
#[derive(Debug, Error)]
pub enum DriftError {
    /// A stored or desired payload could not be decoded.
    #[error("payload error at '{path}': {source}")]
    Payload {
        path: String,
        #[source]
        source: CompileError,
    },
}
