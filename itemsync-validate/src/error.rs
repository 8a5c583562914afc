//! Error taxonomy for conditional validation.

use thiserror::Error;

use itemsync_core::Diagnostic;

/// Everything a validator can report.
///
/// `ValidationFailed` is an ordinary finding; the other variants abort the
/// validator that raised them, since its remaining checks depend on the
/// failed step.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The trigger expression resolved to no location.
    #[error("{trigger} must be set")]
    MissingTrigger { attribute: String, trigger: String },

    /// A location could not be read (e.g. stepping into a scalar).
    #[error("unable to retrieve attribute path: {path}")]
    UnreadableAttribute { attribute: String, path: String },

    /// A configured pattern is not a valid expression.
    #[error("unable to compile pattern '{pattern}': {source}")]
    PatternCompileFailure {
        attribute: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The attribute's value violates the rule.
    #[error("{message}, got: {value}")]
    ValidationFailed {
        attribute: String,
        message: String,
        value: String,
    },
}

impl ValidationError {
    /// Attribute path the finding is anchored at.
    pub fn attribute(&self) -> &str {
        match self {
            ValidationError::MissingTrigger { attribute, .. }
            | ValidationError::UnreadableAttribute { attribute, .. }
            | ValidationError::PatternCompileFailure { attribute, .. }
            | ValidationError::ValidationFailed { attribute, .. } => attribute,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let summary = match self {
            ValidationError::ValidationFailed { .. } => "Invalid attribute value".to_string(),
            _ => format!("Invalid configuration for attribute {}", self.attribute()),
        };
        Diagnostic::error(summary, self.to_string()).at(self.attribute())
    }
}
