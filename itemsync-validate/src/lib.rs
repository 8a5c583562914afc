//! Conditional validation of item configuration trees.
//!
//! Validators are attached to host attributes through a [`ValidatorEngine`].
//! Findings come back as [`itemsync_core::Diagnostics`]; a validator that
//! cannot evaluate its own rule reports that as a diagnostic too, and the
//! engine keeps going.
//!
//! The central species is [`PatternIfAttributeIsOneOf`]: when a trigger
//! attribute takes one of a set of values, the host (or each key of a map
//! host) must match one of a set of wildcard patterns.

pub mod engine;
pub mod error;
pub mod path;
pub mod pattern;
pub mod schema;
pub mod validators;

pub use engine::ValidatorEngine;
pub use error::ValidationError;
pub use path::{lookup, AttrExpr, AttrPath, Lookup, UNKNOWN};
pub use pattern::PatternSyntax;
pub use schema::{definition_path_keys, item_validators, tree_from_yaml, ItemSchema, RequiredEntry};
pub use validators::{
    ConflictsWith, ExactlyOneOf, LengthAtMost, Outcome, PatternIfAttributeIsOneOf, ProcessingModeArguments,
    RequiredIfAttributeIsSet, StructuralPresenceIfMarker, ValidationContext, Validator, ValueIsOneOf,
};
