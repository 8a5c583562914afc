//! # itemsync-drift
//!
//! Decides whether a definition must be pushed and describes what changed.
//!
//! - [`detector`]: [`decide`] over previous/desired compiled definitions
//! - [`identity`]: display name, description and folder changes
//! - [`diff`]: per-path unified diffs for plan output

pub mod detector;
pub mod diff;
pub mod error;
pub mod identity;

pub use detector::{decide, DriftDecision, DriftInput, DriftReason, Transition, EMPTY_DEFINITION_SOURCE};
pub use diff::{diff_parts, PartChange, PartDiff};
pub use error::DriftError;
pub use identity::{folder_changed, identity_changed, IdentityUpdate};
