//! Definition drift decision.
//!
//! Rule precedence:
//! 1. `Pinned` (update disabled on an existing item)
//! 2. `SynthesizedEmpty` (update with no parts while the format declares paths)
//! 3. `InitialCreate`
//! 4. `PathsChanged` (part key sets differ)
//! 5. `ContentChanged` (a shared path's fingerprint differs)
//! 6. `Unchanged`
//!
//! [`decide`] is pure: plan and apply call it with the same inputs and get
//! the same answer.

use std::collections::BTreeSet;

use serde::Serialize;

use itemsync_compiler::compile_inline;
use itemsync_core::{FormatRegistry, ItemDefinition};

/// Source label recorded on a synthesized empty part.
pub const EMPTY_DEFINITION_SOURCE: &str = "<empty definition>";

/// Which lifecycle transition is being planned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Transition {
    Create,
    Update,
}

/// Why a decision came out the way it did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DriftReason {
    Pinned,
    SynthesizedEmpty { path: String },
    InitialCreate,
    PathsChanged { added: Vec<String>, removed: Vec<String> },
    ContentChanged { paths: Vec<String> },
    Unchanged,
}

/// Everything the decision depends on.
#[derive(Debug, Clone, Copy)]
pub struct DriftInput<'a> {
    /// Definition as last applied; `None` when nothing was recorded.
    pub previous: Option<&'a ItemDefinition>,
    /// Freshly compiled desired definition.
    pub desired: &'a ItemDefinition,
    pub update_enabled: bool,
    pub registry: &'a FormatRegistry,
    /// Kind-specific placeholder content for an empty definition.
    pub empty_definition: &'a str,
    pub transition: Transition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriftDecision {
    pub update_required: bool,
    /// Definition to push (possibly synthesized) when an update is required.
    pub definition: ItemDefinition,
    pub reason: DriftReason,
}

/// Decide whether the remote definition must be pushed.
pub fn decide(input: &DriftInput<'_>) -> DriftDecision {
    let desired = input.desired;

    if input.transition == Transition::Update && !input.update_enabled {
        tracing::debug!("definition pinned: update disabled");
        return decision(false, desired.clone(), DriftReason::Pinned);
    }

    if input.transition == Transition::Update && desired.is_empty() {
        let first_path = input
            .registry
            .active(desired.format.as_deref())
            .and_then(|f| f.paths.first());
        if let Some(path) = first_path {
            tracing::debug!("synthesizing empty definition at {path}");
            let mut definition = desired.clone();
            definition.parts.insert(
                (*path).to_string(),
                compile_inline(EMPTY_DEFINITION_SOURCE, input.empty_definition),
            );
            return decision(
                true,
                definition,
                DriftReason::SynthesizedEmpty {
                    path: (*path).to_string(),
                },
            );
        }
    }

    if input.transition == Transition::Create {
        return decision(true, desired.clone(), DriftReason::InitialCreate);
    }

    let previous = input.previous.map(ItemDefinition::fingerprints).unwrap_or_default();
    let current = desired.fingerprints();

    let before: BTreeSet<&str> = previous.keys().copied().collect();
    let after: BTreeSet<&str> = current.keys().copied().collect();
    if before != after {
        let added = after.difference(&before).map(|p| p.to_string()).collect();
        let removed = before.difference(&after).map(|p| p.to_string()).collect();
        return decision(true, desired.clone(), DriftReason::PathsChanged { added, removed });
    }

    let changed: Vec<String> = current
        .iter()
        .filter(|(path, fp)| previous.get(*path) != Some(*fp))
        .map(|(path, _)| path.to_string())
        .collect();
    if !changed.is_empty() {
        tracing::debug!("definition content changed: {}", changed.join(", "));
        return decision(true, desired.clone(), DriftReason::ContentChanged { paths: changed });
    }

    decision(false, desired.clone(), DriftReason::Unchanged)
}

fn decision(update_required: bool, definition: ItemDefinition, reason: DriftReason) -> DriftDecision {
    DriftDecision {
        update_required,
        definition,
        reason,
    }
}
