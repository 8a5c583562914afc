//! Remote-free half of the lifecycle: preflight checks, compilation and the
//! drift decision.
//!
//! `plan` and the apply paths in [`LifecycleController`](crate::LifecycleController)
//! both go through [`Planner::decide`], so a plan that reports an update
//! predicts exactly what apply will push.

use std::path::PathBuf;

use serde::Serialize;
use serde_json::Value;

use itemsync_compiler::Compiler;
use itemsync_core::{
    Diagnostic, Diagnostics, FormatRegistry, ItemDefinition, ResourceManifest, ResourceState, Settings,
    DEFAULT_FORMAT,
};
use itemsync_drift::{
    decide, diff_parts, folder_changed, identity_changed, DriftDecision, DriftInput, DriftReason, IdentityUpdate,
    PartDiff, Transition,
};
use itemsync_validate::ValidatorEngine;

use crate::error::{payload_err, LifecycleError};
use crate::kind::KindDescriptor;

pub const DEFINITION_UPDATE_SUMMARY: &str = "Item definition update";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlanAction {
    Create,
    Update,
    NoOp,
}

/// What applying a manifest would do.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plan {
    pub action: PlanAction,
    /// The remote definition will be overwritten.
    pub will_update: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<IdentityUpdate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<DriftReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<ItemDefinition>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diffs: Vec<PartDiff>,
    pub diagnostics: Diagnostics,
}

/// Kind-aware planning that never touches the remote side.
pub struct Planner {
    descriptor: &'static KindDescriptor,
    registry: FormatRegistry,
    validators: ValidatorEngine,
    compiler: Compiler,
    preview_enabled: bool,
}

impl Planner {
    pub fn new(descriptor: &'static KindDescriptor, settings: &Settings) -> Result<Self, LifecycleError> {
        let registry = descriptor.registry()?;
        let validators = descriptor.validators(&registry);
        Ok(Self {
            descriptor,
            registry,
            validators,
            compiler: Compiler::default(),
            preview_enabled: settings.preview,
        })
    }

    /// Resolve part sources relative to `dir`.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.compiler = Compiler::new(dir);
        self
    }

    pub fn descriptor(&self) -> &'static KindDescriptor {
        self.descriptor
    }

    pub fn registry(&self) -> &FormatRegistry {
        &self.registry
    }

    /// The tree validators read. A definition without a format selector gets
    /// the `Default` format when the kind declares one.
    pub fn config_tree(&self, desired: &ResourceManifest) -> Result<Value, LifecycleError> {
        let mut tree = serde_json::to_value(desired).map_err(payload_err("manifest"))?;
        if self.registry.contains(DEFAULT_FORMAT) {
            if let Some(Value::Object(definition)) = tree.get_mut("definition") {
                definition
                    .entry("format")
                    .or_insert_with(|| Value::String(DEFAULT_FORMAT.to_string()));
            }
        }
        Ok(tree)
    }

    /// Preview gating, kind check and validation.
    ///
    /// Errors abort; warnings are returned for the caller to surface.
    pub fn preflight(&self, desired: &ResourceManifest) -> Result<Diagnostics, LifecycleError> {
        let name = self.descriptor.name;
        let mut diagnostics = Diagnostics::new();

        if self.descriptor.is_preview {
            if !self.preview_enabled {
                return Err(LifecycleError::PreviewModeRequired { name: name.to_string() });
            }
            diagnostics.push(Diagnostic::warning(
                format!("'{name}' preview mode"),
                format!("The behavior of '{name}' may change in future releases without notice or backward compatibility."),
            ));
        }

        if !desired.kind.eq_ignore_ascii_case(self.descriptor.item_type) {
            return Err(LifecycleError::KindMismatch {
                expected: self.descriptor.item_type.to_string(),
                found: desired.kind.clone(),
            });
        }

        let mut findings = self.validators.validate(&self.config_tree(desired)?);
        if desired.configuration.is_some() && !self.descriptor.has_configuration {
            findings.push(
                Diagnostic::error(
                    "Invalid configuration for attribute configuration",
                    format!("{name} does not accept a configuration block"),
                )
                .at("configuration"),
            );
        }
        if findings.has_errors() {
            return Err(LifecycleError::Configuration(findings));
        }
        diagnostics.extend(findings);
        Ok(diagnostics)
    }

    /// Compile the desired definition, if any.
    pub fn compile(&self, desired: &ResourceManifest) -> Result<Option<ItemDefinition>, LifecycleError> {
        let Some(config) = &desired.definition else {
            return Ok(None);
        };
        let mut definition = self.compiler.compile_definition(config)?;
        if definition.format.is_none() && self.registry.contains(DEFAULT_FORMAT) {
            definition.format = Some(DEFAULT_FORMAT.to_string());
        }
        Ok(Some(definition))
    }

    /// Drift decision for a compiled definition.
    pub fn decide(
        &self,
        previous: Option<&ItemDefinition>,
        desired: &ItemDefinition,
        update_enabled: bool,
        transition: Transition,
    ) -> DriftDecision {
        decide(&DriftInput {
            previous,
            desired,
            update_enabled,
            registry: &self.registry,
            empty_definition: self.descriptor.empty_definition,
            transition,
        })
    }

    /// Plan the transition from `prior` (if managed) to `desired`.
    pub fn plan<P>(
        &self,
        prior: Option<&ResourceState<P>>,
        desired: &ResourceManifest,
    ) -> Result<Plan, LifecycleError> {
        let mut diagnostics = self.preflight(desired)?;
        let compiled = self.compile(desired)?;
        let update_enabled = desired.definition.as_ref().map_or(true, |d| d.update_enabled);

        let Some(prior) = prior else {
            let decision = compiled
                .as_ref()
                .map(|definition| self.decide(None, definition, update_enabled, Transition::Create));
            let diffs = match &decision {
                Some(decision) => diff_parts(None, &decision.definition)?,
                None => Vec::new(),
            };
            return Ok(Plan {
                action: PlanAction::Create,
                will_update: decision.as_ref().is_some_and(|d| d.update_required),
                identity: None,
                folder: None,
                reason: decision.as_ref().map(|d| d.reason.clone()),
                definition: decision.map(|d| d.definition),
                diffs,
                diagnostics,
            });
        };

        if prior.workspace_id != desired.workspace_id {
            return Err(LifecycleError::WorkspaceChanged {
                from: prior.workspace_id.clone(),
                to: desired.workspace_id.clone(),
            });
        }

        let identity = identity_changed(&prior.identity, &desired.identity);
        let folder = folder_changed(&prior.identity, &desired.identity);
        let decision = compiled.as_ref().map(|definition| {
            self.decide(prior.definition.as_ref(), definition, update_enabled, Transition::Update)
        });
        let will_update = decision.as_ref().is_some_and(|d| d.update_required);

        let mut diffs = Vec::new();
        if let Some(decision) = decision.as_ref().filter(|d| d.update_required) {
            diagnostics.push(self.definition_update_warning());
            diffs = diff_parts(prior.definition.as_ref(), &decision.definition)?;
        }

        let action = if will_update || identity.is_some() || folder.is_some() {
            PlanAction::Update
        } else {
            PlanAction::NoOp
        };
        Ok(Plan {
            action,
            will_update,
            identity,
            folder,
            reason: decision.as_ref().map(|d| d.reason.clone()),
            definition: decision.map(|d| d.definition),
            diffs,
            diagnostics,
        })
    }

    pub fn definition_update_warning(&self) -> Diagnostic {
        Diagnostic::warning(
            DEFINITION_UPDATE_SUMMARY,
            format!(
                "{} definition update operation will overwrite the existing definition on the remote side.",
                self.descriptor.name
            ),
        )
    }
}
