//! Create / Read / Update / Delete / Import for one item kind.

use std::path::PathBuf;

use chrono::Utc;
use serde::Serialize;

use itemsync_core::{
    DisplayName, ImportId, ItemId, ItemIdentity, Operation, ResourceManifest, ResourceState, Settings,
    WorkspaceId,
};
use itemsync_drift::{folder_changed, identity_changed, Transition};

use crate::client::{CreateItemRequest, ItemsClient, RemoteItem, UpdateItemRequest, WireDefinition};
use crate::context::{CallContext, OpScope};
use crate::error::{payload_err, LifecycleError, RemoteError};
use crate::kind::ResourceKind;
use crate::planner::{Plan, Planner};

/// A remote item found by display name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoundItem<P> {
    pub id: ItemId,
    pub workspace_id: WorkspaceId,
    #[serde(flatten)]
    pub identity: ItemIdentity,
    pub properties: Option<P>,
}

/// Drives one item kind against a remote client.
///
/// Holds no per-item state; independent items may be processed
/// concurrently through one controller.
pub struct LifecycleController<K: ResourceKind, C: ItemsClient> {
    kind: K,
    client: C,
    planner: Planner,
}

impl<K: ResourceKind, C: ItemsClient> LifecycleController<K, C> {
    pub fn new(kind: K, client: C, settings: &Settings) -> Result<Self, LifecycleError> {
        let planner = Planner::new(kind.descriptor(), settings)?;
        Ok(Self { kind, client, planner })
    }

    /// Resolve part sources relative to `dir`.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.planner = self.planner.with_base_dir(dir);
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn planner(&self) -> &Planner {
        &self.planner
    }

    fn name(&self) -> &'static str {
        self.kind.descriptor().name
    }

    // -----------------------------------------------------------------------
    // Plan
    // -----------------------------------------------------------------------

    pub fn plan(
        &self,
        prior: Option<&ResourceState<K::Properties>>,
        desired: &ResourceManifest,
    ) -> Result<Plan, LifecycleError> {
        tracing::debug!(kind = self.name(), action = "start", "PLAN");
        let plan = self.planner.plan(prior, desired)?;
        tracing::debug!(kind = self.name(), action = "end", will_update = plan.will_update, "PLAN");
        Ok(plan)
    }

    // -----------------------------------------------------------------------
    // Create
    // -----------------------------------------------------------------------

    pub async fn create(
        &self,
        desired: &ResourceManifest,
        ctx: &CallContext,
    ) -> Result<ResourceState<K::Properties>, LifecycleError> {
        tracing::debug!(kind = self.name(), action = "start", "CREATE");
        self.surface(self.planner.preflight(desired)?);

        let update_enabled = desired.definition.as_ref().map_or(true, |d| d.update_enabled);
        let definition = self
            .planner
            .compile(desired)?
            .map(|compiled| self.planner.decide(None, &compiled, update_enabled, Transition::Create).definition);

        let request = CreateItemRequest {
            item_type: self.kind.descriptor().item_type.to_string(),
            display_name: desired.identity.display_name.clone(),
            description: desired.identity.description.clone(),
            folder_id: desired.identity.folder_id.clone(),
            definition: definition
                .as_ref()
                .map(|d| WireDefinition::from_definition(d, self.planner.registry())),
            creation_payload: self.creation_payload(desired)?,
        };

        let scope = ctx.scope(Operation::Create);
        let created = scope.call(self.client.create_item(&desired.workspace_id, &request)).await?;
        tracing::trace!(id = %created.id, workspace_id = %created.workspace_id, "created {}", self.name());

        let mut state = ResourceState {
            id: created.id.clone(),
            kind: self.kind.descriptor().item_type.to_string(),
            workspace_id: created.workspace_id.clone(),
            identity: desired.identity.clone(),
            definition_update_enabled: update_enabled,
            definition,
            configuration: desired.configuration.clone(),
            properties: None,
            applied_at: Utc::now(),
        };
        self.refresh(&scope, &mut state).await?;

        tracing::debug!(kind = self.name(), action = "end", id = %state.id, "CREATE");
        Ok(state)
    }

    fn creation_payload(&self, desired: &ResourceManifest) -> Result<Option<serde_json::Value>, LifecycleError> {
        let Some(raw) = desired.configuration.clone() else {
            return Ok(None);
        };
        let config: K::Config = serde_json::from_value(raw).map_err(payload_err("configuration"))?;
        let payload = self.kind.creation_payload_setter(&config)?;
        serde_json::to_value(payload)
            .map(Some)
            .map_err(payload_err("creation payload"))
    }

    // -----------------------------------------------------------------------
    // Read
    // -----------------------------------------------------------------------

    /// Refresh `state` from the remote side. `None` means the item is gone
    /// and should be dropped from the managed set.
    pub async fn read(
        &self,
        state: &ResourceState<K::Properties>,
        ctx: &CallContext,
    ) -> Result<Option<ResourceState<K::Properties>>, LifecycleError> {
        tracing::debug!(kind = self.name(), action = "start", id = %state.id, "READ");
        let scope = ctx.scope(Operation::Read);
        let mut refreshed = state.clone();
        match self.refresh(&scope, &mut refreshed).await {
            Ok(()) => {}
            Err(err) if err.is_not_found() => {
                tracing::warn!(id = %state.id, "{} no longer exists, removing from state", self.name());
                return Ok(None);
            }
            Err(err) => return Err(err),
        }
        tracing::debug!(kind = self.name(), action = "end", id = %state.id, "READ");
        Ok(Some(refreshed))
    }

    /// Re-fetch the item and overwrite remote-reported fields.
    async fn refresh(
        &self,
        scope: &OpScope,
        state: &mut ResourceState<K::Properties>,
    ) -> Result<(), LifecycleError> {
        tracing::trace!(id = %state.id, "getting {} by ID", self.name());
        let item = self
            .kind
            .item_getter(&self.client, scope, &state.workspace_id, &state.id)
            .await?;
        self.apply_remote(state, item);
        Ok(())
    }

    fn apply_remote(&self, state: &mut ResourceState<K::Properties>, item: RemoteItem<K::RemoteProperties>) {
        state.id = item.id;
        state.workspace_id = item.workspace_id;
        state.identity = ItemIdentity {
            display_name: item.display_name,
            description: item.description,
            folder_id: item.folder_id,
        };
        state.properties = item.properties.as_ref().map(|p| self.kind.properties_setter(p));
    }

    // -----------------------------------------------------------------------
    // Update
    // -----------------------------------------------------------------------

    /// Apply identity, folder and definition changes. A missing item is an
    /// error here; nothing is recreated.
    pub async fn update(
        &self,
        prior: &ResourceState<K::Properties>,
        desired: &ResourceManifest,
        ctx: &CallContext,
    ) -> Result<ResourceState<K::Properties>, LifecycleError> {
        tracing::debug!(kind = self.name(), action = "start", id = %prior.id, "UPDATE");
        if prior.workspace_id != desired.workspace_id {
            return Err(LifecycleError::WorkspaceChanged {
                from: prior.workspace_id.clone(),
                to: desired.workspace_id.clone(),
            });
        }
        self.surface(self.planner.preflight(desired)?);

        // Compile before the first remote call so encoding errors leave the
        // item untouched.
        let update_enabled = desired.definition.as_ref().map_or(true, |d| d.update_enabled);
        let decision = self
            .planner
            .compile(desired)?
            .map(|compiled| {
                self.planner
                    .decide(prior.definition.as_ref(), &compiled, update_enabled, Transition::Update)
            });

        let scope = ctx.scope(Operation::Update);
        let mut state = prior.clone();
        let (ws, id) = (&prior.workspace_id, &prior.id);

        if let Some(change) = identity_changed(&prior.identity, &desired.identity) {
            tracing::trace!("updating {} (WorkspaceID: {ws} ItemID: {id})", self.name());
            let request = UpdateItemRequest {
                display_name: change.display_name,
                description: change.description,
            };
            scope.call(self.client.update_item(ws, id, &request)).await?;
            self.refresh(&scope, &mut state).await?;
        }

        if let Some(folder) = folder_changed(&prior.identity, &desired.identity) {
            tracing::trace!(folder = ?folder, "moving {}", self.name());
            scope.call(self.client.move_item(ws, id, folder.as_deref())).await?;
            self.refresh(&scope, &mut state).await?;
        }

        match decision {
            Some(decision) if decision.update_required => {
                tracing::trace!(reason = ?decision.reason, "updating {} definition", self.name());
                let wire = WireDefinition::from_definition(&decision.definition, self.planner.registry());
                scope.call(self.client.update_definition(ws, id, &wire)).await?;
                state.definition = Some(decision.definition);
                self.refresh(&scope, &mut state).await?;
            }
            Some(_) => {}
            None => state.definition = None,
        }

        state.definition_update_enabled = update_enabled;
        state.configuration = desired.configuration.clone();
        state.applied_at = Utc::now();
        tracing::debug!(kind = self.name(), action = "end", id = %state.id, "UPDATE");
        Ok(state)
    }

    // -----------------------------------------------------------------------
    // Delete
    // -----------------------------------------------------------------------

    pub async fn delete(&self, state: &ResourceState<K::Properties>, ctx: &CallContext) -> Result<(), LifecycleError> {
        tracing::debug!(kind = self.name(), action = "start", id = %state.id, "DELETE");
        let scope = ctx.scope(Operation::Delete);
        scope.call(self.client.delete_item(&state.workspace_id, &state.id)).await?;
        tracing::debug!(kind = self.name(), action = "end", id = %state.id, "DELETE");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Import
    // -----------------------------------------------------------------------

    /// Adopt an existing item by `WorkspaceID/ItemID`.
    ///
    /// The remote side cannot report sources, tokens, parameters or the
    /// update flag, so those come from `carried` (typically the caller's
    /// prior record) before the normal read.
    pub async fn import(
        &self,
        key: &str,
        carried: Option<&ResourceState<K::Properties>>,
        ctx: &CallContext,
    ) -> Result<ResourceState<K::Properties>, LifecycleError> {
        tracing::debug!(kind = self.name(), action = "start", "IMPORT");
        tracing::trace!(id = key, "IMPORT");
        let item_type = self.kind.descriptor().item_type;
        let import: ImportId = key.parse().map_err(|source| LifecycleError::ImportId {
            item_type: item_type.to_string(),
            source,
        })?;

        let mut state = ResourceState {
            id: import.item_id,
            kind: item_type.to_string(),
            workspace_id: import.workspace_id,
            identity: ItemIdentity::default(),
            definition_update_enabled: carried.map_or(true, |c| c.definition_update_enabled),
            definition: carried.and_then(|c| c.definition.clone()),
            configuration: carried.and_then(|c| c.configuration.clone()),
            properties: None,
            applied_at: Utc::now(),
        };
        self.refresh(&ctx.scope(Operation::Read), &mut state).await?;

        tracing::debug!(kind = self.name(), action = "end", id = %state.id, "IMPORT");
        Ok(state)
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    /// Find an item by display name. Duplicates resolve to the first match
    /// in listing order.
    pub async fn find_by_display_name(
        &self,
        workspace_id: &WorkspaceId,
        display_name: &DisplayName,
        ctx: &CallContext,
    ) -> Result<FoundItem<K::Properties>, LifecycleError> {
        let not_found = RemoteError::NotFound {
            item_type: self.kind.descriptor().item_type.to_string(),
            id: display_name.to_string(),
        };
        let scope = ctx.scope(Operation::Read);
        let item = self
            .kind
            .item_list_getter(&self.client, &scope, workspace_id, display_name, not_found)
            .await?;
        Ok(FoundItem {
            properties: item.properties.as_ref().map(|p| self.kind.properties_setter(p)),
            id: item.id,
            workspace_id: item.workspace_id,
            identity: ItemIdentity {
                display_name: item.display_name,
                description: item.description,
                folder_id: item.folder_id,
            },
        })
    }

    fn surface(&self, diagnostics: itemsync_core::Diagnostics) {
        for diagnostic in diagnostics.warnings() {
            tracing::warn!(kind = self.name(), "{diagnostic}");
        }
    }
}
