//! Per-kind collaborators of the lifecycle controller.
//!
//! A kind supplies static data ([`KindDescriptor`]) plus four functions:
//!
//! | Function                  | Default                                   |
//! |---------------------------|-------------------------------------------|
//! | `item_getter`             | `get_item`, properties decoded as typed   |
//! | `item_list_getter`        | page through `list_items`, first match    |
//! | `properties_setter`       | none; one explicit mapping per kind       |
//! | `creation_payload_setter` | none; one explicit mapping per kind       |

use std::fmt::Debug;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use itemsync_core::{DefinitionFormat, DisplayName, FormatError, FormatRegistry, ItemId, WorkspaceId};
use itemsync_validate::{item_validators, ItemSchema, RequiredEntry, ValidatorEngine};

use crate::client::{ItemsClient, RemoteItem};
use crate::context::OpScope;
use crate::error::{payload_err, LifecycleError, RemoteError};

/// Static description of an item kind.
#[derive(Debug, Clone, Copy)]
pub struct KindDescriptor {
    /// Remote item type, e.g. `Notebook`.
    pub item_type: &'static str,
    /// Human readable name used in messages.
    pub name: &'static str,
    pub formats: &'static [DefinitionFormat],
    /// Content pushed when an update leaves the definition empty.
    pub empty_definition: &'static str,
    pub definition_required: bool,
    pub has_configuration: bool,
    pub config_or_definition_required: bool,
    pub is_preview: bool,
    pub required_entries: &'static [RequiredEntry],
}

impl KindDescriptor {
    pub fn registry(&self) -> Result<FormatRegistry, FormatError> {
        FormatRegistry::new(self.formats)
    }

    pub fn validators(&self, registry: &FormatRegistry) -> ValidatorEngine {
        item_validators(&ItemSchema {
            formats: registry,
            definition_required: self.definition_required,
            has_configuration: self.has_configuration,
            config_or_definition_required: self.config_or_definition_required,
            required_entries: self.required_entries,
        })
    }
}

/// Property shape of kinds that report none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NoProperties {}

/// Configuration shape of kinds that accept none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NoConfiguration {}

#[async_trait]
pub trait ResourceKind: Send + Sync + 'static {
    /// Locally recorded properties.
    type Properties: Serialize + DeserializeOwned + Clone + Debug + PartialEq + Send + Sync;
    /// Properties as the remote API reports them.
    type RemoteProperties: DeserializeOwned + Debug + Send + Sync;
    /// Manifest `configuration` block.
    type Config: DeserializeOwned + Debug + Send + Sync;
    /// Remote `creationPayload`.
    type CreationPayload: Serialize + Debug + Send + Sync;

    fn descriptor(&self) -> &'static KindDescriptor;

    async fn item_getter(
        &self,
        client: &dyn ItemsClient,
        scope: &OpScope,
        workspace_id: &WorkspaceId,
        id: &ItemId,
    ) -> Result<RemoteItem<Self::RemoteProperties>, LifecycleError> {
        let item = scope.call(client.get_item(workspace_id, id)).await?;
        item.typed().map_err(payload_err("item properties"))
    }

    /// Scan every page for `display_name`. The first match wins; when
    /// nothing matches, `not_found` is returned as given.
    async fn item_list_getter(
        &self,
        client: &dyn ItemsClient,
        scope: &OpScope,
        workspace_id: &WorkspaceId,
        display_name: &DisplayName,
        not_found: RemoteError,
    ) -> Result<RemoteItem<Self::RemoteProperties>, LifecycleError> {
        let item_type = self.descriptor().item_type;
        let mut continuation: Option<String> = None;
        loop {
            let page = scope
                .call(client.list_items(workspace_id, item_type, continuation.as_deref(), scope.page_size()))
                .await?;
            if let Some(item) = page.items.into_iter().find(|i| &i.display_name == display_name) {
                tracing::trace!(id = %item.id, "display name matched");
                return self.item_getter(client, scope, workspace_id, &item.id).await;
            }
            match page.continuation_token {
                Some(token) => continuation = Some(token),
                None => return Err(not_found.into()),
            }
        }
    }

    fn properties_setter(&self, remote: &Self::RemoteProperties) -> Self::Properties;

    fn creation_payload_setter(&self, config: &Self::Config) -> Result<Self::CreationPayload, LifecycleError>;
}
