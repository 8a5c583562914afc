//! Remote items API contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use itemsync_core::{DisplayName, FormatRegistry, ItemDefinition, ItemId, PayloadType, WorkspaceId};

use crate::error::RemoteError;

/// An item as reported by the remote API. `P` is the kind's property shape;
/// clients return it as raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteItem<P = Value> {
    pub id: ItemId,
    pub workspace_id: WorkspaceId,
    pub item_type: String,
    pub display_name: DisplayName,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<P>,
}

impl RemoteItem {
    /// Reinterpret the raw properties as `P`.
    pub fn typed<P: serde::de::DeserializeOwned>(self) -> Result<RemoteItem<P>, serde_json::Error> {
        let properties = self.properties.map(serde_json::from_value).transpose()?;
        Ok(RemoteItem {
            id: self.id,
            workspace_id: self.workspace_id,
            item_type: self.item_type,
            display_name: self.display_name,
            description: self.description,
            folder_id: self.folder_id,
            properties,
        })
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Present when more pages follow.
    #[serde(default)]
    pub continuation_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WirePart {
    pub path: String,
    pub payload: String,
    pub payload_type: PayloadType,
}

/// Definition as sent over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct WireDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    pub parts: Vec<WirePart>,
}

impl WireDefinition {
    /// Translate a compiled definition, mapping the format selector to its
    /// wire value.
    pub fn from_definition(definition: &ItemDefinition, registry: &FormatRegistry) -> Self {
        let format = registry
            .active(definition.format.as_deref())
            .and_then(|f| f.wire_format)
            .map(str::to_string);
        let parts = definition
            .parts
            .iter()
            .map(|(path, part)| WirePart {
                path: path.clone(),
                payload: part.payload.clone(),
                payload_type: part.payload_type,
            })
            .collect();
        Self { format, parts }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateItemRequest {
    pub item_type: String,
    pub display_name: DisplayName,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<WireDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_payload: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateItemRequest {
    pub display_name: DisplayName,
    pub description: String,
}

/// Everything the lifecycle controller needs from the remote side.
///
/// Implementations must report a missing item as [`RemoteError::NotFound`].
#[async_trait]
pub trait ItemsClient: Send + Sync {
    async fn get_item(&self, workspace_id: &WorkspaceId, id: &ItemId) -> Result<RemoteItem, RemoteError>;

    async fn list_items(
        &self,
        workspace_id: &WorkspaceId,
        item_type: &str,
        continuation_token: Option<&str>,
        page_size: usize,
    ) -> Result<Page<RemoteItem>, RemoteError>;

    async fn create_item(
        &self,
        workspace_id: &WorkspaceId,
        request: &CreateItemRequest,
    ) -> Result<RemoteItem, RemoteError>;

    async fn update_item(
        &self,
        workspace_id: &WorkspaceId,
        id: &ItemId,
        request: &UpdateItemRequest,
    ) -> Result<RemoteItem, RemoteError>;

    /// Move an item to `folder_id`, or to the workspace root for `None`.
    async fn move_item(
        &self,
        workspace_id: &WorkspaceId,
        id: &ItemId,
        folder_id: Option<&str>,
    ) -> Result<(), RemoteError>;

    async fn get_definition(
        &self,
        workspace_id: &WorkspaceId,
        id: &ItemId,
        format: Option<&str>,
    ) -> Result<WireDefinition, RemoteError>;

    async fn update_definition(
        &self,
        workspace_id: &WorkspaceId,
        id: &ItemId,
        definition: &WireDefinition,
    ) -> Result<(), RemoteError>;

    async fn delete_item(&self, workspace_id: &WorkspaceId, id: &ItemId) -> Result<(), RemoteError>;
}
