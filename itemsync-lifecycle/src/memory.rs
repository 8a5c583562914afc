//! In-memory [`ItemsClient`] for tests and dry runs.
//!
//! Items are listed in insertion order, `page_size` at a time (the smaller of
//! the client's and the caller's). Failures can be queued per method name
//! with [`MemoryItemsClient::fail_next`].

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use itemsync_core::{ItemId, WorkspaceId};

use crate::client::{CreateItemRequest, ItemsClient, Page, RemoteItem, UpdateItemRequest, WireDefinition};
use crate::error::RemoteError;

#[derive(Debug, Clone)]
struct Stored {
    item: RemoteItem,
    definition: Option<WireDefinition>,
}

#[derive(Debug, Default)]
struct Store {
    items: Vec<Stored>,
    faults: HashMap<&'static str, VecDeque<RemoteError>>,
    calls: Vec<&'static str>,
    properties: HashMap<String, Value>,
}

impl Store {
    fn enter(&mut self, method: &'static str) -> Result<(), RemoteError> {
        self.calls.push(method);
        match self.faults.get_mut(method).and_then(VecDeque::pop_front) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn find_mut(&mut self, workspace_id: &WorkspaceId, id: &ItemId) -> Result<&mut Stored, RemoteError> {
        self.items
            .iter_mut()
            .find(|s| &s.item.workspace_id == workspace_id && &s.item.id == id)
            .ok_or_else(|| not_found(id))
    }
}

fn not_found(id: &ItemId) -> RemoteError {
    RemoteError::NotFound {
        item_type: "Item".to_string(),
        id: id.to_string(),
    }
}

#[derive(Debug)]
pub struct MemoryItemsClient {
    store: Mutex<Store>,
    page_size: usize,
}

impl Default for MemoryItemsClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryItemsClient {
    pub fn new() -> Self {
        Self {
            store: Mutex::new(Store::default()),
            page_size: usize::MAX,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Properties reported for every item of `item_type` created from now on.
    pub fn with_properties(self, item_type: &str, properties: Value) -> Self {
        self.lock().properties.insert(item_type.to_string(), properties);
        self
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seed an existing item.
    pub fn insert(&self, item: RemoteItem) {
        self.lock().items.push(Stored { item, definition: None });
    }

    /// Make the next call to `method` fail with `error`.
    pub fn fail_next(&self, method: &'static str, error: RemoteError) {
        self.lock().faults.entry(method).or_default().push_back(error);
    }

    /// Remove an item behind the controller's back.
    pub fn forget(&self, workspace_id: &WorkspaceId, id: &ItemId) {
        self.lock()
            .items
            .retain(|s| !(&s.item.workspace_id == workspace_id && &s.item.id == id));
    }

    pub fn item(&self, workspace_id: &WorkspaceId, id: &ItemId) -> Option<RemoteItem> {
        let mut store = self.lock();
        store.find_mut(workspace_id, id).ok().map(|s| s.item.clone())
    }

    pub fn stored_definition(&self, workspace_id: &WorkspaceId, id: &ItemId) -> Option<WireDefinition> {
        let mut store = self.lock();
        store.find_mut(workspace_id, id).ok().and_then(|s| s.definition.clone())
    }

    /// Method names called so far, in order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.lock().calls.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().items.is_empty()
    }
}

#[async_trait]
impl ItemsClient for MemoryItemsClient {
    async fn get_item(&self, workspace_id: &WorkspaceId, id: &ItemId) -> Result<RemoteItem, RemoteError> {
        let mut store = self.lock();
        store.enter("get_item")?;
        Ok(store.find_mut(workspace_id, id)?.item.clone())
    }

    async fn list_items(
        &self,
        workspace_id: &WorkspaceId,
        item_type: &str,
        continuation_token: Option<&str>,
        page_size: usize,
    ) -> Result<Page<RemoteItem>, RemoteError> {
        let mut store = self.lock();
        store.enter("list_items")?;
        let start = match continuation_token {
            None => 0,
            Some(token) => token.parse::<usize>().map_err(|_| RemoteError::Rejected {
                code: "InvalidContinuationToken".to_string(),
                message: format!("unknown continuation token '{token}'"),
            })?,
        };
        let matching: Vec<_> = store
            .items
            .iter()
            .filter(|s| &s.item.workspace_id == workspace_id && s.item.item_type == item_type)
            .map(|s| s.item.clone())
            .collect();
        let size = self.page_size.min(page_size.max(1));
        let end = start.saturating_add(size).min(matching.len());
        let items = matching.get(start..end).map(<[_]>::to_vec).unwrap_or_default();
        Ok(Page {
            items,
            continuation_token: (end < matching.len()).then(|| end.to_string()),
        })
    }

    async fn create_item(
        &self,
        workspace_id: &WorkspaceId,
        request: &CreateItemRequest,
    ) -> Result<RemoteItem, RemoteError> {
        let mut store = self.lock();
        store.enter("create_item")?;
        let item = RemoteItem {
            id: ItemId::from(Uuid::new_v4().to_string()),
            workspace_id: workspace_id.clone(),
            item_type: request.item_type.clone(),
            display_name: request.display_name.clone(),
            description: request.description.clone(),
            folder_id: request.folder_id.clone(),
            properties: store.properties.get(&request.item_type).cloned(),
        };
        store.items.push(Stored {
            item: item.clone(),
            definition: request.definition.clone(),
        });
        Ok(item)
    }

    async fn update_item(
        &self,
        workspace_id: &WorkspaceId,
        id: &ItemId,
        request: &UpdateItemRequest,
    ) -> Result<RemoteItem, RemoteError> {
        let mut store = self.lock();
        store.enter("update_item")?;
        let stored = store.find_mut(workspace_id, id)?;
        stored.item.display_name = request.display_name.clone();
        stored.item.description = request.description.clone();
        Ok(stored.item.clone())
    }

    async fn move_item(
        &self,
        workspace_id: &WorkspaceId,
        id: &ItemId,
        folder_id: Option<&str>,
    ) -> Result<(), RemoteError> {
        let mut store = self.lock();
        store.enter("move_item")?;
        store.find_mut(workspace_id, id)?.item.folder_id = folder_id.map(str::to_string);
        Ok(())
    }

    async fn get_definition(
        &self,
        workspace_id: &WorkspaceId,
        id: &ItemId,
        _format: Option<&str>,
    ) -> Result<WireDefinition, RemoteError> {
        let mut store = self.lock();
        store.enter("get_definition")?;
        Ok(store.find_mut(workspace_id, id)?.definition.clone().unwrap_or_default())
    }

    async fn update_definition(
        &self,
        workspace_id: &WorkspaceId,
        id: &ItemId,
        definition: &WireDefinition,
    ) -> Result<(), RemoteError> {
        let mut store = self.lock();
        store.enter("update_definition")?;
        store.find_mut(workspace_id, id)?.definition = Some(definition.clone());
        Ok(())
    }

    async fn delete_item(&self, workspace_id: &WorkspaceId, id: &ItemId) -> Result<(), RemoteError> {
        let mut store = self.lock();
        store.enter("delete_item")?;
        let before = store.items.len();
        store
            .items
            .retain(|s| !(&s.item.workspace_id == workspace_id && &s.item.id == id));
        if store.items.len() == before {
            return Err(not_found(id));
        }
        Ok(())
    }
}
