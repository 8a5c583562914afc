use std::path::Path;

use rstest::rstest;
use serde_json::{json, Value};
use tempfile::TempDir;

use itemsync_compiler::transforms::base64_decode;
use itemsync_core::{DisplayName, ItemId, ResourceManifest, ResourceState, Settings, WorkspaceId};
use itemsync_lifecycle::kinds::{KqlDatabase, KqlDatabaseType, Notebook, VariableLibrary};
use itemsync_lifecycle::{
    CallContext, LifecycleController, LifecycleError, MemoryItemsClient, PlanAction, RemoteError, RemoteItem,
    ResourceKind, DEFINITION_UPDATE_SUMMARY,
};

const WS: &str = "0b1a6c34-2f0e-4c1d-9b7e-5d3f1e2a4c68";
const OTHER_WS: &str = "7e9d2c41-8a3b-4f56-b0c2-1d4e6f8a9b03";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn write_source(dir: &Path, name: &str, contents: &str) {
    std::fs::write(dir.join(name), contents).unwrap();
}

fn notebook_manifest(display_name: &str, update_enabled: bool) -> ResourceManifest {
    serde_json::from_value(json!({
        "kind": "Notebook",
        "workspace_id": WS,
        "display_name": display_name,
        "description": "nightly load",
        "definition": {
            "format": "ipynb",
            "update_enabled": update_enabled,
            "parts": {
                "notebook-content.ipynb": { "source": "nb.ipynb" }
            }
        }
    }))
    .unwrap()
}

fn notebooks(dir: &TempDir) -> LifecycleController<Notebook, MemoryItemsClient> {
    LifecycleController::new(Notebook, MemoryItemsClient::new(), &Settings::default())
        .unwrap()
        .with_base_dir(dir.path())
}

fn remote(id: &str, display_name: &str) -> RemoteItem {
    RemoteItem {
        id: ItemId::from(id),
        workspace_id: WorkspaceId::from(WS),
        item_type: "Notebook".into(),
        display_name: DisplayName::from(display_name),
        description: String::new(),
        folder_id: None,
        properties: None,
    }
}

fn count(calls: &[&str], method: &str) -> usize {
    calls.iter().filter(|c| **c == method).count()
}

async fn created_notebook(
    dir: &TempDir,
) -> (LifecycleController<Notebook, MemoryItemsClient>, ResourceState<<Notebook as ResourceKind>::Properties>) {
    write_source(dir.path(), "nb.ipynb", r#"{"cells":[]}"#);
    let controller = notebooks(dir);
    let state = controller
        .create(&notebook_manifest("etl", true), &CallContext::default())
        .await
        .unwrap();
    (controller, state)
}

// ---------------------------------------------------------------------------
// Create / Read
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_pushes_definition_and_rereads() {
    let dir = TempDir::new().unwrap();
    let (controller, state) = created_notebook(&dir).await;

    assert_eq!(state.kind, "Notebook");
    assert_eq!(state.identity.display_name.as_str(), "etl");
    assert!(state.definition_update_enabled);
    let definition = state.definition.as_ref().unwrap();
    assert!(definition.parts.contains_key("notebook-content.ipynb"));

    let client = controller.client();
    let wire = client.stored_definition(&state.workspace_id, &state.id).unwrap();
    assert_eq!(wire.format.as_deref(), Some("ipynb"));
    assert_eq!(wire.parts.len(), 1);
    assert_eq!(client.calls(), ["create_item", "get_item"]);
}

#[tokio::test]
async fn read_of_deleted_item_drops_it() {
    let dir = TempDir::new().unwrap();
    let (controller, state) = created_notebook(&dir).await;

    controller.client().forget(&state.workspace_id, &state.id);
    let read = controller.read(&state, &CallContext::default()).await.unwrap();
    assert!(read.is_none());
}

#[tokio::test]
async fn read_surfaces_other_remote_failures() {
    let dir = TempDir::new().unwrap();
    let (controller, state) = created_notebook(&dir).await;

    controller.client().fail_next(
        "get_item",
        RemoteError::Transient {
            message: "throttled".into(),
        },
    );
    let err = controller.read(&state, &CallContext::default()).await.unwrap_err();
    assert!(matches!(err, LifecycleError::Remote(RemoteError::Transient { .. })));
}

// ---------------------------------------------------------------------------
// Update / Delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn update_of_deleted_item_is_terminal() {
    let dir = TempDir::new().unwrap();
    let (controller, state) = created_notebook(&dir).await;

    controller.client().forget(&state.workspace_id, &state.id);
    let err = controller
        .update(&state, &notebook_manifest("renamed", true), &CallContext::default())
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(controller.client().is_empty());
}

#[tokio::test]
async fn delete_of_deleted_item_is_terminal() {
    let dir = TempDir::new().unwrap();
    let (controller, state) = created_notebook(&dir).await;

    controller.delete(&state, &CallContext::default()).await.unwrap();
    let err = controller.delete(&state, &CallContext::default()).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn unchanged_update_makes_no_writes() {
    let dir = TempDir::new().unwrap();
    let (controller, state) = created_notebook(&dir).await;

    let updated = controller
        .update(&state, &notebook_manifest("etl", true), &CallContext::default())
        .await
        .unwrap();
    let calls = controller.client().calls();
    assert_eq!(count(&calls, "update_item"), 0);
    assert_eq!(count(&calls, "update_definition"), 0);
    assert_eq!(updated.definition, state.definition);
}

#[tokio::test]
async fn rename_updates_identity_only() {
    let dir = TempDir::new().unwrap();
    let (controller, state) = created_notebook(&dir).await;

    let updated = controller
        .update(&state, &notebook_manifest("etl-v2", true), &CallContext::default())
        .await
        .unwrap();
    assert_eq!(updated.identity.display_name.as_str(), "etl-v2");
    let calls = controller.client().calls();
    assert_eq!(count(&calls, "update_item"), 1);
    assert_eq!(count(&calls, "update_definition"), 0);
}

#[tokio::test]
async fn folder_change_moves_item() {
    let dir = TempDir::new().unwrap();
    let (controller, state) = created_notebook(&dir).await;

    let mut desired = notebook_manifest("etl", true);
    desired.identity.folder_id = Some("5a7c9e1b-3d5f-4b7d-9f1a-3c5e7a9b1d2f".into());
    let updated = controller.update(&state, &desired, &CallContext::default()).await.unwrap();

    assert_eq!(updated.identity.folder_id, desired.identity.folder_id);
    let calls = controller.client().calls();
    assert_eq!(count(&calls, "move_item"), 1);
    assert_eq!(count(&calls, "update_item"), 0);
}

#[tokio::test]
async fn changed_source_pushes_definition() {
    let dir = TempDir::new().unwrap();
    let (controller, state) = created_notebook(&dir).await;

    write_source(dir.path(), "nb.ipynb", r#"{"cells":[{"cell_type":"code"}]}"#);
    let updated = controller
        .update(&state, &notebook_manifest("etl", true), &CallContext::default())
        .await
        .unwrap();
    assert_eq!(count(&controller.client().calls(), "update_definition"), 1);
    assert_ne!(updated.definition, state.definition);
}

#[tokio::test]
async fn pinned_definition_is_never_pushed() {
    let dir = TempDir::new().unwrap();
    let (controller, state) = created_notebook(&dir).await;

    write_source(dir.path(), "nb.ipynb", r#"{"cells":[{"cell_type":"markdown"}]}"#);
    let updated = controller
        .update(&state, &notebook_manifest("etl", false), &CallContext::default())
        .await
        .unwrap();
    assert_eq!(count(&controller.client().calls(), "update_definition"), 0);
    assert!(!updated.definition_update_enabled);
    assert_eq!(updated.definition, state.definition);
}

#[tokio::test]
async fn emptied_definition_pushes_kind_default() {
    let dir = TempDir::new().unwrap();
    let (controller, state) = created_notebook(&dir).await;

    let mut desired = notebook_manifest("etl", true);
    if let Some(definition) = desired.definition.as_mut() {
        definition.parts.clear();
    }
    let updated = controller.update(&state, &desired, &CallContext::default()).await.unwrap();
    assert_eq!(count(&controller.client().calls(), "update_definition"), 1);

    let pushed = controller.client().stored_definition(&state.workspace_id, &state.id).unwrap();
    assert_eq!(pushed.format.as_deref(), Some("ipynb"));
    assert_eq!(pushed.parts.len(), 1);
    assert_eq!(pushed.parts[0].path, "notebook-content.ipynb");
    let payload = base64_decode(&pushed.parts[0].payload).unwrap();
    let expected: Value = serde_json::from_str(Notebook.descriptor().empty_definition).unwrap();
    assert_eq!(serde_json::from_slice::<Value>(&payload).unwrap(), expected);
    assert_eq!(updated.definition.map(|d| d.parts.len()), Some(1));
}

#[tokio::test]
async fn failed_compile_leaves_item_untouched() {
    let dir = TempDir::new().unwrap();
    let (controller, state) = created_notebook(&dir).await;
    write_source(dir.path(), "tpl.ipynb", r#"{"cells":[],"metadata":{"name":"{{ .Missing }}"}}"#);

    let desired: ResourceManifest = serde_json::from_value(json!({
        "kind": "Notebook",
        "workspace_id": WS,
        "display_name": "renamed",
        "folder_id": "5a7c9e1b-3d5f-4b7d-9f1a-3c5e7a9b1d2f",
        "definition": {
            "format": "ipynb",
            "parts": {
                "notebook-content.ipynb": {
                    "source": "tpl.ipynb",
                    "processing_mode": "Template",
                    "tokens": { "Other": "x" }
                }
            }
        }
    }))
    .unwrap();
    let err = controller
        .update(&state, &desired, &CallContext::default())
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::Compile(_)), "got {err:?}");

    assert_eq!(controller.client().calls(), ["create_item", "get_item"]);
    let remote = controller.client().item(&state.workspace_id, &state.id).unwrap();
    assert_eq!(remote.display_name.as_str(), "etl");
    assert_eq!(remote.folder_id, None);
}

#[tokio::test]
async fn definition_without_format_is_rejected() {
    let dir = TempDir::new().unwrap();
    write_source(dir.path(), "x.txt", "payload");
    let desired: ResourceManifest = serde_json::from_value(json!({
        "kind": "Notebook",
        "workspace_id": WS,
        "display_name": "etl",
        "definition": {
            "parts": { "evil/anything.bin": { "source": "x.txt" } }
        }
    }))
    .unwrap();

    let controller = notebooks(&dir);
    let err = controller.create(&desired, &CallContext::default()).await.unwrap_err();
    let LifecycleError::Configuration(diagnostics) = err else {
        panic!("expected configuration error, got {err:?}");
    };
    assert!(diagnostics
        .iter()
        .any(|d| d.path.as_deref() == Some("definition.format")));
    assert!(controller.client().is_empty());
    assert!(controller.client().calls().is_empty());
}

#[tokio::test]
async fn workspace_change_is_rejected() {
    let dir = TempDir::new().unwrap();
    let (controller, state) = created_notebook(&dir).await;

    let mut desired = notebook_manifest("etl", true);
    desired.workspace_id = WorkspaceId::from(OTHER_WS);
    let err = controller
        .update(&state, &desired, &CallContext::default())
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::WorkspaceChanged { .. }));

    let plan_err = controller.plan(Some(&state), &desired).unwrap_err();
    assert!(matches!(plan_err, LifecycleError::WorkspaceChanged { .. }));
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

#[tokio::test]
async fn plan_warns_before_overwriting_definition() {
    let dir = TempDir::new().unwrap();
    let (controller, state) = created_notebook(&dir).await;

    let quiet = controller.plan(Some(&state), &notebook_manifest("etl", true)).unwrap();
    assert_eq!(quiet.action, PlanAction::NoOp);
    assert!(quiet.diagnostics.is_empty());

    write_source(dir.path(), "nb.ipynb", r#"{"cells":[1]}"#);
    let plan = controller.plan(Some(&state), &notebook_manifest("etl", true)).unwrap();
    assert_eq!(plan.action, PlanAction::Update);
    assert!(plan.will_update);
    assert_eq!(plan.diffs.len(), 1);
    let warning = plan.diagnostics.warnings().next().unwrap();
    assert_eq!(warning.summary, DEFINITION_UPDATE_SUMMARY);
}

#[test]
fn plan_for_new_item_creates() {
    let dir = TempDir::new().unwrap();
    write_source(dir.path(), "nb.ipynb", "{}");
    let plan = notebooks(&dir).plan(None, &notebook_manifest("etl", true)).unwrap();
    assert_eq!(plan.action, PlanAction::Create);
    assert!(plan.will_update);
}

#[test]
fn plan_rejects_unknown_definition_path() {
    let dir = TempDir::new().unwrap();
    let desired: ResourceManifest = serde_json::from_value(json!({
        "kind": "Notebook",
        "workspace_id": WS,
        "display_name": "etl",
        "definition": {
            "format": "ipynb",
            "parts": { "notebook-content.py": { "source": "nb.py" } }
        }
    }))
    .unwrap();
    let err = notebooks(&dir).plan(None, &desired).unwrap_err();
    let LifecycleError::Configuration(diagnostics) = err else {
        panic!("expected configuration error, got {err:?}");
    };
    assert!(diagnostics.has_errors());
}

#[test]
fn plan_rejects_foreign_kind() {
    let dir = TempDir::new().unwrap();
    let mut desired = notebook_manifest("etl", true);
    desired.kind = "Report".into();
    let err = notebooks(&dir).plan(None, &desired).unwrap_err();
    assert!(matches!(err, LifecycleError::KindMismatch { .. }));
}

// ---------------------------------------------------------------------------
// Import
// ---------------------------------------------------------------------------

#[tokio::test]
async fn import_carries_config_only_fields() {
    let dir = TempDir::new().unwrap();
    let (controller, state) = created_notebook(&dir).await;

    let mut carried = state.clone();
    carried.definition_update_enabled = false;
    let key = format!("{}/{}", state.workspace_id, state.id);
    let imported = controller
        .import(&key, Some(&carried), &CallContext::default())
        .await
        .unwrap();

    assert_eq!(imported.id, state.id);
    assert_eq!(imported.identity.display_name.as_str(), "etl");
    assert!(!imported.definition_update_enabled);
    assert_eq!(imported.definition, state.definition);
}

#[tokio::test]
async fn import_without_carried_state_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let controller = notebooks(&dir);
    let id = "3c5e7a9b-1d2f-4a6c-8e0b-2f4d6a8c0e1a";
    controller.client().insert(remote(id, "adopted"));

    let imported = controller
        .import(&format!("{WS}/{id}"), None, &CallContext::default())
        .await
        .unwrap();
    assert!(imported.definition_update_enabled);
    assert!(imported.definition.is_none());
    assert_eq!(imported.identity.display_name.as_str(), "adopted");
}

#[rstest]
#[case::no_separator("0b1a6c34-2f0e-4c1d-9b7e-5d3f1e2a4c68")]
#[case::extra_segment("a/b/c")]
#[case::empty_item("0b1a6c34-2f0e-4c1d-9b7e-5d3f1e2a4c68/")]
#[case::not_uuid("0b1a6c34-2f0e-4c1d-9b7e-5d3f1e2a4c68/etl")]
#[tokio::test]
async fn import_rejects_malformed_keys(#[case] key: &str) {
    let dir = TempDir::new().unwrap();
    let controller = notebooks(&dir);
    let err = controller.import(key, None, &CallContext::default()).await.unwrap_err();
    assert!(matches!(err, LifecycleError::ImportId { .. }), "{err:?}");
    assert!(controller.client().calls().is_empty());
}

// ---------------------------------------------------------------------------
// Lookup by display name
// ---------------------------------------------------------------------------

#[tokio::test]
async fn lookup_scans_pages_and_takes_first_match() {
    let dir = TempDir::new().unwrap();
    let client = MemoryItemsClient::new().with_page_size(2);
    for (i, name) in ["a", "b", "c", "target", "target"].iter().enumerate() {
        client.insert(remote(&format!("00000000-0000-4000-8000-00000000000{i}"), name));
    }
    let controller = LifecycleController::new(Notebook, client, &Settings::default())
        .unwrap()
        .with_base_dir(dir.path());

    let found = controller
        .find_by_display_name(&WorkspaceId::from(WS), &DisplayName::from("target"), &CallContext::default())
        .await
        .unwrap();
    assert_eq!(found.id.as_str(), "00000000-0000-4000-8000-000000000003");
    assert_eq!(count(&controller.client().calls(), "list_items"), 2);
}

#[tokio::test]
async fn lookup_without_match_returns_callers_error() {
    let client = MemoryItemsClient::new().with_page_size(2);
    for (i, name) in ["a", "b", "c", "d", "e"].iter().enumerate() {
        client.insert(remote(&format!("00000000-0000-4000-8000-00000000000{i}"), name));
    }
    let sentinel = RemoteError::Rejected {
        code: "Sentinel".into(),
        message: "no such notebook".into(),
    };
    let ctx = CallContext::default();
    let scope = ctx.scope(itemsync_core::Operation::Read);

    let err = Notebook
        .item_list_getter(&client, &scope, &WorkspaceId::from(WS), &DisplayName::from("z"), sentinel.clone())
        .await
        .unwrap_err();
    match err {
        LifecycleError::Remote(remote) => assert_eq!(remote, sentinel),
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(count(&client.calls(), "list_items"), 3);
}

// ---------------------------------------------------------------------------
// Kind specifics
// ---------------------------------------------------------------------------

#[tokio::test]
async fn preview_kind_needs_opt_in() {
    let desired: ResourceManifest = serde_json::from_value(json!({
        "kind": "VariableLibrary",
        "workspace_id": WS,
        "display_name": "vars",
    }))
    .unwrap();

    let gated = LifecycleController::new(VariableLibrary, MemoryItemsClient::new(), &Settings::default()).unwrap();
    let err = gated.create(&desired, &CallContext::default()).await.unwrap_err();
    assert!(matches!(err, LifecycleError::PreviewModeRequired { .. }));

    let settings = Settings {
        preview: true,
        ..Settings::default()
    };
    let allowed = LifecycleController::new(VariableLibrary, MemoryItemsClient::new(), &settings).unwrap();
    let plan = allowed.plan(None, &desired).unwrap();
    assert_eq!(plan.diagnostics.warnings().count(), 1);
    allowed.create(&desired, &CallContext::default()).await.unwrap();
}

#[tokio::test]
async fn kql_database_sends_creation_payload() {
    let client = MemoryItemsClient::new().with_properties(
        "KQLDatabase",
        json!({
            "databaseType": "ReadWrite",
            "parentEventhouseItemId": "5f8a2b6c-1d3e-4f70-9a81-b2c3d4e5f607",
            "queryServiceUri": "https://query.example"
        }),
    );
    let controller = LifecycleController::new(KqlDatabase, client, &Settings::default()).unwrap();
    let desired: ResourceManifest = serde_json::from_value(json!({
        "kind": "KQLDatabase",
        "workspace_id": WS,
        "display_name": "telemetry",
        "configuration": {
            "database_type": "ReadWrite",
            "eventhouse_id": "5f8a2b6c-1d3e-4f70-9a81-b2c3d4e5f607"
        }
    }))
    .unwrap();

    let state = controller.create(&desired, &CallContext::default()).await.unwrap();
    let properties = state.properties.unwrap();
    assert_eq!(properties.database_type, Some(KqlDatabaseType::ReadWrite));
    assert_eq!(properties.query_service_uri.as_deref(), Some("https://query.example"));
    assert_eq!(state.configuration, desired.configuration);
}

#[test]
fn kql_database_needs_configuration_or_definition() {
    let controller = LifecycleController::new(KqlDatabase, MemoryItemsClient::new(), &Settings::default()).unwrap();
    let desired: ResourceManifest = serde_json::from_value(json!({
        "kind": "KQLDatabase",
        "workspace_id": WS,
        "display_name": "telemetry",
    }))
    .unwrap();
    assert!(matches!(controller.plan(None, &desired), Err(LifecycleError::Configuration(_))));
}

#[test]
fn configuration_rejected_for_kinds_without_one() {
    let dir = TempDir::new().unwrap();
    let mut desired = notebook_manifest("etl", true);
    desired.configuration = Some(Value::Object(Default::default()));
    let err = notebooks(&dir).plan(None, &desired).unwrap_err();
    assert!(matches!(err, LifecycleError::Configuration(_)));
}
