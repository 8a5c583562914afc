//! Identity attribute changes (display name, description, folder).

use serde::Serialize;

use itemsync_core::{DisplayName, ItemIdentity};

/// Fields sent on an identity update. Both are always sent together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityUpdate {
    pub display_name: DisplayName,
    pub description: String,
}

/// `Some` when display name or description differ.
pub fn identity_changed(previous: &ItemIdentity, desired: &ItemIdentity) -> Option<IdentityUpdate> {
    if previous.display_name == desired.display_name && previous.description == desired.description {
        return None;
    }
    Some(IdentityUpdate {
        display_name: desired.display_name.clone(),
        description: desired.description.clone(),
    })
}

/// `Some(target)` when the item must move; `Some(None)` moves to the root.
pub fn folder_changed(previous: &ItemIdentity, desired: &ItemIdentity) -> Option<Option<String>> {
    (previous.folder_id != desired.folder_id).then(|| desired.folder_id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(name: &str, description: &str, folder: Option<&str>) -> ItemIdentity {
        ItemIdentity {
            display_name: DisplayName::from(name),
            description: description.to_string(),
            folder_id: folder.map(str::to_string),
        }
    }

    #[test]
    fn unchanged_identity() {
        let a = identity("nb", "d", None);
        assert!(identity_changed(&a, &a.clone()).is_none());
        assert!(folder_changed(&a, &a.clone()).is_none());
    }

    #[test]
    fn description_only_change_sends_both_fields() {
        let update = identity_changed(&identity("nb", "old", None), &identity("nb", "new", None)).unwrap();
        assert_eq!(update.display_name.as_str(), "nb");
        assert_eq!(update.description, "new");
    }

    #[test]
    fn folder_move_to_root() {
        let moved = folder_changed(&identity("nb", "", Some("f1")), &identity("nb", "", None));
        assert_eq!(moved, Some(None));
    }
}
