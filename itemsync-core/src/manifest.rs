//! Resource manifests: one or more YAML documents describing desired items.

use std::path::Path;

use serde::Deserialize;

use crate::error::{io_err, StateError};
use crate::types::ResourceManifest;

/// Load every manifest document in `path`.
///
/// Multiple resources may be separated with `---`; empty documents are skipped.
pub fn load_manifests(path: &Path) -> Result<Vec<ResourceManifest>, StateError> {
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    let mut manifests = Vec::new();
    for document in serde_yaml::Deserializer::from_str(&contents) {
        let value = serde_yaml::Value::deserialize(document).map_err(|source| {
            StateError::ParseYaml {
                path: path.to_path_buf(),
                source,
            }
        })?;
        if value.is_null() {
            continue;
        }
        let manifest = serde_yaml::from_value(value).map_err(|source| StateError::ParseYaml {
            path: path.to_path_buf(),
            source,
        })?;
        manifests.push(manifest);
    }
    Ok(manifests)
}
