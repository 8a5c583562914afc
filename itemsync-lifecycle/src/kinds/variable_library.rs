use serde::{Deserialize, Serialize};

use itemsync_core::{DefinitionFormat, DEFAULT_FORMAT};

use crate::error::LifecycleError;
use crate::kind::{KindDescriptor, NoConfiguration, ResourceKind};

pub static DESCRIPTOR: KindDescriptor = KindDescriptor {
    item_type: "VariableLibrary",
    name: "Variable Library",
    formats: &[DefinitionFormat {
        format_type: DEFAULT_FORMAT,
        wire_format: None,
        paths: &["variables.json", "settings.json", "valueSets/*.json"],
    }],
    empty_definition: "",
    definition_required: false,
    has_configuration: false,
    config_or_definition_required: false,
    is_preview: true,
    required_entries: &[],
};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VariableLibraryProperties {
    pub active_value_set_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteVariableLibraryProperties {
    #[serde(default)]
    pub active_value_set_name: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct VariableLibrary;

impl ResourceKind for VariableLibrary {
    type Properties = VariableLibraryProperties;
    type RemoteProperties = RemoteVariableLibraryProperties;
    type Config = NoConfiguration;
    type CreationPayload = NoConfiguration;

    fn descriptor(&self) -> &'static KindDescriptor {
        &DESCRIPTOR
    }

    fn properties_setter(&self, remote: &RemoteVariableLibraryProperties) -> VariableLibraryProperties {
        VariableLibraryProperties {
            active_value_set_name: remote.active_value_set_name.clone(),
        }
    }

    fn creation_payload_setter(&self, config: &NoConfiguration) -> Result<NoConfiguration, LifecycleError> {
        Ok(*config)
    }
}
