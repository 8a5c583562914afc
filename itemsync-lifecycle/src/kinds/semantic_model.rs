use itemsync_core::DefinitionFormat;

use crate::error::LifecycleError;
use crate::kind::{KindDescriptor, NoConfiguration, NoProperties, ResourceKind};

pub static DESCRIPTOR: KindDescriptor = KindDescriptor {
    item_type: "SemanticModel",
    name: "Semantic Model",
    formats: &[
        DefinitionFormat {
            format_type: "TMSL",
            wire_format: Some("TMSL"),
            paths: &["model.bim", "definition.pbism", "diagramLayout.json"],
        },
        DefinitionFormat {
            format_type: "TMDL",
            wire_format: Some("TMDL"),
            paths: &[
                "definition.pbism",
                "diagramLayout.json",
                "definition/database.tmdl",
                "definition/model.tmdl",
                "definition/expressions.tmdl",
                "definition/relationships.tmdl",
                "definition/tables/*.tmdl",
                "definition/roles/*.tmdl",
                "definition/perspectives/*.tmdl",
                "definition/cultures/*.tmdl",
            ],
        },
    ],
    empty_definition: "",
    definition_required: true,
    has_configuration: false,
    config_or_definition_required: false,
    is_preview: false,
    required_entries: &[],
};

#[derive(Debug, Clone, Copy, Default)]
pub struct SemanticModel;

impl ResourceKind for SemanticModel {
    type Properties = NoProperties;
    type RemoteProperties = NoProperties;
    type Config = NoConfiguration;
    type CreationPayload = NoConfiguration;

    fn descriptor(&self) -> &'static KindDescriptor {
        &DESCRIPTOR
    }

    fn properties_setter(&self, _remote: &NoProperties) -> NoProperties {
        NoProperties {}
    }

    fn creation_payload_setter(&self, config: &NoConfiguration) -> Result<NoConfiguration, LifecycleError> {
        Ok(*config)
    }
}
