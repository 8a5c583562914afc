use itemsync_core::DefinitionFormat;
use itemsync_validate::RequiredEntry;

use crate::error::LifecycleError;
use crate::kind::{KindDescriptor, NoConfiguration, NoProperties, ResourceKind};

pub static DESCRIPTOR: KindDescriptor = KindDescriptor {
    item_type: "Report",
    name: "Report",
    formats: &[
        DefinitionFormat {
            format_type: "PBIR-Legacy",
            wire_format: Some("PBIR-Legacy"),
            paths: &[
                "report.json",
                "definition.pbir",
                "StaticResources/RegisteredResources/*",
                "StaticResources/SharedResources/*",
            ],
        },
        DefinitionFormat {
            format_type: "PBIR",
            wire_format: Some("PBIR"),
            paths: &[
                "definition/report.json",
                "definition/version.json",
                "definition.pbir",
                "definition/pages/pages.json",
                "definition/pages/*/page.json",
                "definition/pages/*/visuals/*/visual.json",
                "definition/pages/*/visuals/*/mobile.json",
                "definition/bookmarks/*.json",
                "definition/reportExtensions.json",
                "StaticResources/RegisteredResources/*",
                "StaticResources/SharedResources/*",
            ],
        },
    ],
    empty_definition: "",
    definition_required: true,
    has_configuration: false,
    config_or_definition_required: false,
    is_preview: false,
    required_entries: &[RequiredEntry {
        format_type: "PBIR",
        pattern: "definition/pages/*/page.json",
        message: "PBIR definitions need at least one page (definition/pages/<name>/page.json)",
    }],
};

#[derive(Debug, Clone, Copy, Default)]
pub struct Report;

impl ResourceKind for Report {
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
