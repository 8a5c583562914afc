use itemsync_core::DefinitionFormat;

use crate::error::LifecycleError;
use crate::kind::{KindDescriptor, NoConfiguration, NoProperties, ResourceKind};

pub static DESCRIPTOR: KindDescriptor = KindDescriptor {
    item_type: "Notebook",
    name: "Notebook",
    formats: &[
        DefinitionFormat {
            format_type: "ipynb",
            wire_format: Some("ipynb"),
            paths: &["notebook-content.ipynb"],
        },
        DefinitionFormat {
            format_type: "py",
            wire_format: None,
            paths: &["notebook-content.py"],
        },
    ],
    empty_definition: r#"{"cells":[],"metadata":{},"nbformat":4,"nbformat_minor":5}"#,
    definition_required: false,
    has_configuration: false,
    config_or_definition_required: false,
    is_preview: false,
    required_entries: &[],
};

#[derive(Debug, Clone, Copy, Default)]
pub struct Notebook;

impl ResourceKind for Notebook {
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
