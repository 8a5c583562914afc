use itemsync_core::{DefinitionFormat, DEFAULT_FORMAT};

use crate::error::LifecycleError;
use crate::kind::{KindDescriptor, NoConfiguration, NoProperties, ResourceKind};

pub static DESCRIPTOR: KindDescriptor = KindDescriptor {
    item_type: "Eventstream",
    name: "Eventstream",
    formats: &[DefinitionFormat {
        format_type: DEFAULT_FORMAT,
        wire_format: None,
        paths: &["eventstream.json", "eventstreamProperties.json"],
    }],
    empty_definition: "",
    definition_required: false,
    has_configuration: false,
    config_or_definition_required: false,
    is_preview: false,
    required_entries: &[],
};

#[derive(Debug, Clone, Copy, Default)]
pub struct Eventstream;

impl ResourceKind for Eventstream {
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
