use serde::{Deserialize, Serialize};

use itemsync_core::DefinitionFormat;

use crate::error::LifecycleError;
use crate::kind::{KindDescriptor, NoConfiguration, ResourceKind};

pub static DESCRIPTOR: KindDescriptor = KindDescriptor {
    item_type: "SparkJobDefinition",
    name: "Spark Job Definition",
    formats: &[DefinitionFormat {
        format_type: "SparkJobDefinitionV1",
        wire_format: Some("SparkJobDefinitionV1"),
        paths: &["SparkJobDefinitionV1.json"],
    }],
    empty_definition: r#"{"executableFile":null,"defaultLakehouseArtifactId":null,"mainClass":null,"additionalLakehouseIds":[],"retryPolicy":null,"commandLineArguments":null,"additionalLibraryUris":null,"language":null,"environmentArtifactId":null}"#,
    definition_required: false,
    has_configuration: false,
    config_or_definition_required: false,
    is_preview: false,
    required_entries: &[],
};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SparkJobDefinitionProperties {
    pub onelake_root_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteSparkJobDefinitionProperties {
    #[serde(default)]
    pub one_lake_root_path: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SparkJobDefinition;

impl ResourceKind for SparkJobDefinition {
    type Properties = SparkJobDefinitionProperties;
    type RemoteProperties = RemoteSparkJobDefinitionProperties;
    type Config = NoConfiguration;
    type CreationPayload = NoConfiguration;

    fn descriptor(&self) -> &'static KindDescriptor {
        &DESCRIPTOR
    }

    fn properties_setter(&self, remote: &RemoteSparkJobDefinitionProperties) -> SparkJobDefinitionProperties {
        SparkJobDefinitionProperties {
            onelake_root_path: remote.one_lake_root_path.clone(),
        }
    }

    fn creation_payload_setter(&self, config: &NoConfiguration) -> Result<NoConfiguration, LifecycleError> {
        Ok(*config)
    }
}
