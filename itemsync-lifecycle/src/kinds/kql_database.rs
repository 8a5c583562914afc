//! KQL databases are created either from a definition or from a creation
//! configuration naming the parent eventhouse, never both.

use serde::{Deserialize, Serialize};

use itemsync_core::{DefinitionFormat, Diagnostic, Diagnostics, DEFAULT_FORMAT};

use crate::error::LifecycleError;
use crate::kind::{KindDescriptor, ResourceKind};

pub static DESCRIPTOR: KindDescriptor = KindDescriptor {
    item_type: "KQLDatabase",
    name: "KQL Database",
    formats: &[DefinitionFormat {
        format_type: DEFAULT_FORMAT,
        wire_format: None,
        paths: &["DatabaseProperties.json", "DatabaseSchema.kql"],
    }],
    empty_definition: "",
    definition_required: false,
    has_configuration: true,
    config_or_definition_required: true,
    is_preview: false,
    required_entries: &[],
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KqlDatabaseType {
    ReadWrite,
    Shortcut,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KqlDatabaseConfig {
    pub database_type: KqlDatabaseType,
    pub eventhouse_id: String,
    #[serde(default)]
    pub invitation_token: Option<String>,
    #[serde(default)]
    pub source_cluster_uri: Option<String>,
    #[serde(default)]
    pub source_database_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KqlDatabasePayload {
    pub database_type: KqlDatabaseType,
    pub parent_eventhouse_item_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invitation_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_cluster_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_database_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KqlDatabaseProperties {
    pub database_type: Option<KqlDatabaseType>,
    pub eventhouse_id: Option<String>,
    pub ingestion_service_uri: Option<String>,
    pub query_service_uri: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteKqlDatabaseProperties {
    #[serde(default)]
    pub database_type: Option<KqlDatabaseType>,
    #[serde(default)]
    pub parent_eventhouse_item_id: Option<String>,
    #[serde(default)]
    pub ingestion_service_uri: Option<String>,
    #[serde(default)]
    pub query_service_uri: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct KqlDatabase;

impl ResourceKind for KqlDatabase {
    type Properties = KqlDatabaseProperties;
    type RemoteProperties = RemoteKqlDatabaseProperties;
    type Config = KqlDatabaseConfig;
    type CreationPayload = KqlDatabasePayload;

    fn descriptor(&self) -> &'static KindDescriptor {
        &DESCRIPTOR
    }

    fn properties_setter(&self, remote: &RemoteKqlDatabaseProperties) -> KqlDatabaseProperties {
        KqlDatabaseProperties {
            database_type: remote.database_type,
            eventhouse_id: remote.parent_eventhouse_item_id.clone(),
            ingestion_service_uri: remote.ingestion_service_uri.clone(),
            query_service_uri: remote.query_service_uri.clone(),
        }
    }

    fn creation_payload_setter(&self, config: &KqlDatabaseConfig) -> Result<KqlDatabasePayload, LifecycleError> {
        let mut diagnostics = Diagnostics::new();
        let shortcut_fields = [
            ("invitation_token", config.invitation_token.is_some()),
            ("source_cluster_uri", config.source_cluster_uri.is_some()),
            ("source_database_name", config.source_database_name.is_some()),
        ];

        if config.database_type == KqlDatabaseType::ReadWrite {
            for (field, _) in shortcut_fields.iter().filter(|(_, set)| *set) {
                diagnostics.push(
                    Diagnostic::error(
                        "Invalid Attribute Combination",
                        format!("{field} is only allowed when database_type is Shortcut"),
                    )
                    .at(format!("configuration.{field}")),
                );
            }
        }
        if config.invitation_token.is_some()
            && (config.source_cluster_uri.is_some() || config.source_database_name.is_some())
        {
            diagnostics.push(
                Diagnostic::error(
                    "Invalid Attribute Combination",
                    "invitation_token cannot be combined with source_cluster_uri or source_database_name",
                )
                .at("configuration.invitation_token"),
            );
        }
        if config.source_cluster_uri.is_some() && config.source_database_name.is_none() {
            diagnostics.push(
                Diagnostic::error(
                    "Missing Attribute Configuration",
                    "source_cluster_uri also requires source_database_name",
                )
                .at("configuration.source_database_name"),
            );
        }
        if diagnostics.has_errors() {
            return Err(LifecycleError::Configuration(diagnostics));
        }

        Ok(KqlDatabasePayload {
            database_type: config.database_type,
            parent_eventhouse_item_id: config.eventhouse_id.clone(),
            invitation_token: config.invitation_token.clone(),
            source_cluster_uri: config.source_cluster_uri.clone(),
            source_database_name: config.source_database_name.clone(),
        })
    }
}
