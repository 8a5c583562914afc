//! Built-in item kinds and the descriptor table tooling reads.

mod eventstream;
mod kql_database;
mod notebook;
mod report;
mod semantic_model;
mod spark_job_definition;
mod variable_library;

pub use eventstream::Eventstream;
pub use kql_database::{
    KqlDatabase, KqlDatabaseConfig, KqlDatabasePayload, KqlDatabaseProperties, KqlDatabaseType,
    RemoteKqlDatabaseProperties,
};
pub use notebook::Notebook;
pub use report::Report;
pub use semantic_model::SemanticModel;
pub use spark_job_definition::{RemoteSparkJobDefinitionProperties, SparkJobDefinition, SparkJobDefinitionProperties};
pub use variable_library::{RemoteVariableLibraryProperties, VariableLibrary, VariableLibraryProperties};

use crate::error::LifecycleError;
use crate::kind::KindDescriptor;

/// Fixed table of the kinds this crate ships.
#[derive(Debug, Clone)]
pub struct KindRegistry {
    kinds: Vec<&'static KindDescriptor>,
}

impl KindRegistry {
    pub fn builtin() -> Self {
        Self {
            kinds: vec![
                &eventstream::DESCRIPTOR,
                &kql_database::DESCRIPTOR,
                &notebook::DESCRIPTOR,
                &report::DESCRIPTOR,
                &semantic_model::DESCRIPTOR,
                &spark_job_definition::DESCRIPTOR,
                &variable_library::DESCRIPTOR,
            ],
        }
    }

    /// Look a kind up by item type, ignoring case.
    pub fn get(&self, item_type: &str) -> Option<&'static KindDescriptor> {
        self.kinds
            .iter()
            .copied()
            .find(|k| k.item_type.eq_ignore_ascii_case(item_type))
    }

    pub fn require(&self, item_type: &str) -> Result<&'static KindDescriptor, LifecycleError> {
        self.get(item_type)
            .ok_or_else(|| LifecycleError::UnknownKind(item_type.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static KindDescriptor> + '_ {
        self.kinds.iter().copied()
    }
}

impl Default for KindRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
