//! Domain types for item definitions and persisted resource state.
//!
//! All path fields use `PathBuf`; all types round-trip through serde so that
//! manifests (YAML) and state files (JSON) share one vocabulary.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::error::ImportIdError;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

macro_rules! string_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }
    };
}

string_newtype!(
    /// Identifier of the workspace that owns an item. Immutable once created.
    WorkspaceId
);
string_newtype!(
    /// Remote identifier of a managed item.
    ItemId
);
string_newtype!(
    /// Human-facing item name, unique per workspace and item type.
    DisplayName
);
string_newtype!(
    /// SHA-256 hex digest over a definition part's inputs.
    Fingerprint
);

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// How a part's source file is turned into a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ProcessingMode {
    /// Source bytes are used verbatim.
    #[default]
    None,
    /// Placeholders are substituted from the part's tokens.
    #[serde(rename = "Template", alias = "TemplateSubstitution")]
    TemplateSubstitution,
    /// Ordered find/replace rules are applied.
    #[serde(rename = "Parameters", alias = "ParameterSubstitution")]
    ParameterSubstitution,
}

impl ProcessingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingMode::None => "None",
            ProcessingMode::TemplateSubstitution => "Template",
            ProcessingMode::ParameterSubstitution => "Parameters",
        }
    }

    pub fn all() -> &'static [ProcessingMode] {
        &[
            ProcessingMode::None,
            ProcessingMode::TemplateSubstitution,
            ProcessingMode::ParameterSubstitution,
        ]
    }
}

impl fmt::Display for ProcessingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Placeholder delimiter pair used in template processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TokensDelimiter {
    #[default]
    #[serde(rename = "{{}}", alias = "CurlyBraces")]
    CurlyBraces,
    #[serde(rename = "<<>>", alias = "Angles")]
    Angles,
    #[serde(rename = "@{}@", alias = "At")]
    At,
}

impl TokensDelimiter {
    pub fn open(&self) -> &'static str {
        match self {
            TokensDelimiter::CurlyBraces => "{{",
            TokensDelimiter::Angles => "<<",
            TokensDelimiter::At => "@{",
        }
    }

    pub fn close(&self) -> &'static str {
        match self {
            TokensDelimiter::CurlyBraces => "}}",
            TokensDelimiter::Angles => ">>",
            TokensDelimiter::At => "}@",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TokensDelimiter::CurlyBraces => "{{}}",
            TokensDelimiter::Angles => "<<>>",
            TokensDelimiter::At => "@{}@",
        }
    }
}

impl fmt::Display for TokensDelimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of a parameter substitution rule. Parsed case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterKind {
    TextReplace,
    JsonPathReplace,
}

impl ParameterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterKind::TextReplace => "TextReplace",
            ParameterKind::JsonPathReplace => "JsonPathReplace",
        }
    }
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParameterKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "textreplace" => Ok(ParameterKind::TextReplace),
            "jsonpathreplace" => Ok(ParameterKind::JsonPathReplace),
            other => Err(format!(
                "unsupported parameter type '{other}'; expected: TextReplace, JsonPathReplace"
            )),
        }
    }
}

impl Serialize for ParameterKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ParameterKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Encoding of a compiled payload as sent to the remote API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PayloadType {
    #[default]
    InlineBase64,
}

/// Remote operation names, used for timeouts and log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Create => write!(f, "create"),
            Operation::Read => write!(f, "read"),
            Operation::Update => write!(f, "update"),
            Operation::Delete => write!(f, "delete"),
        }
    }
}

// ---------------------------------------------------------------------------
// Definition parts
// ---------------------------------------------------------------------------

/// A single find/replace rule applied in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParameterRule {
    #[serde(rename = "type")]
    pub kind: ParameterKind,
    pub find: String,
    pub value: String,
}

/// Desired content for one definition path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionPart {
    pub source: PathBuf,
    #[serde(default)]
    pub processing_mode: ProcessingMode,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tokens: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterRule>,
    #[serde(default)]
    pub delimiter: TokensDelimiter,
}

impl DefinitionPart {
    /// A part whose source is used verbatim.
    pub fn verbatim(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            processing_mode: ProcessingMode::None,
            tokens: BTreeMap::new(),
            parameters: Vec::new(),
            delimiter: TokensDelimiter::default(),
        }
    }
}

/// A part after source resolution and processing.
///
/// Carries both the inputs (so the fingerprint can be recomputed) and the
/// exact payload that was, or will be, pushed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledPart {
    #[serde(flatten)]
    pub part: DefinitionPart,
    pub payload: String,
    #[serde(default)]
    pub payload_type: PayloadType,
    pub fingerprint: Fingerprint,
}

/// A compiled definition: format plus parts keyed by definition path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ItemDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default)]
    pub parts: BTreeMap<String, CompiledPart>,
}

impl ItemDefinition {
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Path → fingerprint view used for drift comparison.
    pub fn fingerprints(&self) -> BTreeMap<&str, &Fingerprint> {
        self.parts
            .iter()
            .map(|(path, part)| (path.as_str(), &part.fingerprint))
            .collect()
    }
}

/// Definition block of a resource manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// When `false`, an existing definition is never pushed again.
    #[serde(default = "default_true")]
    pub update_enabled: bool,
    #[serde(default)]
    pub parts: BTreeMap<String, DefinitionPart>,
}

impl Default for DefinitionConfig {
    fn default() -> Self {
        Self {
            format: None,
            update_enabled: true,
            parts: BTreeMap::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// Scalar identity attributes of an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ItemIdentity {
    pub display_name: DisplayName,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
}

/// Desired configuration of one resource, as authored in a YAML manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceManifest {
    /// Item type, e.g. `Notebook` or `Report`.
    pub kind: String,
    pub workspace_id: WorkspaceId,
    #[serde(flatten)]
    pub identity: ItemIdentity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<DefinitionConfig>,
    /// Kind-specific creation payload. Only consulted on create.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration: Option<serde_json::Value>,
}

/// Persisted record of an applied resource.
///
/// `P` is the kind's reported property shape; tooling that does not know the
/// kind reads it as raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "P: serde::de::DeserializeOwned"))]
pub struct ResourceState<P = serde_json::Value> {
    pub id: ItemId,
    pub kind: String,
    pub workspace_id: WorkspaceId,
    #[serde(flatten)]
    pub identity: ItemIdentity,
    #[serde(default = "default_true")]
    pub definition_update_enabled: bool,
    /// Definition exactly as last pushed, including sources and inputs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<ItemDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<P>,
    pub applied_at: DateTime<Utc>,
}

/// Parsed `workspaceID/itemID` import key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportId {
    pub workspace_id: WorkspaceId,
    pub item_id: ItemId,
}

impl FromStr for ImportId {
    type Err = ImportIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut segments = s.split('/');
        let (Some(workspace), Some(item), None) =
            (segments.next(), segments.next(), segments.next())
        else {
            return Err(ImportIdError::Malformed { input: s.to_string() });
        };
        if workspace.is_empty() || item.is_empty() {
            return Err(ImportIdError::Malformed { input: s.to_string() });
        }
        let workspace = parse_uuid("workspace_id", workspace)?;
        let item = parse_uuid("id", item)?;
        Ok(Self {
            workspace_id: WorkspaceId(workspace),
            item_id: ItemId(item),
        })
    }
}

impl fmt::Display for ImportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.workspace_id, self.item_id)
    }
}

fn parse_uuid(field: &'static str, value: &str) -> Result<String, ImportIdError> {
    Uuid::parse_str(value)
        .map(|u| u.to_string())
        .map_err(|_| ImportIdError::InvalidUuid {
            field,
            value: value.to_string(),
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
