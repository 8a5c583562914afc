//! Validator sets for item manifests.
//!
//! [`item_validators`] assembles the rules every item kind shares from a
//! [`ItemSchema`] describing the kind: identity limits, the format selector,
//! per-format definition path keys, per-part argument rules and the
//! `configuration` / `definition` presence rules.

use serde_json::Value;

use itemsync_core::{FormatRegistry, DEFAULT_FORMAT};

use crate::engine::ValidatorEngine;
use crate::path::AttrExpr;
use crate::validators::{
    ConflictsWith, ExactlyOneOf, LengthAtMost, PatternIfAttributeIsOneOf, ProcessingModeArguments,
    RequiredIfAttributeIsSet, StructuralPresenceIfMarker, ValueIsOneOf,
};

pub const DISPLAY_NAME_MAX_LENGTH: usize = 123;
pub const DESCRIPTION_MAX_LENGTH: usize = 256;

/// A format whose definition must contain at least one entry matching
/// `pattern`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredEntry {
    pub format_type: &'static str,
    pub pattern: &'static str,
    pub message: &'static str,
}

/// What the shared validator set needs to know about a kind.
#[derive(Debug, Clone, Copy)]
pub struct ItemSchema<'a> {
    pub formats: &'a FormatRegistry,
    pub definition_required: bool,
    pub has_configuration: bool,
    pub config_or_definition_required: bool,
    pub required_entries: &'a [RequiredEntry],
}

/// One key-pattern validator per format: when `../format` equals the format
/// type, every key of `definition.parts` must match one of its paths.
pub fn definition_path_keys(formats: &FormatRegistry) -> Vec<PatternIfAttributeIsOneOf> {
    formats
        .formats()
        .iter()
        .map(|format| {
            PatternIfAttributeIsOneOf::new(
                AttrExpr::relative("../format"),
                [format.format_type],
                format.paths.iter().copied(),
            )
            .on_map_keys()
        })
        .collect()
}

pub fn item_validators(schema: &ItemSchema<'_>) -> ValidatorEngine {
    let mut engine = ValidatorEngine::new()
        .rule("display_name", ExactlyOneOf::required())
        .rule("display_name", LengthAtMost(DISPLAY_NAME_MAX_LENGTH))
        .rule("description", LengthAtMost(DESCRIPTION_MAX_LENGTH))
        .rule("definition.parts.*", ProcessingModeArguments);

    if !schema.formats.formats().is_empty() {
        engine.add("definition.format", ValueIsOneOf::new(schema.formats.all_types()));
        // Without a Default layout nothing else selects the allowed paths.
        if !schema.formats.contains(DEFAULT_FORMAT) {
            engine.add("definition.format", RequiredIfAttributeIsSet::new([AttrExpr::root("definition")]));
        }
        for validator in definition_path_keys(schema.formats) {
            engine.add("definition.parts", validator);
        }
    }

    for entry in schema.required_entries {
        engine.add(
            "definition.parts",
            StructuralPresenceIfMarker::new(AttrExpr::relative("../format"), entry.format_type, entry.pattern)
                .with_message(entry.message),
        );
    }

    if schema.has_configuration {
        if schema.config_or_definition_required {
            engine.add("configuration", ExactlyOneOf::new([AttrExpr::root("definition")]));
        } else {
            engine.add("configuration", ConflictsWith::new([AttrExpr::root("definition")]));
        }
    } else if schema.definition_required {
        engine.add("definition", ExactlyOneOf::required());
    }

    engine
}

/// Parse a YAML document into the tree validators read.
pub fn tree_from_yaml(source: &str) -> Result<Value, serde_yaml::Error> {
    serde_yaml::from_str(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use itemsync_core::DefinitionFormat;
    use serde_json::json;

    const FORMATS: &[DefinitionFormat] = &[
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
    ];

    fn schema(formats: &FormatRegistry) -> ItemSchema<'_> {
        ItemSchema {
            formats,
            definition_required: false,
            has_configuration: false,
            config_or_definition_required: false,
            required_entries: &[],
        }
    }

    #[test]
    fn one_key_validator_per_format() {
        let registry = FormatRegistry::new(FORMATS).unwrap();
        assert_eq!(definition_path_keys(&registry).len(), 2);
    }

    #[test]
    fn key_outside_active_format_is_reported() {
        let registry = FormatRegistry::new(FORMATS).unwrap();
        let engine = item_validators(&schema(&registry));
        let tree = json!({
            "display_name": "nb",
            "definition": {"format": "py", "parts": {"notebook-content.ipynb": {"source": "x"}}}
        });
        let diags = engine.validate(&tree);
        assert_eq!(diags.len(), 1);
        let diag = diags.iter().next().unwrap();
        assert_eq!(diag.path.as_deref(), Some(r#"definition.parts["notebook-content.ipynb"]"#));
    }

    #[test]
    fn unknown_format_value_is_reported() {
        let registry = FormatRegistry::new(FORMATS).unwrap();
        let engine = item_validators(&schema(&registry));
        let diags = engine.validate(&json!({"display_name": "nb", "definition": {"format": "r", "parts": {}}}));
        assert_eq!(diags.len(), 1);
        assert!(diags.iter().next().unwrap().detail.contains("[ipynb, py]"));
    }

    #[test]
    fn format_required_once_definition_is_set() {
        let registry = FormatRegistry::new(FORMATS).unwrap();
        let engine = item_validators(&schema(&registry));
        let tree = json!({
            "display_name": "nb",
            "definition": {"parts": {"evil/anything.bin": {"source": "x.txt"}}}
        });
        let diags = engine.validate(&tree);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags.iter().next().unwrap().path.as_deref(), Some("definition.format"));

        assert!(engine.validate(&json!({"display_name": "nb"})).is_empty());
    }

    #[test]
    fn default_layout_needs_no_format() {
        let formats = [DefinitionFormat {
            format_type: DEFAULT_FORMAT,
            wire_format: None,
            paths: &["eventstream.json"],
        }];
        let registry = FormatRegistry::new(&formats).unwrap();
        let engine = item_validators(&schema(&registry));
        let diags = engine.validate(&json!({"display_name": "es", "definition": {"parts": {}}}));
        assert!(diags.is_empty());
    }

    #[test]
    fn definition_required_without_configuration() {
        let registry = FormatRegistry::new(FORMATS).unwrap();
        let schema = ItemSchema {
            definition_required: true,
            ..schema(&registry)
        };
        let diags = item_validators(&schema).validate(&json!({"display_name": "nb"}));
        assert_eq!(diags.len(), 1);
        assert_eq!(diags.iter().next().unwrap().path.as_deref(), Some("definition"));
    }
}
