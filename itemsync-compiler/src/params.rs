//! Ordered find/replace rules for parameter processing.

use serde_json::Value;

use itemsync_core::types::{ParameterKind, ParameterRule};

use crate::error::CompileError;
use crate::jsonpath::JsonPath;

/// Apply `rules` to `text` in declaration order; each rule sees the output
/// of the one before it.
pub fn apply_parameters(text: &str, rules: &[ParameterRule]) -> Result<String, CompileError> {
    let mut current = text.to_string();
    for (index, rule) in rules.iter().enumerate() {
        current = match rule.kind {
            ParameterKind::TextReplace => {
                if rule.find.is_empty() {
                    return Err(CompileError::EmptyFind { index });
                }
                current.replace(&rule.find, &rule.value)
            }
            ParameterKind::JsonPathReplace => json_path_replace(&current, rule)?,
        };
    }
    Ok(current)
}

fn json_path_replace(text: &str, rule: &ParameterRule) -> Result<String, CompileError> {
    let path: JsonPath = rule.find.parse()?;
    let mut doc: Value = serde_json::from_str(text).map_err(|e| CompileError::InvalidJsonPath {
        expression: rule.find.clone(),
        reason: format!("content is not valid JSON: {e}"),
    })?;
    if path.replace_all(&mut doc, &Value::String(rule.value.clone())) == 0 {
        return Ok(text.to_string());
    }
    Ok(serde_json::to_string(&doc)?)
}
