//! Minimal JSONPath for value replacement.
//!
//! Supported syntax: `$`, `.name`, `['name']` / `["name"]`, `[n]`, `[*]`
//! and `.*`. Filters, slices and recursive descent are rejected.

use std::str::FromStr;

use serde_json::Value;

use crate::error::CompileError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    Key(String),
    Index(usize),
    Wildcard,
}

/// A parsed JSONPath expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonPath {
    expression: String,
    steps: Vec<Step>,
}

impl JsonPath {
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Overwrite every node matched by this path with `replacement`.
    ///
    /// Returns the number of nodes replaced; zero is not an error.
    pub fn replace_all(&self, root: &mut Value, replacement: &Value) -> usize {
        replace_at(root, &self.steps, replacement)
    }
}

fn replace_at(node: &mut Value, steps: &[Step], replacement: &Value) -> usize {
    let Some((step, rest)) = steps.split_first() else {
        *node = replacement.clone();
        return 1;
    };
    match (step, node) {
        (Step::Key(key), Value::Object(map)) => map
            .get_mut(key)
            .map_or(0, |child| replace_at(child, rest, replacement)),
        (Step::Index(i), Value::Array(items)) => items
            .get_mut(*i)
            .map_or(0, |child| replace_at(child, rest, replacement)),
        (Step::Wildcard, Value::Object(map)) => map
            .values_mut()
            .map(|child| replace_at(child, rest, replacement))
            .sum(),
        (Step::Wildcard, Value::Array(items)) => items
            .iter_mut()
            .map(|child| replace_at(child, rest, replacement))
            .sum(),
        _ => 0,
    }
}

impl FromStr for JsonPath {
    type Err = CompileError;

    fn from_str(expression: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| CompileError::InvalidJsonPath {
            expression: expression.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = expression.trim();
        let Some(mut rest) = trimmed.strip_prefix('$') else {
            return Err(invalid("must start with '$'"));
        };

        let mut steps = Vec::new();
        while !rest.is_empty() {
            if let Some(after) = rest.strip_prefix('.') {
                if after.starts_with('.') {
                    return Err(invalid("recursive descent is not supported"));
                }
                if let Some(after_star) = after.strip_prefix('*') {
                    steps.push(Step::Wildcard);
                    rest = after_star;
                    continue;
                }
                let end = after.find(['.', '[', ']']).unwrap_or(after.len());
                let name = &after[..end];
                if name.is_empty() {
                    return Err(invalid("empty member name"));
                }
                steps.push(Step::Key(name.to_string()));
                rest = &after[end..];
            } else if let Some(after) = rest.strip_prefix('[') {
                let Some(close) = find_bracket_close(after) else {
                    return Err(invalid("unterminated '['"));
                };
                steps.push(parse_bracket(after[..close].trim()).ok_or_else(|| {
                    invalid("expected a quoted name, an index or '*' inside brackets")
                })?);
                rest = &after[close + 1..];
            } else {
                return Err(invalid("expected '.' or '['"));
            }
        }

        Ok(Self {
            expression: trimmed.to_string(),
            steps,
        })
    }
}

/// Position of the `]` closing a bracket step, skipping quoted names.
fn find_bracket_close(s: &str) -> Option<usize> {
    let mut quote = None;
    for (i, c) in s.char_indices() {
        match (quote, c) {
            (None, '\'' | '"') => quote = Some(c),
            (Some(q), c) if c == q => quote = None,
            (None, ']') => return Some(i),
            _ => {}
        }
    }
    None
}

fn parse_bracket(inner: &str) -> Option<Step> {
    if inner == "*" {
        return Some(Step::Wildcard);
    }
    for q in ['\'', '"'] {
        if let Some(name) = inner.strip_prefix(q).and_then(|s| s.strip_suffix(q)) {
            return Some(Step::Key(name.to_string()));
        }
    }
    inner.parse().ok().map(Step::Index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn replace(doc: Value, path: &str, value: &str) -> (Value, usize) {
        let mut doc = doc;
        let path: JsonPath = path.parse().unwrap();
        let n = path.replace_all(&mut doc, &Value::String(value.to_string()));
        (doc, n)
    }

    #[test]
    fn member_and_bracket_forms() {
        let (doc, n) = replace(json!({"a": {"b c": 1}}), "$.a['b c']", "x");
        assert_eq!((doc, n), (json!({"a": {"b c": "x"}}), 1));
        let (doc, _) = replace(json!({"a": [1, 2, 3]}), "$.a[1]", "x");
        assert_eq!(doc, json!({"a": [1, "x", 3]}));
    }

    #[test]
    fn wildcards_replace_every_match() {
        let doc = json!({"items": [{"id": 1}, {"id": 2}, {"other": 3}]});
        let (doc, n) = replace(doc, "$.items[*].id", "z");
        assert_eq!(n, 2);
        assert_eq!(doc, json!({"items": [{"id": "z"}, {"id": "z"}, {"other": 3}]}));

        let (doc, n) = replace(json!({"a": 1, "b": 2}), "$.*", "q");
        assert_eq!((doc, n), (json!({"a": "q", "b": "q"}), 2));
    }

    #[test]
    fn missing_path_is_noop() {
        let (doc, n) = replace(json!({"a": 1}), "$.nope.deeper", "x");
        assert_eq!((doc, n), (json!({"a": 1}), 0));
    }

    #[test]
    fn invalid_expressions() {
        for bad in ["a.b", "$..a", "$.", "$[", "$[?(@.a)]", "$.a]"] {
            assert!(bad.parse::<JsonPath>().is_err(), "{bad}");
        }
    }
}
