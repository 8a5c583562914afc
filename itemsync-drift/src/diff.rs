//! Plan-time unified diffs between applied and desired definition parts.

use std::collections::BTreeSet;

use serde::Serialize;
use similar::TextDiff;

use itemsync_compiler::transforms::decode_payload;
use itemsync_core::{CompiledPart, ItemDefinition};

use crate::DriftError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PartChange {
    Added,
    Removed,
    /// `unified_diff` is `None` when either side is binary.
    Modified { unified_diff: Option<String> },
    Unchanged,
}

/// Change classification for a single definition path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartDiff {
    pub path: String,
    pub change: PartChange,
}

/// Compare every path of `previous` and `desired`, sorted by path.
///
/// Parts are compared by fingerprint; text diffs are only rendered for parts
/// that actually changed.
pub fn diff_parts(
    previous: Option<&ItemDefinition>,
    desired: &ItemDefinition,
) -> Result<Vec<PartDiff>, DriftError> {
    let empty = ItemDefinition::default();
    let previous = previous.unwrap_or(&empty);

    let paths: BTreeSet<&String> = previous.parts.keys().chain(desired.parts.keys()).collect();
    let mut diffs = Vec::with_capacity(paths.len());
    for path in paths {
        let change = match (previous.parts.get(path), desired.parts.get(path)) {
            (None, Some(_)) => PartChange::Added,
            (Some(_), None) => PartChange::Removed,
            (Some(old), Some(new)) if old.fingerprint == new.fingerprint => PartChange::Unchanged,
            (Some(old), Some(new)) => PartChange::Modified {
                unified_diff: unified(path, old, new)?,
            },
            (None, None) => continue,
        };
        diffs.push(PartDiff {
            path: path.clone(),
            change,
        });
    }
    Ok(diffs)
}

fn unified(path: &str, old: &CompiledPart, new: &CompiledPart) -> Result<Option<String>, DriftError> {
    let decode = |part: &CompiledPart| {
        decode_payload(&part.payload).map_err(|source| DriftError::Payload {
            path: path.to_string(),
            source,
        })
    };
    let (Some(before), Some(after)) = (decode(old)?, decode(new)?) else {
        return Ok(None);
    };
    let before = normalize_line_endings(&before);
    let after = normalize_line_endings(&after);
    if before == after {
        // Same content, different processing inputs.
        return Ok(Some(String::new()));
    }

    let old_header = format!("a/{path}");
    let new_header = format!("b/{path}");
    Ok(Some(
        TextDiff::from_lines(&before, &after)
            .unified_diff()
            .header(&old_header, &new_header)
            .context_radius(3)
            .to_string(),
    ))
}

fn normalize_line_endings(content: &str) -> String {
    content.replace("\r\n", "\n")
}

#[cfg(test)]
mod tests {
    use itemsync_compiler::compile_inline;

    use super::*;

    fn definition(parts: &[(&str, &str)]) -> ItemDefinition {
        ItemDefinition {
            format: None,
            parts: parts
                .iter()
                .map(|(path, content)| (path.to_string(), compile_inline(path, content)))
                .collect(),
        }
    }

    #[test]
    fn identical_definitions_have_no_changes() {
        let def = definition(&[("a.json", r#"{"a":1}"#)]);
        let diffs = diff_parts(Some(&def), &def).expect("diff");
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].change, PartChange::Unchanged);
    }

    #[test]
    fn added_removed_and_modified() {
        let before = definition(&[("a.txt", "one\ntwo\n"), ("gone.txt", "x")]);
        let after = definition(&[("a.txt", "one\nthree\n"), ("new.txt", "y")]);
        let diffs = diff_parts(Some(&before), &after).expect("diff");

        let kinds: Vec<_> = diffs.iter().map(|d| (d.path.as_str(), &d.change)).collect();
        assert!(matches!(kinds[1], ("gone.txt", PartChange::Removed)));
        assert!(matches!(kinds[2], ("new.txt", PartChange::Added)));

        let PartChange::Modified { unified_diff: Some(text) } = &diffs[0].change else {
            panic!("expected text diff, got {:?}", diffs[0].change);
        };
        assert!(text.contains("--- a/a.txt"));
        assert!(text.contains("+++ b/a.txt"));
        assert!(text.contains("-two"));
        assert!(text.contains("+three"));
    }

    #[test]
    fn no_previous_means_everything_added() {
        let diffs = diff_parts(None, &definition(&[("a.json", "{}")])).expect("diff");
        assert_eq!(diffs[0].change, PartChange::Added);
    }
}
