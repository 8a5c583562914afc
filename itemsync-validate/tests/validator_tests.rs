//! Conditional validator behaviour over whole configuration trees.

use itemsync_validate::{
    tree_from_yaml, AttrExpr, ConflictsWith, ExactlyOneOf, PatternIfAttributeIsOneOf, PatternSyntax,
    ProcessingModeArguments, RequiredIfAttributeIsSet, StructuralPresenceIfMarker, ValidatorEngine,
};
use rstest::rstest;
use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn keys_engine(patterns: &[&str]) -> ValidatorEngine {
    ValidatorEngine::new().rule(
        "definition.parts",
        PatternIfAttributeIsOneOf::new(AttrExpr::relative("../format"), ["ipynb"], patterns.iter().copied())
            .on_map_keys(),
    )
}

fn name_engine() -> ValidatorEngine {
    ValidatorEngine::new().rule(
        "name",
        PatternIfAttributeIsOneOf::new(AttrExpr::root("kind"), ["file"], ["b*c"]),
    )
}

fn details(tree: &Value, engine: &ValidatorEngine) -> Vec<String> {
    engine.validate(tree).iter().map(|d| d.detail.clone()).collect()
}

// ---------------------------------------------------------------------------
// PatternIfAttributeIsOneOf
// ---------------------------------------------------------------------------

#[rstest]
#[case("bXYZc", 0)]
#[case("bc", 1)]
#[case("abXc", 1)]
#[case("b.c", 0)]
fn wildcard_stands_for_one_or_more_chars(#[case] name: &str, #[case] expected: usize) {
    let tree = json!({"kind": "file", "name": name});
    assert_eq!(name_engine().validate(&tree).len(), expected, "{name}");
}

#[test]
fn trigger_outside_values_skips_host_even_when_empty() {
    let tree = json!({"kind": "folder"});
    assert!(name_engine().validate(&tree).is_empty());
}

#[rstest]
#[case(json!({"name": "zzz"}))]
#[case(json!({"kind": null, "name": "zzz"}))]
#[case(json!({"kind": "${unknown}", "name": "zzz"}))]
fn unset_or_unknown_trigger_is_deferred(#[case] tree: Value) {
    assert!(name_engine().validate(&tree).is_empty());
}

#[test]
fn unknown_host_is_not_checked() {
    let tree = json!({"kind": "file", "name": "${unknown}"});
    assert!(name_engine().validate(&tree).is_empty());
}

#[test]
fn empty_host_with_matching_trigger_is_an_error() {
    let tree = json!({"kind": "file"});
    let found = details(&tree, &name_engine());
    assert_eq!(found, vec!["is empty, value must match expression patterns 'b*c', got: <null>"]);
}

#[test]
fn trigger_matches_by_string_form() {
    let engine = ValidatorEngine::new().rule(
        "name",
        PatternIfAttributeIsOneOf::new(AttrExpr::root("level"), ["2"], ["ok"]),
    );
    assert_eq!(engine.validate(&json!({"level": 2, "name": "bad"})).len(), 1);
    assert!(engine.validate(&json!({"level": 3, "name": "bad"})).is_empty());
}

#[test]
fn each_violating_key_is_reported() {
    let tree = json!({
        "definition": {
            "format": "ipynb",
            "parts": {"notebook-content.ipynb": {}, "extra.py": {}, "other.txt": {}}
        }
    });
    let diags = keys_engine(&["notebook-content.ipynb"]).validate(&tree);
    let paths: Vec<_> = diags.iter().filter_map(|d| d.path.clone()).collect();
    assert_eq!(
        paths,
        vec![r#"definition.parts["extra.py"]"#, r#"definition.parts["other.txt"]"#]
    );
}

#[test]
fn null_key_map_has_nothing_to_check() {
    let tree = json!({"definition": {"format": "ipynb"}});
    assert!(keys_engine(&["notebook-content.ipynb"]).validate(&tree).is_empty());
}

#[test]
fn missing_trigger_is_reported_and_others_still_run() {
    let engine = ValidatorEngine::new()
        .rule("name", PatternIfAttributeIsOneOf::new(AttrExpr::relative("../../up"), ["x"], ["*"]))
        .rule("name", PatternIfAttributeIsOneOf::new(AttrExpr::root("kind"), ["file"], ["b*c"]));
    let diags = engine.validate(&json!({"kind": "file", "name": "nope"}));
    assert_eq!(diags.len(), 2);
    let first = diags.iter().next().unwrap();
    assert_eq!(first.summary, "Invalid configuration for attribute name");
    assert_eq!(first.detail, "../../up must be set");
}

#[test]
fn unreadable_trigger_is_reported() {
    let engine = ValidatorEngine::new().rule(
        "name",
        PatternIfAttributeIsOneOf::new(AttrExpr::root("kind.inner"), ["x"], ["*"]),
    );
    let diags = engine.validate(&json!({"kind": "scalar", "name": "n"}));
    assert_eq!(diags.len(), 1);
    assert!(diags.iter().next().unwrap().detail.starts_with("unable to retrieve attribute path"));
}

#[test]
fn bad_regex_is_a_compile_failure() {
    let engine = ValidatorEngine::new().rule(
        "name",
        PatternIfAttributeIsOneOf::new(AttrExpr::root("kind"), ["file"], ["(open"]).with_syntax(PatternSyntax::Regex),
    );
    let diags = engine.validate(&json!({"kind": "file", "name": "n"}));
    assert_eq!(diags.len(), 1);
    assert!(diags.iter().next().unwrap().detail.contains("unable to compile pattern '(open'"));
}

#[test]
fn custom_message_replaces_default_description() {
    let engine = ValidatorEngine::new().rule(
        "name",
        PatternIfAttributeIsOneOf::new(AttrExpr::root("kind"), ["file"], ["b*c"]).with_message("names start with b"),
    );
    assert_eq!(
        details(&json!({"kind": "file", "name": "x"}), &engine),
        vec!["names start with b, got: x"]
    );
}

// ---------------------------------------------------------------------------
// StructuralPresenceIfMarker
// ---------------------------------------------------------------------------

fn pages_engine() -> ValidatorEngine {
    ValidatorEngine::new().rule(
        "definition.parts",
        StructuralPresenceIfMarker::new(AttrExpr::relative("../format"), "PBIR", "definition/pages/*/page.json"),
    )
}

#[rstest]
#[case(json!({"definition": {"format": "PBIR", "parts": {"definition/pages/p1/page.json": {}}}}), 0)]
#[case(json!({"definition": {"format": "PBIR", "parts": {"definition/report.json": {}}}}), 1)]
#[case(json!({"definition": {"format": "PBIR"}}), 1)]
#[case(json!({"definition": {"format": "PBIR-Legacy", "parts": {"report.json": {}}}}), 0)]
#[case(json!({"definition": {"parts": {"report.json": {}}}}), 0)]
fn pages_required_only_for_marked_format(#[case] tree: Value, #[case] expected: usize) {
    assert_eq!(pages_engine().validate(&tree).len(), expected);
}

// ---------------------------------------------------------------------------
// Presence combinators and part arguments
// ---------------------------------------------------------------------------

#[test]
fn configuration_conflicts_with_definition() {
    let engine = ValidatorEngine::new().rule("configuration", ConflictsWith::new([AttrExpr::root("definition")]));
    assert_eq!(engine.validate(&json!({"configuration": {}, "definition": {}})).len(), 1);
    assert!(engine.validate(&json!({"configuration": {}})).is_empty());
    assert!(engine.validate(&json!({"definition": {}})).is_empty());
}

#[rstest]
#[case(json!({"definition": {"format": "ipynb", "parts": {}}}), 0)]
#[case(json!({"definition": {"parts": {"x.bin": {}}}}), 1)]
#[case(json!({}), 0)]
#[case(json!({"definition": "${unknown}"}), 0)]
fn format_required_with_definition(#[case] tree: Value, #[case] expected: usize) {
    let engine =
        ValidatorEngine::new().rule("definition.format", RequiredIfAttributeIsSet::new([AttrExpr::root("definition")]));
    assert_eq!(engine.validate(&tree).len(), expected);
}

#[rstest]
#[case(json!({"configuration": {"a": 1}}), 0)]
#[case(json!({"definition": {}}), 0)]
#[case(json!({}), 1)]
#[case(json!({"configuration": {}, "definition": {}}), 1)]
#[case(json!({"configuration": "${unknown}"}), 0)]
fn exactly_one_of_configuration_or_definition(#[case] tree: Value, #[case] expected: usize) {
    let engine = ValidatorEngine::new().rule("configuration", ExactlyOneOf::new([AttrExpr::root("definition")]));
    assert_eq!(engine.validate(&tree).len(), expected);
}

#[rstest]
#[case("processing_mode: Template\ntokens: {A: b}", 0)]
#[case("tokens: {A: b}", 1)]
#[case("processing_mode: Parameters\ntokens: {A: b}", 1)]
#[case("processing_mode: Parameters\nparameters: [{type: TextReplace, find: a, value: b}]", 0)]
#[case("processing_mode: None\nparameters: [{type: TextReplace, find: a, value: b}]", 1)]
#[case("processing_mode: Parameters\nparameters: [{type: Regex, find: a, value: b}]", 1)]
#[case("delimiter: \"<<>>\"", 1)]
#[case("processing_mode: Template\ndelimiter: \"<<>>\"", 0)]
#[case("delimiter: \"{{}}\"", 0)]
#[case("processing_mode: Sometimes", 1)]
fn part_arguments_follow_processing_mode(#[case] part: &str, #[case] expected: usize) {
    let part = tree_from_yaml(part).unwrap();
    let tree = json!({"definition": {"parts": {"a.json": part}}});
    let engine = ValidatorEngine::new().rule("definition.parts.*", ProcessingModeArguments);
    assert_eq!(engine.validate(&tree).len(), expected);
}
