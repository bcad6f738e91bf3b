//! Integration tests for the public API
//!
//! Exercises the three engines together the way callers use them:
//! - Path reads, writes and existence checks on parsed JSON data
//! - Transform specs built in code and loaded from YAML
//! - Rule trees loaded from YAML, evaluated with options and traced
//! - Existence checks on class-like targets

use std::sync::Arc;

use recshape_core::{
    Error, Predicate, Record, RuleTree, Segment, TransformMapping, TransformSpec, TypeShape,
    ValidationOptions, Value, get, has, has_value, set, transform, validate, validate_report,
};
use rstest::rstest;
use serde_json::json;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn record(value: serde_json::Value) -> Record {
    Value::from(value).into_record().unwrap()
}

fn rules(yaml: &str) -> RuleTree {
    serde_yaml::from_str(yaml).unwrap()
}

// =============================================================================
// Path Resolver
// =============================================================================

#[test]
fn test_get_nested_index() {
    let root = Value::from(json!({"testA": {"testB": [1]}}));
    assert_eq!(get(&root, "testA.testB[0]"), Some(&Value::from(1)));
}

#[test]
fn test_text_and_segment_paths_agree() {
    let root = Value::from(json!({"a": {"b": [{"c": "found"}]}}));
    let segments = [
        Segment::from("a"),
        Segment::from("b"),
        Segment::from(0usize),
        Segment::from("c"),
    ];
    assert_eq!(get(&root, "a.b[0].c"), get(&root, segments));
    assert_eq!(get(&root, "a.b[0].c"), Some(&Value::from("found")));
    assert_eq!(get(&root, "a['b'][0][\"c\"]"), Some(&Value::from("found")));
}

#[rstest]
#[case("name")]
#[case("profile.city")]
#[case("tags[1]")]
#[case("tags[4]")]
#[case("profile.tags[0]")]
fn test_set_then_get_round_trip(#[case] path: &str) {
    let mut root = Value::from(json!({
        "name": "old",
        "profile": {"city": "Paris", "tags": []},
        "tags": ["a", "b"]
    }));
    let value = Value::from(json!({"written": path}));
    assert!(set(&mut root, path, value.clone()));
    assert_eq!(get(&root, path), Some(&value));
}

#[test]
fn test_sparse_array_write() {
    let mut root = Value::from(json!([0]));
    assert!(set(&mut root, 5usize, Value::from(5)));
    for index in 1..5usize {
        assert_eq!(get(&root, index), None, "index {index} should be a hole");
        assert!(!has(&root, index));
    }
    assert_eq!(get(&root, 5usize), Some(&Value::from(5)));
    assert_eq!(get(&root, 0usize), Some(&Value::from(0)));
}

#[test]
fn test_malformed_paths_degrade() {
    let mut root = Value::from(json!({"a": 1}));
    assert_eq!(get(&root, ""), None);
    assert!(!has(&root, Vec::<Segment>::new()));
    assert!(!set(&mut root, None::<&str>, Value::from(2)));
    assert!(!set(&mut root, "missing.child", Value::from(2)));
    assert_eq!(root, Value::from(json!({"a": 1})));

    let mut scalar = Value::from("text");
    assert!(!set(&mut scalar, "a", Value::from(1)));
    assert!(!has(&scalar, "length"));
}

#[test]
fn test_has_value_with_predicate() {
    let root = Value::from(json!({"age": 35}));
    assert!(has_value(&root, "age", &Value::from(35)));
    assert!(!has_value(&root, "age", &Value::from("35")));
    let adult = Value::from(Predicate::new(|v| v.as_f64().is_some_and(|n| n >= 18.0)));
    assert!(has_value(&root, "age", &adult));
    assert!(!has_value(&root, "name", &adult));
}

#[test]
fn test_has_on_class_like_targets() {
    let shape = Arc::new(
        TypeShape::new("TestClass")
            .with_static("staticProp", true)
            .with_prototype("protoProp", true),
    );
    let mut fields = Record::new();
    fields.insert("instanceProp".to_string(), Value::from(true));
    let instance = shape.instantiate(fields);

    assert!(has(&*shape, "staticProp"));
    assert!(!has(&*shape, "protoProp"));
    assert!(!has(&*shape, "instanceProp"));
    assert!(has(&instance, "instanceProp"));
    assert!(has(&instance, "protoProp"));
    assert!(!has(&instance, "staticProp"));
}

// =============================================================================
// Transform Engine
// =============================================================================

#[test]
fn test_transform_rename() {
    init_tracing();
    let input = record(json!({"name": "Matt", "age": 35}));
    let mapping = TransformMapping::new()
        .rename("name", "fullName")
        .rename("age", "ageInYears");
    let output = transform(&input, &[mapping.into()]).unwrap();
    assert_eq!(output, record(json!({"fullName": "Matt", "ageInYears": 35})));
}

#[test]
fn test_transform_identity() {
    let input = record(json!({"name": "Matt", "tags": ["a"]}));
    assert_eq!(transform(&input, &[]).unwrap(), input);
}

#[test]
fn test_transform_chained_renames_in_order() {
    init_tracing();
    let specs: Vec<TransformSpec> =
        serde_yaml::from_str("- {a: x}\n- {x: y}\n- {y: z}\n").unwrap();
    let output = transform(&record(json!({"a": 1})), &specs).unwrap();
    assert_eq!(output.get("z"), Some(&Value::from(1)));

    let reversed: Vec<TransformSpec> = specs.into_iter().rev().collect();
    let output = transform(&record(json!({"a": 1})), &reversed).unwrap();
    assert_eq!(output.get("z"), None);
}

#[test]
fn test_transform_never_mutates_input() {
    let input = record(json!({"name": "Matt", "age": 35}));
    let before = input.clone();
    let mapping = TransformMapping::new()
        .map("name", |value, _, frozen, output| {
            assert!(frozen.try_insert("name", Value::from("changed")).is_err());
            output.insert("shout".to_string(), Value::from(value.to_text().to_uppercase()));
            Ok(None)
        })
        .map("age", |_, _, frozen, _| {
            frozen.try_remove("name")?;
            Ok(None)
        });
    let err = transform(&input, &[mapping.into()]).unwrap_err();
    assert!(matches!(err, Error::FrozenInput { .. }));
    assert_eq!(input, before);
}

#[test]
fn test_transform_yaml_specs_with_functions() {
    let mut specs: Vec<TransformSpec> = serde_yaml::from_str(
        r#"
- name: fullName
- country
"#,
    )
    .unwrap();
    specs.push(
        TransformMapping::new()
            .map("languages", |value, _, _, _| {
                Ok(Some(Value::from(value.as_array().map_or(0, <[Value]>::len))))
            })
            .into(),
    );
    let input = record(json!({"name": "Matt", "country": "fr", "languages": ["en", "fr"]}));
    let output = transform(&input, &specs).unwrap();
    assert_eq!(
        output,
        record(json!({"fullName": "Matt", "country": "fr", "languages": 2}))
    );
}

// =============================================================================
// Validation Engine
// =============================================================================

const LANGUAGE_RULES: &str = r#"
all:
  any:
    has:
      language: [fr, de]
  not:
    has:
      language: en
"#;

#[rstest]
#[case(json!({"language": ["en", "de"]}), false)]
#[case(json!({"language": ["en", "fr"]}), false)]
#[case(json!({"language": "en"}), false)]
#[case(json!({"language": ["de", "fr"]}), true)]
#[case(json!({"language": ["fr", "nl"]}), true)]
#[case(json!({"language": ["de", "nl"]}), true)]
#[case(json!({"language": ["de", "fr", "nl"]}), true)]
#[case(json!({"language": "de"}), true)]
#[case(json!({"language": "fr"}), true)]
fn test_language_rules(#[case] input: serde_json::Value, #[case] expected: bool) {
    init_tracing();
    let tree = rules(LANGUAGE_RULES);
    assert_eq!(
        validate(&Value::from(input), &tree, &ValidationOptions::default()),
        expected
    );
}

#[rstest]
#[case(json!({}), true)]
#[case(json!({"example": true}), true)]
#[case(json!("{}"), false)]
#[case(json!({"name": "Example"}), false)]
#[case(json!({"age": 55}), false)]
#[case(json!({"name": "Example", "age": 55}), false)]
fn test_object_without_name_or_age(#[case] input: serde_json::Value, #[case] expected: bool) {
    let tree = rules("all:\n  type: object\n  not:\n    has: [name, age]\n");
    assert_eq!(
        validate(&Value::from(input), &tree, &ValidationOptions::default()),
        expected
    );
}

#[test]
fn test_any_all_symmetry() {
    let input = Value::from(5);
    let options = ValidationOptions::default();
    assert!(validate(&input, &rules("gt: 1\nlt: 1"), &options));
    assert!(!validate(&input, &rules("all:\n  gt: 1\n  lt: 1"), &options));
}

#[rstest]
#[case("gt: 1")]
#[case("eq: '5'")]
#[case("all:\n  gt: 1\n  lt: 1")]
#[case("any:\n  gt: 10\n  lt: 1")]
#[case("has: name")]
#[case("type: string")]
#[case("unknownRule: 1")]
fn test_not_negates_any_tree(#[case] yaml: &str) {
    let options = ValidationOptions::default();
    let negated = format!(
        "not:\n{}",
        yaml.lines().map(|line| format!("  {line}\n")).collect::<String>()
    );
    for input in [Value::from(5), Value::from(json!({"name": "x"})), Value::Null] {
        assert_eq!(
            validate(&input, &rules(&negated), &options),
            !validate(&input, &rules(yaml), &options),
            "not over {yaml:?} with {input:?}"
        );
    }
}

#[test]
fn test_match_with_fallback_data() {
    let tree = rules(
        r#"
match:
  country:
    eq: fr
  age:
    gte: 18
"#,
    );
    let options = ValidationOptions::default()
        .with_match_all(true)
        .with_datum("country", "fr");
    assert!(validate(&Value::from(json!({"age": 35})), &tree, &options));
    assert!(!validate(&Value::from(json!({"age": 35, "country": "de"})), &tree, &options));

    let skipping = ValidationOptions::default()
        .with_match_all(true)
        .with_skip_missing_props(true);
    assert!(validate(&Value::from(json!({"age": 35})), &tree, &skipping));
}

#[test]
fn test_options_from_yaml() {
    let options: ValidationOptions =
        serde_yaml::from_str("matchAll: true\ncaseSensitive: true\n").unwrap();
    let tree = rules("startsWith: Ex\nendsWith: ple");
    assert!(validate(&Value::from("Example"), &tree, &options));
    assert!(!validate(&Value::from("example"), &tree, &options));
}

#[test]
fn test_debug_report() {
    init_tracing();
    let tree = rules(LANGUAGE_RULES);
    let report = validate_report(
        &Value::from(json!({"language": "de"})),
        &tree,
        &ValidationOptions::default().with_debug(true),
    );
    assert!(report.valid);
    let names: Vec<_> = report.outcomes.iter().map(|o| o.rule.as_str()).collect();
    assert_eq!(names, ["has", "any", "has", "not", "all"]);
    assert!(report.outcomes.iter().all(|o| o.depth <= 2));
}
