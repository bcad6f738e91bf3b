//! Property rules: `has` and `match`

use crate::path::{get, has};
use crate::predicates::{all_in_array, any_in_array, cast_slice};
use crate::validate::rules::{HasRule, RuleTree};
use crate::validate::{Trace, ValidationOptions, evaluate};
use crate::value::{UNDEFINED, Value};

/// Fold per-item results: any one in any-mode, every one (and at least one)
/// in all-mode. Stops as soon as the outcome is known.
pub(crate) fn combine(match_all: bool, results: impl IntoIterator<Item = bool>) -> bool {
    if !match_all {
        return results.into_iter().any(|matched| matched);
    }
    let mut total = 0usize;
    for matched in results {
        if !matched {
            return false;
        }
        total += 1;
    }
    total > 0
}

/// Property absent from both the input and the fallback data while
/// `skipMissingProps` is on
fn is_skipped(input: &Value, prop: &str, options: &ValidationOptions) -> bool {
    options.skip_missing_props && !has(input, prop) && !has(&options.data, prop)
}

/// Property value from the input, else from the fallback data
fn resolve_prop<'a>(input: &'a Value, prop: &str, options: &'a ValidationOptions) -> &'a Value {
    if matches!(input, Value::Array(_)) || has(input, prop) {
        get(input, prop).unwrap_or(&UNDEFINED)
    } else {
        get(&options.data, prop).unwrap_or(&UNDEFINED)
    }
}

pub(crate) fn has_rule(input: &Value, rule: &HasRule, options: &ValidationOptions) -> bool {
    match rule {
        HasRule::Path(prop) => has(input, prop.as_str()),
        HasRule::AnyOf(props) => combine(
            options.match_all,
            props.iter().map(|prop| {
                is_skipped(input, prop, options) || has(input, prop.as_str())
            }),
        ),
        HasRule::Values(expected) => combine(
            options.match_all,
            expected.iter().map(|(prop, values)| {
                if is_skipped(input, prop, options) {
                    return true;
                }
                let actual = cast_slice(resolve_prop(input, prop, options));
                let wanted = cast_slice(values);
                if options.match_all {
                    all_in_array(actual, wanted)
                } else {
                    any_in_array(actual, wanted)
                }
            }),
        ),
    }
}

pub(crate) fn match_rule(
    input: &Value,
    props: &[(String, RuleTree)],
    options: &ValidationOptions,
    trace: &mut Trace,
) -> bool {
    let child = options.for_match();
    combine(
        options.match_all,
        props.iter().map(|(prop, rules)| {
            if is_skipped(input, prop, options) {
                return true;
            }
            evaluate(resolve_prop(input, prop, options), rules, &child, trace)
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn values(pairs: &[(&str, serde_json::Value)]) -> HasRule {
        HasRule::Values(
            pairs
                .iter()
                .map(|(prop, value)| (prop.to_string(), Value::from(value.clone())))
                .collect(),
        )
    }

    #[test]
    fn test_combine() {
        assert!(combine(false, [false, true]));
        assert!(!combine(false, []));
        assert!(!combine(true, [true, false]));
        assert!(combine(true, [true, true]));
        assert!(!combine(true, []));
    }

    #[test]
    fn test_has_single_path() {
        let input = Value::from(json!({"a": {"b": [1]}}));
        let options = ValidationOptions::default();
        assert!(has_rule(&input, &HasRule::Path("a.b[0]".into()), &options));
        assert!(!has_rule(&input, &HasRule::Path("a.c".into()), &options));
        assert!(!has_rule(&input, &HasRule::Path(String::new()), &options));
    }

    #[test]
    fn test_has_any_or_all_paths() {
        let input = Value::from(json!({"name": "Example"}));
        let rule = HasRule::AnyOf(vec!["name".into(), "age".into()]);
        assert!(has_rule(&input, &rule, &ValidationOptions::default()));
        assert!(!has_rule(&input, &rule, &ValidationOptions::default().with_match_all(true)));

    }

    #[test]
    fn test_has_paths_ignore_fallback_data() {
        let options = ValidationOptions::default().with_datum("name", "x");
        let path = HasRule::Path("name".into());
        assert!(!has_rule(&Value::from(json!({})), &path, &options));

        let rule = HasRule::AnyOf(vec!["name".into(), "age".into()]);
        let with_data = ValidationOptions::default()
            .with_match_all(true)
            .with_datum("age", 1);
        assert!(!has_rule(&Value::from(json!({"name": 1})), &rule, &with_data));
    }

    #[test]
    fn test_has_skips_missing_props() {
        let input = Value::from(json!({"name": "Example"}));
        let rule = HasRule::AnyOf(vec!["name".into(), "age".into()]);
        let options = ValidationOptions::default()
            .with_match_all(true)
            .with_skip_missing_props(true);
        assert!(has_rule(&input, &rule, &options));
    }

    #[rstest]
    #[case(json!({}), false, true)]
    #[case(json!({}), true, true)]
    #[case(json!({"name": "Example"}), false, true)]
    #[case(json!({"name": "Example"}), true, true)]
    fn test_has_paths_skip_missing(
        #[case] input: serde_json::Value,
        #[case] match_all: bool,
        #[case] expected: bool,
    ) {
        let rule = HasRule::AnyOf(vec!["name".into(), "age".into()]);
        let options = ValidationOptions::default()
            .with_match_all(match_all)
            .with_skip_missing_props(true);
        assert_eq!(has_rule(&Value::from(input), &rule, &options), expected);
    }

    #[rstest]
    #[case(json!({}), false, None, true)]
    #[case(json!({}), true, None, true)]
    #[case(json!({"language": "fr"}), false, None, false)]
    #[case(json!({"language": "fr"}), true, None, false)]
    #[case(json!({}), false, Some("fr"), false)]
    #[case(json!({}), true, Some("en"), true)]
    fn test_has_values_skip_missing(
        #[case] input: serde_json::Value,
        #[case] match_all: bool,
        #[case] datum: Option<&str>,
        #[case] expected: bool,
    ) {
        let rule = values(&[("language", json!("en"))]);
        let mut options = ValidationOptions::default()
            .with_match_all(match_all)
            .with_skip_missing_props(true);
        if let Some(language) = datum {
            options = options.with_datum("language", language);
        }
        assert_eq!(has_rule(&Value::from(input), &rule, &options), expected);
    }

    #[rstest]
    #[case(json!({"language": ["fr", "de", "nl"], "country": "fr"}), true, true)]
    #[case(json!({"language": ["fr", "de"], "country": "de"}), true, false)]
    #[case(json!({"language": ["fr"], "country": "fr"}), true, false)]
    #[case(json!({"language": ["fr", "de"], "country": "de"}), false, true)]
    #[case(json!({"language": ["nl"], "country": "de"}), false, false)]
    fn test_has_values_across_props(
        #[case] input: serde_json::Value,
        #[case] match_all: bool,
        #[case] expected: bool,
    ) {
        let rule = values(&[
            ("language", json!(["fr", "de"])),
            ("country", json!("fr")),
        ]);
        let options = ValidationOptions::default().with_match_all(match_all);
        assert_eq!(has_rule(&Value::from(input), &rule, &options), expected);
    }

    #[rstest]
    #[case(false)]
    #[case(true)]
    fn test_match_with_every_prop_skipped(#[case] match_all: bool) {
        let props: Vec<(String, RuleTree)> = vec![
            ("age".into(), serde_yaml::from_str("gte: 18").unwrap()),
            ("name".into(), serde_yaml::from_str("type: string").unwrap()),
        ];
        let options = ValidationOptions::default()
            .with_match_all(match_all)
            .with_skip_missing_props(true);
        assert!(match_rule(&Value::from(json!({})), &props, &options, &mut Trace::default()));

        let strict = ValidationOptions::default().with_match_all(match_all);
        assert!(!match_rule(&Value::from(json!({})), &props, &strict, &mut Trace::default()));
    }

    #[test]
    fn test_has_values() {
        let rule = values(&[("language", json!(["fr", "de"]))]);
        let options = ValidationOptions::default();
        assert!(has_rule(&Value::from(json!({"language": ["de", "nl"]})), &rule, &options));
        assert!(has_rule(&Value::from(json!({"language": "fr"})), &rule, &options));
        assert!(!has_rule(&Value::from(json!({"language": "en"})), &rule, &options));

        let all = options.clone().with_match_all(true);
        assert!(has_rule(&Value::from(json!({"language": ["de", "fr", "nl"]})), &rule, &all));
        assert!(!has_rule(&Value::from(json!({"language": ["de"]})), &rule, &all));
    }

    #[test]
    fn test_has_values_falls_back_to_data() {
        let rule = values(&[("language", json!("en"))]);
        let options = ValidationOptions::default().with_datum("language", "en");
        assert!(has_rule(&Value::from(json!({})), &rule, &options));
        assert!(!has_rule(&Value::from(json!({"language": "fr"})), &rule, &options));
    }

    #[test]
    fn test_match_resolves_each_prop() {
        let input = Value::from(json!({"age": 35, "name": "Example"}));
        let props: Vec<(String, RuleTree)> = vec![
            ("age".into(), serde_yaml::from_str("gte: 18").unwrap()),
            ("name".into(), serde_yaml::from_str("type: number").unwrap()),
        ];
        let any = ValidationOptions::default();
        let all = ValidationOptions::default().with_match_all(true);
        assert!(match_rule(&input, &props, &any, &mut Trace::default()));
        assert!(!match_rule(&input, &props, &all, &mut Trace::default()));
    }

    #[test]
    fn test_match_ignores_outer_negation() {
        let input = Value::from(json!({"age": 35}));
        let props: Vec<(String, RuleTree)> =
            vec![("age".into(), serde_yaml::from_str("gte: 18").unwrap())];
        let negated = ValidationOptions::default().with_negate_match(true);
        assert!(match_rule(&input, &props, &negated, &mut Trace::default()));
    }
}
