//! Leaf rules: comparisons, ranges and text tests

use std::cmp::Ordering;

use crate::validate::ValidationOptions;
use crate::validate::rules::{Pattern, Range, RangeKind};
use crate::value::Value;

pub(crate) fn compare(input: &Value, argument: &Value, accept: fn(Ordering) -> bool) -> bool {
    if input.is_undefined() || argument.is_undefined() {
        return false;
    }
    input.compare(argument).is_some_and(accept)
}

pub(crate) fn in_range(kind: RangeKind, input: &Value, range: &Range) -> bool {
    let (Some(min), Some(max)) = (&range.min, &range.max) else {
        return false;
    };
    if input.is_undefined() {
        return false;
    }
    let (Some(low), Some(high)) = (input.compare(min), input.compare(max)) else {
        return false;
    };

    use Ordering::{Equal, Greater, Less};
    match kind {
        RangeKind::InsideRange => low == Greater && high == Less,
        RangeKind::WithinRange => low != Less && high != Greater,
        RangeKind::WithinRangeMin => low != Less && high == Less,
        RangeKind::WithinRangeMax => low == Greater && high != Greater,
        RangeKind::OutsideRange => low == Less || high == Greater,
        RangeKind::OuterRange => low != Greater || high != Less,
        RangeKind::OuterRangeMin => low != Greater || high == Greater,
        RangeKind::OuterRangeMax => low == Less || matches!(high, Greater | Equal),
    }
}

pub(crate) fn matches_pattern(input: &Value, pattern: &Pattern, options: &ValidationOptions) -> bool {
    if input.is_nil() {
        return false;
    }
    match pattern.compile(options.case_sensitive) {
        Ok(regex) => regex.is_match(&input.to_text()),
        Err(err) => {
            tracing::warn!(error = %err, "skipping rule with invalid pattern");
            false
        }
    }
}

/// Haystack and needle as text, folded unless case sensitive
fn text_pair(input: &Value, argument: &Value, options: &ValidationOptions) -> Option<(String, String)> {
    if input.is_nil() || argument.is_undefined() {
        return None;
    }
    let (haystack, needle) = (input.to_text(), argument.to_text());
    if options.case_sensitive {
        Some((haystack, needle))
    } else {
        Some((haystack.to_lowercase(), needle.to_lowercase()))
    }
}

pub(crate) fn starts_with(input: &Value, argument: &Value, options: &ValidationOptions) -> bool {
    text_pair(input, argument, options).is_some_and(|(haystack, needle)| haystack.starts_with(&needle))
}

pub(crate) fn ends_with(input: &Value, argument: &Value, options: &ValidationOptions) -> bool {
    text_pair(input, argument, options).is_some_and(|(haystack, needle)| haystack.ends_with(&needle))
}

pub(crate) fn contains(input: &Value, argument: &Value, options: &ValidationOptions) -> bool {
    if let Value::Array(items) = input {
        return items.contains(argument);
    }
    text_pair(input, argument, options).is_some_and(|(haystack, needle)| haystack.contains(&needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;
    use rstest::rstest;
    use serde_json::json;

    fn insensitive() -> ValidationOptions {
        ValidationOptions::default()
    }

    fn sensitive() -> ValidationOptions {
        ValidationOptions::default().with_case_sensitive(true)
    }

    #[rstest]
    #[case(RangeKind::InsideRange, [false, false, true, false, false])]
    #[case(RangeKind::WithinRange, [false, true, true, true, false])]
    #[case(RangeKind::WithinRangeMin, [false, true, true, false, false])]
    #[case(RangeKind::WithinRangeMax, [false, false, true, true, false])]
    #[case(RangeKind::OutsideRange, [true, false, false, false, true])]
    #[case(RangeKind::OuterRange, [true, true, false, true, true])]
    #[case(RangeKind::OuterRangeMin, [true, true, false, false, true])]
    #[case(RangeKind::OuterRangeMax, [true, false, false, true, true])]
    fn test_range_kinds(#[case] kind: RangeKind, #[case] expected: [bool; 5]) {
        let range = Range::new(1, 5);
        let inputs = [0, 1, 3, 5, 6];
        for (input, expected) in inputs.into_iter().zip(expected) {
            assert_eq!(
                in_range(kind, &Value::from(input), &range),
                expected,
                "{} with input {input}",
                kind.as_str()
            );
        }
    }

    #[test]
    fn test_range_needs_both_bounds() {
        let range = Range {
            min: Some(Value::from(1)),
            max: None,
        };
        assert!(!in_range(RangeKind::OutsideRange, &Value::from(10), &range));
        assert!(!in_range(RangeKind::WithinRange, &Value::Undefined, &Range::new(1, 5)));
    }

    #[test]
    fn test_compare() {
        assert!(compare(&Value::from(2), &Value::from(1), Ordering::is_gt));
        assert!(compare(&Value::from("b"), &Value::from("a"), Ordering::is_gt));
        assert!(compare(&Value::from("10"), &Value::from(9), Ordering::is_gt));
        assert!(!compare(&Value::from("abc"), &Value::from(1), Ordering::is_lt));
        assert!(!compare(&Value::Undefined, &Value::from(1), Ordering::is_le));
    }

    #[test]
    fn test_pattern() {
        let input = Value::from("Hello World");
        assert!(matches_pattern(&input, &Pattern::from("^hello"), &insensitive()));
        assert!(!matches_pattern(&input, &Pattern::from("^hello"), &sensitive()));
        assert!(matches_pattern(&Value::from(1234), &Pattern::from(r"^\d+$"), &sensitive()));
        assert!(!matches_pattern(&Value::Null, &Pattern::from("null"), &insensitive()));

        let compiled = Pattern::from(Regex::new("^hello").unwrap());
        assert!(!matches_pattern(&input, &compiled, &insensitive()));
    }

    #[test]
    fn test_invalid_pattern_never_matches() {
        assert!(!matches_pattern(&Value::from("("), &Pattern::from("("), &insensitive()));
    }

    #[test]
    fn test_starts_and_ends_with() {
        let input = Value::from("Example");
        assert!(starts_with(&input, &Value::from("ex"), &insensitive()));
        assert!(!starts_with(&input, &Value::from("ex"), &sensitive()));
        assert!(ends_with(&input, &Value::from("PLE"), &insensitive()));
        assert!(ends_with(&Value::from(12345), &Value::from(45), &sensitive()));
        assert!(!ends_with(&Value::Undefined, &Value::from(""), &insensitive()));
    }

    #[test]
    fn test_contains() {
        let text = Value::from("The Quick Fox");
        assert!(contains(&text, &Value::from("quick"), &insensitive()));
        assert!(!contains(&text, &Value::from("quick"), &sensitive()));
        assert!(contains(&text, &Value::from("Quick"), &sensitive()));

        let list = Value::from(json!(["en", "fr"]));
        assert!(contains(&list, &Value::from("fr"), &insensitive()));
        assert!(!contains(&list, &Value::from("FR"), &insensitive()));
        assert!(!contains(&Value::Null, &Value::from("null"), &insensitive()));
    }
}
