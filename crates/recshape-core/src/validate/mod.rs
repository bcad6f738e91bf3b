//! Validation engine
//!
//! Evaluates an input value against a [`RuleTree`]. Sibling rules are
//! combined in any-mode by default (first match wins) or all-mode under
//! `matchAll` (first miss loses). The logical rules `not`, `all` and `any`
//! recurse into a nested tree with adjusted options:
//!
//! | rule  | negateMatch | matchAll |
//! |-------|-------------|----------|
//! | `not` | flipped     | false    |
//! | `all` | false       | true     |
//! | `any` | false       | false    |
//!
//! `not` flips `negateMatch` on every entry and each level negates its own
//! result, so `{not: {not: R}}` is the negation of `R`, not `R` itself.
//!
//! Evaluation never fails. Unknown rule names and invalid patterns simply
//! do not match.

mod leaf;
mod options;
mod props;
mod rules;

use std::cmp::Ordering;

use serde::Serialize;

use crate::predicates::{all_in_array, any_in_array, cast_slice, check_type};
use crate::value::Value;

pub use options::ValidationOptions;
pub use rules::{HasRule, Pattern, Range, RangeKind, Rule, RuleFn, RuleTree};

/// One evaluated rule, recorded when `debug` is on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleOutcome {
    /// Rule name (`fn` for a predicate tree)
    pub rule: String,
    /// Nesting depth the rule ran at
    pub depth: usize,
    /// Whether the rule matched, before negation
    pub matched: bool,
    /// Matches at this level so far, this rule included
    pub matched_so_far: usize,
    /// Rules at this level
    pub total: usize,
}

/// Result of [`validate_report`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Final result
    pub valid: bool,
    /// Evaluated rules in order; empty unless `debug` is on
    pub outcomes: Vec<RuleOutcome>,
}

#[derive(Debug, Default)]
pub(crate) struct Trace {
    outcomes: Vec<RuleOutcome>,
}

impl Trace {
    fn record(
        &mut self,
        options: &ValidationOptions,
        rule: &str,
        matched: bool,
        matched_so_far: usize,
        total: usize,
    ) {
        if !options.debug {
            return;
        }
        tracing::debug!(
            rule,
            depth = options.depth,
            matched,
            matched_so_far,
            total,
            "rule evaluated"
        );
        self.outcomes.push(RuleOutcome {
            rule: rule.to_string(),
            depth: options.depth,
            matched,
            matched_so_far,
            total,
        });
    }
}

/// Validate `input` against `rules`.
///
/// # Example
///
/// ```rust,ignore
/// let rules: RuleTree = serde_yaml::from_str("has: [name, age]")?;
/// let valid = validate(&input, &rules, &ValidationOptions::default());
/// ```
pub fn validate(input: &Value, rules: &RuleTree, options: &ValidationOptions) -> bool {
    evaluate(input, rules, options, &mut Trace::default())
}

/// Validate and return the per-rule trace alongside the result.
///
/// The trace is only collected when `options.debug` is set.
pub fn validate_report(
    input: &Value,
    rules: &RuleTree,
    options: &ValidationOptions,
) -> ValidationReport {
    let mut trace = Trace::default();
    let valid = evaluate(input, rules, options, &mut trace);
    ValidationReport {
        valid,
        outcomes: trace.outcomes,
    }
}

pub(crate) fn evaluate(
    input: &Value,
    rules: &RuleTree,
    options: &ValidationOptions,
    trace: &mut Trace,
) -> bool {
    let matched = match rules {
        RuleTree::Predicate(check) => {
            let matched = check.call(input, options);
            trace.record(options, "fn", matched, usize::from(matched), 1);
            matched
        }
        RuleTree::Rules(rules) => evaluate_rules(input, rules, options, trace),
    };
    matched != options.negate_match
}

fn evaluate_rules(
    input: &Value,
    rules: &[Rule],
    options: &ValidationOptions,
    trace: &mut Trace,
) -> bool {
    let total = rules.len();
    let mut matched_count = 0;

    for rule in rules {
        let matched = evaluate_rule(input, rule, options, trace);
        if matched {
            matched_count += 1;
        }
        trace.record(options, rule.name(), matched, matched_count, total);

        match (options.match_all, matched) {
            (false, true) => return true,
            (true, false) => return false,
            _ => {}
        }
    }

    options.match_all && total > 0 && matched_count == total
}

fn evaluate_rule(input: &Value, rule: &Rule, options: &ValidationOptions, trace: &mut Trace) -> bool {
    match rule {
        Rule::Not(tree) => evaluate(input, tree, &options.for_not(), trace),
        Rule::All(tree) => evaluate(input, tree, &options.for_all(), trace),
        Rule::Any(tree) => evaluate(input, tree, &options.for_any(), trace),
        Rule::Eq(expected) => input.loose_eq(expected),
        Rule::Eqs(expected) => input == expected,
        Rule::Gt(bound) => leaf::compare(input, bound, Ordering::is_gt),
        Rule::Gte(bound) => leaf::compare(input, bound, Ordering::is_ge),
        Rule::Lt(bound) => leaf::compare(input, bound, Ordering::is_lt),
        Rule::Lte(bound) => leaf::compare(input, bound, Ordering::is_le),
        Rule::Range(kind, range) => leaf::in_range(*kind, input, range),
        Rule::Re(pattern) => leaf::matches_pattern(input, pattern, options),
        Rule::StartsWith(prefix) => leaf::starts_with(input, prefix, options),
        Rule::EndsWith(suffix) => leaf::ends_with(input, suffix, options),
        Rule::Contains(needle) => leaf::contains(input, needle, options),
        Rule::IncludesAny(values) => any_in_array(cast_slice(input), cast_slice(values)),
        Rule::IncludesAll(values) => all_in_array(cast_slice(input), cast_slice(values)),
        Rule::Type(name) => check_type(name, input),
        Rule::Has(rule) => props::has_rule(input, rule, options),
        Rule::Match(fields) => props::match_rule(input, fields, options, trace),
        Rule::Custom { check, .. } => check.call(input, options),
        Rule::Unknown { name, .. } => {
            tracing::debug!(rule = %name, "unknown rule never matches");
            false
        }
    }
}
