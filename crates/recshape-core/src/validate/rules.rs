//! Rule tree model
//!
//! A rule tree is either a single predicate function or an ordered list of
//! named rules. Rule documents parse with serde, keeping declaration order:
//!
//! ```yaml
//! all:
//!   type: plainObject
//!   not:
//!     has: [name, age]
//! ```

use std::fmt;
use std::sync::Arc;

use regex::{Regex, RegexBuilder};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use crate::error::{Error, Result};
use crate::ordered::OrderedEntries;
use crate::validate::ValidationOptions;
use crate::value::Value;

/// A caller-supplied rule, called with the input and the active options
#[derive(Clone)]
pub struct RuleFn(Arc<dyn Fn(&Value, &ValidationOptions) -> bool + Send + Sync>);

impl RuleFn {
    /// Wrap a closure
    pub fn new<F>(check: F) -> Self
    where
        F: Fn(&Value, &ValidationOptions) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(check))
    }

    /// Run the rule
    pub fn call(&self, input: &Value, options: &ValidationOptions) -> bool {
        (self.0)(input, options)
    }
}

impl fmt::Debug for RuleFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RuleFn(..)")
    }
}

/// Bounds for the range rules. A missing bound makes every range rule fail.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Range {
    /// Lower bound
    #[serde(default)]
    pub min: Option<Value>,
    /// Upper bound
    #[serde(default)]
    pub max: Option<Value>,
}

impl Range {
    /// Range with both bounds
    pub fn new(min: impl Into<Value>, max: impl Into<Value>) -> Self {
        Self {
            min: Some(min.into()),
            max: Some(max.into()),
        }
    }
}

/// Interval tests over a [`Range`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeKind {
    /// `min < x < max`
    InsideRange,
    /// `min <= x <= max`
    WithinRange,
    /// `min <= x < max`
    WithinRangeMin,
    /// `min < x <= max`
    WithinRangeMax,
    /// `x < min || x > max`
    OutsideRange,
    /// `x <= min || x >= max`
    OuterRange,
    /// `x <= min || x > max`
    OuterRangeMin,
    /// `x < min || x >= max`
    OuterRangeMax,
}

impl RangeKind {
    /// Parse a rule name
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "insideRange" => Self::InsideRange,
            "withinRange" => Self::WithinRange,
            "withinRangeMin" => Self::WithinRangeMin,
            "withinRangeMax" => Self::WithinRangeMax,
            "outsideRange" => Self::OutsideRange,
            "outerRange" => Self::OuterRange,
            "outerRangeMin" => Self::OuterRangeMin,
            "outerRangeMax" => Self::OuterRangeMax,
            _ => return None,
        })
    }

    /// Rule name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InsideRange => "insideRange",
            Self::WithinRange => "withinRange",
            Self::WithinRangeMin => "withinRangeMin",
            Self::WithinRangeMax => "withinRangeMax",
            Self::OutsideRange => "outsideRange",
            Self::OuterRange => "outerRange",
            Self::OuterRangeMin => "outerRangeMin",
            Self::OuterRangeMax => "outerRangeMax",
        }
    }
}

/// Argument of the `re` rule
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Pattern text, compiled per evaluation honoring `caseSensitive`
    Source(String),
    /// Ready-made regex, used exactly as given
    Compiled(Regex),
}

impl Pattern {
    /// Resolve to a regex for the given case handling
    pub fn compile(&self, case_sensitive: bool) -> Result<Regex> {
        match self {
            Self::Source(source) => RegexBuilder::new(source)
                .case_insensitive(!case_sensitive)
                .build()
                .map_err(|e| Error::InvalidPattern {
                    pattern: source.clone(),
                    message: e.to_string(),
                }),
            Self::Compiled(regex) => Ok(regex.clone()),
        }
    }
}

impl From<&str> for Pattern {
    fn from(source: &str) -> Self {
        Self::Source(source.to_string())
    }
}

impl From<Regex> for Pattern {
    fn from(regex: Regex) -> Self {
        Self::Compiled(regex)
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::Source)
    }
}

/// Argument of the `has` rule
#[derive(Debug, Clone, PartialEq)]
pub enum HasRule {
    /// One property path must exist
    Path(String),
    /// Any (or, under `matchAll`, all) of the paths must exist
    AnyOf(Vec<String>),
    /// Properties must hold (any or all of) the listed values
    Values(Vec<(String, Value)>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawHas {
    Path(String),
    AnyOf(Vec<String>),
    Values(OrderedEntries<Value>),
}

impl<'de> Deserialize<'de> for HasRule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Ok(match RawHas::deserialize(deserializer)? {
            RawHas::Path(path) => Self::Path(path),
            RawHas::AnyOf(paths) => Self::AnyOf(paths),
            RawHas::Values(OrderedEntries(values)) => Self::Values(values),
        })
    }
}

/// One named rule
#[derive(Debug, Clone)]
pub enum Rule {
    /// Negate the nested tree
    Not(RuleTree),
    /// Every nested rule must match
    All(RuleTree),
    /// Any nested rule must match
    Any(RuleTree),
    /// Loose equality
    Eq(Value),
    /// Strict equality
    Eqs(Value),
    /// Greater than
    Gt(Value),
    /// Greater than or equal
    Gte(Value),
    /// Less than
    Lt(Value),
    /// Less than or equal
    Lte(Value),
    /// Interval membership
    Range(RangeKind, Range),
    /// Regular expression test
    Re(Pattern),
    /// Text prefix
    StartsWith(Value),
    /// Text suffix
    EndsWith(Value),
    /// Substring, or strict membership for array input
    Contains(Value),
    /// Input holds any of the values
    IncludesAny(Value),
    /// Input holds all of the values
    IncludesAll(Value),
    /// Named type check
    Type(String),
    /// Property existence or property values
    Has(HasRule),
    /// Nested rule trees per property
    Match(Vec<(String, RuleTree)>),
    /// Caller-supplied rule
    Custom {
        /// Rule name
        name: String,
        /// Rule body
        check: RuleFn,
    },
    /// Unrecognized rule name; never matches
    Unknown {
        /// Rule name as written
        name: String,
        /// Argument as written
        argument: Value,
    },
}

impl Rule {
    /// Build a caller-supplied rule
    pub fn custom<F>(name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&Value, &ValidationOptions) -> bool + Send + Sync + 'static,
    {
        Self::Custom {
            name: name.into(),
            check: RuleFn::new(check),
        }
    }

    /// Rule name as it appears in a rule tree
    pub fn name(&self) -> &str {
        match self {
            Self::Not(_) => "not",
            Self::All(_) => "all",
            Self::Any(_) => "any",
            Self::Eq(_) => "eq",
            Self::Eqs(_) => "eqs",
            Self::Gt(_) => "gt",
            Self::Gte(_) => "gte",
            Self::Lt(_) => "lt",
            Self::Lte(_) => "lte",
            Self::Range(kind, _) => kind.as_str(),
            Self::Re(_) => "re",
            Self::StartsWith(_) => "startsWith",
            Self::EndsWith(_) => "endsWith",
            Self::Contains(_) => "contains",
            Self::IncludesAny(_) => "includesAny",
            Self::IncludesAll(_) => "includesAll",
            Self::Type(_) => "type",
            Self::Has(_) => "has",
            Self::Match(_) => "match",
            Self::Custom { name, .. } | Self::Unknown { name, .. } => name.as_str(),
        }
    }
}

/// A predicate function or an ordered set of named rules
#[derive(Debug, Clone)]
pub enum RuleTree {
    /// Whole tree replaced by one function
    Predicate(RuleFn),
    /// Named rules in declaration order
    Rules(Vec<Rule>),
}

impl Default for RuleTree {
    fn default() -> Self {
        Self::Rules(Vec::new())
    }
}

impl RuleTree {
    /// Empty rule set
    pub fn new() -> Self {
        Self::default()
    }

    /// Tree made of a single function
    pub fn predicate<F>(check: F) -> Self
    where
        F: Fn(&Value, &ValidationOptions) -> bool + Send + Sync + 'static,
    {
        Self::Predicate(RuleFn::new(check))
    }

    /// Add a rule. A rule with the same name is replaced in place; a
    /// predicate tree is replaced by a rule set.
    pub fn rule(self, rule: Rule) -> Self {
        let mut rules = match self {
            Self::Rules(rules) => rules,
            Self::Predicate(_) => Vec::new(),
        };
        match rules.iter_mut().find(|existing| existing.name() == rule.name()) {
            Some(existing) => *existing = rule,
            None => rules.push(rule),
        }
        Self::Rules(rules)
    }

    /// Named rules; empty for a predicate tree
    pub fn rules(&self) -> &[Rule] {
        match self {
            Self::Rules(rules) => rules,
            Self::Predicate(_) => &[],
        }
    }
}

impl From<Rule> for RuleTree {
    fn from(rule: Rule) -> Self {
        Self::Rules(vec![rule])
    }
}

impl<'de> Deserialize<'de> for RuleTree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct RulesVisitor;

        impl<'de> Visitor<'de> for RulesVisitor {
            type Value = RuleTree;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of rule names to arguments")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut map: A,
            ) -> std::result::Result<RuleTree, A::Error> {
                let mut tree = RuleTree::new();
                while let Some(name) = map.next_key::<String>()? {
                    let rule = match name.as_str() {
                        "not" => Rule::Not(map.next_value()?),
                        "all" => Rule::All(map.next_value()?),
                        "any" => Rule::Any(map.next_value()?),
                        "eq" => Rule::Eq(map.next_value()?),
                        "eqs" => Rule::Eqs(map.next_value()?),
                        "gt" => Rule::Gt(map.next_value()?),
                        "gte" => Rule::Gte(map.next_value()?),
                        "lt" => Rule::Lt(map.next_value()?),
                        "lte" => Rule::Lte(map.next_value()?),
                        "re" => Rule::Re(map.next_value()?),
                        "startsWith" => Rule::StartsWith(map.next_value()?),
                        "endsWith" => Rule::EndsWith(map.next_value()?),
                        "contains" => Rule::Contains(map.next_value()?),
                        "includesAny" => Rule::IncludesAny(map.next_value()?),
                        "includesAll" => Rule::IncludesAll(map.next_value()?),
                        "type" => Rule::Type(map.next_value()?),
                        "has" => Rule::Has(map.next_value()?),
                        "match" => {
                            let OrderedEntries(props) = map.next_value()?;
                            Rule::Match(props)
                        }
                        _ => match RangeKind::from_name(&name) {
                            Some(kind) => Rule::Range(kind, map.next_value()?),
                            None => Rule::Unknown {
                                name: name.clone(),
                                argument: map.next_value()?,
                            },
                        },
                    };
                    tree = tree.rule(rule);
                }
                Ok(tree)
            }
        }

        deserializer.deserialize_map(RulesVisitor)
    }
}
