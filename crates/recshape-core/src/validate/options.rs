//! Validation options
//!
//! Options are plain data and deserialize from the same camelCase keys the
//! rule documents use:
//!
//! ```yaml
//! matchAll: true
//! caseSensitive: false
//! skipMissingProps: true
//! data:
//!   language: en
//! ```

use serde::{Deserialize, Serialize};

use crate::value::{Record, Value};

/// Options controlling how a rule tree is evaluated
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOptions {
    /// Require every sibling rule to match instead of any one
    #[serde(default)]
    pub match_all: bool,

    /// Invert the result at this level
    #[serde(default)]
    pub negate_match: bool,

    /// Compare text without case folding
    #[serde(default)]
    pub case_sensitive: bool,

    /// Treat properties absent from both the input and `data` as satisfied
    /// in `has` and `match`
    #[serde(default)]
    pub skip_missing_props: bool,

    /// Fallback values for properties absent from the input
    #[serde(default)]
    pub data: Record,

    /// Nesting depth of the current evaluation
    #[serde(default, rename = "_depth")]
    pub depth: usize,

    /// Collect a per-rule trace
    #[serde(default)]
    pub debug: bool,
}

impl ValidationOptions {
    /// Default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `matchAll`
    pub fn with_match_all(mut self, match_all: bool) -> Self {
        self.match_all = match_all;
        self
    }

    /// Set `negateMatch`
    pub fn with_negate_match(mut self, negate_match: bool) -> Self {
        self.negate_match = negate_match;
        self
    }

    /// Set `caseSensitive`
    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Set `skipMissingProps`
    pub fn with_skip_missing_props(mut self, skip_missing_props: bool) -> Self {
        self.skip_missing_props = skip_missing_props;
        self
    }

    /// Replace the fallback data
    pub fn with_data(mut self, data: Record) -> Self {
        self.data = data;
        self
    }

    /// Add one fallback value
    pub fn with_datum(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Set `debug`
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Options for the body of a `not` rule: negation flipped, any-mode
    pub(crate) fn for_not(&self) -> Self {
        Self {
            negate_match: !self.negate_match,
            match_all: false,
            depth: self.depth + 1,
            ..self.clone()
        }
    }

    /// Options for the body of an `all` rule
    pub(crate) fn for_all(&self) -> Self {
        Self {
            negate_match: false,
            match_all: true,
            depth: self.depth + 1,
            ..self.clone()
        }
    }

    /// Options for the body of an `any` rule
    pub(crate) fn for_any(&self) -> Self {
        Self {
            negate_match: false,
            match_all: false,
            depth: self.depth + 1,
            ..self.clone()
        }
    }

    /// Options for one property's rules inside `match`: fresh defaults that
    /// keep the fallback data, text handling and tracing
    pub(crate) fn for_match(&self) -> Self {
        Self {
            case_sensitive: self.case_sensitive,
            data: self.data.clone(),
            depth: self.depth + 1,
            debug: self.debug,
            ..Self::default()
        }
    }
}
