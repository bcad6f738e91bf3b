//! Dynamic record values
//!
//! A [`Record`] is a string-keyed map of [`Value`]s. Values cover the shapes
//! found in loosely typed structured data: scalars, arrays (which may contain
//! holes), nested records, dates, compiled patterns and predicate functions.
//!
//! Structured data is parsed elsewhere; [`Value`] converts from
//! [`serde_json::Value`] and back via [`Value::to_json`].

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// String-keyed mapping of values
pub type Record = BTreeMap<String, Value>;

/// Shared `undefined`, returned where a borrowed value is needed for an
/// absent property.
pub(crate) static UNDEFINED: Value = Value::Undefined;

/// A predicate function stored inside a [`Value`]
#[derive(Clone)]
pub struct Predicate(Arc<dyn Fn(&Value) -> bool + Send + Sync>);

impl Predicate {
    /// Wrap a closure as a predicate value
    pub fn new<F>(check: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(check))
    }

    /// Run the predicate
    pub fn call(&self, value: &Value) -> bool {
        (self.0)(value)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}

/// A dynamically typed value inside a record
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Absent value; also marks holes in sparse arrays
    #[default]
    Undefined,
    /// Explicit null
    Null,
    /// Boolean
    Bool(bool),
    /// Number (always double precision)
    Number(f64),
    /// String
    String(String),
    /// Point in time
    Date(DateTime<Utc>),
    /// Compiled regular expression
    Pattern(Regex),
    /// Ordered sequence
    Array(Vec<Value>),
    /// Nested record
    Record(Record),
    /// Predicate function
    Function(Predicate),
}

impl Value {
    /// Short name of the value's kind, used in logs and errors
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Date(_) => "date",
            Self::Pattern(_) => "pattern",
            Self::Array(_) => "array",
            Self::Record(_) => "record",
            Self::Function(_) => "function",
        }
    }

    /// `true` for [`Value::Undefined`]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// `true` for null or undefined
    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Undefined | Self::Null)
    }

    /// `true` for values that can carry properties: records, arrays and functions
    pub fn is_object_like(&self) -> bool {
        matches!(self, Self::Record(_) | Self::Array(_) | Self::Function(_))
    }

    /// Truthiness: nil, `false`, `0`, `NaN` and `""` are falsy, everything else is truthy
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Undefined | Self::Null => false,
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::String(s) => !s.is_empty(),
            _ => true,
        }
    }

    /// Emptiness: nil, `""` and `[]`
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Undefined | Self::Null => true,
            Self::String(s) => s.is_empty(),
            Self::Array(items) => items.is_empty(),
            _ => false,
        }
    }

    /// Borrow as a record
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Take the inner record
    pub fn into_record(self) -> Option<Record> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Borrow as an array
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Borrow as a string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Number payload, if any
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric coercion. Values with no numeric reading become `NaN`.
    pub fn to_number(&self) -> f64 {
        match self {
            Self::Null => 0.0,
            Self::Bool(b) => f64::from(u8::from(*b)),
            Self::Number(n) => *n,
            Self::String(s) => parse_number(s),
            Self::Date(date) => date.timestamp_millis() as f64,
            _ => f64::NAN,
        }
    }

    /// String coercion, as used by the text rules
    pub fn to_text(&self) -> String {
        match self {
            Self::Undefined => "undefined".to_string(),
            Self::Null => "null".to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => number_text(*n),
            Self::String(s) => s.clone(),
            Self::Date(date) => date.to_rfc3339(),
            Self::Pattern(re) => format!("/{}/", re.as_str()),
            Self::Array(items) => items
                .iter()
                .map(|item| if item.is_nil() { String::new() } else { item.to_text() })
                .collect::<Vec<_>>()
                .join(","),
            Self::Record(_) => "[object Object]".to_string(),
            Self::Function(_) => "function".to_string(),
        }
    }

    /// Loose equality: nil equals nil, and numbers, numeric strings, booleans
    /// and dates compare by numeric value. Otherwise falls back to strict
    /// equality.
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Self::Undefined | Self::Null, Self::Undefined | Self::Null) => true,
            (Self::Undefined | Self::Null, _) | (_, Self::Undefined | Self::Null) => false,
            (Self::Number(_), Self::String(_))
            | (Self::String(_), Self::Number(_))
            | (Self::Date(_), Self::Number(_))
            | (Self::Number(_), Self::Date(_))
            | (Self::Bool(_), _)
            | (_, Self::Bool(_)) => self.to_number() == other.to_number(),
            _ => self == other,
        }
    }

    /// Relational ordering: two strings compare lexicographically, anything
    /// else compares numerically. `None` when either side has no numeric reading.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Self::String(a), Self::String(b)) => Some(a.cmp(b)),
            _ => self.to_number().partial_cmp(&other.to_number()),
        }
    }

    /// Convert into a JSON value.
    ///
    /// Array holes become `null` and undefined record entries are dropped.
    /// Dates serialize as RFC 3339 strings and patterns as their source text.
    /// Non-finite numbers become `null`.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(match self {
            Self::Undefined | Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Number(n) => number_json(*n),
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::Date(date) => serde_json::Value::String(date.to_rfc3339()),
            Self::Pattern(re) => serde_json::Value::String(re.as_str().to_string()),
            Self::Array(items) => serde_json::Value::Array(
                items
                    .iter()
                    .map(Value::to_json)
                    .collect::<Result<Vec<_>>>()?,
            ),
            Self::Record(record) => {
                let mut map = serde_json::Map::new();
                for (key, value) in record {
                    if !value.is_undefined() {
                        map.insert(key.clone(), value.to_json()?);
                    }
                }
                serde_json::Value::Object(map)
            }
            Self::Function(_) => {
                return Err(Error::NotRepresentable { kind: "function" });
            }
        })
    }
}

fn parse_number(text: &str) -> f64 {
    match text.trim() {
        "" => 0.0,
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        trimmed
            if trimmed
                .chars()
                .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-')) =>
        {
            trimmed.parse().unwrap_or(f64::NAN)
        }
        _ => f64::NAN,
    }
}

fn number_text(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let text = if n > 0.0 { "Infinity" } else { "-Infinity" };
        text.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else {
        n.to_string()
    }
}

fn number_json(n: f64) -> serde_json::Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        serde_json::Value::Number((n as i64).into())
    } else {
        serde_json::Number::from_f64(n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null)
    }
}

/// Structural equality. Numbers follow IEEE rules (`NaN` is never equal),
/// patterns compare by source and functions by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Undefined, Self::Undefined) | (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Date(a), Self::Date(b)) => a == b,
            (Self::Pattern(a), Self::Pattern(b)) => a.as_str() == b.as_str(),
            (Self::Array(a), Self::Array(b)) => a == b,
            (Self::Record(a), Self::Record(b)) => a == b,
            (Self::Function(a), Self::Function(b)) => Arc::ptr_eq(&a.0, &b.0),
            _ => false,
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Self::Record(
                map.into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Self::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(date: DateTime<Utc>) -> Self {
        Self::Date(date)
    }
}

impl From<Regex> for Value {
    fn from(re: Regex) -> Self {
        Self::Pattern(re)
    }
}

impl From<Predicate> for Value {
    fn from(predicate: Predicate) -> Self {
        Self::Function(predicate)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::Array(items)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Self::Record(record)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}
