//! Predicate library
//!
//! Type checks addressed by name from the `type` validation rule, plus the
//! array membership helpers shared by the `has` and `includes*` rules.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::value::Value;

/// Named type checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeName {
    /// `bool` / `boolean`
    Bool,
    /// `string`
    String,
    /// `number`, including `NaN` and infinities
    Number,
    /// `integer`: finite whole number
    Integer,
    /// `float`: finite number with a fractional part
    Float,
    /// `array`
    Array,
    /// `arrayLike`: arrays and strings
    ArrayLike,
    /// `object`: anything that is not a primitive
    Object,
    /// `objectLike`: non-primitive, non-function
    ObjectLike,
    /// `plainObject`: a record
    PlainObject,
    /// `function`
    Function,
    /// `regExp`
    RegExp,
    /// `date`
    Date,
    /// `null`
    Null,
    /// `undefined`
    Undefined,
    /// `nan`
    NaN,
    /// `nil`: null or undefined
    Nil,
    /// `truthy`
    Truthy,
    /// `falsy`
    Falsy,
}

impl TypeName {
    /// Apply the check
    pub fn check(self, value: &Value) -> bool {
        match self {
            Self::Bool => matches!(value, Value::Bool(_)),
            Self::String => matches!(value, Value::String(_)),
            Self::Number => matches!(value, Value::Number(_)),
            Self::Integer => value
                .as_f64()
                .is_some_and(|n| n.is_finite() && n.fract() == 0.0),
            Self::Float => is_float(value),
            Self::Array => matches!(value, Value::Array(_)),
            Self::ArrayLike => matches!(value, Value::Array(_) | Value::String(_)),
            Self::Object => matches!(
                value,
                Value::Record(_)
                    | Value::Array(_)
                    | Value::Date(_)
                    | Value::Pattern(_)
                    | Value::Function(_)
            ),
            Self::ObjectLike => matches!(
                value,
                Value::Record(_) | Value::Array(_) | Value::Date(_) | Value::Pattern(_)
            ),
            Self::PlainObject => matches!(value, Value::Record(_)),
            Self::Function => matches!(value, Value::Function(_)),
            Self::RegExp => matches!(value, Value::Pattern(_)),
            Self::Date => matches!(value, Value::Date(_)),
            Self::Null => matches!(value, Value::Null),
            Self::Undefined => value.is_undefined(),
            Self::NaN => value.as_f64().is_some_and(f64::is_nan),
            Self::Nil => value.is_nil(),
            Self::Truthy => value.is_truthy(),
            Self::Falsy => !value.is_truthy(),
        }
    }

    /// Catalog name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "boolean",
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Array => "array",
            Self::ArrayLike => "arrayLike",
            Self::Object => "object",
            Self::ObjectLike => "objectLike",
            Self::PlainObject => "plainObject",
            Self::Function => "function",
            Self::RegExp => "regExp",
            Self::Date => "date",
            Self::Null => "null",
            Self::Undefined => "undefined",
            Self::NaN => "nan",
            Self::Nil => "nil",
            Self::Truthy => "truthy",
            Self::Falsy => "falsy",
        }
    }
}

impl FromStr for TypeName {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Ok(match name {
            "bool" | "boolean" => Self::Bool,
            "string" => Self::String,
            "number" => Self::Number,
            "integer" => Self::Integer,
            "float" => Self::Float,
            "array" => Self::Array,
            "arrayLike" => Self::ArrayLike,
            "object" => Self::Object,
            "objectLike" => Self::ObjectLike,
            "plainObject" => Self::PlainObject,
            "function" => Self::Function,
            "regExp" => Self::RegExp,
            "date" => Self::Date,
            "null" => Self::Null,
            "undefined" => Self::Undefined,
            "nan" => Self::NaN,
            "nil" => Self::Nil,
            "truthy" => Self::Truthy,
            "falsy" => Self::Falsy,
            other => {
                return Err(Error::UnknownType {
                    name: other.to_string(),
                });
            }
        })
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Look up `name` in the catalog and apply it. Unknown names never match.
pub fn check_type(name: &str, value: &Value) -> bool {
    name.parse::<TypeName>()
        .is_ok_and(|type_name| type_name.check(value))
}

/// Finite number with a fractional part
pub fn is_float(value: &Value) -> bool {
    value
        .as_f64()
        .is_some_and(|n| n.is_finite() && n.fract() != 0.0)
}

/// View a value as a slice: arrays as their items, anything else as itself
pub fn cast_slice(value: &Value) -> &[Value] {
    match value {
        Value::Array(items) => items,
        other => std::slice::from_ref(other),
    }
}

/// Whether any of `values` appears in `haystack` (strict equality).
/// No values never match.
pub fn any_in_array(haystack: &[Value], values: &[Value]) -> bool {
    values.iter().any(|value| haystack.contains(value))
}

/// Whether every one of `values` appears in `haystack` (strict equality).
/// No values never match.
pub fn all_in_array(haystack: &[Value], values: &[Value]) -> bool {
    !values.is_empty() && values.iter().all(|value| haystack.contains(value))
}
