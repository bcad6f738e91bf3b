//! Transform engine
//!
//! Builds an output record from an input record by applying a sequence of
//! transform specs in order. Each spec writes into one shared output, so a
//! later spec sees what earlier specs produced.
//!
//! # Spec forms
//!
//! - a property name copies that property verbatim
//! - a [`TransformMapping`] maps each declared input property to a rename
//!   target, a function or a nested set of specs
//! - a sequence applies its members in turn
//!
//! # Example
//!
//! ```yaml
//! - name
//! - age: ageInYears
//!   petPreferences:
//!     cat: cats
//!     dog: dogs
//! ```
//!
//! Functions cannot be written in YAML; attach them with
//! [`TransformMapping::map`].

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use serde::{Deserialize, Deserializer};

use crate::error::{Error, Result};
use crate::ordered::OrderedEntries;
use crate::path::{Resolve, Segment, get, set};
use crate::value::{Record, UNDEFINED, Value};

/// Caller-supplied transform function.
///
/// Called as `(value, prop, input, output)`. `value` is the resolved value of
/// `prop` ([`Value::Undefined`] when absent), `input` is a read-only view of
/// the original input and `output` is the live accumulator.
///
/// Returning a record merges it into the output. Any other value is written
/// at `prop`. `None` (or an undefined value) writes nothing; the function may
/// have written to `output` itself.
pub type TransformFn = Arc<
    dyn Fn(&Value, &str, &FrozenRecord<'_>, &mut Record) -> Result<Option<Value>> + Send + Sync,
>;

/// Read-only view of the input handed to transform functions
#[derive(Debug, Clone, Copy)]
pub struct FrozenRecord<'a> {
    inner: &'a Record,
}

impl<'a> FrozenRecord<'a> {
    /// Freeze a record for the duration of a transform
    pub fn new(inner: &'a Record) -> Self {
        Self { inner }
    }

    /// The underlying record
    pub fn record(&self) -> &'a Record {
        self.inner
    }

    /// Writes are always rejected
    pub fn try_insert(&self, key: impl Into<String>, _value: Value) -> Result<()> {
        Err(Error::FrozenInput { key: key.into() })
    }

    /// Removals are always rejected
    pub fn try_remove(&self, key: &str) -> Result<Value> {
        Err(Error::FrozenInput {
            key: key.to_string(),
        })
    }
}

impl Deref for FrozenRecord<'_> {
    type Target = Record;

    fn deref(&self) -> &Record {
        self.inner
    }
}

impl Resolve for FrozenRecord<'_> {
    fn lookup(&self, segment: &Segment) -> Option<&Value> {
        self.inner.lookup(segment)
    }

    fn lookup_mut(&mut self, _segment: &Segment) -> Option<&mut Value> {
        None
    }

    fn assign(&mut self, segment: &Segment, _value: Value) -> bool {
        tracing::warn!(key = %segment.as_key(), "rejected write to frozen input");
        false
    }
}

/// What a mapping entry does with its input property
#[derive(Clone)]
pub enum MappingTarget {
    /// Write the value under another name (or path)
    Rename(String),
    /// Derive output from the value with a function
    Func(TransformFn),
    /// Transform a nested record with its own specs
    Nested(Vec<TransformSpec>),
}

impl fmt::Debug for MappingTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rename(to) => f.debug_tuple("Rename").field(to).finish(),
            Self::Func(_) => f.write_str("Func(..)"),
            Self::Nested(specs) => f.debug_tuple("Nested").field(specs).finish(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTarget {
    Rename(String),
    Sequence(Vec<TransformSpec>),
    Mapping(TransformMapping),
}

impl<'de> Deserialize<'de> for MappingTarget {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Ok(match RawTarget::deserialize(deserializer)? {
            RawTarget::Rename(to) => Self::Rename(to),
            RawTarget::Sequence(specs) => Self::Nested(specs),
            RawTarget::Mapping(mapping) => Self::Nested(vec![TransformSpec::Mapping(mapping)]),
        })
    }
}

/// Input property names mapped to targets, applied in declaration order
#[derive(Debug, Clone, Default)]
pub struct TransformMapping {
    entries: Vec<(String, MappingTarget)>,
}

impl TransformMapping {
    /// Create an empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry. Re-declaring a property replaces its target in place.
    pub fn entry(mut self, prop: impl Into<String>, target: MappingTarget) -> Self {
        let prop = prop.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == prop) {
            Some(entry) => entry.1 = target,
            None => self.entries.push((prop, target)),
        }
        self
    }

    /// Copy `prop` to `to`
    pub fn rename(self, prop: impl Into<String>, to: impl Into<String>) -> Self {
        self.entry(prop, MappingTarget::Rename(to.into()))
    }

    /// Run `func` on `prop`
    pub fn map<F>(self, prop: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Value, &str, &FrozenRecord<'_>, &mut Record) -> Result<Option<Value>>
            + Send
            + Sync
            + 'static,
    {
        self.entry(prop, MappingTarget::Func(Arc::new(func)))
    }

    /// Transform the nested record at `prop` with `specs`
    pub fn nest(self, prop: impl Into<String>, specs: impl Into<Vec<TransformSpec>>) -> Self {
        self.entry(prop, MappingTarget::Nested(specs.into()))
    }

    /// Entries in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MappingTarget)> {
        self.entries.iter().map(|(prop, target)| (prop.as_str(), target))
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the mapping has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'de> Deserialize<'de> for TransformMapping {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let OrderedEntries(entries) = OrderedEntries::deserialize(deserializer)?;
        Ok(Self { entries })
    }
}

/// One transform instruction
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TransformSpec {
    /// Copy a property verbatim
    Prop(String),
    /// Apply several specs in turn
    Sequence(Vec<TransformSpec>),
    /// Per-property mapping
    Mapping(TransformMapping),
}

impl From<&str> for TransformSpec {
    fn from(prop: &str) -> Self {
        Self::Prop(prop.to_string())
    }
}

impl From<String> for TransformSpec {
    fn from(prop: String) -> Self {
        Self::Prop(prop)
    }
}

impl From<TransformMapping> for TransformSpec {
    fn from(mapping: TransformMapping) -> Self {
        Self::Mapping(mapping)
    }
}

impl From<Vec<TransformSpec>> for TransformSpec {
    fn from(specs: Vec<TransformSpec>) -> Self {
        Self::Sequence(specs)
    }
}

impl From<TransformSpec> for Vec<TransformSpec> {
    fn from(spec: TransformSpec) -> Self {
        vec![spec]
    }
}

impl From<TransformMapping> for Vec<TransformSpec> {
    fn from(mapping: TransformMapping) -> Self {
        vec![TransformSpec::Mapping(mapping)]
    }
}

/// Apply `specs` to `input` in order and return the output record.
///
/// With no specs the input is returned as a copy. The input is never
/// modified. Errors returned by transform functions are propagated as-is.
///
/// # Example
///
/// ```rust,ignore
/// let mapping = TransformMapping::new()
///     .rename("name", "fullName")
///     .rename("age", "ageInYears");
/// let output = transform(&input, &[mapping.into()])?;
/// ```
pub fn transform(input: &Record, specs: &[TransformSpec]) -> Result<Record> {
    if specs.is_empty() {
        return Ok(input.clone());
    }

    let frozen = FrozenRecord::new(input);
    let mut output = Record::new();
    for spec in specs {
        apply_spec(&frozen, spec, &mut output)?;
    }
    Ok(output)
}

fn apply_spec(input: &FrozenRecord<'_>, spec: &TransformSpec, output: &mut Record) -> Result<()> {
    match spec {
        TransformSpec::Prop(prop) => {
            if let Some(value) = resolve_value(input, output, prop) {
                set(output, prop.as_str(), value);
            } else {
                tracing::trace!(prop = %prop, "property not found, skipping");
            }
        }
        TransformSpec::Mapping(mapping) => {
            for (prop, target) in mapping.iter() {
                apply_entry(input, prop, target, output)?;
            }
        }
        TransformSpec::Sequence(specs) => {
            for spec in specs {
                apply_spec(input, spec, output)?;
            }
        }
    }
    Ok(())
}

fn apply_entry(
    input: &FrozenRecord<'_>,
    prop: &str,
    target: &MappingTarget,
    output: &mut Record,
) -> Result<()> {
    let value = resolve_value(input, output, prop);

    match target {
        MappingTarget::Func(func) => {
            let argument = value.as_ref().unwrap_or(&UNDEFINED);
            match func(argument, prop, input, output)? {
                Some(Value::Record(fields)) => {
                    tracing::trace!(prop, merged = fields.len(), "merging function result");
                    output.extend(fields);
                }
                Some(Value::Undefined) | None => {}
                Some(result) => {
                    set(output, prop, result);
                }
            }
        }
        MappingTarget::Nested(specs) => match value {
            Some(Value::Record(nested)) => {
                let result = transform(&nested, specs)?;
                set(output, prop, Value::Record(result));
            }
            _ => tracing::trace!(prop, "nested specs need a record, skipping"),
        },
        MappingTarget::Rename(to) => {
            if let Some(value) = value {
                set(output, to.as_str(), value);
            }
        }
    }
    Ok(())
}

/// Non-empty value on the input, else whatever the output already holds
fn resolve_value(input: &FrozenRecord<'_>, output: &Record, prop: &str) -> Option<Value> {
    get(input.record(), prop)
        .filter(|value| !value.is_empty())
        .or_else(|| get(output, prop))
        .cloned()
}
