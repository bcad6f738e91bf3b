//! Class-like lookup targets
//!
//! Plain records only have their own properties. Class-like data has three
//! separate scopes, and which of them a lookup sees depends on the target:
//!
//! | target       | own fields | prototype fields | static fields |
//! |--------------|------------|------------------|---------------|
//! | [`TypeShape`]| -          | no               | yes           |
//! | [`Instance`] | yes        | yes              | no            |
//!
//! Both implement [`Resolve`], so [`crate::path::get`] and
//! [`crate::path::has`] work on them directly.

use std::sync::Arc;

use crate::path::{Resolve, Segment};
use crate::value::{Record, Value};

/// A constructor-like type: static fields plus the prototype fields its
/// instances inherit
#[derive(Debug, Clone, Default)]
pub struct TypeShape {
    name: String,
    statics: Record,
    prototype: Record,
}

impl TypeShape {
    /// Create an empty shape
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Add a field visible on the type itself
    pub fn with_static(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.statics.insert(key.into(), value.into());
        self
    }

    /// Add a field inherited by every instance
    pub fn with_prototype(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.prototype.insert(key.into(), value.into());
        self
    }

    /// Type name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Build an instance carrying `fields` as its own properties
    pub fn instantiate(self: &Arc<Self>, fields: Record) -> Instance {
        Instance {
            shape: Arc::clone(self),
            fields,
        }
    }
}

impl Resolve for TypeShape {
    fn lookup(&self, segment: &Segment) -> Option<&Value> {
        self.statics.lookup(segment)
    }

    fn lookup_mut(&mut self, segment: &Segment) -> Option<&mut Value> {
        self.statics.lookup_mut(segment)
    }

    fn assign(&mut self, segment: &Segment, value: Value) -> bool {
        self.statics.assign(segment, value)
    }
}

/// An object built from a [`TypeShape`]
#[derive(Debug, Clone)]
pub struct Instance {
    shape: Arc<TypeShape>,
    fields: Record,
}

impl Instance {
    /// The shape this instance was built from
    pub fn shape(&self) -> &TypeShape {
        &self.shape
    }

    /// Own fields only
    pub fn fields(&self) -> &Record {
        &self.fields
    }
}

impl Resolve for Instance {
    fn lookup(&self, segment: &Segment) -> Option<&Value> {
        self.fields
            .lookup(segment)
            .or_else(|| self.shape.prototype.lookup(segment))
    }

    // Writes always land on the instance, shadowing the prototype.
    fn lookup_mut(&mut self, segment: &Segment) -> Option<&mut Value> {
        self.fields.lookup_mut(segment)
    }

    fn assign(&mut self, segment: &Segment, value: Value) -> bool {
        self.fields.assign(segment, value)
    }
}
