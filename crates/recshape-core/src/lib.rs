//! Recshape Core Library
//!
//! This crate reshapes and checks loosely typed records:
//! - Path resolution (`get`, `set`, `has`) over nested records and arrays
//! - Transform engine that builds a new record from an input record
//! - Validation engine that evaluates composable rule trees
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Record    │────▶│  Transform  │────▶│   Output    │
//! │   (Value)   │     │   Engine    │     │   Record    │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        │                   │
//!        │            ┌─────────────┐     ┌─────────────┐
//!        └───────────▶│ Validation  │────▶│    bool     │
//!                     │   Engine    │     │  (report)   │
//!                     └─────────────┘     └─────────────┘
//!                            │
//!                     ┌─────────────┐
//!                     │    Path     │
//!                     │  Resolver   │
//!                     └─────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use recshape_core::{RuleTree, TransformMapping, ValidationOptions, Value, transform, validate};
//!
//! let mapping = TransformMapping::new().rename("name", "fullName");
//! let output = transform(&input, &[mapping.into()])?;
//!
//! let rules: RuleTree = serde_yaml::from_str("has: fullName")?;
//! assert!(validate(&Value::from(output), &rules, &ValidationOptions::default()));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
mod ordered;
pub mod path;
pub mod predicates;
pub mod shape;
pub mod transform;
pub mod validate;
pub mod value;

pub use error::{Error, Result};
pub use path::{IntoPath, Path, Resolve, Segment, get, get_or, has, has_value, set};
pub use shape::{Instance, TypeShape};
pub use transform::{
    FrozenRecord, MappingTarget, TransformFn, TransformMapping, TransformSpec, transform,
};
pub use validate::{
    Rule, RuleTree, ValidationOptions, ValidationReport, validate, validate_report,
};
pub use value::{Predicate, Record, Value};
