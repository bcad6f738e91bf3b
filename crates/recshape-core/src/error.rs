//! Error types for recshape-core
//!
//! Path resolution and rule evaluation never fail: malformed paths, wrong
//! roots and unknown rules degrade to a default, `false` or a no-op. Errors
//! only surface from caller-supplied transform functions, writes through a
//! frozen input and explicit conversions.

use thiserror::Error;

/// Result type alias for recshape-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in recshape-core
#[derive(Error, Debug)]
pub enum Error {
    /// A property path could not be parsed
    #[error("invalid path '{path}': {message}")]
    InvalidPath {
        /// The path text that was rejected
        path: String,
        /// Description of the problem
        message: String,
    },

    /// A transform function tried to write through the frozen input record
    #[error("cannot modify frozen input property '{key}'")]
    FrozenInput {
        /// Property that was targeted
        key: String,
    },

    /// Transform function error
    #[error("transform error in '{transform}': {message}")]
    TransformError {
        /// Property the failing transform was attached to
        transform: String,
        /// Description of the error
        message: String,
    },

    /// Invalid regex pattern in a rule tree
    #[error("invalid regex pattern '{pattern}': {message}")]
    InvalidPattern {
        /// The pattern that failed
        pattern: String,
        /// Error message
        message: String,
    },

    /// Type name missing from the predicate catalog
    #[error("unknown type name '{name}'")]
    UnknownType {
        /// The name that was looked up
        name: String,
    },

    /// Value has no JSON representation
    #[error("{kind} values cannot be represented as JSON")]
    NotRepresentable {
        /// Kind of the offending value
        kind: &'static str,
    },
}

impl Error {
    /// Build a [`Error::TransformError`] for the given property.
    ///
    /// Intended for use inside transform functions:
    ///
    /// ```rust,ignore
    /// return Err(Error::transform(prop, "expected a date string"));
    /// ```
    pub fn transform(transform: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TransformError {
            transform: transform.into(),
            message: message.into(),
        }
    }
}
