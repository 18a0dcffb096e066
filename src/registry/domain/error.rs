//! Error types for registry domain validation.

use thiserror::Error;

/// Errors returned while constructing registry domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryDomainError {
    /// A required field is empty after trimming.
    #[error("field '{field}' is required")]
    MissingField {
        /// Name of the offending field.
        field: &'static str,
    },

    /// A field exceeds its declared maximum length.
    #[error("field '{field}' is {actual} characters long, limit is {max}")]
    FieldTooLong {
        /// Name of the offending field.
        field: &'static str,
        /// Declared maximum length in characters.
        max: usize,
        /// Actual length in characters.
        actual: usize,
    },

    /// A field contains a NUL character, which text columns cannot store.
    #[error("field '{field}' contains a NUL character")]
    ContainsNul {
        /// Name of the offending field.
        field: &'static str,
    },

    /// A payload could not be converted to or from JSON.
    #[error("invalid JSON payload: {0}")]
    InvalidPayload(String),
}
