//! Length-bounded text values backing every stored string column.

use super::RegistryDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Limit for names, owners, versions, and status labels.
pub const SHORT_TEXT_MAX_CHARS: usize = 128;
/// Limit for algorithm descriptions.
pub const DESCRIPTION_MAX_CHARS: usize = 1000;
/// Limit for algorithm source code.
pub const CODE_MAX_CHARS: usize = 50_000;
/// Limit for request payloads and feedback.
pub const PAYLOAD_MAX_CHARS: usize = 10_000;

/// Text holding at most `MAX` characters.
///
/// When `REQUIRED` is set, blank input (empty after trimming) is treated as a
/// missing value; otherwise empty text is accepted. The stored text is kept
/// exactly as given. Length is counted in Unicode scalar values, not bytes.
/// NUL characters are rejected because `PostgreSQL` text columns cannot hold
/// them.
///
/// Deserialized values are validated too, but serde offers no way to learn
/// the enclosing field name, so those errors report the field as `value`.
/// Use [`BoundedText::new`] when the field name matters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BoundedText<const MAX: usize, const REQUIRED: bool>(String);

/// Short required label such as a name, owner, or version.
pub type ShortText = BoundedText<SHORT_TEXT_MAX_CHARS, true>;
/// Human-readable algorithm description. May be empty.
pub type Description = BoundedText<DESCRIPTION_MAX_CHARS, false>;
/// Opaque algorithm source or configuration. May be empty.
pub type SourceCode = BoundedText<CODE_MAX_CHARS, false>;
/// Opaque JSON-shaped request or response payload. May be empty.
pub type Payload = BoundedText<PAYLOAD_MAX_CHARS, false>;

impl<const MAX: usize, const REQUIRED: bool> BoundedText<MAX, REQUIRED> {
    /// Maximum length accepted by this text type.
    pub const MAX_CHARS: usize = MAX;

    /// Validates `value` for the named field.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryDomainError::MissingField`] when a required value is
    /// blank, [`RegistryDomainError::ContainsNul`] when it contains `'\0'`,
    /// or [`RegistryDomainError::FieldTooLong`] when it exceeds `MAX`
    /// characters.
    pub fn new(field: &'static str, value: impl Into<String>) -> Result<Self, RegistryDomainError> {
        let raw = value.into();
        if REQUIRED && raw.trim().is_empty() {
            return Err(RegistryDomainError::MissingField { field });
        }
        if raw.contains('\0') {
            return Err(RegistryDomainError::ContainsNul { field });
        }

        let actual = raw.chars().count();
        if actual > MAX {
            return Err(RegistryDomainError::FieldTooLong {
                field,
                max: MAX,
                actual,
            });
        }

        Ok(Self(raw))
    }

    /// Returns the text as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the value, returning the owned string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Payload {
    /// Serializes a JSON value into a payload.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryDomainError::InvalidPayload`] when serialization
    /// fails, or the usual length errors when the rendered JSON is too long.
    pub fn from_json(
        field: &'static str,
        value: &serde_json::Value,
    ) -> Result<Self, RegistryDomainError> {
        let rendered = serde_json::to_string(value)
            .map_err(|err| RegistryDomainError::InvalidPayload(err.to_string()))?;
        Self::new(field, rendered)
    }

    /// Parses the stored text as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryDomainError::InvalidPayload`] when the text is not
    /// valid JSON.
    pub fn parse_json(&self) -> Result<serde_json::Value, RegistryDomainError> {
        serde_json::from_str(&self.0)
            .map_err(|err| RegistryDomainError::InvalidPayload(err.to_string()))
    }
}

impl<const MAX: usize, const REQUIRED: bool> TryFrom<String> for BoundedText<MAX, REQUIRED> {
    type Error = RegistryDomainError;

    /// Validates `value` under the generic field name `value`.
    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new("value", value)
    }
}

impl<const MAX: usize, const REQUIRED: bool> From<BoundedText<MAX, REQUIRED>> for String {
    fn from(value: BoundedText<MAX, REQUIRED>) -> Self {
        value.0
    }
}

impl<const MAX: usize, const REQUIRED: bool> AsRef<str> for BoundedText<MAX, REQUIRED> {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl<const MAX: usize, const REQUIRED: bool> fmt::Display for BoundedText<MAX, REQUIRED> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
