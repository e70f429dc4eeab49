//! Error types for the config field transcoder

use thiserror::Error;

/// Result type for transcoder operations
pub type Result<T> = std::result::Result<T, TranscodeError>;

/// Errors surfaced to the caller as `Err`.
///
/// Decoding a schema value never produces one of these; per-field problems are
/// reported as [`crate::Diagnostic`]s instead.
#[derive(Debug, Error)]
pub enum TranscodeError {
    /// Two descriptors share a name and the encoder is rejecting duplicates
    #[error("duplicate field name: {name}")]
    DuplicateFieldName { name: String },

    /// An enumeration descriptor with no values reached the encoder
    #[error("enumeration field '{name}' has no values")]
    EmptyEnumeration { name: String },

    /// An item descriptor whose default is not an object or a list of objects
    #[error("item field '{name}' default must be an object or an array of objects")]
    InvalidItemDefault { name: String },

    /// Descriptor JSON with an unknown type tag or malformed attributes
    #[error("invalid field descriptor: {0}")]
    InvalidDescriptor(#[source] serde_json::Error),

    /// Input text is not JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Why a single schema property could not be turned into a descriptor.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClassificationError {
    /// Property fragment is not a JSON object
    #[error("property schema must be an object")]
    NotAnObject,

    /// Fragment has no `type` keyword
    #[error("property schema has no 'type'")]
    MissingType,

    /// `type` is not a JSON Schema type this model understands
    #[error("unknown input type '{found}'")]
    UnknownType { found: String },

    /// Base type is valid JSON Schema but no field kind uses it without an extension
    #[error("type '{base}' is not supported without a recognized 'x-component'")]
    UnsupportedShape { base: &'static str },

    /// Plain array whose items are not strings
    #[error("property.items.type must be of type string, found {found}")]
    NonStringArrayItems { found: String },

    /// An attribute is present with the wrong JSON type
    #[error("'{keyword}' must be {expected}")]
    InvalidAttribute {
        keyword: &'static str,
        expected: &'static str,
    },

    /// Enumeration without any values
    #[error("enumeration has no values")]
    EmptyEnumeration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TranscodeError::DuplicateFieldName {
            name: "cooldown".into(),
        };
        assert_eq!(err.to_string(), "duplicate field name: cooldown");
    }

    #[test]
    fn test_classification_display() {
        let err = ClassificationError::InvalidAttribute {
            keyword: "minLength",
            expected: "a non-negative integer",
        };
        assert_eq!(err.to_string(), "'minLength' must be a non-negative integer");

        let err = ClassificationError::NonStringArrayItems {
            found: "\"number\"".into(),
        };
        assert!(err.to_string().contains("must be of type string"));
    }

    #[test]
    fn test_json_error_converts() {
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: TranscodeError = parse.into();
        assert!(matches!(err, TranscodeError::Json(_)));
    }
}
