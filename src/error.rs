//! Unified error type for the message model.
//!
//! Every fallible operation in the crate returns [`MessageResult`]. The
//! variants fall into four groups:
//!
//! * value errors (`AssertionFailed`, `DecodeValueFailed`, `EncodeValueFailed`)
//! * schema definition errors, raised while building or resolving schemas
//! * resolver errors, which callers may legitimately catch and fall back on
//! * usage errors on an already constructed message graph

/// Maximum number of characters of a value included in an error message.
pub const VALUE_PREVIEW_LENGTH: usize = 255;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MessageError {
    /// A value failed a type guard or a field constraint.
    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    /// A wire value could not be decoded into its in-memory form.
    #[error("Failed to decode [{value}] for field [{field}] to a [{type_name}]: {reason}")]
    DecodeValueFailed {
        value: String,
        field: String,
        type_name: String,
        reason: String,
    },

    /// An in-memory value could not be encoded into its wire form.
    #[error("Failed to encode [{value}] for field [{field}] to a [{type_name}]: {reason}")]
    EncodeValueFailed {
        value: String,
        field: String,
        type_name: String,
        reason: String,
    },

    #[error("Field [{field}] is already defined on schema [{schema}] and is not overridable")]
    FieldAlreadyDefined { schema: String, field: String },

    #[error("Field [{field}] override on schema [{schema}] is not compatible: {reason}")]
    FieldOverrideNotCompatible {
        schema: String,
        field: String,
        reason: String,
    },

    #[error("Field [{field}] is not defined on schema [{schema}]")]
    FieldNotDefined { schema: String, field: String },

    #[error("Mixin [{mixin}] was already added to schema [{schema}]")]
    MixinAlreadyAdded { schema: String, mixin: String },

    #[error("Mixin [{mixin}] is not defined on schema [{schema}]")]
    MixinNotDefined { schema: String, mixin: String },

    /// The resolved schema does not describe the message the payload declared.
    #[error("Payload declared schema [{expected}] but the resolver returned [{resolved}]")]
    InvalidResolvedSchema { expected: String, resolved: String },

    #[error("Schema not defined: {0}")]
    SchemaNotDefined(String),

    #[error("No message is registered for schema id [{0}]")]
    NoMessageForSchemaId(String),

    #[error("No message is registered for curie [{0}]")]
    NoMessageForCurie(String),

    #[error("No message is registered for qname [{0}]")]
    NoMessageForQName(String),

    #[error("No message is using mixin [{0}]")]
    NoMessageForMixin(String),

    #[error("More than one message is using mixin [{mixin}]: {found:?}")]
    MoreThanOneMessageForMixin { mixin: String, found: Vec<String> },

    #[error("Message [{0}] is frozen and cannot be modified")]
    FrozenMessageIsImmutable(String),

    #[error("Required field [{field}] must be set on message [{schema}]")]
    RequiredFieldNotSet { schema: String, field: String },

    #[error("Logic error: {0}")]
    LogicException(String),
}

impl MessageError {
    /// Convenience constructor for guard failures.
    pub fn assertion<S: Into<String>>(message: S) -> Self {
        Self::AssertionFailed(message.into())
    }

    pub fn decode_failed(
        value: &str,
        field: &str,
        type_name: &str,
        reason: impl ToString,
    ) -> Self {
        Self::DecodeValueFailed {
            value: preview(value),
            field: field.to_string(),
            type_name: type_name.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn encode_failed(
        value: &str,
        field: &str,
        type_name: &str,
        reason: impl ToString,
    ) -> Self {
        Self::EncodeValueFailed {
            value: preview(value),
            field: field.to_string(),
            type_name: type_name.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Errors raised while defining or resolving schemas. These indicate
    /// programmer or configuration mistakes and are not worth retrying.
    pub fn is_schema_definition_error(&self) -> bool {
        matches!(
            self,
            Self::FieldAlreadyDefined { .. }
                | Self::FieldOverrideNotCompatible { .. }
                | Self::FieldNotDefined { .. }
                | Self::MixinAlreadyAdded { .. }
                | Self::MixinNotDefined { .. }
                | Self::InvalidResolvedSchema { .. }
                | Self::SchemaNotDefined(_)
        )
    }

    /// Data dependent lookup failures from the resolver.
    pub fn is_resolver_error(&self) -> bool {
        matches!(
            self,
            Self::NoMessageForSchemaId(_)
                | Self::NoMessageForCurie(_)
                | Self::NoMessageForQName(_)
                | Self::NoMessageForMixin(_)
                | Self::MoreThanOneMessageForMixin { .. }
        )
    }

    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Self::FrozenMessageIsImmutable(_)
                | Self::RequiredFieldNotSet { .. }
                | Self::LogicException(_)
        )
    }
}

/// Truncates a value rendering so error messages stay readable.
pub fn preview(value: &str) -> String {
    if value.chars().count() <= VALUE_PREVIEW_LENGTH {
        return value.to_string();
    }
    let mut truncated: String = value.chars().take(VALUE_PREVIEW_LENGTH).collect();
    truncated.push_str("...");
    truncated
}

/// Result type alias for operations that can fail with a [`MessageError`].
pub type MessageResult<T> = Result<T, MessageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_truncates_long_values() {
        let long = "x".repeat(400);
        let err = MessageError::decode_failed(&long, "title", "string", "bad");
        match err {
            MessageError::DecodeValueFailed { value, .. } => {
                assert_eq!(value.len(), VALUE_PREVIEW_LENGTH + 3);
                assert!(value.ends_with("..."));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn classification_groups() {
        assert!(MessageError::NoMessageForCurie("a:b::c".into()).is_resolver_error());
        assert!(MessageError::SchemaNotDefined("x".into()).is_schema_definition_error());
        assert!(MessageError::LogicException("x".into()).is_usage_error());
        assert!(!MessageError::assertion("x").is_resolver_error());
    }
}
