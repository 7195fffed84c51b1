//! The type system: one stateless singleton per [`TypeName`].
//!
//! A type knows how to validate an in-memory [`Value`] against a [`Field`]
//! and how to move it to and from the wire form. Complex kinds (messages,
//! refs, geo points, dynamic fields) hand the wire work to a [`Codec`] so the
//! serializer decides the shape.

pub mod boolean;
pub mod enums;
pub mod identifiers;
pub mod message;
pub mod numeric;
pub mod objects;
pub mod temporal;
pub mod textual;
pub mod type_name;

use serde_json::Value as JsonValue;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{MessageError, MessageResult};
use crate::schema::Field;
use crate::serializers::Codec;
use crate::value::Value;

pub use type_name::TypeName;

/// Largest integer exactly representable by an IEEE double.
pub const MAX_SAFE_INTEGER: i64 = 9_007_199_254_740_991;

static BINARY_BASE64: AtomicBool = AtomicBool::new(true);

/// Switches the binary family between base64 and raw UTF-8 wire strings.
pub fn set_binary_base64(enabled: bool) {
    BINARY_BASE64.store(enabled, Ordering::SeqCst);
}

pub fn binary_base64() -> bool {
    BINARY_BASE64.load(Ordering::SeqCst)
}

/// Behavior shared by every field type.
pub trait Type: Send + Sync + fmt::Debug {
    fn type_name(&self) -> TypeName;

    fn type_value(&self) -> &'static str {
        self.type_name().as_str()
    }

    /// True when the in-memory value is a primitive rather than an object.
    fn is_scalar(&self) -> bool {
        true
    }

    /// True when `encode` yields a JSON primitive, even for rich values.
    fn encodes_to_scalar(&self) -> bool {
        true
    }

    fn is_boolean(&self) -> bool {
        false
    }

    fn is_binary(&self) -> bool {
        false
    }

    fn is_numeric(&self) -> bool {
        false
    }

    fn is_string(&self) -> bool {
        false
    }

    fn is_message(&self) -> bool {
        false
    }

    /// Value applied by default population. `None` skips the field.
    fn get_default(&self) -> Option<Value> {
        None
    }

    fn get_min(&self) -> i64 {
        -2_147_483_648
    }

    fn get_max(&self) -> i64 {
        2_147_483_647
    }

    fn get_max_bytes(&self) -> usize {
        65_535
    }

    fn allows_empty(&self) -> bool {
        false
    }

    /// Rejects values of the wrong kind or outside the field's constraints.
    fn guard(&self, value: &Value, field: &Field) -> MessageResult<()>;

    fn encode(&self, value: &Value, field: &Field, codec: &dyn Codec) -> MessageResult<JsonValue>;

    /// Returns `None` when the wire value normalizes to empty.
    fn decode(
        &self,
        value: &JsonValue,
        field: &Field,
        codec: &dyn Codec,
    ) -> MessageResult<Option<Value>>;
}

impl TypeName {
    /// The singleton implementing this type.
    pub fn get_type(&self) -> &'static dyn Type {
        match self {
            Self::BigInt => &numeric::BIG_INT,
            Self::Binary => &textual::BINARY,
            Self::Blob => &textual::BLOB,
            Self::Boolean => &boolean::BOOLEAN,
            Self::Date => &temporal::DATE,
            Self::DateTime => &temporal::DATE_TIME,
            Self::Decimal => &numeric::DECIMAL,
            Self::DynamicField => &objects::DYNAMIC_FIELD,
            Self::Float => &numeric::FLOAT,
            Self::GeoPoint => &objects::GEO_POINT,
            Self::Identifier => &identifiers::IDENTIFIER,
            Self::IntEnum => &enums::INT_ENUM,
            Self::Int => &numeric::INT,
            Self::MediumBlob => &textual::MEDIUM_BLOB,
            Self::MediumInt => &numeric::MEDIUM_INT,
            Self::MediumText => &textual::MEDIUM_TEXT,
            Self::Message => &message::MESSAGE,
            Self::MessageRef => &objects::MESSAGE_REF,
            Self::Microtime => &temporal::MICROTIME,
            Self::NodeRef => &objects::NODE_REF,
            Self::SignedBigInt => &numeric::SIGNED_BIG_INT,
            Self::SignedInt => &numeric::SIGNED_INT,
            Self::SignedMediumInt => &numeric::SIGNED_MEDIUM_INT,
            Self::SignedSmallInt => &numeric::SIGNED_SMALL_INT,
            Self::SignedTinyInt => &numeric::SIGNED_TINY_INT,
            Self::SmallInt => &numeric::SMALL_INT,
            Self::StringEnum => &enums::STRING_ENUM,
            Self::String => &textual::STRING,
            Self::Text => &textual::TEXT,
            Self::TimeUuid => &identifiers::TIME_UUID,
            Self::Timestamp => &temporal::TIMESTAMP,
            Self::TinyInt => &numeric::TINY_INT,
            Self::Trinary => &numeric::TRINARY,
            Self::Uuid => &identifiers::UUID,
        }
    }
}

/// Guard failure for `field`.
pub(crate) fn guard_failed(field: &Field, reason: impl fmt::Display) -> MessageError {
    MessageError::assertion(format!(
        "Field [{}] of type [{}]: {reason}",
        field.name(),
        field.type_name()
    ))
}

/// Guard failure for a value of the wrong variant.
pub(crate) fn unexpected_kind(field: &Field, expected: &str, value: &Value) -> MessageError {
    guard_failed(
        field,
        format!("expected a {expected} but got a {} [{}]", value.kind_name(), value.preview()),
    )
}

pub(crate) fn decode_failed(field: &Field, value: &JsonValue, reason: impl ToString) -> MessageError {
    MessageError::decode_failed(
        &json_preview(value),
        field.name(),
        field.type_name().as_str(),
        reason,
    )
}

pub(crate) fn encode_failed(field: &Field, value: &Value, reason: impl ToString) -> MessageError {
    MessageError::encode_failed(
        &value.to_text(),
        field.name(),
        field.type_name().as_str(),
        reason,
    )
}

fn json_preview(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `[max(field.min, type.min), min(field.max, type.max)]`
pub(crate) fn effective_range(field: &Field, ty: &dyn Type) -> (i64, i64) {
    let min = field.min().map_or(ty.get_min(), |m| m.max(ty.get_min()));
    let max = field.max().map_or(ty.get_max(), |m| m.min(ty.get_max()));
    (min, max)
}

/// Checks a measured byte length against `[min_length, min(max_length, max_bytes)]`.
pub(crate) fn check_length(field: &Field, ty: &dyn Type, length: usize) -> MessageResult<()> {
    let min = field.min_length().unwrap_or(0);
    let max = field
        .max_length()
        .map_or(ty.get_max_bytes(), |m| m.min(ty.get_max_bytes()));
    if length < min || length > max {
        return Err(guard_failed(
            field,
            format!("length [{length}] must be between {min} and {max} bytes"),
        ));
    }
    Ok(())
}

/// Trimmed string content of a wire value, `None` when empty.
pub(crate) fn trimmed_text(value: &JsonValue) -> Option<String> {
    let text = match value {
        JsonValue::String(s) => s.trim().to_string(),
        JsonValue::Null => return None,
        other => other.to_string(),
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_type_name_has_a_singleton() {
        for name in TypeName::all() {
            let ty = name.get_type();
            assert_eq!(ty.type_name(), *name);
            assert_eq!(ty.type_value(), name.as_str());
            assert!(std::ptr::eq(
                ty as *const dyn Type as *const u8,
                name.get_type() as *const dyn Type as *const u8
            ));
        }
    }

    #[test]
    fn test_classification() {
        assert!(TypeName::Message.get_type().is_message());
        assert!(!TypeName::GeoPoint.get_type().encodes_to_scalar());
        assert!(TypeName::Uuid.get_type().encodes_to_scalar());
        assert!(!TypeName::Uuid.get_type().is_scalar());
        assert!(TypeName::Blob.get_type().is_binary());
        assert!(TypeName::TinyInt.get_type().is_numeric());
        assert!(TypeName::Text.get_type().is_string());
        assert!(TypeName::Boolean.get_type().is_boolean());
    }
}
