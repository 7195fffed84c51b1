//! Uuid, time-uuid and generic identifier types.

use serde_json::Value as JsonValue;

use super::{
    check_length, decode_failed, encode_failed, guard_failed, trimmed_text, unexpected_kind, Type,
    TypeName,
};
use crate::constants::IDENTIFIER_MAX_BYTES;
use crate::error::MessageResult;
use crate::objects::{Identifier, IdentifierKind};
use crate::schema::{ClassProto, Field};
use crate::serializers::Codec;
use crate::value::Value;

/// Identifier kind declared on the field, if any.
fn declared_kind(field: &Field) -> Option<IdentifierKind> {
    match field.class_proto() {
        Some(ClassProto::Identifier(kind)) => Some(*kind),
        _ => None,
    }
}

fn encode_identifier(value: &Value, field: &Field) -> MessageResult<JsonValue> {
    match value {
        Value::Identifier(id) => Ok(JsonValue::String(id.as_str().to_string())),
        other => Err(encode_failed(field, other, "expected an identifier")),
    }
}

fn decode_identifier(
    value: &JsonValue,
    field: &Field,
    kind: IdentifierKind,
) -> MessageResult<Option<Value>> {
    let Some(text) = trimmed_text(value) else {
        return Ok(None);
    };
    Identifier::from_string(kind, &text)
        .map(|id| Some(Value::Identifier(id)))
        .map_err(|e| decode_failed(field, value, e))
}

/// `uuid` and `time-uuid`. The plain uuid accepts time uuids unless the field
/// pins an exact kind.
#[derive(Debug)]
pub struct UuidType {
    name: TypeName,
    kind: IdentifierKind,
}

pub static UUID: UuidType = UuidType { name: TypeName::Uuid, kind: IdentifierKind::Uuid };
pub static TIME_UUID: UuidType = UuidType {
    name: TypeName::TimeUuid,
    kind: IdentifierKind::TimeUuid,
};

impl Type for UuidType {
    fn type_name(&self) -> TypeName {
        self.name
    }

    fn is_scalar(&self) -> bool {
        false
    }

    fn get_max_bytes(&self) -> usize {
        36
    }

    fn guard(&self, value: &Value, field: &Field) -> MessageResult<()> {
        let Value::Identifier(id) = value else {
            return Err(unexpected_kind(field, "uuid", value));
        };
        let accepted = match declared_kind(field) {
            Some(kind) => kind == id.kind(),
            None => self.kind.accepts(id.kind()),
        };
        if !accepted {
            return Err(guard_failed(
                field,
                format!("[{id}] is a {} identifier, expected {}", id.kind(), self.kind),
            ));
        }
        if self.kind == IdentifierKind::TimeUuid
            && id.to_uuid().map(|u| u.get_version_num()) != Some(1)
        {
            return Err(guard_failed(field, format!("[{id}] is not a version 1 uuid")));
        }
        Ok(())
    }

    fn encode(&self, value: &Value, field: &Field, _codec: &dyn Codec) -> MessageResult<JsonValue> {
        encode_identifier(value, field)
    }

    fn decode(
        &self,
        value: &JsonValue,
        field: &Field,
        _codec: &dyn Codec,
    ) -> MessageResult<Option<Value>> {
        decode_identifier(value, field, declared_kind(field).unwrap_or(self.kind))
    }
}

/// Identifier of the exact kind declared by the field's class proto.
#[derive(Debug)]
pub struct IdentifierType;

pub static IDENTIFIER: IdentifierType = IdentifierType;

impl Type for IdentifierType {
    fn type_name(&self) -> TypeName {
        TypeName::Identifier
    }

    fn is_scalar(&self) -> bool {
        false
    }

    fn get_max_bytes(&self) -> usize {
        IDENTIFIER_MAX_BYTES
    }

    fn guard(&self, value: &Value, field: &Field) -> MessageResult<()> {
        let Value::Identifier(id) = value else {
            return Err(unexpected_kind(field, "identifier", value));
        };
        let Some(kind) = declared_kind(field) else {
            return Err(guard_failed(field, "no identifier class proto is declared"));
        };
        if id.kind() != kind {
            return Err(guard_failed(
                field,
                format!("[{id}] is a {} identifier, expected {kind}", id.kind()),
            ));
        }
        check_length(field, self, id.as_str().len())
    }

    fn encode(&self, value: &Value, field: &Field, _codec: &dyn Codec) -> MessageResult<JsonValue> {
        encode_identifier(value, field)
    }

    fn decode(
        &self,
        value: &JsonValue,
        field: &Field,
        _codec: &dyn Codec,
    ) -> MessageResult<Option<Value>> {
        let kind = declared_kind(field)
            .ok_or_else(|| decode_failed(field, value, "no identifier class proto is declared"))?;
        decode_identifier(value, field, kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MessageError;
    use crate::schema::FieldBuilder;
    use crate::serializers::ObjectSerializer;
    use serde_json::json;

    #[test]
    fn test_uuid_accepts_time_uuid_unless_pinned() {
        let field = FieldBuilder::new("id", TypeName::Uuid).build().unwrap();
        let v4 = Value::Identifier(Identifier::generate_uuid());
        let v1 = Value::Identifier(Identifier::generate_time_uuid());
        assert!(UUID.guard(&v4, &field).is_ok());
        assert!(UUID.guard(&v1, &field).is_ok());

        let pinned = FieldBuilder::new("id", TypeName::Uuid)
            .identifier(IdentifierKind::Uuid)
            .build()
            .unwrap();
        assert!(UUID.guard(&v1, &pinned).is_err());

        let time_field = FieldBuilder::new("id", TypeName::TimeUuid).build().unwrap();
        assert!(TIME_UUID.guard(&v1, &time_field).is_ok());
        assert!(TIME_UUID.guard(&v4, &time_field).is_err());
    }

    #[test]
    fn test_uuid_decode_normalizes() {
        let field = FieldBuilder::new("id", TypeName::Uuid).build().unwrap();
        let codec = ObjectSerializer::default();
        let decoded = UUID
            .decode(&json!(" 6BA7B810-9DAD-11D1-80B4-00C04FD430C8 "), &field, &codec)
            .unwrap()
            .unwrap();
        assert_eq!(
            UUID.encode(&decoded, &field, &codec).unwrap(),
            json!("6ba7b810-9dad-11d1-80b4-00c04fd430c8")
        );
        assert!(matches!(
            UUID.decode(&json!("not-a-uuid"), &field, &codec),
            Err(MessageError::DecodeValueFailed { .. })
        ));
    }

    #[test]
    fn test_identifier_requires_exact_kind() {
        let field = FieldBuilder::new("slug", TypeName::Identifier)
            .identifier(IdentifierKind::Slug)
            .build()
            .unwrap();
        let codec = ObjectSerializer::default();
        let slug = IDENTIFIER
            .decode(&json!("hello-world"), &field, &codec)
            .unwrap()
            .unwrap();
        assert!(IDENTIFIER.guard(&slug, &field).is_ok());

        let other = Value::Identifier(
            Identifier::from_string(IdentifierKind::String, "hello world").unwrap(),
        );
        assert!(IDENTIFIER.guard(&other, &field).is_err());
        assert!(IDENTIFIER.decode(&json!("Not A Slug"), &field, &codec).is_err());
    }
}
