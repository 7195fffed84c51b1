use serde_json::{json, Value as JsonValue};

use super::{
    decode_failed, encode_failed, guard_failed, trimmed_text, unexpected_kind, Type, TypeName,
};
use crate::error::MessageResult;
use crate::schema::{ClassProto, EnumDef, Field};
use crate::serializers::Codec;
use crate::value::Value;

fn enum_def(field: &Field) -> Option<&EnumDef> {
    match field.class_proto() {
        Some(ClassProto::StringEnum(def)) | Some(ClassProto::IntEnum(def)) => Some(def.as_ref()),
        _ => None,
    }
}

fn guard_member(value: &Value, field: &Field) -> MessageResult<()> {
    let def = enum_def(field).ok_or_else(|| guard_failed(field, "no enum class proto is declared"))?;
    if !def.contains(value) {
        return Err(guard_failed(
            field,
            format!("[{}] is not a member of enum [{}]", value.preview(), def.name()),
        ));
    }
    Ok(())
}

fn decode_member(value: Value, raw: &JsonValue, field: &Field) -> MessageResult<Option<Value>> {
    match enum_def(field) {
        Some(def) if def.contains(&value) => Ok(Some(value)),
        Some(def) => Err(decode_failed(
            field,
            raw,
            format!("not a member of enum [{}]", def.name()),
        )),
        None => Err(decode_failed(field, raw, "no enum class proto is declared")),
    }
}

#[derive(Debug)]
pub struct StringEnumType;

pub static STRING_ENUM: StringEnumType = StringEnumType;

impl Type for StringEnumType {
    fn type_name(&self) -> TypeName {
        TypeName::StringEnum
    }

    fn is_scalar(&self) -> bool {
        false
    }

    fn is_string(&self) -> bool {
        true
    }

    fn get_max_bytes(&self) -> usize {
        100
    }

    fn guard(&self, value: &Value, field: &Field) -> MessageResult<()> {
        if !matches!(value, Value::String(_)) {
            return Err(unexpected_kind(field, "string enum value", value));
        }
        guard_member(value, field)
    }

    fn encode(&self, value: &Value, field: &Field, _codec: &dyn Codec) -> MessageResult<JsonValue> {
        match value {
            Value::String(s) => Ok(json!(s)),
            other => Err(encode_failed(field, other, "expected a string enum value")),
        }
    }

    fn decode(
        &self,
        value: &JsonValue,
        field: &Field,
        _codec: &dyn Codec,
    ) -> MessageResult<Option<Value>> {
        match trimmed_text(value) {
            Some(text) => decode_member(Value::String(text), value, field),
            None => Ok(None),
        }
    }
}

#[derive(Debug)]
pub struct IntEnumType;

pub static INT_ENUM: IntEnumType = IntEnumType;

impl Type for IntEnumType {
    fn type_name(&self) -> TypeName {
        TypeName::IntEnum
    }

    fn is_scalar(&self) -> bool {
        false
    }

    fn is_numeric(&self) -> bool {
        true
    }

    fn guard(&self, value: &Value, field: &Field) -> MessageResult<()> {
        if !matches!(value, Value::Int(_)) {
            return Err(unexpected_kind(field, "int enum value", value));
        }
        guard_member(value, field)
    }

    fn encode(&self, value: &Value, field: &Field, _codec: &dyn Codec) -> MessageResult<JsonValue> {
        match value {
            Value::Int(n) => Ok(json!(n)),
            other => Err(encode_failed(field, other, "expected an int enum value")),
        }
    }

    fn decode(
        &self,
        value: &JsonValue,
        field: &Field,
        _codec: &dyn Codec,
    ) -> MessageResult<Option<Value>> {
        let number = match value {
            JsonValue::Null => return Ok(None),
            JsonValue::Number(n) => n.as_i64(),
            JsonValue::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        };
        match number {
            Some(n) => decode_member(Value::Int(n), value, field),
            None => Err(decode_failed(field, value, "expected an integer")),
        }
    }
}
