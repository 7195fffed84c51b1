use serde_json::Value as JsonValue;

use super::{unexpected_kind, Type, TypeName};
use crate::error::MessageResult;
use crate::schema::Field;
use crate::serializers::Codec;
use crate::value::Value;

#[derive(Debug)]
pub struct BooleanType;

pub static BOOLEAN: BooleanType = BooleanType;

fn truthy(text: &str) -> bool {
    matches!(
        text.trim().to_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

impl Type for BooleanType {
    fn type_name(&self) -> TypeName {
        TypeName::Boolean
    }

    fn is_boolean(&self) -> bool {
        true
    }

    fn get_default(&self) -> Option<Value> {
        Some(Value::Bool(false))
    }

    fn guard(&self, value: &Value, field: &Field) -> MessageResult<()> {
        match value {
            Value::Bool(_) => Ok(()),
            other => Err(unexpected_kind(field, "boolean", other)),
        }
    }

    fn encode(&self, value: &Value, _field: &Field, _codec: &dyn Codec) -> MessageResult<JsonValue> {
        let flag = match value {
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::String(s) => truthy(s),
            _ => false,
        };
        Ok(JsonValue::Bool(flag))
    }

    fn decode(
        &self,
        value: &JsonValue,
        _field: &Field,
        _codec: &dyn Codec,
    ) -> MessageResult<Option<Value>> {
        let flag = match value {
            JsonValue::Bool(b) => *b,
            JsonValue::Number(n) => n.as_f64().map_or(false, |f| f != 0.0),
            JsonValue::String(s) => truthy(s),
            JsonValue::Null => return Ok(None),
            _ => false,
        };
        Ok(Some(Value::Bool(flag)))
    }
}
