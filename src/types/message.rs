use serde_json::Value as JsonValue;

use super::{encode_failed, guard_failed, unexpected_kind, Type, TypeName};
use crate::error::MessageResult;
use crate::schema::Field;
use crate::serializers::Codec;
use crate::value::Value;

/// Nested messages. The codec owns the field walking in both directions.
#[derive(Debug)]
pub struct MessageType;

pub static MESSAGE: MessageType = MessageType;

impl Type for MessageType {
    fn type_name(&self) -> TypeName {
        TypeName::Message
    }

    fn is_scalar(&self) -> bool {
        false
    }

    fn encodes_to_scalar(&self) -> bool {
        false
    }

    fn is_message(&self) -> bool {
        true
    }

    fn guard(&self, value: &Value, field: &Field) -> MessageResult<()> {
        let Value::Message(message) = value else {
            return Err(unexpected_kind(field, "message", value));
        };
        let curies = field.any_of_curies();
        if curies.is_empty() {
            return Ok(());
        }
        let schema = message.schema();
        if curies.iter().any(|curie| schema.uses_curie(curie)) {
            return Ok(());
        }
        Err(guard_failed(
            field,
            format!(
                "message [{}] must be one of {:?} or use one of them as a mixin",
                schema.curie(),
                curies
            ),
        ))
    }

    fn encode(&self, value: &Value, field: &Field, codec: &dyn Codec) -> MessageResult<JsonValue> {
        match value {
            Value::Message(message) => codec.encode_message(message, field),
            other => Err(encode_failed(field, other, "expected a message")),
        }
    }

    fn decode(
        &self,
        value: &JsonValue,
        field: &Field,
        codec: &dyn Codec,
    ) -> MessageResult<Option<Value>> {
        if value.is_null() {
            return Ok(None);
        }
        codec
            .decode_message(value, field)
            .map(|message| Some(Value::Message(Box::new(message))))
    }
}
