//! String and binary families, bounded by transport byte length.

use base64::{engine::general_purpose, Engine as _};
use serde_json::Value as JsonValue;

use super::{
    binary_base64, check_length, decode_failed, encode_failed, guard_failed, trimmed_text,
    unexpected_kind, Type, TypeName,
};
use crate::constants::{MEDIUM_TEXT_MAX_BYTES, STRING_MAX_BYTES, TEXT_MAX_BYTES};
use crate::error::MessageResult;
use crate::schema::Field;
use crate::serializers::Codec;
use crate::value::Value;

#[derive(Debug)]
pub struct StringType {
    name: TypeName,
    max_bytes: usize,
}

pub static STRING: StringType = StringType { name: TypeName::String, max_bytes: STRING_MAX_BYTES };
pub static TEXT: StringType = StringType { name: TypeName::Text, max_bytes: TEXT_MAX_BYTES };
pub static MEDIUM_TEXT: StringType = StringType {
    name: TypeName::MediumText,
    max_bytes: MEDIUM_TEXT_MAX_BYTES,
};

impl Type for StringType {
    fn type_name(&self) -> TypeName {
        self.name
    }

    fn is_string(&self) -> bool {
        true
    }

    fn get_max_bytes(&self) -> usize {
        self.max_bytes
    }

    fn allows_empty(&self) -> bool {
        true
    }

    fn guard(&self, value: &Value, field: &Field) -> MessageResult<()> {
        let Value::String(text) = value else {
            return Err(unexpected_kind(field, "string", value));
        };
        check_length(field, self, text.len())?;

        if let Some(pattern) = field.pattern() {
            if !pattern.is_match(text) {
                return Err(guard_failed(
                    field,
                    format!("[{}] does not match pattern [{}]", value.preview(), pattern.as_str()),
                ));
            }
        }

        if let Some(format) = field.format() {
            if !format.is_valid(text) {
                return Err(guard_failed(
                    field,
                    format!("[{}] is not a valid {format}", value.preview()),
                ));
            }
        }
        Ok(())
    }

    fn encode(&self, value: &Value, _field: &Field, _codec: &dyn Codec) -> MessageResult<JsonValue> {
        let text = value.to_text();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(JsonValue::Null);
        }
        Ok(JsonValue::String(trimmed.to_string()))
    }

    fn decode(
        &self,
        value: &JsonValue,
        field: &Field,
        _codec: &dyn Codec,
    ) -> MessageResult<Option<Value>> {
        match value {
            JsonValue::Array(_) | JsonValue::Object(_) => {
                Err(decode_failed(field, value, "expected a string"))
            }
            other => Ok(trimmed_text(other).map(Value::String)),
        }
    }
}

/// Binary family. Wire strings are base64 or raw UTF-8 per [`super::set_binary_base64`].
#[derive(Debug)]
pub struct BinaryType {
    name: TypeName,
    max_bytes: usize,
}

pub static BINARY: BinaryType = BinaryType { name: TypeName::Binary, max_bytes: STRING_MAX_BYTES };
pub static BLOB: BinaryType = BinaryType { name: TypeName::Blob, max_bytes: TEXT_MAX_BYTES };
pub static MEDIUM_BLOB: BinaryType = BinaryType {
    name: TypeName::MediumBlob,
    max_bytes: MEDIUM_TEXT_MAX_BYTES,
};

fn encoded_len(bytes: &[u8]) -> usize {
    if binary_base64() {
        bytes.len().div_ceil(3) * 4
    } else {
        bytes.len()
    }
}

impl Type for BinaryType {
    fn type_name(&self) -> TypeName {
        self.name
    }

    fn is_binary(&self) -> bool {
        true
    }

    fn get_max_bytes(&self) -> usize {
        self.max_bytes
    }

    fn allows_empty(&self) -> bool {
        true
    }

    fn guard(&self, value: &Value, field: &Field) -> MessageResult<()> {
        let Value::Binary(bytes) = value else {
            return Err(unexpected_kind(field, "binary", value));
        };
        check_length(field, self, encoded_len(bytes))
    }

    fn encode(&self, value: &Value, field: &Field, _codec: &dyn Codec) -> MessageResult<JsonValue> {
        let Value::Binary(bytes) = value else {
            return Err(encode_failed(field, value, "expected binary data"));
        };
        if bytes.is_empty() {
            return Ok(JsonValue::Null);
        }
        if binary_base64() {
            return Ok(JsonValue::String(general_purpose::STANDARD.encode(bytes)));
        }
        std::str::from_utf8(bytes)
            .map(|text| JsonValue::String(text.trim().to_string()))
            .map_err(|e| encode_failed(field, value, e))
    }

    fn decode(
        &self,
        value: &JsonValue,
        field: &Field,
        _codec: &dyn Codec,
    ) -> MessageResult<Option<Value>> {
        let text = match value {
            JsonValue::String(s) => s.trim(),
            JsonValue::Null => return Ok(None),
            other => return Err(decode_failed(field, other, "expected a string")),
        };
        if text.is_empty() {
            return Ok(None);
        }
        if binary_base64() {
            return general_purpose::STANDARD
                .decode(text)
                .map(|bytes| Some(Value::Binary(bytes)))
                .map_err(|e| decode_failed(field, value, e));
        }
        Ok(Some(Value::Binary(text.as_bytes().to_vec())))
    }
}
