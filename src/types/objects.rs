//! Value object types whose wire shape is chosen by the codec.

use serde_json::Value as JsonValue;

use super::{decode_failed, encode_failed, trimmed_text, unexpected_kind, Type, TypeName};
use crate::error::MessageResult;
use crate::objects::NodeRef;
use crate::schema::Field;
use crate::serializers::Codec;
use crate::value::Value;

#[derive(Debug)]
pub struct GeoPointType;

pub static GEO_POINT: GeoPointType = GeoPointType;

impl Type for GeoPointType {
    fn type_name(&self) -> TypeName {
        TypeName::GeoPoint
    }

    fn is_scalar(&self) -> bool {
        false
    }

    fn encodes_to_scalar(&self) -> bool {
        false
    }

    fn guard(&self, value: &Value, field: &Field) -> MessageResult<()> {
        match value {
            Value::GeoPoint(_) => Ok(()),
            other => Err(unexpected_kind(field, "geo point", other)),
        }
    }

    fn encode(&self, value: &Value, field: &Field, codec: &dyn Codec) -> MessageResult<JsonValue> {
        match value {
            Value::GeoPoint(point) => codec.encode_geo_point(point, field),
            other => Err(encode_failed(field, other, "expected a geo point")),
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
            .decode_geo_point(value, field)
            .map(|point| Some(Value::GeoPoint(point)))
    }
}

#[derive(Debug)]
pub struct MessageRefType;

pub static MESSAGE_REF: MessageRefType = MessageRefType;

impl Type for MessageRefType {
    fn type_name(&self) -> TypeName {
        TypeName::MessageRef
    }

    fn is_scalar(&self) -> bool {
        false
    }

    fn encodes_to_scalar(&self) -> bool {
        false
    }

    fn guard(&self, value: &Value, field: &Field) -> MessageResult<()> {
        match value {
            Value::MessageRef(_) => Ok(()),
            other => Err(unexpected_kind(field, "message ref", other)),
        }
    }

    fn encode(&self, value: &Value, field: &Field, codec: &dyn Codec) -> MessageResult<JsonValue> {
        match value {
            Value::MessageRef(reference) => codec.encode_message_ref(reference, field),
            other => Err(encode_failed(field, other, "expected a message ref")),
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
            .decode_message_ref(value, field)
            .map(|reference| Some(Value::MessageRef(reference)))
    }
}

/// Node refs always travel in their `vendor:label:id` string form.
#[derive(Debug)]
pub struct NodeRefType;

pub static NODE_REF: NodeRefType = NodeRefType;

impl Type for NodeRefType {
    fn type_name(&self) -> TypeName {
        TypeName::NodeRef
    }

    fn is_scalar(&self) -> bool {
        false
    }

    fn guard(&self, value: &Value, field: &Field) -> MessageResult<()> {
        match value {
            Value::NodeRef(_) => Ok(()),
            other => Err(unexpected_kind(field, "node ref", other)),
        }
    }

    fn encode(&self, value: &Value, field: &Field, _codec: &dyn Codec) -> MessageResult<JsonValue> {
        match value {
            Value::NodeRef(node) => Ok(JsonValue::String(node.to_string())),
            other => Err(encode_failed(field, other, "expected a node ref")),
        }
    }

    fn decode(
        &self,
        value: &JsonValue,
        field: &Field,
        _codec: &dyn Codec,
    ) -> MessageResult<Option<Value>> {
        let Some(text) = trimmed_text(value) else {
            return Ok(None);
        };
        NodeRef::from_string(&text)
            .map(|node| Some(Value::NodeRef(node)))
            .map_err(|e| decode_failed(field, value, e))
    }
}

#[derive(Debug)]
pub struct DynamicFieldType;

pub static DYNAMIC_FIELD: DynamicFieldType = DynamicFieldType;

impl Type for DynamicFieldType {
    fn type_name(&self) -> TypeName {
        TypeName::DynamicField
    }

    fn is_scalar(&self) -> bool {
        false
    }

    fn encodes_to_scalar(&self) -> bool {
        false
    }

    fn guard(&self, value: &Value, field: &Field) -> MessageResult<()> {
        match value {
            Value::DynamicField(_) => Ok(()),
            other => Err(unexpected_kind(field, "dynamic field", other)),
        }
    }

    fn encode(&self, value: &Value, field: &Field, codec: &dyn Codec) -> MessageResult<JsonValue> {
        match value {
            Value::DynamicField(dynamic) => codec.encode_dynamic_field(dynamic, field),
            other => Err(encode_failed(field, other, "expected a dynamic field")),
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
            .decode_dynamic_field(value, field)
            .map(|dynamic| Some(Value::DynamicField(dynamic)))
    }
}
