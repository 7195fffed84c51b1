//! Message <-> `serde_json::Value` serializer.
//!
//! Deserialization runs in two phases. The root `_schema` is resolved through
//! the [`MessageResolver`], then the discriminators carried by that schema's
//! message fields, level by level and concurrently within a level. Keys the
//! schema does not declare are never looked at. The payload is then decoded
//! synchronously against the now bound schemas, so types can recurse through
//! the codec without awaiting.

use futures::future::{try_join_all, BoxFuture};
use futures::FutureExt;
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::Codec;
use crate::constants::SCHEMA_FIELD_NAME;
use crate::error::{MessageError, MessageResult};
use crate::message::{FieldData, Message};
use crate::objects::{DynamicField, GeoPoint, MessageRef};
use crate::resolver::MessageResolver;
use crate::schema::{Field, FieldRule, Schema, SchemaId};
use crate::types::decode_failed;
use crate::value::Value;

#[derive(Clone)]
pub struct ObjectSerializer {
    resolver: Arc<MessageResolver>,
}

impl Default for ObjectSerializer {
    fn default() -> Self {
        Self::new(MessageResolver::global())
    }
}

impl ObjectSerializer {
    pub fn new(resolver: Arc<MessageResolver>) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &Arc<MessageResolver> {
        &self.resolver
    }

    /// Validates the message, then encodes every set field.
    pub fn serialize(&self, message: &Message) -> MessageResult<JsonValue> {
        message.validate(false, false)?;

        let mut object = Map::new();
        for field in message.schema().fields() {
            let Some(data) = message.data().get(field.name()) else {
                continue;
            };
            let ty = field.get_type();
            let encoded = match data {
                FieldData::Single(value) => ty.encode(value, field, self)?,
                FieldData::Set(entries) => {
                    self.encode_items(entries.iter().map(|(_, v)| v), field)?
                }
                FieldData::List(items) => self.encode_items(items.iter(), field)?,
                FieldData::Map(entries) => {
                    let mut encoded = Map::new();
                    for (key, value) in entries {
                        let item = ty.encode(value, field, self)?;
                        if !item.is_null() {
                            encoded.insert(key.clone(), item);
                        }
                    }
                    if encoded.is_empty() {
                        JsonValue::Null
                    } else {
                        JsonValue::Object(encoded)
                    }
                }
            };
            if !encoded.is_null() {
                object.insert(field.name().to_string(), encoded);
            }
        }
        Ok(JsonValue::Object(object))
    }

    fn encode_items<'a>(
        &self,
        items: impl Iterator<Item = &'a Value>,
        field: &Field,
    ) -> MessageResult<JsonValue> {
        let ty = field.get_type();
        let mut encoded = Vec::new();
        for value in items {
            let item = ty.encode(value, field, self)?;
            if !item.is_null() {
                encoded.push(item);
            }
        }
        if encoded.is_empty() {
            return Ok(JsonValue::Null);
        }
        Ok(JsonValue::Array(encoded))
    }

    /// Builds a message from a payload carrying its own `_schema`.
    pub async fn deserialize(&self, payload: &JsonValue) -> MessageResult<Message> {
        let object = payload_object(payload)?;
        let id = declared_id(object)?;
        let schema = self.resolver.resolve_id(&id).await?;
        self.preload(schema, object).await?;
        self.decode_payload(payload, None)
    }

    /// Builds a message of `schema` from a payload. The payload's own
    /// `_schema`, if any, is replaced by the schema id.
    pub async fn deserialize_with_schema(
        &self,
        schema: &Arc<Schema>,
        payload: &JsonValue,
    ) -> MessageResult<Message> {
        self.preload(schema.clone(), payload_object(payload)?).await?;
        self.decode_payload(payload, Some(schema))
    }

    /// Resolves the schemas of the nested messages held by `schema`'s message
    /// fields, then recurses into each of them.
    fn preload<'a>(
        &'a self,
        schema: Arc<Schema>,
        object: &'a Map<String, JsonValue>,
    ) -> BoxFuture<'a, MessageResult<()>> {
        async move {
            let children = nested_messages(&schema, object);
            if children.is_empty() {
                return Ok(());
            }

            let resolutions = children.into_iter().map(|(id, child)| async move {
                let resolved = self.resolver.resolve_id(&id).await?;
                self.preload(resolved, child).await
            });
            try_join_all(resolutions).await?;
            Ok(())
        }
        .boxed()
    }

    fn decode_payload(
        &self,
        payload: &JsonValue,
        schema: Option<&Arc<Schema>>,
    ) -> MessageResult<Message> {
        let object = payload_object(payload)?;

        let schema = match schema {
            Some(schema) => schema.clone(),
            None => self.resolve_declared(object)?,
        };

        let mut message = Message::empty(&schema);
        for field in schema.fields() {
            if field.name() == SCHEMA_FIELD_NAME {
                continue;
            }
            match object.get(field.name()) {
                None => {}
                Some(JsonValue::Null) => message.mark_cleared(field.name()),
                Some(raw) => {
                    if let Some(data) = self.decode_field(raw, field)? {
                        message.store_decoded(field, data)?;
                    }
                }
            }
        }

        let schema_field = schema.field(SCHEMA_FIELD_NAME)?;
        message.store_decoded(
            schema_field,
            FieldData::Single(Value::String(schema.id().to_string())),
        )?;
        message.populate_defaults(None)?;
        Ok(message)
    }

    fn resolve_declared(&self, object: &Map<String, JsonValue>) -> MessageResult<Arc<Schema>> {
        let id = declared_id(object)?;
        let resolved = self.resolver.resolve_id_now(&id)?;
        if resolved.curie() != id.curie() {
            return Err(MessageError::InvalidResolvedSchema {
                expected: id.to_string(),
                resolved: resolved.id().to_string(),
            });
        }
        Ok(resolved)
    }

    /// Decodes one field's wire value. `None` means nothing worth storing.
    fn decode_field(&self, raw: &JsonValue, field: &Field) -> MessageResult<Option<FieldData>> {
        let ty = field.get_type();
        match field.rule() {
            FieldRule::Single => Ok(ty.decode(raw, field, self)?.map(FieldData::Single)),
            FieldRule::Set | FieldRule::List => {
                let items = raw
                    .as_array()
                    .ok_or_else(|| decode_failed(field, raw, "expected an array"))?;
                let mut decoded = Vec::with_capacity(items.len());
                for item in items {
                    if let Some(value) = ty.decode(item, field, self)? {
                        decoded.push(value);
                    }
                }
                Ok(Some(if field.rule() == FieldRule::Set {
                    FieldData::Set(decoded.into_iter().map(|v| (String::new(), v)).collect())
                } else {
                    FieldData::List(decoded)
                }))
            }
            FieldRule::Map => {
                let entries = raw
                    .as_object()
                    .ok_or_else(|| decode_failed(field, raw, "expected an object"))?;
                let mut decoded = BTreeMap::new();
                for (key, item) in entries {
                    if let Some(value) = ty.decode(item, field, self)? {
                        decoded.insert(key.clone(), value);
                    }
                }
                Ok(Some(FieldData::Map(decoded)))
            }
        }
    }
}

fn payload_object(payload: &JsonValue) -> MessageResult<&Map<String, JsonValue>> {
    payload.as_object().ok_or_else(|| {
        MessageError::assertion(format!("Message payload must be an object, got [{payload}]"))
    })
}

fn declared_id(object: &Map<String, JsonValue>) -> MessageResult<Arc<SchemaId>> {
    let declared = object
        .get(SCHEMA_FIELD_NAME)
        .and_then(JsonValue::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            MessageError::SchemaNotDefined(format!("Payload has no [{SCHEMA_FIELD_NAME}] field"))
        })?;
    SchemaId::from_string(declared)
}

/// Nested message objects under `schema`'s message fields, paired with the
/// schema id each one declares. Objects without a usable id are left for the
/// decode pass to reject.
fn nested_messages<'a>(
    schema: &Schema,
    object: &'a Map<String, JsonValue>,
) -> Vec<(Arc<SchemaId>, &'a Map<String, JsonValue>)> {
    let mut nested = Vec::new();
    for field in schema.fields() {
        if !field.get_type().is_message() {
            continue;
        }
        let Some(raw) = object.get(field.name()) else {
            continue;
        };
        let candidates: Vec<&JsonValue> = match (field.rule(), raw) {
            (FieldRule::Single, _) => vec![raw],
            (FieldRule::Set | FieldRule::List, JsonValue::Array(items)) => items.iter().collect(),
            (FieldRule::Map, JsonValue::Object(entries)) => entries.values().collect(),
            _ => Vec::new(),
        };
        for child in candidates.into_iter().filter_map(JsonValue::as_object) {
            if let Ok(id) = declared_id(child) {
                nested.push((id, child));
            }
        }
    }
    nested
}

impl Codec for ObjectSerializer {
    fn encode_message(&self, message: &Message, _field: &Field) -> MessageResult<JsonValue> {
        self.serialize(message)
    }

    fn decode_message(&self, value: &JsonValue, _field: &Field) -> MessageResult<Message> {
        self.decode_payload(value, None)
    }

    fn encode_message_ref(
        &self,
        reference: &MessageRef,
        _field: &Field,
    ) -> MessageResult<JsonValue> {
        Ok(reference.to_object())
    }

    fn decode_message_ref(&self, value: &JsonValue, field: &Field) -> MessageResult<MessageRef> {
        let result = match value {
            JsonValue::String(s) => MessageRef::from_string(s.trim()),
            other => MessageRef::from_object(other),
        };
        result.map_err(|e| decode_failed(field, value, e))
    }

    fn encode_geo_point(&self, point: &GeoPoint, _field: &Field) -> MessageResult<JsonValue> {
        Ok(point.to_object())
    }

    fn decode_geo_point(&self, value: &JsonValue, field: &Field) -> MessageResult<GeoPoint> {
        let result = match value {
            JsonValue::String(s) => GeoPoint::from_string(s),
            other => GeoPoint::from_object(other),
        };
        result.map_err(|e| decode_failed(field, value, e))
    }

    fn encode_dynamic_field(
        &self,
        dynamic: &DynamicField,
        _field: &Field,
    ) -> MessageResult<JsonValue> {
        dynamic.to_object(self)
    }

    fn decode_dynamic_field(
        &self,
        value: &JsonValue,
        field: &Field,
    ) -> MessageResult<DynamicField> {
        DynamicField::from_object(value, self).map_err(|e| match e {
            MessageError::AssertionFailed(reason) => decode_failed(field, value, reason),
            other => other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldBuilder;
    use crate::types::TypeName;
    use serde_json::json;

    fn resolver_with(schema: &Arc<Schema>) -> Arc<MessageResolver> {
        let resolver = Arc::new(MessageResolver::new());
        resolver.register_schema(schema.clone());
        resolver
    }

    fn article() -> Arc<Schema> {
        Schema::new(
            "acme:blog:node:object-article:1-0-0",
            vec![
                FieldBuilder::new("title", TypeName::String).build().unwrap(),
                FieldBuilder::new("tags", TypeName::String).as_a_set().build().unwrap(),
                FieldBuilder::new("scores", TypeName::Int).as_a_map().build().unwrap(),
            ],
            vec![],
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_serialize_shapes_by_rule() {
        let schema = article();
        let serializer = ObjectSerializer::new(resolver_with(&schema));

        let mut message = schema.create_message();
        message.set("title", " Hello ").unwrap();
        message.add_to_set("tags", ["A", "b"]).unwrap();
        message.add_to_map("scores", "x", 3).unwrap();

        let object = serializer.serialize(&message).unwrap();
        assert_eq!(
            object,
            json!({
                "_schema": "acme:blog:node:object-article:1-0-0",
                "title": "Hello",
                "tags": ["A", "b"],
                "scores": {"x": 3},
            })
        );

        let decoded = serializer.deserialize(&object).await.unwrap();
        assert!(decoded.equals(&message));
    }

    #[tokio::test]
    async fn test_null_clears_and_unknown_keys_are_ignored() {
        let schema = article();
        let serializer = ObjectSerializer::new(resolver_with(&schema));
        let decoded = serializer
            .deserialize(&json!({
                "_schema": "acme:blog:node:object-article:1-0-0",
                "title": null,
                "unknown": 1,
            }))
            .await
            .unwrap();
        assert!(!decoded.has("title"));
        assert!(decoded.has_cleared_field("title"));
    }

    #[tokio::test]
    async fn test_undeclared_keys_are_not_resolved() {
        let schema = article();
        let serializer = ObjectSerializer::new(resolver_with(&schema));
        let payload = json!({
            "_schema": "acme:blog:node:object-article:1-0-0",
            "title": "x",
            "future_field": {"_schema": "acme:blog:node:not-registered:1-0-0"},
            "future_list": [{"_schema": "acme:blog:node:not-registered-either:1-0-0"}],
        });

        let decoded = serializer.deserialize(&payload).await.unwrap();
        assert_eq!(decoded.get_single("title"), Some(&Value::from("x")));

        let decoded = serializer.deserialize_with_schema(&schema, &payload).await.unwrap();
        assert_eq!(decoded.get_single("title"), Some(&Value::from("x")));
    }

    #[tokio::test]
    async fn test_missing_schema_is_rejected() {
        let serializer = ObjectSerializer::new(Arc::new(MessageResolver::new()));
        let result = serializer.deserialize(&json!({"title": "x"})).await;
        assert!(matches!(result, Err(MessageError::SchemaNotDefined(_))));
        let result = serializer.deserialize(&json!({"_schema": " "})).await;
        assert!(matches!(result, Err(MessageError::SchemaNotDefined(_))));
    }

    #[tokio::test]
    async fn test_deserialize_with_schema_stamps_id() {
        let schema = article();
        let serializer = ObjectSerializer::new(Arc::new(MessageResolver::new()));
        let message = serializer
            .deserialize_with_schema(&schema, &json!({"title": "x"}))
            .await
            .unwrap();
        assert_eq!(
            message.get_single("_schema"),
            Some(&Value::from("acme:blog:node:object-article:1-0-0"))
        );
    }

    #[tokio::test]
    async fn test_decode_failures_abort() {
        let schema = article();
        let serializer = ObjectSerializer::new(resolver_with(&schema));
        let result = serializer
            .deserialize(&json!({
                "_schema": "acme:blog:node:object-article:1-0-0",
                "tags": "not-an-array",
            }))
            .await;
        assert!(matches!(result, Err(MessageError::DecodeValueFailed { .. })));
    }
}
