//! Wire serializers and the codec contract types call back into.

pub mod json;
pub mod object;

use serde_json::Value as JsonValue;

use crate::error::MessageResult;
use crate::message::Message;
use crate::objects::{DynamicField, GeoPoint, MessageRef};
use crate::schema::Field;

pub use json::JsonSerializer;
pub use object::ObjectSerializer;

/// Wire shape of the complex kinds. Types hand these values to the codec so
/// each serializer decides how they look on the wire.
pub trait Codec: Send + Sync {
    fn encode_message(&self, message: &Message, field: &Field) -> MessageResult<JsonValue>;

    fn decode_message(&self, value: &JsonValue, field: &Field) -> MessageResult<Message>;

    fn encode_message_ref(&self, reference: &MessageRef, field: &Field)
        -> MessageResult<JsonValue>;

    fn decode_message_ref(&self, value: &JsonValue, field: &Field) -> MessageResult<MessageRef>;

    fn encode_geo_point(&self, point: &GeoPoint, field: &Field) -> MessageResult<JsonValue>;

    fn decode_geo_point(&self, value: &JsonValue, field: &Field) -> MessageResult<GeoPoint>;

    fn encode_dynamic_field(
        &self,
        dynamic: &DynamicField,
        field: &Field,
    ) -> MessageResult<JsonValue>;

    fn decode_dynamic_field(&self, value: &JsonValue, field: &Field)
        -> MessageResult<DynamicField>;
}

/// Output options for text serialization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SerializeOptions {
    pub pretty: bool,
}

impl SerializeOptions {
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}
