//! Message <-> JSON text serializer, a thin layer over [`ObjectSerializer`].

use serde_json::Value as JsonValue;
use std::sync::Arc;

use super::{ObjectSerializer, SerializeOptions};
use crate::error::{preview, MessageError, MessageResult};
use crate::message::Message;
use crate::resolver::MessageResolver;
use crate::schema::Schema;

#[derive(Clone, Default)]
pub struct JsonSerializer {
    inner: ObjectSerializer,
}

impl JsonSerializer {
    pub fn new(resolver: Arc<MessageResolver>) -> Self {
        Self {
            inner: ObjectSerializer::new(resolver),
        }
    }

    pub fn serialize(&self, message: &Message, options: &SerializeOptions) -> MessageResult<String> {
        let object = self.inner.serialize(message)?;
        let text = if options.pretty {
            serde_json::to_string_pretty(&object)
        } else {
            serde_json::to_string(&object)
        };
        text.map_err(|e| MessageError::assertion(format!("Unable to write JSON: {e}")))
    }

    pub async fn deserialize(&self, json: &str) -> MessageResult<Message> {
        let payload = parse(json)?;
        self.inner.deserialize(&payload).await
    }

    pub async fn deserialize_with_schema(
        &self,
        schema: &Arc<Schema>,
        json: &str,
    ) -> MessageResult<Message> {
        let payload = parse(json)?;
        self.inner.deserialize_with_schema(schema, &payload).await
    }
}

fn parse(json: &str) -> MessageResult<JsonValue> {
    serde_json::from_str(json).map_err(|e| {
        MessageError::assertion(format!("Invalid JSON [{}]: {e}", preview(json)))
    })
}
