//! Raw binary mode flips a process-wide toggle, so it lives in its own test binary.

use msgfold::types::{binary_base64, set_binary_base64};
use msgfold::{FieldBuilder, ObjectSerializer, Schema, TypeName, Value};
use serde_json::json;

#[tokio::test]
async fn test_binary_fields_switch_between_base64_and_raw() {
    let schema = Schema::new(
        "acme:files:node:attachment:1-0-0",
        vec![FieldBuilder::new("payload", TypeName::Blob).build().unwrap()],
        vec![],
    )
    .unwrap();
    let mut message = schema.create_message();
    message.set("payload", b"hello".to_vec()).unwrap();
    let serializer = ObjectSerializer::default();

    assert!(binary_base64());
    let encoded = serializer.serialize(&message).unwrap();
    assert_eq!(encoded["payload"], json!("aGVsbG8="));

    set_binary_base64(false);
    let encoded = serializer.serialize(&message).unwrap();
    assert_eq!(encoded["payload"], json!("hello"));

    let decoded = serializer
        .deserialize_with_schema(&schema, &json!({"payload": "  raw bytes "}))
        .await
        .unwrap();
    assert_eq!(
        decoded.get_single("payload"),
        Some(&Value::Binary(b"raw bytes".to_vec()))
    );

    set_binary_base64(true);
    assert!(binary_base64());
}
