//! Named union of a handful of primitive kinds.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value as JsonValue};
use std::fmt;
use std::str::FromStr;

use crate::error::{MessageError, MessageResult};
use crate::schema::{Field, FieldBuilder};
use crate::serializers::Codec;
use crate::types::TypeName;
use crate::value::Value;

static NAME_REGEX: Lazy<Regex> = Lazy::new(|| match Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_-]*$") {
    Ok(regex) => regex,
    Err(e) => panic!("invalid built-in dynamic field name pattern: {e}"),
});

const MAX_NAME_BYTES: usize = 127;

fn kind_field(name: &str, type_name: TypeName) -> Field {
    match FieldBuilder::new(name, type_name).build() {
        Ok(field) => field,
        Err(e) => panic!("invalid built-in dynamic field {name}: {e}"),
    }
}

static BOOL_VAL: Lazy<Field> = Lazy::new(|| kind_field("bool_val", TypeName::Boolean));
static DATE_VAL: Lazy<Field> = Lazy::new(|| kind_field("date_val", TypeName::Date));
static FLOAT_VAL: Lazy<Field> = Lazy::new(|| kind_field("float_val", TypeName::Float));
static INT_VAL: Lazy<Field> = Lazy::new(|| kind_field("int_val", TypeName::Int));
static STRING_VAL: Lazy<Field> = Lazy::new(|| kind_field("string_val", TypeName::String));
static TEXT_VAL: Lazy<Field> = Lazy::new(|| kind_field("text_val", TypeName::Text));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DynamicFieldKind {
    BoolVal,
    DateVal,
    FloatVal,
    IntVal,
    StringVal,
    TextVal,
}

impl DynamicFieldKind {
    pub const ALL: [DynamicFieldKind; 6] = [
        Self::BoolVal,
        Self::DateVal,
        Self::FloatVal,
        Self::IntVal,
        Self::StringVal,
        Self::TextVal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BoolVal => "bool_val",
            Self::DateVal => "date_val",
            Self::FloatVal => "float_val",
            Self::IntVal => "int_val",
            Self::StringVal => "string_val",
            Self::TextVal => "text_val",
        }
    }

    /// The shared field guarding and encoding values of this kind.
    pub fn field(&self) -> &'static Field {
        match self {
            Self::BoolVal => &BOOL_VAL,
            Self::DateVal => &DATE_VAL,
            Self::FloatVal => &FLOAT_VAL,
            Self::IntVal => &INT_VAL,
            Self::StringVal => &STRING_VAL,
            Self::TextVal => &TEXT_VAL,
        }
    }
}

impl fmt::Display for DynamicFieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DynamicFieldKind {
    type Err = MessageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| MessageError::assertion(format!("Unknown dynamic field kind [{s}]")))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DynamicField {
    name: String,
    kind: DynamicFieldKind,
    value: Box<Value>,
}

impl DynamicField {
    pub fn new(name: &str, kind: DynamicFieldKind, value: Value) -> MessageResult<Self> {
        if name.len() > MAX_NAME_BYTES || !NAME_REGEX.is_match(name) {
            return Err(MessageError::assertion(format!(
                "Dynamic field name [{name}] is invalid"
            )));
        }
        kind.field().guard_value(&value)?;
        Ok(Self {
            name: name.to_string(),
            kind,
            value: Box::new(value),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> DynamicFieldKind {
        self.kind
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// `{"name": ..., "<kind>": <encoded value>}`
    pub fn to_object(&self, codec: &dyn Codec) -> MessageResult<JsonValue> {
        let field = self.kind.field();
        let encoded = field.get_type().encode(&self.value, field, codec)?;
        let mut object = Map::new();
        object.insert("name".to_string(), JsonValue::String(self.name.clone()));
        object.insert(self.kind.as_str().to_string(), encoded);
        Ok(JsonValue::Object(object))
    }

    pub fn from_object(object: &JsonValue, codec: &dyn Codec) -> MessageResult<Self> {
        let invalid = |reason: &str| {
            MessageError::assertion(format!("Dynamic field [{object}] is invalid: {reason}"))
        };
        let map = object.as_object().ok_or_else(|| invalid("expected an object"))?;
        let name = map
            .get("name")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| invalid("missing name"))?;
        let (kind, raw) = DynamicFieldKind::ALL
            .iter()
            .find_map(|kind| map.get(kind.as_str()).map(|raw| (*kind, raw)))
            .ok_or_else(|| invalid("missing value"))?;
        let field = kind.field();
        let value = field
            .get_type()
            .decode(raw, field, codec)?
            .ok_or_else(|| invalid("value is empty"))?;
        Self::new(name, kind, value)
    }
}

impl fmt::Display for DynamicField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}={}", self.name, self.kind, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serializers::ObjectSerializer;
    use serde_json::json;

    #[test]
    fn test_new_guards_value_with_kind_field() {
        assert!(DynamicField::new("flag", DynamicFieldKind::BoolVal, Value::Bool(true)).is_ok());
        assert!(DynamicField::new("flag", DynamicFieldKind::BoolVal, Value::Int(1)).is_err());
        assert!(DynamicField::new("bad name", DynamicFieldKind::IntVal, Value::Int(1)).is_err());
    }

    #[test]
    fn test_object_form() {
        let codec = ObjectSerializer::default();
        let dynamic = DynamicField::from_object(&json!({"name": "title", "string_val": " Hi "}), &codec)
            .unwrap();
        assert_eq!(dynamic.kind(), DynamicFieldKind::StringVal);
        assert_eq!(dynamic.value(), &Value::from("Hi"));
        assert_eq!(
            dynamic.to_object(&codec).unwrap(),
            json!({"name": "title", "string_val": "Hi"})
        );
        assert!(DynamicField::from_object(&json!({"name": "x"}), &codec).is_err());
        let wrapped = Value::DynamicField(dynamic.clone());
        assert_eq!(wrapped, Value::DynamicField(dynamic));
        assert_eq!("int_val".parse::<DynamicFieldKind>().unwrap(), DynamicFieldKind::IntVal);
    }
}
