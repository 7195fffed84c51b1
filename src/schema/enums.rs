//! Closed enumerations backing `string-enum` and `int-enum` fields.

use std::sync::Arc;

use crate::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum EnumValue {
    String(String),
    Int(i64),
}

impl EnumValue {
    fn to_value(&self) -> Value {
        match self {
            Self::String(s) => Value::String(s.clone()),
            Self::Int(i) => Value::Int(*i),
        }
    }

    fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::String(a), Value::String(b)) => a == b,
            (Self::Int(a), Value::Int(b)) => a == b,
            _ => false,
        }
    }
}

/// A named, ordered set of enum cases (`KEY` => value).
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDef {
    name: String,
    cases: Vec<(String, EnumValue)>,
}

impl EnumDef {
    pub fn from_strings(name: &str, cases: &[(&str, &str)]) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            cases: cases
                .iter()
                .map(|(key, value)| (key.to_string(), EnumValue::String(value.to_string())))
                .collect(),
        })
    }

    pub fn from_ints(name: &str, cases: &[(&str, i64)]) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            cases: cases
                .iter()
                .map(|(key, value)| (key.to_string(), EnumValue::Int(*value)))
                .collect(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_string_enum(&self) -> bool {
        self.cases
            .iter()
            .all(|(_, v)| matches!(v, EnumValue::String(_)))
    }

    pub fn is_int_enum(&self) -> bool {
        self.cases.iter().all(|(_, v)| matches!(v, EnumValue::Int(_)))
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.cases.iter().any(|(_, v)| v.matches(value))
    }

    pub fn key_of(&self, value: &Value) -> Option<&str> {
        self.cases
            .iter()
            .find(|(_, v)| v.matches(value))
            .map(|(k, _)| k.as_str())
    }

    /// Looks up a case by its key, e.g. `PUBLISHED`.
    pub fn value_of(&self, key: &str) -> Option<Value> {
        self.cases
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.to_value())
    }

    pub fn values(&self) -> Vec<Value> {
        self.cases.iter().map(|(_, v)| v.to_value()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_enum_lookup() {
        let status = EnumDef::from_strings("status", &[("DRAFT", "draft"), ("PUBLISHED", "published")]);
        assert!(status.is_string_enum());
        assert!(status.contains(&Value::from("draft")));
        assert!(!status.contains(&Value::from("DRAFT")));
        assert_eq!(status.key_of(&Value::from("published")), Some("PUBLISHED"));
        assert_eq!(status.value_of("DRAFT"), Some(Value::from("draft")));
    }

    #[test]
    fn test_int_enum_lookup() {
        let priority = EnumDef::from_ints("priority", &[("LOW", 1), ("HIGH", 3)]);
        assert!(priority.is_int_enum());
        assert!(priority.contains(&Value::Int(3)));
        assert!(!priority.contains(&Value::Int(2)));
        assert!(!priority.contains(&Value::from("3")));
    }
}
