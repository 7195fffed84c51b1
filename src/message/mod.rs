//! Runtime message container.
//!
//! A [`Message`] holds values for the fields of its [`Schema`], stored per
//! cardinality rule. Every mutation is guarded by the field and its type.
//! Once frozen a message never changes again; `clone_mutable` produces an
//! editable deep copy.

mod storage;

pub use storage::FieldValue;
pub(crate) use storage::FieldData;

use serde_json::Value as JsonValue;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use crate::error::{MessageError, MessageResult};
use crate::schema::{Field, FieldRule, Schema};
use crate::serializers::{JsonSerializer, ObjectSerializer, SerializeOptions};
use crate::value::Value;

#[derive(Debug, Clone)]
pub struct Message {
    schema: Arc<Schema>,
    data: HashMap<String, FieldData>,
    cleared: BTreeSet<String>,
    frozen: bool,
    replay: Option<bool>,
}

impl Message {
    /// Fresh message with every default populated.
    pub fn create(schema: &Arc<Schema>) -> Self {
        let mut message = Self::empty(schema);
        message.apply_defaults(None);
        message
    }

    /// Message without defaults, used as the decode target.
    pub(crate) fn empty(schema: &Arc<Schema>) -> Self {
        Self {
            schema: schema.clone(),
            data: HashMap::new(),
            cleared: BTreeSet::new(),
            frozen: false,
            replay: None,
        }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// True only when replay was explicitly set to true.
    pub fn is_replay(&self) -> bool {
        self.replay == Some(true)
    }

    pub fn replay(&self) -> Option<bool> {
        self.replay
    }

    /// Sets the replay flag. It can be set once; `true` also freezes the message.
    pub fn set_replay(&mut self, replay: bool) -> MessageResult<()> {
        if self.replay.is_some() {
            return Err(MessageError::LogicException(format!(
                "Replay mode on message [{}] can only be set once",
                self.schema.id()
            )));
        }
        if replay {
            self.freeze(false)?;
        }
        self.replay = Some(replay);
        Ok(())
    }

    /// Absent fields, empty collections and unknown names are all unset.
    pub fn has(&self, name: &str) -> bool {
        self.data.get(name).is_some_and(|data| !data.is_empty())
    }

    /// Copy of the field's current content.
    pub fn get(&self, name: &str) -> Option<FieldValue> {
        self.data
            .get(name)
            .filter(|data| !data.is_empty())
            .map(FieldData::to_field_value)
    }

    pub fn get_single(&self, name: &str) -> Option<&Value> {
        match self.data.get(name) {
            Some(FieldData::Single(value)) => Some(value),
            _ => None,
        }
    }

    pub fn get_list(&self, name: &str) -> Vec<Value> {
        match self.data.get(name) {
            Some(FieldData::List(items)) => items.clone(),
            _ => Vec::new(),
        }
    }

    pub fn get_set(&self, name: &str) -> Vec<Value> {
        match self.data.get(name) {
            Some(FieldData::Set(entries)) => entries.iter().map(|(_, v)| v.clone()).collect(),
            _ => Vec::new(),
        }
    }

    pub fn get_map(&self, name: &str) -> BTreeMap<String, Value> {
        match self.data.get(name) {
            Some(FieldData::Map(entries)) => entries.clone(),
            _ => BTreeMap::new(),
        }
    }

    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> MessageResult<&mut Self> {
        let field = self.field_for_mutation(name, FieldRule::Single)?;
        let value = value.into();
        field.guard_value(&value)?;
        self.data.insert(name.to_string(), FieldData::Single(value));
        self.cleared.remove(name);
        Ok(self)
    }

    /// Unsets the field and records it as cleared.
    pub fn clear(&mut self, name: &str) -> MessageResult<&mut Self> {
        self.ensure_mutable()?;
        self.schema.field(name)?;
        self.data.remove(name);
        self.cleared.insert(name.to_string());
        Ok(self)
    }

    pub fn cleared_fields(&self) -> Vec<String> {
        self.cleared.iter().cloned().collect()
    }

    pub fn has_cleared_field(&self, name: &str) -> bool {
        self.cleared.contains(name)
    }

    pub fn is_in_set(&self, name: &str, value: impl Into<Value>) -> bool {
        let Some(key) = value.into().set_key() else {
            return false;
        };
        match self.data.get(name) {
            Some(FieldData::Set(entries)) => entries.iter().any(|(k, _)| *k == key),
            _ => false,
        }
    }

    /// Adds items keyed by their normalized form. A colliding key keeps its
    /// position and takes the new value.
    pub fn add_to_set<I>(&mut self, name: &str, values: I) -> MessageResult<&mut Self>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let field = self.field_for_mutation(name, FieldRule::Set)?;
        let values = guard_all(&field, values)?;

        let entry = self
            .data
            .entry(name.to_string())
            .or_insert_with(|| FieldData::Set(Vec::new()));
        if let FieldData::Set(entries) = entry {
            for value in values {
                insert_set_entry(entries, value);
            }
        }
        self.cleared.remove(name);
        Ok(self)
    }

    pub fn remove_from_set<I>(&mut self, name: &str, values: I) -> MessageResult<&mut Self>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.field_for_mutation(name, FieldRule::Set)?;
        let keys: Vec<String> = values
            .into_iter()
            .filter_map(|v| v.into().set_key())
            .filter(|k| !k.is_empty())
            .collect();
        if let Some(FieldData::Set(entries)) = self.data.get_mut(name) {
            entries.retain(|(k, _)| !keys.contains(k));
        }
        Ok(self)
    }

    pub fn is_in_list(&self, name: &str, value: &Value) -> bool {
        match self.data.get(name) {
            Some(FieldData::List(items)) => items.contains(value),
            _ => false,
        }
    }

    pub fn get_from_list_at(&self, name: &str, index: usize) -> Option<&Value> {
        match self.data.get(name) {
            Some(FieldData::List(items)) => items.get(index),
            _ => None,
        }
    }

    pub fn add_to_list<I>(&mut self, name: &str, values: I) -> MessageResult<&mut Self>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let field = self.field_for_mutation(name, FieldRule::List)?;
        let values = guard_all(&field, values)?;

        let entry = self
            .data
            .entry(name.to_string())
            .or_insert_with(|| FieldData::List(Vec::new()));
        if let FieldData::List(items) = entry {
            items.extend(values);
        }
        self.cleared.remove(name);
        Ok(self)
    }

    /// Removes every item equal to any of `values`.
    pub fn remove_from_list<I>(&mut self, name: &str, values: I) -> MessageResult<&mut Self>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.field_for_mutation(name, FieldRule::List)?;
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        if let Some(FieldData::List(items)) = self.data.get_mut(name) {
            items.retain(|item| !values.contains(item));
        }
        Ok(self)
    }

    /// Out of range indexes are ignored.
    pub fn remove_from_list_at(&mut self, name: &str, index: usize) -> MessageResult<&mut Self> {
        self.field_for_mutation(name, FieldRule::List)?;
        if let Some(FieldData::List(items)) = self.data.get_mut(name) {
            if index < items.len() {
                items.remove(index);
            }
        }
        Ok(self)
    }

    pub fn is_in_map(&self, name: &str, key: &str) -> bool {
        self.get_from_map(name, key).is_some()
    }

    pub fn get_from_map(&self, name: &str, key: &str) -> Option<&Value> {
        match self.data.get(name) {
            Some(FieldData::Map(entries)) => entries.get(key),
            _ => None,
        }
    }

    pub fn add_to_map(
        &mut self,
        name: &str,
        key: &str,
        value: impl Into<Value>,
    ) -> MessageResult<&mut Self> {
        let field = self.field_for_mutation(name, FieldRule::Map)?;
        let value = value.into();
        field.guard_value(&value)?;

        let entry = self
            .data
            .entry(name.to_string())
            .or_insert_with(|| FieldData::Map(BTreeMap::new()));
        if let FieldData::Map(entries) = entry {
            entries.insert(key.to_string(), value);
        }
        self.cleared.remove(name);
        Ok(self)
    }

    pub fn remove_from_map(&mut self, name: &str, key: &str) -> MessageResult<&mut Self> {
        self.field_for_mutation(name, FieldRule::Map)?;
        if let Some(FieldData::Map(entries)) = self.data.get_mut(name) {
            entries.remove(key);
        }
        Ok(self)
    }

    /// Fills unset fields (or only `name`) with their defaults.
    pub fn populate_defaults(&mut self, name: Option<&str>) -> MessageResult<&mut Self> {
        self.ensure_mutable()?;
        if let Some(name) = name {
            self.schema.field(name)?;
        }
        self.apply_defaults(name);
        Ok(self)
    }

    fn apply_defaults(&mut self, only: Option<&str>) {
        let schema = self.schema.clone();
        for field in schema.fields() {
            if only.is_some_and(|name| name != field.name()) || self.has(field.name()) {
                continue;
            }
            // Defaults the field's own guard rejects are left unset.
            let accepted = |value: &Value| field.guard_value(value).is_ok();
            let data = match field.rule() {
                FieldRule::Single => field.default_value().filter(accepted).map(FieldData::Single),
                FieldRule::Set => {
                    let mut entries = Vec::new();
                    for value in field.default_values().into_iter().filter(accepted) {
                        insert_set_entry(&mut entries, value);
                    }
                    Some(FieldData::Set(entries))
                }
                FieldRule::List => Some(FieldData::List(
                    field.default_values().into_iter().filter(accepted).collect(),
                )),
                FieldRule::Map => None,
            };
            if let Some(data) = data.filter(|d| !d.is_empty()) {
                self.data.insert(field.name().to_string(), data);
            }
        }
    }

    /// Checks required fields, and with `strict` re-guards every stored value.
    ///
    /// A frozen message was validated when it froze, so a non-strict call on
    /// it does nothing.
    pub fn validate(&self, strict: bool, recursive: bool) -> MessageResult<()> {
        if !strict && self.frozen {
            return Ok(());
        }

        for field in self.schema.required_fields() {
            if !self.has(field.name()) {
                return Err(MessageError::RequiredFieldNotSet {
                    schema: self.schema.id().to_string(),
                    field: field.name().to_string(),
                });
            }
        }

        if strict {
            for (name, data) in &self.data {
                let field = self.schema.field(name)?;
                for value in data.values() {
                    field.guard_value(value)?;
                }
            }
        }

        if recursive {
            for data in self.data.values() {
                for value in data.values() {
                    if let Value::Message(nested) = value {
                        nested.validate(strict, true)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Validates, then freezes this message and every nested message.
    pub fn freeze(&mut self, strict: bool) -> MessageResult<&mut Self> {
        if self.frozen {
            return Ok(self);
        }
        self.validate(strict, true)?;
        self.frozen = true;
        for data in self.data.values_mut() {
            for value in data.values_mut() {
                if let Value::Message(nested) = value {
                    nested.freeze(strict)?;
                }
            }
        }
        Ok(self)
    }

    /// Deep copy that is mutable again, with replay unset.
    pub fn clone_mutable(&self) -> Self {
        let mut copy = self.clone();
        copy.thaw();
        copy
    }

    fn thaw(&mut self) {
        self.frozen = false;
        self.replay = None;
        for data in self.data.values_mut() {
            for value in data.values_mut() {
                if let Value::Message(nested) = value {
                    nested.thaw();
                }
            }
        }
    }

    pub fn to_object(&self) -> MessageResult<JsonValue> {
        ObjectSerializer::default().serialize(self)
    }

    pub fn to_json(&self) -> MessageResult<String> {
        JsonSerializer::default().serialize(self, &SerializeOptions::default())
    }

    /// Weak equality: both messages serialize to the same JSON text.
    ///
    /// Either side failing to serialize makes them unequal.
    pub fn equals(&self, other: &Message) -> bool {
        match (self.to_json(), other.to_json()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }

    pub(crate) fn data(&self) -> &HashMap<String, FieldData> {
        &self.data
    }

    /// Stores already decoded values, bypassing the frozen check but not the guards.
    pub(crate) fn store_decoded(&mut self, field: &Field, data: FieldData) -> MessageResult<()> {
        for value in data.values() {
            field.guard_value(value)?;
        }
        let data = match data {
            FieldData::Set(entries) => {
                let mut normalized = Vec::with_capacity(entries.len());
                for (_, value) in entries {
                    insert_set_entry(&mut normalized, value);
                }
                FieldData::Set(normalized)
            }
            other => other,
        };
        if data.is_empty() {
            self.data.remove(field.name());
        } else {
            self.data.insert(field.name().to_string(), data);
        }
        Ok(())
    }

    pub(crate) fn mark_cleared(&mut self, name: &str) {
        self.data.remove(name);
        self.cleared.insert(name.to_string());
    }

    fn ensure_mutable(&self) -> MessageResult<()> {
        if self.frozen {
            return Err(MessageError::FrozenMessageIsImmutable(
                self.schema.id().to_string(),
            ));
        }
        Ok(())
    }

    fn field_for_mutation(&self, name: &str, rule: FieldRule) -> MessageResult<Arc<Field>> {
        self.ensure_mutable()?;
        let field = self.schema.field(name)?;
        if field.rule() != rule {
            return Err(MessageError::assertion(format!(
                "Field [{name}] on [{}] is a {} field and cannot be used as a {rule}",
                self.schema.id(),
                field.rule()
            )));
        }
        Ok(field.clone())
    }
}

fn guard_all<I>(field: &Field, values: I) -> MessageResult<Vec<Value>>
where
    I: IntoIterator,
    I::Item: Into<Value>,
{
    let values: Vec<Value> = values.into_iter().map(Into::into).collect();
    for value in &values {
        field.guard_value(value)?;
    }
    Ok(values)
}

fn insert_set_entry(entries: &mut Vec<(String, Value)>, value: Value) {
    let Some(key) = value.set_key().filter(|k| !k.is_empty()) else {
        return;
    };
    match entries.iter_mut().find(|(k, _)| *k == key) {
        Some(existing) => existing.1 = value,
        None => entries.push((key, value)),
    }
}

impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_json() {
            Ok(json) => f.write_str(&json),
            Err(e) => write!(f, "<{} unserializable: {e}>", self.schema.id()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldBuilder;
    use crate::types::TypeName;

    fn schema() -> Arc<Schema> {
        Schema::new(
            "acme:blog:node:message-test:1-0-0",
            vec![
                FieldBuilder::new("title", TypeName::String).build().unwrap(),
                FieldBuilder::new("count", TypeName::Int).required().build().unwrap(),
                FieldBuilder::new("tags", TypeName::String).as_a_set().build().unwrap(),
                FieldBuilder::new("links", TypeName::String).as_a_list().build().unwrap(),
                FieldBuilder::new("meta", TypeName::String).as_a_map().build().unwrap(),
            ],
            vec![],
        )
        .unwrap()
    }

    #[test]
    fn test_defaults_rejected_by_the_field_are_skipped() {
        let schema = Schema::new(
            "acme:blog:node:bounded-defaults:1-0-0",
            vec![
                FieldBuilder::new("rank", TypeName::Int).min(1).build().unwrap(),
                FieldBuilder::new("count", TypeName::Int).build().unwrap(),
            ],
            vec![],
        )
        .unwrap();

        let mut message = Message::create(&schema);
        assert!(!message.has("rank"));
        assert_eq!(message.get_single("count"), Some(&Value::Int(0)));
        message.freeze(true).unwrap();
        assert!(message.validate(true, true).is_ok());
    }

    #[test]
    fn test_create_populates_defaults() {
        let message = Message::create(&schema());
        assert!(message.has("count"));
        assert_eq!(message.get_single("count"), Some(&Value::Int(0)));
        assert_eq!(
            message.get_single("_schema"),
            Some(&Value::from("acme:blog:node:message-test:1-0-0"))
        );
        assert!(!message.has("title"));
        assert!(!message.has("tags"));
    }

    #[test]
    fn test_set_normalizes_keys_and_last_write_wins() {
        let mut message = Message::create(&schema());
        message.add_to_set("tags", ["A", "a", " B "]).unwrap();

        assert_eq!(message.get_set("tags"), vec![Value::from("a"), Value::from(" B ")]);
        assert!(message.is_in_set("tags", "B"));
        assert!(message.is_in_set("tags", "A"));

        message.remove_from_set("tags", ["b"]).unwrap();
        assert_eq!(message.get_set("tags"), vec![Value::from("a")]);
    }

    #[test]
    fn test_empty_set_keys_are_skipped() {
        let mut message = Message::create(&schema());
        message.add_to_set("tags", ["  ", ""]).unwrap();
        assert!(!message.has("tags"));
    }

    #[test]
    fn test_list_operations() {
        let mut message = Message::create(&schema());
        message.add_to_list("links", ["a", "b", "a", "c"]).unwrap();
        assert_eq!(message.get_from_list_at("links", 1), Some(&Value::from("b")));
        assert!(message.is_in_list("links", &Value::from("c")));

        message.remove_from_list("links", ["a"]).unwrap();
        assert_eq!(message.get_list("links"), vec![Value::from("b"), Value::from("c")]);

        message.remove_from_list_at("links", 10).unwrap();
        message.remove_from_list_at("links", 0).unwrap();
        assert_eq!(message.get_list("links"), vec![Value::from("c")]);
    }

    #[test]
    fn test_map_operations() {
        let mut message = Message::create(&schema());
        message.add_to_map("meta", "author", "bart").unwrap();
        assert!(message.is_in_map("meta", "author"));
        assert_eq!(message.get_from_map("meta", "author"), Some(&Value::from("bart")));
        message.remove_from_map("meta", "author").unwrap();
        assert!(!message.has("meta"));
    }

    #[test]
    fn test_cardinality_mismatch_is_an_assertion() {
        let mut message = Message::create(&schema());
        assert!(matches!(
            message.add_to_set("links", ["x"]),
            Err(MessageError::AssertionFailed(_))
        ));
        assert!(matches!(
            message.set("tags", "x"),
            Err(MessageError::AssertionFailed(_))
        ));
        assert!(matches!(
            message.set("missing", "x"),
            Err(MessageError::FieldNotDefined { .. })
        ));
    }

    #[test]
    fn test_get_returns_copies() {
        let mut message = Message::create(&schema());
        message.add_to_list("links", ["a"]).unwrap();

        let mut copy = message.get_list("links");
        copy.push(Value::from("b"));
        if let Some(FieldValue::List(mut items)) = message.get("links") {
            items.clear();
        }
        assert_eq!(message.get_list("links"), vec![Value::from("a")]);
    }

    #[test]
    fn test_clear_records_field() {
        let mut message = Message::create(&schema());
        message.set("title", "hello").unwrap();
        message.clear("title").unwrap();
        assert!(!message.has("title"));
        assert!(message.has_cleared_field("title"));
        assert_eq!(message.cleared_fields(), vec!["title".to_string()]);

        message.set("title", "again").unwrap();
        assert!(!message.has_cleared_field("title"));
    }

    #[test]
    fn test_freeze_is_idempotent_and_blocks_mutation() {
        let mut message = Message::create(&schema());
        message.freeze(false).unwrap();
        message.freeze(true).unwrap();
        assert!(message.is_frozen());

        assert!(matches!(
            message.set("title", "x"),
            Err(MessageError::FrozenMessageIsImmutable(_))
        ));
        assert!(matches!(
            message.add_to_list("links", ["x"]),
            Err(MessageError::FrozenMessageIsImmutable(_))
        ));
        assert!(matches!(
            message.clear("title"),
            Err(MessageError::FrozenMessageIsImmutable(_))
        ));
        assert!(matches!(
            message.populate_defaults(None),
            Err(MessageError::FrozenMessageIsImmutable(_))
        ));
    }

    #[test]
    fn test_required_fields_are_checked() {
        let mut message = Message::create(&schema());
        message.clear("count").unwrap();
        assert!(matches!(
            message.validate(false, false),
            Err(MessageError::RequiredFieldNotSet { .. })
        ));
        assert!(message.freeze(false).is_err());
        assert!(!message.is_frozen());
    }

    #[test]
    fn test_replay_can_be_set_once() {
        let mut message = Message::create(&schema());
        message.set_replay(true).unwrap();
        assert!(message.is_replay());
        assert!(message.is_frozen());
        assert!(matches!(
            message.set_replay(false),
            Err(MessageError::LogicException(_))
        ));

        let copy = message.clone_mutable();
        assert!(!copy.is_frozen());
        assert_eq!(copy.replay(), None);
    }

    #[test]
    fn test_nested_messages_freeze_with_parent() {
        let child_schema = schema();
        let parent_schema = Schema::new(
            "acme:blog:node:message-parent:1-0-0",
            vec![FieldBuilder::new("child", TypeName::Message).build().unwrap()],
            vec![],
        )
        .unwrap();

        let mut parent = Message::create(&parent_schema);
        parent.set("child", Message::create(&child_schema)).unwrap();
        parent.freeze(false).unwrap();

        let child = parent.get_single("child").and_then(Value::as_message).unwrap();
        assert!(child.is_frozen());

        let copy = parent.clone_mutable();
        let child = copy.get_single("child").and_then(Value::as_message).unwrap();
        assert!(!child.is_frozen());
    }

    #[test]
    fn test_equals_and_display() {
        let mut a = Message::create(&schema());
        a.set("title", "same").unwrap();
        let mut b = a.clone_mutable();
        assert_eq!(a, b);

        b.set("title", "different").unwrap();
        assert_ne!(a, b);
        assert!(a.to_string().contains("\"title\":\"same\""));
    }
}
