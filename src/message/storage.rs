use std::collections::BTreeMap;

use crate::value::Value;

/// Internal storage of one field, shaped by its rule.
#[derive(Debug, Clone)]
pub(crate) enum FieldData {
    Single(Value),
    /// Entries keyed by [`Value::set_key`], in first-insertion order.
    Set(Vec<(String, Value)>),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl FieldData {
    pub(crate) fn is_empty(&self) -> bool {
        match self {
            Self::Single(_) => false,
            Self::Set(entries) => entries.is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Map(entries) => entries.is_empty(),
        }
    }

    pub(crate) fn to_field_value(&self) -> FieldValue {
        match self {
            Self::Single(value) => FieldValue::Single(value.clone()),
            Self::Set(entries) => FieldValue::Set(entries.iter().map(|(_, v)| v.clone()).collect()),
            Self::List(items) => FieldValue::List(items.clone()),
            Self::Map(entries) => FieldValue::Map(entries.clone()),
        }
    }

    pub(crate) fn values(&self) -> Box<dyn Iterator<Item = &Value> + '_> {
        match self {
            Self::Single(value) => Box::new(std::iter::once(value)),
            Self::Set(entries) => Box::new(entries.iter().map(|(_, v)| v)),
            Self::List(items) => Box::new(items.iter()),
            Self::Map(entries) => Box::new(entries.values()),
        }
    }

    pub(crate) fn values_mut(&mut self) -> Box<dyn Iterator<Item = &mut Value> + '_> {
        match self {
            Self::Single(value) => Box::new(std::iter::once(value)),
            Self::Set(entries) => Box::new(entries.iter_mut().map(|(_, v)| v)),
            Self::List(items) => Box::new(items.iter_mut()),
            Self::Map(entries) => Box::new(entries.values_mut()),
        }
    }
}

/// Detached copy of a field's current content, as returned by [`super::Message::get`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Single(Value),
    List(Vec<Value>),
    Set(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl FieldValue {
    pub fn as_single(&self) -> Option<&Value> {
        match self {
            Self::Single(value) => Some(value),
            _ => None,
        }
    }

    /// Items of a LIST or SET.
    pub fn as_slice(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) | Self::Set(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Self::Map(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn into_vec(self) -> Vec<Value> {
        match self {
            Self::Single(value) => vec![value],
            Self::List(items) | Self::Set(items) => items,
            Self::Map(entries) => entries.into_values().collect(),
        }
    }
}
