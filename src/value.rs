//! In-memory field values.

use base64::{engine::general_purpose, Engine as _};
use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use num_bigint::BigInt;
use std::fmt;

use crate::error::preview;
use crate::message::Message;
use crate::objects::{DynamicField, GeoPoint, Identifier, MessageRef, Microtime, NodeRef};

/// A single field item as held by a message.
///
/// Collections are not values: a LIST, SET or MAP field stores many of these.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    BigNumber(BigInt),
    Float(f64),
    Decimal(BigDecimal),
    String(String),
    Binary(Vec<u8>),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
    Microtime(Microtime),
    Identifier(Identifier),
    GeoPoint(GeoPoint),
    MessageRef(MessageRef),
    NodeRef(NodeRef),
    DynamicField(DynamicField),
    Message(Box<Message>),
}

impl Value {
    /// Short name of the variant for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::BigNumber(_) => "big-number",
            Self::Float(_) => "float",
            Self::Decimal(_) => "decimal",
            Self::String(_) => "string",
            Self::Binary(_) => "binary",
            Self::Date(_) => "date",
            Self::DateTime(_) => "date-time",
            Self::Microtime(_) => "microtime",
            Self::Identifier(_) => "identifier",
            Self::GeoPoint(_) => "geo-point",
            Self::MessageRef(_) => "message-ref",
            Self::NodeRef(_) => "node-ref",
            Self::DynamicField(_) => "dynamic-field",
            Self::Message(_) => "message",
        }
    }

    /// Plain text rendering of scalar-like values. Messages render their schema id.
    pub fn to_text(&self) -> String {
        match self {
            Self::Bool(v) => v.to_string(),
            Self::Int(v) => v.to_string(),
            Self::BigNumber(v) => v.to_string(),
            Self::Float(v) => v.to_string(),
            Self::Decimal(v) => v.normalized().to_string(),
            Self::String(v) => v.clone(),
            Self::Binary(v) => general_purpose::STANDARD.encode(v),
            Self::Date(v) => v.format("%Y-%m-%d").to_string(),
            Self::DateTime(v) => v.to_rfc3339_opts(SecondsFormat::Micros, true),
            Self::Microtime(v) => v.to_string(),
            Self::Identifier(v) => v.to_string(),
            Self::GeoPoint(v) => v.to_string(),
            Self::MessageRef(v) => v.to_string(),
            Self::NodeRef(v) => v.to_string(),
            Self::DynamicField(v) => v.to_string(),
            Self::Message(m) => m.schema().id().to_string(),
        }
    }

    /// Truncated rendering used in error messages.
    pub fn preview(&self) -> String {
        preview(&self.to_text())
    }

    /// Normalized key identifying this value inside a SET field.
    ///
    /// Strings and string-like values are trimmed and lowercased. Values that
    /// cannot live in a set (messages, dynamic fields, geo points) have no key.
    pub fn set_key(&self) -> Option<String> {
        match self {
            Self::DynamicField(_) | Self::Message(_) | Self::GeoPoint(_) => None,
            Self::Binary(v) => Some(general_purpose::STANDARD.encode(v)),
            other => Some(other.to_text().trim().to_lowercase()),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_identifier(&self) -> Option<&Identifier> {
        match self {
            Self::Identifier(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_message(&self) -> Option<&Message> {
        match self {
            Self::Message(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_message_mut(&mut self) -> Option<&mut Message> {
        match self {
            Self::Message(m) => Some(m),
            _ => None,
        }
    }

    pub fn into_message(self) -> Option<Message> {
        match self {
            Self::Message(m) => Some(*m),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(v.into())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Int(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Binary(v)
    }
}

impl From<BigInt> for Value {
    fn from(v: BigInt) -> Self {
        Self::BigNumber(v)
    }
}

impl From<BigDecimal> for Value {
    fn from(v: BigDecimal) -> Self {
        Self::Decimal(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Self::Date(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Self::DateTime(v)
    }
}

impl From<Microtime> for Value {
    fn from(v: Microtime) -> Self {
        Self::Microtime(v)
    }
}

impl From<Identifier> for Value {
    fn from(v: Identifier) -> Self {
        Self::Identifier(v)
    }
}

impl From<GeoPoint> for Value {
    fn from(v: GeoPoint) -> Self {
        Self::GeoPoint(v)
    }
}

impl From<MessageRef> for Value {
    fn from(v: MessageRef) -> Self {
        Self::MessageRef(v)
    }
}

impl From<NodeRef> for Value {
    fn from(v: NodeRef) -> Self {
        Self::NodeRef(v)
    }
}

impl From<DynamicField> for Value {
    fn from(v: DynamicField) -> Self {
        Self::DynamicField(v)
    }
}

impl From<Message> for Value {
    fn from(v: Message) -> Self {
        Self::Message(Box::new(v))
    }
}
