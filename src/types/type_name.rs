use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::MessageError;

/// Closed set of field types. The wire string is stable and used in schema
/// descriptions and error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeName {
    BigInt,
    Binary,
    Blob,
    Boolean,
    Date,
    DateTime,
    Decimal,
    DynamicField,
    Float,
    GeoPoint,
    Identifier,
    IntEnum,
    Int,
    MediumBlob,
    MediumInt,
    MediumText,
    Message,
    MessageRef,
    Microtime,
    NodeRef,
    SignedBigInt,
    SignedInt,
    SignedMediumInt,
    SignedSmallInt,
    SignedTinyInt,
    SmallInt,
    StringEnum,
    String,
    Text,
    TimeUuid,
    Timestamp,
    TinyInt,
    Trinary,
    Uuid,
}

const ALL: [TypeName; 34] = [
    TypeName::BigInt,
    TypeName::Binary,
    TypeName::Blob,
    TypeName::Boolean,
    TypeName::Date,
    TypeName::DateTime,
    TypeName::Decimal,
    TypeName::DynamicField,
    TypeName::Float,
    TypeName::GeoPoint,
    TypeName::Identifier,
    TypeName::IntEnum,
    TypeName::Int,
    TypeName::MediumBlob,
    TypeName::MediumInt,
    TypeName::MediumText,
    TypeName::Message,
    TypeName::MessageRef,
    TypeName::Microtime,
    TypeName::NodeRef,
    TypeName::SignedBigInt,
    TypeName::SignedInt,
    TypeName::SignedMediumInt,
    TypeName::SignedSmallInt,
    TypeName::SignedTinyInt,
    TypeName::SmallInt,
    TypeName::StringEnum,
    TypeName::String,
    TypeName::Text,
    TypeName::TimeUuid,
    TypeName::Timestamp,
    TypeName::TinyInt,
    TypeName::Trinary,
    TypeName::Uuid,
];

impl TypeName {
    pub fn all() -> &'static [TypeName] {
        &ALL
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BigInt => "big-int",
            Self::Binary => "binary",
            Self::Blob => "blob",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::DateTime => "date-time",
            Self::Decimal => "decimal",
            Self::DynamicField => "dynamic-field",
            Self::Float => "float",
            Self::GeoPoint => "geo-point",
            Self::Identifier => "identifier",
            Self::IntEnum => "int-enum",
            Self::Int => "int",
            Self::MediumBlob => "medium-blob",
            Self::MediumInt => "medium-int",
            Self::MediumText => "medium-text",
            Self::Message => "message",
            Self::MessageRef => "message-ref",
            Self::Microtime => "microtime",
            Self::NodeRef => "node-ref",
            Self::SignedBigInt => "signed-big-int",
            Self::SignedInt => "signed-int",
            Self::SignedMediumInt => "signed-medium-int",
            Self::SignedSmallInt => "signed-small-int",
            Self::SignedTinyInt => "signed-tiny-int",
            Self::SmallInt => "small-int",
            Self::StringEnum => "string-enum",
            Self::String => "string",
            Self::Text => "text",
            Self::TimeUuid => "time-uuid",
            Self::Timestamp => "timestamp",
            Self::TinyInt => "tiny-int",
            Self::Trinary => "trinary",
            Self::Uuid => "uuid",
        }
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TypeName {
    type Err = MessageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL.iter()
            .copied()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| MessageError::assertion(format!("Unknown type name [{s}]")))
    }
}

impl Serialize for TypeName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_all_names() {
        for name in TypeName::all() {
            assert_eq!(name.as_str().parse::<TypeName>().unwrap(), *name);
        }
        assert!("varchar".parse::<TypeName>().is_err());
    }
}
