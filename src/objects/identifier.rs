//! Identifier value objects.
//!
//! Identifiers are small string-backed values tagged with the kind that
//! validated them. Two identifiers are equal when their string forms are.

use serde::{Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use uuid::Uuid;

use crate::constants::IDENTIFIER_MAX_BYTES;
use crate::error::{MessageError, MessageResult};
use crate::utils::ValidationUtils;

/// Closed set of identifier kinds a field may require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentifierKind {
    /// Any RFC 4122 uuid.
    Uuid,
    /// Version 1 (time based) uuid.
    TimeUuid,
    /// Free-form non-blank string.
    String,
    Slug,
    /// `YYYY-MM-DD-slug`
    DatedSlug,
}

impl IdentifierKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uuid => "uuid",
            Self::TimeUuid => "time-uuid",
            Self::String => "string",
            Self::Slug => "slug",
            Self::DatedSlug => "dated-slug",
        }
    }

    /// Whether an identifier of kind `other` satisfies a requirement for `self`.
    ///
    /// Time uuids are uuids, so they satisfy a plain uuid requirement.
    pub fn accepts(&self, other: IdentifierKind) -> bool {
        *self == other || (*self == Self::Uuid && other == Self::TimeUuid)
    }
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Identifier {
    kind: IdentifierKind,
    value: String,
}

impl Identifier {
    /// Validates `value` for the given kind and builds the identifier.
    pub fn from_string(kind: IdentifierKind, value: &str) -> MessageResult<Self> {
        let invalid = |reason: &str| {
            MessageError::assertion(format!("Identifier [{value}] is not a valid {kind}: {reason}"))
        };

        let value = match kind {
            IdentifierKind::Uuid | IdentifierKind::TimeUuid => {
                let uuid = Uuid::parse_str(value.trim()).map_err(|e| invalid(&e.to_string()))?;
                if kind == IdentifierKind::TimeUuid && uuid.get_version_num() != 1 {
                    return Err(invalid("expected a version 1 uuid"));
                }
                uuid.hyphenated().to_string()
            }
            IdentifierKind::String => {
                if value.trim().is_empty() {
                    return Err(invalid("value cannot be blank"));
                }
                value.to_string()
            }
            IdentifierKind::Slug => {
                if !ValidationUtils::is_valid_slug(value) {
                    return Err(invalid("value must be a slug"));
                }
                value.to_string()
            }
            IdentifierKind::DatedSlug => {
                if !ValidationUtils::is_valid_dated_slug(value) {
                    return Err(invalid("value must be YYYY-MM-DD-slug"));
                }
                value.to_string()
            }
        };

        if value.len() > IDENTIFIER_MAX_BYTES {
            return Err(invalid("value is too long"));
        }

        Ok(Self { kind, value })
    }

    /// Random (v4) uuid identifier.
    pub fn generate_uuid() -> Self {
        Self {
            kind: IdentifierKind::Uuid,
            value: Uuid::new_v4().hyphenated().to_string(),
        }
    }

    /// Time based (v1) uuid identifier using a random node id.
    pub fn generate_time_uuid() -> Self {
        let node_id: [u8; 6] = rand::random();
        Self {
            kind: IdentifierKind::TimeUuid,
            value: Uuid::now_v1(&node_id).hyphenated().to_string(),
        }
    }

    pub fn kind(&self) -> IdentifierKind {
        self.kind
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// The parsed uuid for uuid kinds.
    pub fn to_uuid(&self) -> Option<Uuid> {
        match self.kind {
            IdentifierKind::Uuid | IdentifierKind::TimeUuid => Uuid::parse_str(&self.value).ok(),
            _ => None,
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl PartialEq for Identifier {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for Identifier {}

impl Hash for Identifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl Serialize for Identifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_normalizes_case() {
        let id = Identifier::from_string(
            IdentifierKind::Uuid,
            "936DA01F-9ABD-4D9D-80C7-02AF85C822A8",
        )
        .unwrap();
        assert_eq!(id.as_str(), "936da01f-9abd-4d9d-80c7-02af85c822a8");
        assert!(id.to_uuid().is_some());
    }

    #[test]
    fn test_time_uuid_requires_v1() {
        let v4 = Uuid::new_v4().to_string();
        assert!(Identifier::from_string(IdentifierKind::TimeUuid, &v4).is_err());

        let generated = Identifier::generate_time_uuid();
        let parsed = Identifier::from_string(IdentifierKind::TimeUuid, generated.as_str()).unwrap();
        assert_eq!(parsed, generated);
        assert!(IdentifierKind::Uuid.accepts(parsed.kind()));
        assert!(!IdentifierKind::TimeUuid.accepts(IdentifierKind::Uuid));
    }

    #[test]
    fn test_slug_kinds() {
        assert!(Identifier::from_string(IdentifierKind::Slug, "my-post").is_ok());
        assert!(Identifier::from_string(IdentifierKind::Slug, "My Post").is_err());
        assert!(Identifier::from_string(IdentifierKind::DatedSlug, "2021-05-04-my-post").is_ok());
        assert!(Identifier::from_string(IdentifierKind::String, "   ").is_err());
        assert!(Identifier::from_string(IdentifierKind::String, &"a".repeat(256)).is_err());
    }
}
