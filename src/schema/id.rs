//! Schema identity: full ids, version-less curies and minimal qnames.
//!
//! All three are interned process-wide. Building the same canonical string
//! twice yields the same `Arc`, so identity comparison is a pointer check.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use super::interner::Interner;
use crate::constants::{
    MAX_SCHEMA_ID_BYTES, MIXIN_CATEGORY, SCHEMA_CURIE_MAJOR_PATTERN, SCHEMA_CURIE_PATTERN,
    SCHEMA_ID_PATTERN, SCHEMA_QNAME_PATTERN, SCHEMA_VERSION_PATTERN,
};
use crate::error::{MessageError, MessageResult};

fn compile(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(regex) => regex,
        Err(e) => panic!("invalid built-in pattern {pattern}: {e}"),
    }
}

static ID_REGEX: Lazy<Regex> = Lazy::new(|| compile(SCHEMA_ID_PATTERN));
static CURIE_REGEX: Lazy<Regex> = Lazy::new(|| compile(SCHEMA_CURIE_PATTERN));
static CURIE_MAJOR_REGEX: Lazy<Regex> = Lazy::new(|| compile(SCHEMA_CURIE_MAJOR_PATTERN));
static QNAME_REGEX: Lazy<Regex> = Lazy::new(|| compile(SCHEMA_QNAME_PATTERN));
static VERSION_REGEX: Lazy<Regex> = Lazy::new(|| compile(SCHEMA_VERSION_PATTERN));

static IDS: Lazy<Interner<SchemaId>> = Lazy::new(Interner::new);
static CURIES: Lazy<Interner<SchemaCurie>> = Lazy::new(Interner::new);
static QNAMES: Lazy<Interner<SchemaQName>> = Lazy::new(Interner::new);

/// Semantic version in the `major-minor-patch` form used by schema ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl SchemaVersion {
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    pub fn from_string(version: &str) -> MessageResult<Self> {
        let captures = VERSION_REGEX.captures(version).ok_or_else(|| {
            MessageError::assertion(format!(
                "Schema version [{version}] is invalid. It must match the pattern [{SCHEMA_VERSION_PATTERN}]."
            ))
        })?;

        let part = |index: usize| -> MessageResult<u32> {
            captures
                .get(index)
                .map(|m| m.as_str())
                .unwrap_or_default()
                .parse::<u32>()
                .map_err(|e| {
                    MessageError::assertion(format!("Schema version [{version}] is invalid: {e}"))
                })
        };

        Ok(Self::new(part(1)?, part(2)?, part(3)?))
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.major, self.minor, self.patch)
    }
}

/// Full schema identifier `vendor:package:category:message:major-minor-patch`.
///
/// The category segment is optional and may be empty.
#[derive(Debug)]
pub struct SchemaId {
    id: String,
    vendor: String,
    package: String,
    category: Option<String>,
    message: String,
    version: SchemaVersion,
    curie: Arc<SchemaCurie>,
    curie_major: String,
}

impl SchemaId {
    /// Parses and interns a schema id.
    pub fn from_string(id: &str) -> MessageResult<Arc<Self>> {
        IDS.get_or_try_insert(id, || Self::parse(id))
    }

    fn parse(id: &str) -> MessageResult<Self> {
        if id.len() > MAX_SCHEMA_ID_BYTES {
            return Err(MessageError::assertion(format!(
                "Schema id [{id}] cannot be longer than {MAX_SCHEMA_ID_BYTES} bytes."
            )));
        }

        let captures = ID_REGEX.captures(id).ok_or_else(|| {
            MessageError::assertion(format!(
                "Schema id [{id}] is invalid. It must match the pattern [{SCHEMA_ID_PATTERN}]."
            ))
        })?;

        let group = |index: usize| captures.get(index).map(|m| m.as_str().to_string());
        let vendor = group(1).unwrap_or_default();
        let package = group(2).unwrap_or_default();
        let category = group(3).filter(|c| !c.is_empty());
        let message = group(4).unwrap_or_default();
        let version = SchemaVersion::from_string(&group(5).unwrap_or_default())?;

        let curie = SchemaCurie::from_string(&format!(
            "{}:{}:{}:{}",
            vendor,
            package,
            category.as_deref().unwrap_or(""),
            message
        ))?;
        let curie_major = format!("{}:v{}", curie, version.major);

        Ok(Self {
            id: id.to_string(),
            vendor,
            package,
            category,
            message,
            version,
            curie,
            curie_major,
        })
    }

    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn version(&self) -> SchemaVersion {
        self.version
    }

    pub fn curie(&self) -> &Arc<SchemaCurie> {
        &self.curie
    }

    /// `vendor:package:category:message:v{major}`
    pub fn curie_major(&self) -> &str {
        &self.curie_major
    }

    pub fn qname(&self) -> &Arc<SchemaQName> {
        self.curie.qname()
    }

    pub fn as_str(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

impl PartialEq for SchemaId {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for SchemaId {}

impl Hash for SchemaId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Serialize for SchemaId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.id)
    }
}

/// Compact identifier `vendor:package:category:message`, without version.
#[derive(Debug)]
pub struct SchemaCurie {
    curie: String,
    vendor: String,
    package: String,
    category: Option<String>,
    message: String,
    qname: Arc<SchemaQName>,
}

impl SchemaCurie {
    /// Parses and interns a curie. The vendor may be the `*` wildcard.
    pub fn from_string(curie: &str) -> MessageResult<Arc<Self>> {
        CURIES.get_or_try_insert(curie, || Self::parse(curie))
    }

    fn parse(curie: &str) -> MessageResult<Self> {
        let captures = CURIE_REGEX.captures(curie).ok_or_else(|| {
            MessageError::assertion(format!(
                "Schema curie [{curie}] is invalid. It must match the pattern [{SCHEMA_CURIE_PATTERN}]."
            ))
        })?;

        let group = |index: usize| captures.get(index).map(|m| m.as_str().to_string());
        let vendor = group(1).unwrap_or_default();
        let package = group(2).unwrap_or_default();
        let category = group(3).filter(|c| !c.is_empty());
        let message = group(4).unwrap_or_default();
        let qname = SchemaQName::from_string(&format!("{vendor}:{message}"))?;

        Ok(Self {
            curie: curie.to_string(),
            vendor,
            package,
            category,
            message,
            qname,
        })
    }

    /// Splits a curie-major (`curie:vN`) into its interned curie and major number.
    pub fn from_curie_major(curie_major: &str) -> MessageResult<(Arc<Self>, u32)> {
        let captures = CURIE_MAJOR_REGEX.captures(curie_major).ok_or_else(|| {
            MessageError::assertion(format!(
                "Schema curie major [{curie_major}] is invalid. It must match the pattern [{SCHEMA_CURIE_MAJOR_PATTERN}]."
            ))
        })?;
        let major = captures
            .get(5)
            .map(|m| m.as_str())
            .unwrap_or_default()
            .parse::<u32>()
            .map_err(|e| MessageError::assertion(format!("Invalid major in [{curie_major}]: {e}")))?;
        let curie = curie_major
            .rsplit_once(':')
            .map(|(curie, _)| curie)
            .unwrap_or(curie_major);
        Ok((Self::from_string(curie)?, major))
    }

    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn qname(&self) -> &Arc<SchemaQName> {
        &self.qname
    }

    pub fn is_mixin(&self) -> bool {
        self.category.as_deref() == Some(MIXIN_CATEGORY)
    }

    pub fn has_wildcard_vendor(&self) -> bool {
        self.vendor == crate::constants::WILDCARD_VENDOR
    }

    pub fn as_str(&self) -> &str {
        &self.curie
    }
}

impl fmt::Display for SchemaCurie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.curie)
    }
}

impl PartialEq for SchemaCurie {
    fn eq(&self, other: &Self) -> bool {
        self.curie == other.curie
    }
}

impl Eq for SchemaCurie {}

impl Hash for SchemaCurie {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.curie.hash(state);
    }
}

impl PartialOrd for SchemaCurie {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SchemaCurie {
    fn cmp(&self, other: &Self) -> Ordering {
        self.curie.cmp(&other.curie)
    }
}

impl Serialize for SchemaCurie {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.curie)
    }
}

/// Minimal identifier `vendor:message`, agnostic of package and category.
#[derive(Debug)]
pub struct SchemaQName {
    qname: String,
    vendor: String,
    message: String,
}

impl SchemaQName {
    pub fn from_string(qname: &str) -> MessageResult<Arc<Self>> {
        QNAMES.get_or_try_insert(qname, || {
            let captures = QNAME_REGEX.captures(qname).ok_or_else(|| {
                MessageError::assertion(format!(
                    "Schema qname [{qname}] is invalid. It must match the pattern [{SCHEMA_QNAME_PATTERN}]."
                ))
            })?;
            Ok(Self {
                qname: qname.to_string(),
                vendor: captures.get(1).map(|m| m.as_str()).unwrap_or_default().to_string(),
                message: captures.get(2).map(|m| m.as_str()).unwrap_or_default().to_string(),
            })
        })
    }

    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn has_wildcard_vendor(&self) -> bool {
        self.vendor == crate::constants::WILDCARD_VENDOR
    }

    pub fn as_str(&self) -> &str {
        &self.qname
    }
}

impl fmt::Display for SchemaQName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qname)
    }
}

impl PartialEq for SchemaQName {
    fn eq(&self, other: &Self) -> bool {
        self.qname == other.qname
    }
}

impl Eq for SchemaQName {}

impl Hash for SchemaQName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.qname.hash(state);
    }
}

impl Serialize for SchemaQName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.qname)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_schema_id() {
        let id = SchemaId::from_string("acme:blog:node:article:1-2-3").unwrap();
        assert_eq!(id.vendor(), "acme");
        assert_eq!(id.package(), "blog");
        assert_eq!(id.category(), Some("node"));
        assert_eq!(id.message(), "article");
        assert_eq!(id.version(), SchemaVersion::new(1, 2, 3));
        assert_eq!(id.curie().to_string(), "acme:blog:node:article");
        assert_eq!(id.curie_major(), "acme:blog:node:article:v1");
        assert_eq!(id.qname().to_string(), "acme:article");
    }

    #[test]
    fn test_optional_category() {
        let id = SchemaId::from_string("acme:blog::comment:1-0-0").unwrap();
        assert_eq!(id.category(), None);
        assert_eq!(id.curie().as_str(), "acme:blog::comment");
        assert_eq!(id.curie_major(), "acme:blog::comment:v1");
    }

    #[test]
    fn test_identity_is_interned() {
        let a = SchemaId::from_string("acme:blog:node:article:1-0-0").unwrap();
        let b = SchemaId::from_string("acme:blog:node:article:1-0-0").unwrap();
        assert!(Arc::ptr_eq(&a, &b));

        let c = SchemaCurie::from_string("acme:blog:node:article").unwrap();
        assert!(Arc::ptr_eq(a.curie(), &c));

        let q = SchemaQName::from_string("acme:article").unwrap();
        assert!(Arc::ptr_eq(a.qname(), &q));
    }

    #[test]
    fn test_invalid_identifiers() {
        assert!(SchemaId::from_string("acme:blog:node:article").is_err());
        assert!(SchemaId::from_string("Acme:blog:node:article:1-0-0").is_err());
        assert!(SchemaId::from_string("acme:blog:node:article:1-0").is_err());
        assert!(SchemaCurie::from_string("acme:article").is_err());
        assert!(SchemaQName::from_string("acme:blog:article").is_err());
    }

    #[test]
    fn test_curie_major_and_wildcards() {
        let (curie, major) = SchemaCurie::from_curie_major("acme:blog:node:article:v12").unwrap();
        assert_eq!(curie.as_str(), "acme:blog:node:article");
        assert_eq!(major, 12);

        let wildcard = SchemaCurie::from_string("*:blog:node:article").unwrap();
        assert!(wildcard.has_wildcard_vendor());
        assert!(SchemaCurie::from_string("acme:common:mixin:taggable").unwrap().is_mixin());
    }
}
