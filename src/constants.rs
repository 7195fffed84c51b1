//! Common constants used across the message model.
//!
//! Reserved field names, canonical identifier patterns and the byte limits
//! shared by the string and binary type families.

/// Field every message carries with its full schema id.
pub const SCHEMA_FIELD_NAME: &str = "_schema";

pub const SCHEMA_ID_PATTERN: &str =
    r"^([a-z0-9-]+):([a-z0-9\.-]+):([a-z0-9-]+)?:([a-z0-9-]+):([0-9]+-[0-9]+-[0-9]+)$";
pub const SCHEMA_CURIE_PATTERN: &str =
    r"^([a-z0-9-]+|\*):([a-z0-9\.-]+):([a-z0-9-]+)?:([a-z0-9-]+)$";
pub const SCHEMA_CURIE_MAJOR_PATTERN: &str =
    r"^([a-z0-9-]+|\*):([a-z0-9\.-]+):([a-z0-9-]+)?:([a-z0-9-]+):v([0-9]+)$";
pub const SCHEMA_QNAME_PATTERN: &str = r"^([a-z0-9-]+|\*):([a-z0-9-]+)$";
pub const SCHEMA_VERSION_PATTERN: &str = r"^([0-9]+)-([0-9]+)-([0-9]+)$";
pub const FIELD_NAME_PATTERN: &str = r"^[a-zA-Z_][a-zA-Z0-9_]*$";

pub const MAX_SCHEMA_ID_BYTES: usize = 150;

/// Byte limits of the string and binary families.
pub const STRING_MAX_BYTES: usize = 255;
pub const TEXT_MAX_BYTES: usize = 65_535;
pub const MEDIUM_TEXT_MAX_BYTES: usize = 16_777_215;

pub const IDENTIFIER_MAX_BYTES: usize = 255;

pub const DECIMAL_MAX_PRECISION: u32 = 65;
pub const DEFAULT_DECIMAL_PRECISION: u32 = 10;
pub const DEFAULT_DECIMAL_SCALE: u32 = 2;

/// Category used by mixin curies.
pub const MIXIN_CATEGORY: &str = "mixin";

/// Vendor placeholder replaced with the configured default vendor.
pub const WILDCARD_VENDOR: &str = "*";
