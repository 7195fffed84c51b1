//! Static description layer: identities, fields, mixins and schemas.
//!
//! Everything here is immutable once built and freely shared behind `Arc`.

pub mod enums;
pub mod field;
pub mod field_builder;
pub mod format;
pub mod id;
pub mod interner;
pub mod mixin;
#[allow(clippy::module_inception)]
pub mod schema;

pub use enums::{EnumDef, EnumValue};
pub use field::{ClassProto, Field, FieldAssertion, FieldDefault, FieldRule};
pub use field_builder::FieldBuilder;
pub use format::Format;
pub use id::{SchemaCurie, SchemaId, SchemaQName, SchemaVersion};
pub use interner::Interner;
pub use mixin::Mixin;
pub use schema::Schema;
