//! # msgfold
//!
//! Schema-driven message modeling and serialization.
//!
//! A [`Schema`] is an ordered registry of typed [`Field`]s, composed from
//! reusable [`Mixin`]s and identified by a versioned [`SchemaId`]
//! (`vendor:package:category:message:major-minor-patch`). A [`Message`] holds
//! values for a schema, guarded by each field's [`Type`] on every write, and can
//! be frozen into an immutable graph. Messages travel as JSON objects carrying
//! their schema id in the reserved `_schema` key; the [`MessageResolver`] maps
//! that id back to a schema when decoding, including polymorphic nested
//! messages.
//!
//! ```no_run
//! use msgfold::{FieldBuilder, JsonSerializer, Schema, SerializeOptions, TypeName};
//!
//! # async fn demo() -> msgfold::MessageResult<()> {
//! let schema = Schema::new(
//!     "acme:blog:node:article:1-0-0",
//!     vec![FieldBuilder::new("title", TypeName::String).required().build()?],
//!     vec![],
//! )?;
//! msgfold::MessageResolver::global().register_schema(schema.clone());
//!
//! let mut article = schema.create_message();
//! article.set("title", "Hello")?;
//!
//! let json = JsonSerializer::default().serialize(&article, &SerializeOptions::default())?;
//! let decoded = JsonSerializer::default().deserialize(&json).await?;
//! assert!(decoded.equals(&article));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod message;
pub mod objects;
pub mod resolver;
pub mod schema;
pub mod serializers;
pub mod types;
pub mod utils;
pub mod value;

pub use config::{Config, ConfigError};
pub use error::{MessageError, MessageResult};
pub use message::{FieldValue, Message};
pub use objects::{
    DynamicField, DynamicFieldKind, GeoPoint, Identifier, IdentifierKind, MessageRef, Microtime,
    NodeRef,
};
pub use resolver::{ManifestResolver, MessageResolver, StaticManifest};
pub use schema::{
    EnumDef, EnumValue, Field, FieldBuilder, FieldRule, Format, Mixin, Schema, SchemaCurie,
    SchemaId, SchemaQName, SchemaVersion,
};
pub use serializers::{Codec, JsonSerializer, ObjectSerializer, SerializeOptions};
pub use types::{Type, TypeName};
pub use value::Value;
