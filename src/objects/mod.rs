//! Small value objects carried by message fields.

pub mod dynamic_field;
pub mod geo_point;
pub mod identifier;
pub mod microtime;
pub mod refs;

pub use dynamic_field::{DynamicField, DynamicFieldKind};
pub use geo_point::GeoPoint;
pub use identifier::{Identifier, IdentifierKind};
pub use microtime::Microtime;
pub use refs::{MessageRef, NodeRef};
