use serde_json::{json, Value as JsonValue};
use std::collections::HashMap;
use std::sync::Arc;

use super::field::Field;
use super::field_builder::FieldBuilder;
use super::id::{SchemaCurie, SchemaId, SchemaQName};
use super::mixin::Mixin;
use crate::constants::{SCHEMA_FIELD_NAME, SCHEMA_ID_PATTERN};
use crate::error::{MessageError, MessageResult};
use crate::message::Message;
use crate::serializers::ObjectSerializer;
use crate::types::TypeName;

/// Immutable description of a message: identity, mixins and the ordered field registry.
///
/// Field order is the implicit `_schema` field, then mixin fields in mixin
/// order, then the schema's own fields. Overrides keep the original position.
#[derive(Debug)]
pub struct Schema {
    id: Arc<SchemaId>,
    fields: Vec<Arc<Field>>,
    index: HashMap<String, usize>,
    required: Vec<String>,
    mixins: Vec<Arc<Mixin>>,
}

impl Schema {
    pub fn new(id: &str, fields: Vec<Field>, mixins: Vec<Arc<Mixin>>) -> MessageResult<Arc<Self>> {
        let id = SchemaId::from_string(id)?;
        let mut schema = Self {
            id: id.clone(),
            fields: Vec::new(),
            index: HashMap::new(),
            required: Vec::new(),
            mixins: Vec::new(),
        };

        let schema_field = FieldBuilder::new(SCHEMA_FIELD_NAME, TypeName::String)
            .required()
            .pattern(SCHEMA_ID_PATTERN)
            .with_default(id.as_str())
            .build()?;
        schema.add_field(schema_field)?;

        for mixin in mixins {
            schema.add_mixin(mixin)?;
        }

        for field in fields {
            schema.add_field(field)?;
        }

        schema.required = schema
            .fields
            .iter()
            .filter(|f| f.is_required())
            .map(|f| f.name().to_string())
            .collect();

        log::debug!(
            "Built schema {} with {} fields and {} mixins",
            schema.id,
            schema.fields.len(),
            schema.mixins.len()
        );
        Ok(Arc::new(schema))
    }

    fn add_mixin(&mut self, mixin: Arc<Mixin>) -> MessageResult<()> {
        if self.has_mixin(mixin.curie().as_str()) {
            return Err(MessageError::MixinAlreadyAdded {
                schema: self.id.to_string(),
                mixin: mixin.id().to_string(),
            });
        }
        for field in mixin.fields() {
            self.add_arc_field(field.clone())?;
        }
        self.mixins.push(mixin);
        Ok(())
    }

    fn add_field(&mut self, field: Field) -> MessageResult<()> {
        self.add_arc_field(Arc::new(field))
    }

    fn add_arc_field(&mut self, field: Arc<Field>) -> MessageResult<()> {
        let Some(&position) = self.index.get(field.name()) else {
            self.index.insert(field.name().to_string(), self.fields.len());
            self.fields.push(field);
            return Ok(());
        };

        let existing = &self.fields[position];
        if !existing.is_overridable() {
            return Err(MessageError::FieldAlreadyDefined {
                schema: self.id.to_string(),
                field: field.name().to_string(),
            });
        }
        existing
            .is_compatible_override(&field)
            .map_err(|reason| MessageError::FieldOverrideNotCompatible {
                schema: self.id.to_string(),
                field: field.name().to_string(),
                reason,
            })?;

        self.fields[position] = field;
        Ok(())
    }

    pub fn id(&self) -> &Arc<SchemaId> {
        &self.id
    }

    pub fn curie(&self) -> &Arc<SchemaCurie> {
        self.id.curie()
    }

    pub fn curie_major(&self) -> &str {
        self.id.curie_major()
    }

    pub fn qname(&self) -> &Arc<SchemaQName> {
        self.id.qname()
    }

    pub fn fields(&self) -> &[Arc<Field>] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> MessageResult<&Arc<Field>> {
        self.index
            .get(name)
            .map(|&i| &self.fields[i])
            .ok_or_else(|| MessageError::FieldNotDefined {
                schema: self.id.to_string(),
                field: name.to_string(),
            })
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn required_fields(&self) -> Vec<&Arc<Field>> {
        self.required
            .iter()
            .filter_map(|name| self.index.get(name).map(|&i| &self.fields[i]))
            .collect()
    }

    pub fn mixins(&self) -> &[Arc<Mixin>] {
        &self.mixins
    }

    /// Matches a mixin by full id, curie or curie-major.
    pub fn has_mixin(&self, mixin: &str) -> bool {
        self.find_mixin(mixin).is_some()
    }

    pub fn mixin(&self, mixin: &str) -> MessageResult<&Arc<Mixin>> {
        self.find_mixin(mixin)
            .ok_or_else(|| MessageError::MixinNotDefined {
                schema: self.id.to_string(),
                mixin: mixin.to_string(),
            })
    }

    fn find_mixin(&self, key: &str) -> Option<&Arc<Mixin>> {
        self.mixins.iter().find(|m| {
            m.curie().as_str() == key || m.curie_major() == key || m.id().as_str() == key
        })
    }

    pub fn mixin_ids(&self) -> Vec<String> {
        self.mixins.iter().map(|m| m.id().to_string()).collect()
    }

    pub fn mixin_curies(&self) -> Vec<String> {
        self.mixins.iter().map(|m| m.curie().to_string()).collect()
    }

    /// True when the curie is this schema's own or one of its mixins'.
    pub fn uses_curie(&self, curie: &str) -> bool {
        self.curie().as_str() == curie || self.mixins.iter().any(|m| m.curie().as_str() == curie)
    }

    pub fn to_object(&self) -> JsonValue {
        json!({
            "id": self.id.as_str(),
            "curie": self.curie().as_str(),
            "curie_major": self.curie_major(),
            "qname": self.qname().as_str(),
            "mixins": self.mixin_ids(),
            "fields": self.fields.iter().map(|f| f.to_object()).collect::<Vec<_>>(),
        })
    }

    /// Fresh message with defaults populated.
    pub fn create_message(self: &Arc<Self>) -> Message {
        Message::create(self)
    }

    /// Message built from a wire payload, decoded against this schema.
    pub async fn create_message_with(self: &Arc<Self>, data: &JsonValue) -> MessageResult<Message> {
        ObjectSerializer::default()
            .deserialize_with_schema(self, data)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn taggable() -> Arc<Mixin> {
        Mixin::get_or_create("acme:core:mixin:schema-taggable:1-0-0", || {
            Ok(vec![
                FieldBuilder::new("tags", TypeName::String).as_a_set().build()?,
                FieldBuilder::new("label", TypeName::String)
                    .overridable(true)
                    .build()?,
                FieldBuilder::new("owner", TypeName::String).required().build()?,
            ])
        })
        .unwrap()
    }

    #[test]
    fn test_field_order_and_implicit_schema_field() {
        let schema = Schema::new(
            "acme:blog:node:article:1-0-0",
            vec![FieldBuilder::new("title", TypeName::String).build().unwrap()],
            vec![taggable()],
        )
        .unwrap();

        let names: Vec<&str> = schema.fields().iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["_schema", "tags", "label", "owner", "title"]);

        let schema_field = schema.field("_schema").unwrap();
        assert!(schema_field.is_required());
        assert_eq!(
            schema_field.default_value(),
            Some(Value::from("acme:blog:node:article:1-0-0"))
        );
        assert_eq!(schema.curie_major(), "acme:blog:node:article:v1");
        assert_eq!(schema.qname().as_str(), "acme:article");
    }

    #[test]
    fn test_compatible_override_keeps_position() {
        let schema = Schema::new(
            "acme:blog:node:override-ok:1-0-0",
            vec![FieldBuilder::new("label", TypeName::String)
                .required()
                .build()
                .unwrap()],
            vec![taggable()],
        )
        .unwrap();

        assert_eq!(schema.fields()[2].name(), "label");
        assert!(schema.fields()[2].is_required());
        assert_eq!(schema.required_fields().len(), 3);
    }

    #[test]
    fn test_non_overridable_field_cannot_be_redeclared() {
        let result = Schema::new(
            "acme:blog:node:override-bad:1-0-0",
            vec![FieldBuilder::new("owner", TypeName::String)
                .required()
                .build()
                .unwrap()],
            vec![taggable()],
        );
        assert!(matches!(result, Err(MessageError::FieldAlreadyDefined { .. })));
    }

    #[test]
    fn test_incompatible_override_is_rejected() {
        let result = Schema::new(
            "acme:blog:node:override-type:1-0-0",
            vec![FieldBuilder::new("label", TypeName::Text).build().unwrap()],
            vec![taggable()],
        );
        assert!(matches!(
            result,
            Err(MessageError::FieldOverrideNotCompatible { .. })
        ));
    }

    #[test]
    fn test_schema_field_is_not_overridable() {
        let result = Schema::new(
            "acme:blog:node:override-schema:1-0-0",
            vec![FieldBuilder::new("_schema", TypeName::String).build().unwrap()],
            vec![],
        );
        assert!(matches!(result, Err(MessageError::FieldAlreadyDefined { .. })));
    }

    #[test]
    fn test_mixin_lookups() {
        let schema = Schema::new("acme:blog:node:mixed:1-0-0", vec![], vec![taggable()]).unwrap();
        assert!(schema.has_mixin("acme:core:mixin:schema-taggable"));
        assert!(schema.has_mixin("acme:core:mixin:schema-taggable:v1"));
        assert!(schema.uses_curie("acme:core:mixin:schema-taggable"));
        assert!(schema.uses_curie("acme:blog:node:mixed"));
        assert!(matches!(
            schema.mixin("acme:core:mixin:unknown"),
            Err(MessageError::MixinNotDefined { .. })
        ));
        assert!(matches!(
            schema.field("nope"),
            Err(MessageError::FieldNotDefined { .. })
        ));

        let duplicate = Schema::new(
            "acme:blog:node:mixed-twice:1-0-0",
            vec![],
            vec![taggable(), taggable()],
        );
        assert!(matches!(duplicate, Err(MessageError::MixinAlreadyAdded { .. })));
    }
}
