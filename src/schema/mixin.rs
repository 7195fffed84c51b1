use once_cell::sync::Lazy;
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;

use super::field::Field;
use super::id::{SchemaCurie, SchemaId};
use super::interner::Interner;
use crate::error::{MessageError, MessageResult};

static MIXINS: Lazy<Interner<Mixin>> = Lazy::new(Interner::new);

/// A reusable, named bundle of fields that schemas compose.
///
/// Mixins are flyweights: one instance per schema id for the process lifetime.
#[derive(Debug)]
pub struct Mixin {
    id: Arc<SchemaId>,
    fields: Vec<Arc<Field>>,
}

impl Mixin {
    /// Returns the mixin registered under `id`, building it from `fields` on first use.
    ///
    /// Later calls return the first instance and never invoke `fields`.
    pub fn get_or_create<F>(id: &str, fields: F) -> MessageResult<Arc<Mixin>>
    where
        F: FnOnce() -> MessageResult<Vec<Field>>,
    {
        let schema_id = SchemaId::from_string(id)?;
        MIXINS.get_or_try_insert(schema_id.as_str(), || {
            let fields = fields()?;
            let mut names = std::collections::HashSet::new();
            for field in &fields {
                if !names.insert(field.name().to_string()) {
                    return Err(MessageError::FieldAlreadyDefined {
                        schema: schema_id.to_string(),
                        field: field.name().to_string(),
                    });
                }
            }
            log::debug!("Created mixin {} with {} fields", schema_id, fields.len());
            Ok(Mixin {
                id: schema_id.clone(),
                fields: fields.into_iter().map(Arc::new).collect(),
            })
        })
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

    pub fn fields(&self) -> &[Arc<Field>] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Arc<Field>> {
        self.fields.iter().find(|f| f.name() == name)
    }

    pub fn to_object(&self) -> JsonValue {
        json!({
            "id": self.id.as_str(),
            "curie": self.curie().as_str(),
            "fields": self.fields.iter().map(|f| f.to_object()).collect::<Vec<_>>(),
        })
    }
}
