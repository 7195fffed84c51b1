//! References to other messages and graph nodes.

use serde_json::{json, Map, Value as JsonValue};
use std::fmt;
use std::sync::Arc;

use crate::error::{MessageError, MessageResult};
use crate::schema::{SchemaCurie, SchemaQName};

const MAX_REF_ID_BYTES: usize = 255;
const MAX_TAG_BYTES: usize = 100;

fn check_id(kind: &str, id: &str) -> MessageResult<()> {
    if id.is_empty() || id.len() > MAX_REF_ID_BYTES {
        return Err(MessageError::assertion(format!(
            "{kind} id [{id}] must be between 1 and {MAX_REF_ID_BYTES} bytes"
        )));
    }
    if id.chars().any(|c| c.is_whitespace() || c == '#') {
        return Err(MessageError::assertion(format!(
            "{kind} id [{id}] cannot contain whitespace or '#'"
        )));
    }
    Ok(())
}

/// Points at a specific message by curie and id, with an optional tag.
///
/// String form: `vendor:package:category:message:id#tag`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageRef {
    curie: Arc<SchemaCurie>,
    id: String,
    tag: Option<String>,
}

impl MessageRef {
    pub fn new(curie: Arc<SchemaCurie>, id: &str, tag: Option<&str>) -> MessageResult<Self> {
        check_id("MessageRef", id)?;
        let tag = tag
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty());
        if let Some(tag) = &tag {
            if tag.len() > MAX_TAG_BYTES {
                return Err(MessageError::assertion(format!(
                    "MessageRef tag [{tag}] cannot be longer than {MAX_TAG_BYTES} bytes"
                )));
            }
        }
        Ok(Self {
            curie,
            id: id.to_string(),
            tag,
        })
    }

    pub fn from_string(value: &str) -> MessageResult<Self> {
        let (reference, tag) = match value.split_once('#') {
            Some((reference, tag)) => (reference, Some(tag)),
            None => (value, None),
        };

        // The curie has exactly four segments; everything after belongs to the id.
        let parts: Vec<&str> = reference.splitn(5, ':').collect();
        if parts.len() != 5 {
            return Err(MessageError::assertion(format!(
                "MessageRef [{value}] must be in the form vendor:package:category:message:id#tag"
            )));
        }
        let curie = SchemaCurie::from_string(&parts[..4].join(":"))?;
        Self::new(curie, parts[4], tag)
    }

    pub fn from_object(value: &JsonValue) -> MessageResult<Self> {
        let text = |key: &str| value.get(key).and_then(JsonValue::as_str);
        let curie = text("curie").ok_or_else(|| {
            MessageError::assertion(format!("MessageRef object [{value}] is missing the curie"))
        })?;
        let id = text("id").ok_or_else(|| {
            MessageError::assertion(format!("MessageRef object [{value}] is missing the id"))
        })?;
        Self::new(SchemaCurie::from_string(curie)?, id, text("tag"))
    }

    pub fn curie(&self) -> &Arc<SchemaCurie> {
        &self.curie
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn has_tag(&self) -> bool {
        self.tag.is_some()
    }

    pub fn to_object(&self) -> JsonValue {
        let mut object = Map::new();
        object.insert("curie".to_string(), json!(self.curie.as_str()));
        object.insert("id".to_string(), json!(self.id));
        if let Some(tag) = &self.tag {
            object.insert("tag".to_string(), json!(tag));
        }
        JsonValue::Object(object)
    }
}

impl fmt::Display for MessageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.curie, self.id)?;
        if let Some(tag) = &self.tag {
            write!(f, "#{tag}")?;
        }
        Ok(())
    }
}

/// Points at a node in a graph by qname and id.
///
/// String form: `vendor:label:id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeRef {
    qname: Arc<SchemaQName>,
    id: String,
}

impl NodeRef {
    pub fn new(qname: Arc<SchemaQName>, id: &str) -> MessageResult<Self> {
        check_id("NodeRef", id)?;
        Ok(Self {
            qname,
            id: id.to_string(),
        })
    }

    pub fn from_string(value: &str) -> MessageResult<Self> {
        let parts: Vec<&str> = value.trim().splitn(3, ':').collect();
        if parts.len() != 3 {
            return Err(MessageError::assertion(format!(
                "NodeRef [{value}] must be in the form vendor:label:id"
            )));
        }
        let qname = SchemaQName::from_string(&format!("{}:{}", parts[0], parts[1]))?;
        Self::new(qname, parts[2])
    }

    pub fn qname(&self) -> &Arc<SchemaQName> {
        &self.qname
    }

    pub fn vendor(&self) -> &str {
        self.qname.vendor()
    }

    pub fn label(&self) -> &str {
        self.qname.message()
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.qname, self.id)
    }
}
