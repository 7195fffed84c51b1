use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value as JsonValue};
use std::fmt;
use std::sync::Arc;

use super::enums::EnumDef;
use super::format::Format;
use super::id::SchemaCurie;
use crate::constants::{DECIMAL_MAX_PRECISION, FIELD_NAME_PATTERN};
use crate::error::{MessageError, MessageResult};
use crate::objects::IdentifierKind;
use crate::types::{Type, TypeName};
use crate::value::Value;

static FIELD_NAME_REGEX: Lazy<Regex> = Lazy::new(|| match Regex::new(FIELD_NAME_PATTERN) {
    Ok(regex) => regex,
    Err(e) => panic!("invalid built-in pattern {FIELD_NAME_PATTERN}: {e}"),
});

/// Cardinality of a field and therefore the shape of its storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldRule {
    Single,
    Set,
    List,
    Map,
}

impl FieldRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Set => "set",
            Self::List => "list",
            Self::Map => "map",
        }
    }
}

impl fmt::Display for FieldRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FieldRule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// The concrete kind a field expects beyond its type.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassProto {
    Identifier(IdentifierKind),
    StringEnum(Arc<EnumDef>),
    IntEnum(Arc<EnumDef>),
}

impl ClassProto {
    pub fn name(&self) -> String {
        match self {
            Self::Identifier(kind) => format!("identifier:{kind}"),
            Self::StringEnum(def) | Self::IntEnum(def) => format!("enum:{}", def.name()),
        }
    }
}

/// Explicit field default, taking precedence over the type default.
#[derive(Debug, Clone)]
pub enum FieldDefault {
    /// Static value for a SINGLE field.
    Value(Value),
    /// Static items for a SET or LIST field.
    Values(Vec<Value>),
    /// Computed on every population, for SINGLE fields.
    Generator(fn() -> Value),
}

/// Custom check run before the type guard.
pub type FieldAssertion = Arc<dyn Fn(&Value, &Field) -> MessageResult<()> + Send + Sync>;

/// Immutable field descriptor. Built through [`super::FieldBuilder`].
#[derive(Clone)]
pub struct Field {
    pub(super) name: String,
    pub(super) type_name: TypeName,
    pub(super) rule: FieldRule,
    pub(super) required: bool,
    pub(super) min_length: Option<usize>,
    pub(super) max_length: Option<usize>,
    pub(super) pattern: Option<Regex>,
    pub(super) format: Option<Format>,
    pub(super) min: Option<i64>,
    pub(super) max: Option<i64>,
    pub(super) precision: u32,
    pub(super) scale: u32,
    pub(super) default: Option<FieldDefault>,
    pub(super) use_type_default: bool,
    pub(super) class_proto: Option<ClassProto>,
    pub(super) any_of_curies: Vec<String>,
    pub(super) overridable: bool,
    pub(super) assertion: Option<FieldAssertion>,
}

impl Field {
    /// Checks the descriptor is internally consistent. Called once by the builder.
    pub(super) fn validate_definition(&self) -> MessageResult<()> {
        let invalid = |reason: String| {
            MessageError::assertion(format!("Field [{}] is invalid: {reason}", self.name))
        };

        if !FIELD_NAME_REGEX.is_match(&self.name) {
            return Err(invalid(format!(
                "name must match the pattern [{FIELD_NAME_PATTERN}]"
            )));
        }

        let field_type = self.get_type();

        match (&self.type_name, &self.class_proto) {
            (TypeName::StringEnum, Some(ClassProto::StringEnum(def))) if def.is_string_enum() => {}
            (TypeName::StringEnum, _) => {
                return Err(invalid("string-enum requires a string enum class proto".into()))
            }
            (TypeName::IntEnum, Some(ClassProto::IntEnum(def))) if def.is_int_enum() => {}
            (TypeName::IntEnum, _) => {
                return Err(invalid("int-enum requires an int enum class proto".into()))
            }
            (TypeName::Identifier, Some(ClassProto::Identifier(_))) => {}
            (TypeName::Identifier, _) => {
                return Err(invalid("identifier requires an identifier class proto".into()))
            }
            (TypeName::Uuid, None | Some(ClassProto::Identifier(IdentifierKind::Uuid)))
            | (
                TypeName::Uuid | TypeName::TimeUuid,
                Some(ClassProto::Identifier(IdentifierKind::TimeUuid)),
            )
            | (TypeName::TimeUuid, None) => {}
            (_, None) => {}
            (other, Some(proto)) => {
                return Err(invalid(format!(
                    "type [{other}] does not accept class proto [{}]",
                    proto.name()
                )))
            }
        }

        if !self.any_of_curies.is_empty() {
            if !field_type.is_message() {
                return Err(invalid("any_of_curies is only supported on message fields".into()));
            }
            for curie in &self.any_of_curies {
                SchemaCurie::from_string(curie)?;
            }
        }

        if self.rule == FieldRule::Set && (!field_type.encodes_to_scalar() || field_type.is_message())
        {
            return Err(invalid(format!(
                "type [{}] cannot be used in a set",
                self.type_name
            )));
        }

        if (self.pattern.is_some() || self.format.is_some()) && self.type_name != TypeName::String {
            return Err(invalid("pattern and format are only supported on string fields".into()));
        }

        if let (Some(min), Some(max)) = (self.min, self.max) {
            if min > max {
                return Err(invalid(format!("min [{min}] cannot be greater than max [{max}]")));
            }
        }

        if let (Some(min), Some(max)) = (self.min_length, self.max_length) {
            if min > max {
                return Err(invalid(format!(
                    "min_length [{min}] cannot be greater than max_length [{max}]"
                )));
            }
        }

        if self.type_name == TypeName::Decimal {
            if self.precision == 0 || self.precision > DECIMAL_MAX_PRECISION {
                return Err(invalid(format!(
                    "precision [{}] must be between 1 and {DECIMAL_MAX_PRECISION}",
                    self.precision
                )));
            }
            if self.scale > self.precision {
                return Err(invalid(format!(
                    "scale [{}] cannot exceed precision [{}]",
                    self.scale, self.precision
                )));
            }
        }

        match &self.default {
            None => {}
            Some(FieldDefault::Value(value)) => {
                if self.rule != FieldRule::Single {
                    return Err(invalid("a single default requires a single field".into()));
                }
                self.guard_value(value)?;
            }
            Some(FieldDefault::Values(values)) => {
                if !matches!(self.rule, FieldRule::Set | FieldRule::List) {
                    return Err(invalid("default values require a set or list field".into()));
                }
                for value in values {
                    self.guard_value(value)?;
                }
            }
            Some(FieldDefault::Generator(_)) => {
                if self.rule != FieldRule::Single {
                    return Err(invalid("a default generator requires a single field".into()));
                }
            }
        }

        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_name(&self) -> TypeName {
        self.type_name
    }

    pub fn get_type(&self) -> &'static dyn Type {
        self.type_name.get_type()
    }

    pub fn rule(&self) -> FieldRule {
        self.rule
    }

    pub fn is_single(&self) -> bool {
        self.rule == FieldRule::Single
    }

    pub fn is_set(&self) -> bool {
        self.rule == FieldRule::Set
    }

    pub fn is_list(&self) -> bool {
        self.rule == FieldRule::List
    }

    pub fn is_map(&self) -> bool {
        self.rule == FieldRule::Map
    }

    pub fn is_collection(&self) -> bool {
        self.rule != FieldRule::Single
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_overridable(&self) -> bool {
        self.overridable
    }

    pub fn min_length(&self) -> Option<usize> {
        self.min_length
    }

    pub fn max_length(&self) -> Option<usize> {
        self.max_length
    }

    pub fn pattern(&self) -> Option<&Regex> {
        self.pattern.as_ref()
    }

    pub fn format(&self) -> Option<Format> {
        self.format
    }

    pub fn min(&self) -> Option<i64> {
        self.min
    }

    pub fn max(&self) -> Option<i64> {
        self.max
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn class_proto(&self) -> Option<&ClassProto> {
        self.class_proto.as_ref()
    }

    pub fn any_of_curies(&self) -> &[String] {
        &self.any_of_curies
    }

    pub fn has_explicit_default(&self) -> bool {
        self.default.is_some()
    }

    /// Default for a SINGLE field: the explicit default, else the type default
    /// unless disabled.
    pub fn default_value(&self) -> Option<Value> {
        match &self.default {
            Some(FieldDefault::Value(value)) => Some(value.clone()),
            Some(FieldDefault::Generator(generate)) => Some(generate()),
            Some(FieldDefault::Values(_)) => None,
            None if self.is_single() && self.use_type_default => self.get_type().get_default(),
            None => None,
        }
    }

    /// Default items for a SET or LIST field.
    pub fn default_values(&self) -> Vec<Value> {
        match &self.default {
            Some(FieldDefault::Values(values)) => values.clone(),
            _ => Vec::new(),
        }
    }

    /// Validates a single item against the custom assertion and the type guard.
    pub fn guard_value(&self, value: &Value) -> MessageResult<()> {
        if let Some(assertion) = &self.assertion {
            assertion(value, self)?;
        }
        self.get_type().guard(value, self)
    }

    /// Whether `replacement` may override this field. Only the required flag
    /// may change, and only from optional to required.
    pub fn is_compatible_override(&self, replacement: &Field) -> Result<(), String> {
        if self.type_name != replacement.type_name {
            return Err(format!(
                "type [{}] cannot be changed to [{}]",
                self.type_name, replacement.type_name
            ));
        }
        if self.rule != replacement.rule {
            return Err(format!(
                "rule [{}] cannot be changed to [{}]",
                self.rule, replacement.rule
            ));
        }
        if self.required && !replacement.required {
            return Err("a required field cannot become optional".to_string());
        }
        Ok(())
    }

    /// Descriptive JSON form used by schema introspection.
    pub fn to_object(&self) -> JsonValue {
        let mut object = Map::new();
        object.insert("name".to_string(), json!(self.name));
        object.insert("type".to_string(), json!(self.type_name));
        object.insert("rule".to_string(), json!(self.rule));
        object.insert("required".to_string(), json!(self.required));
        object.insert("overridable".to_string(), json!(self.overridable));
        if let Some(v) = self.min_length {
            object.insert("min_length".to_string(), json!(v));
        }
        if let Some(v) = self.max_length {
            object.insert("max_length".to_string(), json!(v));
        }
        if let Some(v) = &self.pattern {
            object.insert("pattern".to_string(), json!(v.as_str()));
        }
        if let Some(v) = self.format {
            object.insert("format".to_string(), json!(v));
        }
        if let Some(v) = self.min {
            object.insert("min".to_string(), json!(v));
        }
        if let Some(v) = self.max {
            object.insert("max".to_string(), json!(v));
        }
        if self.type_name == TypeName::Decimal {
            object.insert("precision".to_string(), json!(self.precision));
            object.insert("scale".to_string(), json!(self.scale));
        }
        if let Some(proto) = &self.class_proto {
            object.insert("class_proto".to_string(), json!(proto.name()));
        }
        if !self.any_of_curies.is_empty() {
            object.insert("any_of_curies".to_string(), json!(self.any_of_curies));
        }
        JsonValue::Object(object)
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .field("rule", &self.rule)
            .field("required", &self.required)
            .field("overridable", &self.overridable)
            .finish_non_exhaustive()
    }
}
