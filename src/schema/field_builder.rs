use regex::Regex;
use std::sync::Arc;

use super::enums::EnumDef;
use super::field::{ClassProto, Field, FieldAssertion, FieldDefault, FieldRule};
use super::format::Format;
use crate::constants::{DEFAULT_DECIMAL_PRECISION, DEFAULT_DECIMAL_SCALE};
use crate::error::{MessageError, MessageResult};
use crate::objects::IdentifierKind;
use crate::types::TypeName;
use crate::value::Value;

/// Fluent constructor for [`Field`].
///
/// ```
/// use msgfold::schema::FieldBuilder;
/// use msgfold::types::TypeName;
///
/// let title = FieldBuilder::new("title", TypeName::String)
///     .required()
///     .max_length(100)
///     .build()
///     .unwrap();
/// assert!(title.is_required());
/// ```
pub struct FieldBuilder {
    name: String,
    type_name: TypeName,
    rule: FieldRule,
    required: bool,
    min_length: Option<usize>,
    max_length: Option<usize>,
    pattern: Option<String>,
    format: Option<Format>,
    min: Option<i64>,
    max: Option<i64>,
    precision: u32,
    scale: u32,
    default: Option<FieldDefault>,
    use_type_default: bool,
    class_proto: Option<ClassProto>,
    any_of_curies: Vec<String>,
    overridable: bool,
    assertion: Option<FieldAssertion>,
}

impl FieldBuilder {
    pub fn new(name: &str, type_name: TypeName) -> Self {
        Self {
            name: name.to_string(),
            type_name,
            rule: FieldRule::Single,
            required: false,
            min_length: None,
            max_length: None,
            pattern: None,
            format: None,
            min: None,
            max: None,
            precision: DEFAULT_DECIMAL_PRECISION,
            scale: DEFAULT_DECIMAL_SCALE,
            default: None,
            use_type_default: true,
            class_proto: None,
            any_of_curies: Vec::new(),
            overridable: false,
            assertion: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn as_a_set(mut self) -> Self {
        self.rule = FieldRule::Set;
        self
    }

    pub fn as_a_list(mut self) -> Self {
        self.rule = FieldRule::List;
        self
    }

    pub fn as_a_map(mut self) -> Self {
        self.rule = FieldRule::Map;
        self
    }

    pub fn rule(mut self, rule: FieldRule) -> Self {
        self.rule = rule;
        self
    }

    pub fn min_length(mut self, min_length: usize) -> Self {
        self.min_length = Some(min_length);
        self
    }

    pub fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    /// Regular expression the string value must match. Compiled on build.
    pub fn pattern(mut self, pattern: &str) -> Self {
        self.pattern = Some(pattern.to_string());
        self
    }

    pub fn format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    pub fn min(mut self, min: i64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: i64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }

    pub fn scale(mut self, scale: u32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(FieldDefault::Value(value.into()));
        self
    }

    pub fn with_defaults(mut self, values: Vec<Value>) -> Self {
        self.default = Some(FieldDefault::Values(values));
        self
    }

    pub fn with_default_fn(mut self, generate: fn() -> Value) -> Self {
        self.default = Some(FieldDefault::Generator(generate));
        self
    }

    /// Disables the fallback to the type default when no explicit default is set.
    pub fn use_type_default(mut self, enabled: bool) -> Self {
        self.use_type_default = enabled;
        self
    }

    pub fn class_proto(mut self, class_proto: ClassProto) -> Self {
        self.class_proto = Some(class_proto);
        self
    }

    pub fn identifier(self, kind: IdentifierKind) -> Self {
        self.class_proto(ClassProto::Identifier(kind))
    }

    /// Attaches an enum definition, picking the proto that matches the enum values.
    pub fn enum_def(self, def: Arc<EnumDef>) -> Self {
        if def.is_int_enum() && !def.is_string_enum() {
            self.class_proto(ClassProto::IntEnum(def))
        } else {
            self.class_proto(ClassProto::StringEnum(def))
        }
    }

    pub fn any_of_curies(mut self, curies: &[&str]) -> Self {
        self.any_of_curies = curies.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn overridable(mut self, overridable: bool) -> Self {
        self.overridable = overridable;
        self
    }

    pub fn assertion<F>(mut self, assertion: F) -> Self
    where
        F: Fn(&Value, &Field) -> MessageResult<()> + Send + Sync + 'static,
    {
        self.assertion = Some(Arc::new(assertion));
        self
    }

    pub fn build(self) -> MessageResult<Field> {
        let pattern = match &self.pattern {
            Some(pattern) => Some(Regex::new(pattern).map_err(|e| {
                MessageError::assertion(format!(
                    "Field [{}] is invalid: pattern [{pattern}] does not compile: {e}",
                    self.name
                ))
            })?),
            None => None,
        };

        let field = Field {
            name: self.name,
            type_name: self.type_name,
            rule: self.rule,
            required: self.required,
            min_length: self.min_length,
            max_length: self.max_length,
            pattern,
            format: self.format,
            min: self.min,
            max: self.max,
            precision: self.precision,
            scale: self.scale,
            default: self.default,
            use_type_default: self.use_type_default,
            class_proto: self.class_proto,
            any_of_curies: self.any_of_curies,
            overridable: self.overridable,
            assertion: self.assertion,
        };
        field.validate_definition()?;
        Ok(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_names() {
        assert!(FieldBuilder::new("1abc", TypeName::String).build().is_err());
        assert!(FieldBuilder::new("with-dash", TypeName::String).build().is_err());
        assert!(FieldBuilder::new("_ok_1", TypeName::String).build().is_ok());
    }

    #[test]
    fn test_enum_requires_class_proto() {
        assert!(FieldBuilder::new("status", TypeName::StringEnum).build().is_err());
        let status = EnumDef::from_strings("status", &[("DRAFT", "draft")]);
        let field = FieldBuilder::new("status", TypeName::StringEnum)
            .enum_def(status)
            .build()
            .unwrap();
        assert!(matches!(field.class_proto(), Some(ClassProto::StringEnum(_))));
    }

    #[test]
    fn test_class_proto_on_plain_type_is_rejected() {
        let result = FieldBuilder::new("name", TypeName::String)
            .identifier(IdentifierKind::Slug)
            .build();
        assert!(matches!(result, Err(MessageError::AssertionFailed(_))));
    }

    #[test]
    fn test_set_requires_scalar_encoding() {
        assert!(FieldBuilder::new("tags", TypeName::String).as_a_set().build().is_ok());
        assert!(FieldBuilder::new("points", TypeName::GeoPoint).as_a_set().build().is_err());
        assert!(FieldBuilder::new("nested", TypeName::Message).as_a_set().build().is_err());
    }

    #[test]
    fn test_range_and_length_consistency() {
        assert!(FieldBuilder::new("n", TypeName::Int).min(10).max(5).build().is_err());
        assert!(FieldBuilder::new("s", TypeName::String)
            .min_length(10)
            .max_length(5)
            .build()
            .is_err());
        assert!(FieldBuilder::new("d", TypeName::Decimal).precision(0).build().is_err());
        assert!(FieldBuilder::new("d", TypeName::Decimal)
            .precision(4)
            .scale(5)
            .build()
            .is_err());
    }

    #[test]
    fn test_pattern_only_on_strings() {
        assert!(FieldBuilder::new("n", TypeName::Int).pattern("^a$").build().is_err());
        assert!(FieldBuilder::new("s", TypeName::String).pattern("(").build().is_err());
    }

    #[test]
    fn test_static_default_is_guarded() {
        assert!(FieldBuilder::new("n", TypeName::TinyInt)
            .with_default(300)
            .build()
            .is_err());
        let field = FieldBuilder::new("n", TypeName::TinyInt)
            .with_default(7)
            .build()
            .unwrap();
        assert_eq!(field.default_value(), Some(Value::Int(7)));
    }

    #[test]
    fn test_type_default_applies_to_single_only() {
        let single = FieldBuilder::new("n", TypeName::Int).build().unwrap();
        assert_eq!(single.default_value(), Some(Value::Int(0)));

        let disabled = FieldBuilder::new("n", TypeName::Int)
            .use_type_default(false)
            .build()
            .unwrap();
        assert_eq!(disabled.default_value(), None);

        let list = FieldBuilder::new("n", TypeName::Int).as_a_list().build().unwrap();
        assert_eq!(list.default_value(), None);
        assert!(list.default_values().is_empty());
    }

    #[test]
    fn test_override_compatibility() {
        let optional = FieldBuilder::new("a", TypeName::String).build().unwrap();
        let required = FieldBuilder::new("a", TypeName::String).required().build().unwrap();
        let other_type = FieldBuilder::new("a", TypeName::Text).build().unwrap();

        assert!(optional.is_compatible_override(&required).is_ok());
        assert!(required.is_compatible_override(&optional).is_err());
        assert!(optional.is_compatible_override(&other_type).is_err());
    }

    #[test]
    fn test_any_of_curies_requires_message_type() {
        assert!(FieldBuilder::new("m", TypeName::String)
            .any_of_curies(&["acme:blog::article"])
            .build()
            .is_err());
        assert!(FieldBuilder::new("m", TypeName::Message)
            .any_of_curies(&["acme:blog::article"])
            .build()
            .is_ok());
        assert!(FieldBuilder::new("m", TypeName::Message)
            .any_of_curies(&["not a curie"])
            .build()
            .is_err());
    }

    #[test]
    fn test_custom_assertion_runs_before_type_guard() {
        let field = FieldBuilder::new("even", TypeName::Int)
            .assertion(|value, _| match value.as_int() {
                Some(n) if n % 2 == 0 => Ok(()),
                _ => Err(MessageError::assertion("must be even")),
            })
            .build()
            .unwrap();
        assert!(field.guard_value(&Value::Int(4)).is_ok());
        assert!(field.guard_value(&Value::Int(3)).is_err());
    }
}
