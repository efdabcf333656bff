//! Field specs: the schema of config objects.

use crate::ComponentType;
use serde_json::Value;

/// Whether a field holds one value, a list of values or a map of values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Scalar,
    Array,
    Map,
}

/// The type of each value a field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Int,
    Float,
    Bool,
    Object,
    Component(ComponentType),
    Unknown,
}

impl FieldType {
    pub fn name(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Int => "int",
            FieldType::Float => "float",
            FieldType::Bool => "bool",
            FieldType::Object => "object",
            FieldType::Component(_) => "component",
            FieldType::Unknown => "unknown",
        }
    }
}

/// Schema of a single config field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub description: String,
    pub kind: FieldKind,
    pub field_type: FieldType,

    /// Fields of an object.
    pub children: Vec<FieldSpec>,

    pub default: Option<Value>,
    pub optional: bool,
    pub deprecated: bool,

    /// Allowed values, compared case-insensitively. Empty means any.
    pub options: Vec<String>,
}

impl FieldSpec {
    fn new(name: impl Into<String>, description: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kind: FieldKind::Scalar,
            field_type,
            children: Vec::new(),
            default: None,
            optional: false,
            deprecated: false,
            options: Vec::new(),
        }
    }

    pub fn string(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, description, FieldType::String)
    }

    pub fn int(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, description, FieldType::Int)
    }

    pub fn float(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, description, FieldType::Float)
    }

    pub fn bool(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, description, FieldType::Bool)
    }

    pub fn any(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, description, FieldType::Unknown)
    }

    pub fn object(
        name: impl Into<String>,
        description: impl Into<String>,
        children: Vec<FieldSpec>,
    ) -> Self {
        let mut spec = Self::new(name, description, FieldType::Object);
        spec.children = children;
        spec
    }

    pub fn component(
        name: impl Into<String>,
        description: impl Into<String>,
        ctype: ComponentType,
    ) -> Self {
        Self::new(name, description, FieldType::Component(ctype))
    }

    /// Make this field a list of its type.
    pub fn array(mut self) -> Self {
        self.kind = FieldKind::Array;
        self
    }

    /// Make this field a map of arbitrary keys to its type.
    pub fn map(mut self) -> Self {
        self.kind = FieldKind::Map;
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    pub fn with_options(mut self, options: &[&str]) -> Self {
        self.options = options.iter().map(|o| o.to_string()).collect();
        self
    }

    /// Whether a config must set this field explicitly.
    ///
    /// Objects whose children all have defaults are not required.
    pub fn is_required(&self) -> bool {
        !self.optional && self.default_value().is_none()
    }

    pub fn child(&self, name: &str) -> Option<&FieldSpec> {
        self.children.iter().find(|c| c.name == name)
    }

    /// The default value of an object built from its children's defaults.
    ///
    /// Returns `None` when this field has no default and a child is required.
    pub fn default_value(&self) -> Option<Value> {
        if let Some(default) = &self.default {
            return Some(default.clone());
        }
        if self.field_type != FieldType::Object || self.kind != FieldKind::Scalar {
            return None;
        }
        let mut map = serde_json::Map::new();
        for child in &self.children {
            match child.default_value() {
                Some(value) => {
                    map.insert(child.name.clone(), value);
                }
                None if child.optional => {}
                None => return None,
            }
        }
        Some(Value::Object(map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builders() {
        let field = FieldSpec::string("tag_format", "Tag style.")
            .with_options(&["none", "datadog"])
            .with_default(json!("none"));
        assert_eq!(field.kind, FieldKind::Scalar);
        assert_eq!(field.field_type, FieldType::String);
        assert_eq!(field.options, vec!["none", "datadog"]);
        assert!(!field.is_required());

        let buckets = FieldSpec::float("buckets", "").array();
        assert_eq!(buckets.kind, FieldKind::Array);
        assert!(buckets.is_required());
        assert!(!buckets.clone().optional().is_required());
    }

    #[test]
    fn test_object_default_value() {
        let obj = FieldSpec::object(
            "auth",
            "",
            vec![
                FieldSpec::string("username", "").with_default(json!("")),
                FieldSpec::bool("enabled", "").with_default(json!(false)),
                FieldSpec::string("token", "").optional(),
            ],
        );
        assert_eq!(
            obj.default_value(),
            Some(json!({"username": "", "enabled": false}))
        );

        let required = FieldSpec::object("x", "", vec![FieldSpec::string("address", "")]);
        assert_eq!(required.default_value(), None);
    }
}
