//! Component categories and specs.

use crate::FieldSpec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The category a component belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentType {
    Buffer,
    Cache,
    Input,
    Metrics,
    Output,
    Processor,
    RateLimit,
    Tracer,
}

impl ComponentType {
    pub const ALL: [ComponentType; 8] = [
        ComponentType::Buffer,
        ComponentType::Cache,
        ComponentType::Input,
        ComponentType::Metrics,
        ComponentType::Output,
        ComponentType::Processor,
        ComponentType::RateLimit,
        ComponentType::Tracer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentType::Buffer => "buffer",
            ComponentType::Cache => "cache",
            ComponentType::Input => "input",
            ComponentType::Metrics => "metrics",
            ComponentType::Output => "output",
            ComponentType::Processor => "processor",
            ComponentType::RateLimit => "rate_limit",
            ComponentType::Tracer => "tracer",
        }
    }

    /// Fields shared by every component of this category, next to the type
    /// key. For metrics this is the `mapping` expression.
    pub fn core_fields(&self) -> Vec<FieldSpec> {
        match self {
            ComponentType::Metrics => vec![
                FieldSpec::string(
                    "mapping",
                    "An optional mapping applied to metric names and labels.",
                )
                .with_default(serde_json::Value::String(String::new())),
            ],
            ComponentType::Buffer | ComponentType::Tracer => Vec::new(),
            ComponentType::Cache
            | ComponentType::Input
            | ComponentType::Output
            | ComponentType::Processor
            | ComponentType::RateLimit => vec![
                FieldSpec::string("label", "An optional label to identify this component.")
                    .with_default(serde_json::Value::String(String::new())),
            ],
        }
    }

    /// Names of [`ComponentType::core_fields`].
    pub fn core_field_names(&self) -> &'static [&'static str] {
        match self {
            ComponentType::Metrics => &["mapping"],
            ComponentType::Buffer | ComponentType::Tracer => &[],
            ComponentType::Cache
            | ComponentType::Input
            | ComponentType::Output
            | ComponentType::Processor
            | ComponentType::RateLimit => &["label"],
        }
    }

    /// Keys of a component node that never name a component type.
    pub fn is_reserved_key(&self, key: &str) -> bool {
        key == "type" || key == "plugin" || self.core_field_names().contains(&key)
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComponentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ComponentType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown component type: {s}"))
    }
}

/// Stability of a component.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Stable,
    Beta,
    Experimental,
    Deprecated,
}

/// Documentation and schema for one registered component.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentSpec {
    pub name: String,
    pub category: ComponentType,
    pub status: Status,
    pub summary: String,

    /// Whether the component takes a nested config payload under its key.
    pub plugin: bool,

    /// Schema of the plugin payload. An object spec; empty for components
    /// without fields.
    pub config: FieldSpec,
}

impl ComponentSpec {
    /// A component without a config payload.
    pub fn new(name: impl Into<String>, category: ComponentType) -> Self {
        let name = name.into();
        Self {
            config: FieldSpec::object(name.clone(), "", Vec::new()),
            name,
            category,
            status: Status::Stable,
            summary: String::new(),
            plugin: false,
        }
    }

    /// A component whose payload follows the given fields.
    pub fn plugin(name: impl Into<String>, category: ComponentType, fields: Vec<FieldSpec>) -> Self {
        let mut spec = Self::new(name, category);
        spec.config.children = fields;
        spec.plugin = true;
        spec
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }
}
