//! The root config of a Benthos service.

use crate::{logger, metrics};
use benthos_docs::{ComponentType, FieldSpec, LintError, LintKind, Provider};
use benthos_yaml::Node;
use indexmap::IndexMap;
use serde_json::{Map, Value, json};

/// Sections consumed by the pipeline engine. They are kept as written and
/// not linted here.
pub const PIPELINE_SECTIONS: &[&str] = &[
    "http",
    "input",
    "buffer",
    "pipeline",
    "output",
    "input_resources",
    "processor_resources",
    "output_resources",
    "cache_resources",
    "rate_limit_resources",
    "tracer",
    "tests",
];

const DEFAULT_SHUTDOWN_TIMEOUT: &str = "20s";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub metrics: metrics::Config,
    pub logger: logger::Config,
    pub shutdown_timeout: String,

    /// Pipeline sections, in document order.
    pub sections: IndexMap<String, Value>,
}

impl Config {
    pub fn new(provider: &dyn Provider) -> Self {
        Self {
            metrics: metrics::Config::new(provider),
            logger: logger::Config::default(),
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT.to_string(),
            sections: IndexMap::new(),
        }
    }

    /// Schema of a root document.
    pub fn spec() -> FieldSpec {
        let mut fields: Vec<FieldSpec> = PIPELINE_SECTIONS
            .iter()
            .map(|name| FieldSpec::any(*name, "").optional())
            .collect();
        fields.push(
            FieldSpec::component(
                "metrics",
                "A mechanism for exporting metrics.",
                ComponentType::Metrics,
            )
            .optional(),
        );
        fields.push(logger::Config::spec());
        fields.push(
            FieldSpec::string(
                "shutdown_timeout",
                "Maximum period of time to wait for a clean shutdown.",
            )
            .with_default(json!(DEFAULT_SHUTDOWN_TIMEOUT)),
        );
        FieldSpec::object("", "", fields)
    }

    pub fn from_node(provider: &dyn Provider, node: &Node) -> Result<Self, LintError> {
        Self::new(provider).with_node(provider, node)
    }

    /// Decode a root document over this config. Sections the document does
    /// not set keep their current values; unrecognised keys are ignored.
    pub fn with_node(mut self, provider: &dyn Provider, node: &Node) -> Result<Self, LintError> {
        if node.is_null() {
            return Ok(self);
        }
        let Some(entries) = node.as_mapping() else {
            return Err(LintError::new(
                node.line(),
                LintKind::FailedRead,
                format!("expected object value, got {}", node.kind_name()),
            ));
        };

        for entry in entries {
            match entry.key.as_str() {
                "metrics" if !entry.value.is_null() => {
                    self.metrics = metrics::Config::from_document_node(provider, &entry.value)?;
                }
                "logger" if !entry.value.is_null() => {
                    self.logger = self.logger.with_node(&entry.value)?;
                }
                "shutdown_timeout" if !entry.value.is_null() => match entry.value.as_str() {
                    Some(timeout) => self.shutdown_timeout = timeout.to_string(),
                    None => {
                        return Err(LintError::new(
                            entry.value.line(),
                            LintKind::FailedRead,
                            format!(
                                "expected string value for shutdown_timeout, got {}",
                                entry.value.kind_name()
                            ),
                        ));
                    }
                },
                key if PIPELINE_SECTIONS.contains(&key) => {
                    self.sections.insert(key.to_string(), entry.value.to_json());
                }
                _ => {}
            }
        }
        Ok(self)
    }

    /// The config as a document, sections first.
    pub fn to_json(&self) -> Value {
        let mut map: Map<String, Value> = self
            .sections
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        map.insert("metrics".into(), self.metrics.to_json());
        map.insert("logger".into(), self.logger.to_json());
        map.insert(
            "shutdown_timeout".into(),
            Value::String(self.shutdown_timeout.clone()),
        );
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use benthos_docs::{LintContext, Registry};
    use benthos_yaml::parse;

    #[test]
    fn test_defaults_for_empty_document() {
        let reg = Registry::builtin();
        let config = Config::from_node(&reg, &parse("").unwrap()).unwrap();
        assert_eq!(config, Config::new(&reg));
        assert_eq!(config.shutdown_timeout, "20s");
    }

    #[test]
    fn test_sections_are_kept_in_order() {
        let reg = Registry::builtin();
        let node = parse(
            "output:\n  stdout: {}\ninput:\n  stdin: {}\nmetrics:\n  none: {}\nshutdown_timeout: 5s\n",
        )
        .unwrap();
        let config = Config::from_node(&reg, &node).unwrap();
        assert_eq!(config.metrics.type_name, "none");
        assert_eq!(config.shutdown_timeout, "5s");
        let keys: Vec<&String> = config.sections.keys().collect();
        assert_eq!(keys, ["output", "input"]);
        assert_eq!(config.sections["input"], json!({"stdin": {}}));
    }

    #[test]
    fn test_layering_over_a_base() {
        let reg = Registry::builtin();
        let mut base = Config::new(&reg);
        base.metrics = metrics::Config::of_type(&reg, "none");
        base.logger.format = "json".into();

        let config = base
            .with_node(&reg, &parse("logger:\n  level: DEBUG\n").unwrap())
            .unwrap();
        assert_eq!(config.metrics.type_name, "none");
        assert_eq!(config.logger.level, "DEBUG");
        assert_eq!(config.logger.format, "json");
    }

    #[test]
    fn test_metrics_errors_propagate() {
        let reg = Registry::builtin();
        let err = Config::from_node(&reg, &parse("metrics:\n  nope: {}\n").unwrap()).unwrap_err();
        assert_eq!(err.lint().kind, LintKind::ComponentNotFound);
        assert_eq!(err.lint().line, 2);
    }

    #[test]
    fn test_pipeline_sections_are_not_linted() {
        let node = parse("input:\n  anything: {goes: here}\nmetrics:\n  none: {}\n").unwrap();
        let lints = Config::spec().lint_node(&LintContext::default(), &node);
        assert!(lints.is_empty(), "{lints:?}");
    }

    #[test]
    fn test_to_json() {
        let reg = Registry::builtin();
        let node = parse("input:\n  stdin: {}\nmetrics:\n  none: {}\n").unwrap();
        let config = Config::from_node(&reg, &node).unwrap();
        let json = config.to_json();
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["input", "metrics", "logger", "shutdown_timeout"]);
        assert_eq!(json["metrics"], json!({"none": {}, "mapping": ""}));
    }
}
