//! Config of the metrics component.

use benthos_docs::{
    ComponentType, LintError, LintKind, Provider, get_inference_candidate,
    get_inference_candidate_from_map, get_plugin_config,
};
use benthos_yaml::Node;
use serde_json::{Map, Value};

const CATEGORY: ComponentType = ComponentType::Metrics;

/// The payload of a plugin metrics type.
#[derive(Debug, Clone, PartialEq)]
pub enum Plugin {
    /// Parsed from a document; keeps line numbers.
    Node(Node),
    /// Built programmatically.
    Value(Value),
}

impl Plugin {
    pub fn to_json(&self) -> Value {
        match self {
            Plugin::Node(node) => node.to_json(),
            Plugin::Value(value) => value.clone(),
        }
    }
}

/// Metrics config: which type to use, an optional name mapping and the type's
/// payload.
///
/// `plugin` is set exactly when the type's spec declares a plugin payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub type_name: String,
    pub mapping: String,
    pub plugin: Option<Plugin>,
}

/// Anything a metrics config can be built from.
#[derive(Debug, Clone)]
pub enum ConfigInput {
    Config(Config),
    Node(Node),
    Value(Value),
}

impl From<Config> for ConfigInput {
    fn from(config: Config) -> Self {
        ConfigInput::Config(config)
    }
}

impl From<Node> for ConfigInput {
    fn from(node: Node) -> Self {
        ConfigInput::Node(node)
    }
}

impl From<Value> for ConfigInput {
    fn from(value: Value) -> Self {
        ConfigInput::Value(value)
    }
}

impl Config {
    /// Defaults: the provider's default metrics type with that type's default
    /// payload.
    pub fn new(provider: &dyn Provider) -> Self {
        let type_name = provider.default_type(CATEGORY).unwrap_or("none");
        Self::of_type(provider, type_name)
    }

    /// A config of the given type with its default payload.
    pub fn of_type(provider: &dyn Provider, type_name: &str) -> Self {
        let plugin = provider
            .get_docs(type_name, CATEGORY)
            .filter(|spec| spec.plugin)
            .map(|spec| {
                let payload = spec
                    .config
                    .default_value()
                    .unwrap_or_else(|| Value::Object(Map::new()));
                Plugin::Value(payload)
            });
        Self {
            type_name: type_name.to_string(),
            mapping: String::new(),
            plugin,
        }
    }

    /// Build from any supported input.
    ///
    /// A config is returned as is, a node is decoded with
    /// [`Config::from_document_node`] and a JSON object with
    /// [`Config::from_map`]. Other JSON values fail with a `failed_read` lint
    /// error.
    pub fn from_any(
        provider: &dyn Provider,
        input: impl Into<ConfigInput>,
    ) -> Result<Self, LintError> {
        match input.into() {
            ConfigInput::Config(config) => Ok(config),
            ConfigInput::Node(node) => Self::from_document_node(provider, &node),
            ConfigInput::Value(Value::Object(map)) => Self::from_map(provider, &map),
            ConfigInput::Value(other) => Err(LintError::new(
                0,
                LintKind::FailedRead,
                format!(
                    "unexpected {CATEGORY} value, expected object, got {}",
                    json_kind(&other)
                ),
            )),
        }
    }

    /// Decode a metrics node of a document.
    ///
    /// Fields are decoded over the defaults first. The type is then resolved,
    /// and only after that is the plugin payload extracted.
    pub fn from_document_node(provider: &dyn Provider, node: &Node) -> Result<Self, LintError> {
        let mut config = Self::new(provider);
        if node.is_null() {
            return Ok(config);
        }
        if !node.is_mapping() {
            return Err(LintError::new(
                node.line(),
                LintKind::FailedRead,
                format!("expected object value, got {}", node.kind_name()),
            ));
        }

        if let Some(mapping) = node.get("mapping") {
            config.mapping = match mapping.as_str() {
                Some(text) if !mapping.is_null() => text.to_string(),
                Some(_) => String::new(),
                None => {
                    return Err(LintError::new(
                        mapping.line(),
                        LintKind::FailedRead,
                        format!("expected string value for mapping, got {}", mapping.kind_name()),
                    ));
                }
            };
        }

        let inference = get_inference_candidate(provider, CATEGORY, node)?;
        config.type_name = inference.name;
        config.plugin = inference
            .spec
            .plugin
            .then(|| Plugin::Node(get_plugin_config(provider, CATEGORY, &config.type_name, node)));
        Ok(config)
    }

    /// Build from a programmatic map. Errors carry line 0.
    pub fn from_map(provider: &dyn Provider, map: &Map<String, Value>) -> Result<Self, LintError> {
        let mapping = match map.get("mapping") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(text)) => text.clone(),
            Some(other) => {
                return Err(LintError::new(
                    0,
                    LintKind::FailedRead,
                    format!("expected string value for mapping, got {}", json_kind(other)),
                ));
            }
        };

        let inference = get_inference_candidate_from_map(provider, CATEGORY, map)?;

        let plugin = inference.spec.plugin.then(|| {
            let payload = map
                .iter()
                .find(|(key, _)| {
                    key.as_str() != "type"
                        && provider.canonical_name(key, CATEGORY) == Some(inference.name.as_str())
                })
                .map(|(_, value)| value)
                .or_else(|| map.get("plugin"))
                .filter(|value| !value.is_null())
                .cloned()
                .unwrap_or_else(|| Value::Object(Map::new()));
            Plugin::Value(payload)
        });

        Ok(Self {
            type_name: inference.name,
            mapping,
            plugin,
        })
    }

    /// The config as it would be written in a document.
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        let payload = self
            .plugin
            .as_ref()
            .map(Plugin::to_json)
            .unwrap_or_else(|| Value::Object(Map::new()));
        map.insert(self.type_name.clone(), payload);
        map.insert("mapping".into(), Value::String(self.mapping.clone()));
        Value::Object(map)
    }

    pub fn to_node(&self) -> Node {
        Node::from_json(&self.to_json(), 0)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use benthos_docs::Registry;
    use benthos_yaml::parse;
    use serde_json::json;

    fn metrics_of(source: &str) -> Node {
        parse(source).unwrap().get("metrics").unwrap().clone()
    }

    #[test]
    fn test_defaults() {
        let reg = Registry::builtin();
        let config = Config::new(&reg);
        assert_eq!(config.type_name, "prometheus");
        assert_eq!(config.mapping, "");
        let payload = config.plugin.as_ref().map(Plugin::to_json).unwrap();
        assert_eq!(payload["push_job_name"], json!("benthos_push"));

        let none = Config::new(&Registry::new());
        assert_eq!(none.type_name, "none");
        assert_eq!(none.plugin, None);
    }

    #[test]
    fn test_none_has_no_plugin() {
        let reg = Registry::builtin();
        let config = Config::from_any(&reg, metrics_of(r#"{"metrics": {"none": {}}}"#)).unwrap();
        assert_eq!(config.type_name, "none");
        assert_eq!(config.plugin, None);
    }

    #[test]
    fn test_plugin_and_mapping_from_node() {
        let reg = Registry::builtin();
        let config = Config::from_any(
            &reg,
            metrics_of("metrics:\n  mapping: 'root = this.upper()'\n  statsd:\n    address: foo:8125\n"),
        )
        .unwrap();
        assert_eq!(config.type_name, "statsd");
        assert_eq!(config.mapping, "root = this.upper()");
        let Some(Plugin::Node(payload)) = &config.plugin else {
            panic!("expected node payload, got {:?}", config.plugin);
        };
        assert_eq!(payload.get("address").and_then(Node::as_str), Some("foo:8125"));
        assert_eq!(payload.line(), 4);
    }

    #[test]
    fn test_non_scalar_mapping_fails_read() {
        let reg = Registry::builtin();
        let err = Config::from_document_node(&reg, &metrics_of("metrics:\n  mapping: [a]\n  none: {}\n"))
            .unwrap_err();
        assert_eq!(err.lint().kind, LintKind::FailedRead);
        assert_eq!(err.lint().line, 2);
    }

    #[test]
    fn test_resolution_errors_carry_node_line() {
        let reg = Registry::builtin();
        let err = Config::from_document_node(&reg, &metrics_of("a: 1\nmetrics:\n  nope: {}\n"))
            .unwrap_err();
        assert_eq!(err.lint().kind, LintKind::ComponentNotFound);
        assert_eq!(err.lint().line, 3);

        let err = Config::from_document_node(
            &reg,
            &metrics_of("metrics:\n  statsd: {}\n  influxdb: {}\n"),
        )
        .unwrap_err();
        assert_eq!(err.lint().kind, LintKind::ComponentMissing);
    }

    #[test]
    fn test_from_map() {
        let reg = Registry::builtin();
        let config = Config::from_any(
            &reg,
            json!({"http_server": {}, "mapping": "root = this"}),
        )
        .unwrap();
        assert_eq!(config.type_name, "json_api");
        assert_eq!(config.mapping, "root = this");
        assert_eq!(config.plugin, Some(Plugin::Value(json!({}))));

        let config = Config::from_any(&reg, json!({"type": "statsd", "plugin": {"address": "x"}}))
            .unwrap();
        assert_eq!(config.plugin, Some(Plugin::Value(json!({"address": "x"}))));

        let err = Config::from_any(&reg, json!({"nope": {}})).unwrap_err();
        assert_eq!(err.lint().kind, LintKind::ComponentNotFound);
        assert_eq!(err.lint().line, 0);
    }

    #[test]
    fn test_from_map_rejects_non_string_mapping() {
        let reg = Registry::builtin();
        let err = Config::from_any(&reg, json!({"none": {}, "mapping": ["root = this"]}))
            .unwrap_err();
        assert_eq!(err.lint().kind, LintKind::FailedRead);
        assert_eq!(err.lint().line, 0);
        insta::assert_snapshot!(
            err.to_string(),
            @"line 0: expected string value for mapping, got array"
        );

        let config = Config::from_any(&reg, json!({"none": {}, "mapping": null})).unwrap();
        assert_eq!(config.mapping, "");
    }

    #[test]
    fn test_config_is_identity() {
        let reg = Registry::builtin();
        let config = Config::of_type(&reg, "none");
        assert_eq!(Config::from_any(&reg, config.clone()).unwrap(), config);
    }

    #[test]
    fn test_unexpected_value() {
        let reg = Registry::builtin();
        let err = Config::from_any(&reg, json!(["statsd"])).unwrap_err();
        insta::assert_snapshot!(
            err.to_string(),
            @"line 0: unexpected metrics value, expected object, got array"
        );
    }

    #[test]
    fn test_round_trip() {
        let reg = Registry::builtin();
        for source in [
            "metrics:\n  none: {}\n",
            "metrics:\n  statsd:\n    address: x\n",
            "metrics:\n  stdout: {}\n",
            "metrics:\n  type: influxdb\n  plugin:\n    url: u\n    db: d\n",
            "metrics:\n  mapping: meta = deleted()\n",
        ] {
            let first = Config::from_document_node(&reg, &metrics_of(source)).unwrap();
            let again = Config::from_document_node(&reg, &first.to_node()).unwrap();
            assert_eq!(again.type_name, first.type_name, "{source}");
            assert_eq!(again.plugin.is_some(), first.plugin.is_some(), "{source}");
            assert_eq!(again.mapping, first.mapping, "{source}");
        }
    }
}
