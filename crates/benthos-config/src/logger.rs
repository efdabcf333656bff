//! Config of the service logger.

use benthos_docs::{FieldSpec, LintError, LintKind};
use benthos_yaml::Node;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

const LEVELS: &[&str] = &[
    "OFF", "FATAL", "ERROR", "WARN", "INFO", "DEBUG", "TRACE", "ALL", "NONE",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub level: String,
    pub format: String,
    pub add_timestamp: bool,
    pub level_name: String,
    pub timestamp_name: String,
    pub message_name: String,
    pub static_fields: IndexMap<String, Value>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            level: "INFO".into(),
            format: "logfmt".into(),
            add_timestamp: false,
            level_name: "level".into(),
            timestamp_name: "time".into(),
            message_name: "msg".into(),
            static_fields: IndexMap::from([("@service".to_string(), json!("benthos"))]),
        }
    }
}

impl Config {
    /// Decode a logger node over the defaults.
    pub fn from_node(node: &Node) -> Result<Self, LintError> {
        Self::default().with_node(node)
    }

    /// Decode a logger node over this config, keeping fields it does not set.
    pub fn with_node(self, node: &Node) -> Result<Self, LintError> {
        if node.is_null() {
            return Ok(self);
        }
        let failed_read = |err: serde_json::Error| {
            LintError::new(node.line(), LintKind::FailedRead, err.to_string())
        };

        let mut merged = serde_json::to_value(&self).map_err(failed_read)?;
        match (&mut merged, node.to_json()) {
            (Value::Object(base), Value::Object(fields)) => base.extend(fields),
            (_, other) => merged = other,
        }
        serde_json::from_value(merged).map_err(failed_read)
    }

    /// The config as it would be written in a document.
    pub fn to_json(&self) -> Value {
        let static_fields: Map<String, Value> = self
            .static_fields
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        json!({
            "level": self.level,
            "format": self.format,
            "add_timestamp": self.add_timestamp,
            "level_name": self.level_name,
            "timestamp_name": self.timestamp_name,
            "message_name": self.message_name,
            "static_fields": static_fields,
        })
    }

    pub fn spec() -> FieldSpec {
        FieldSpec::object(
            "logger",
            "Describes how operational logs should be emitted.",
            vec![
                FieldSpec::string("level", "Minimum level of logs to emit.")
                    .with_options(LEVELS)
                    .with_default(json!("INFO")),
                FieldSpec::string("format", "Format of emitted logs.")
                    .with_options(&["json", "logfmt"])
                    .with_default(json!("logfmt")),
                FieldSpec::bool("add_timestamp", "Add a timestamp to each log line.")
                    .with_default(json!(false)),
                FieldSpec::string("level_name", "Field name of the log level.")
                    .with_default(json!("level")),
                FieldSpec::string("timestamp_name", "Field name of the timestamp.")
                    .with_default(json!("time")),
                FieldSpec::string("message_name", "Field name of the message.")
                    .with_default(json!("msg")),
                FieldSpec::string("static_fields", "Fields added to every log line.")
                    .map()
                    .with_default(json!({"@service": "benthos"})),
            ],
        )
    }
}
