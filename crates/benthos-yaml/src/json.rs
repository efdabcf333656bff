//! Conversion between nodes and `serde_json` values.
//!
//! Plain scalars are inferred using the YAML 1.2 core schema (null, booleans,
//! integers, floats); everything else becomes a string.

use crate::{MappingEntry, Node, NodeKind, ScalarStyle, SourceInfo};
use serde_json::{Map, Number, Value};

impl Node {
    /// Convert this node into a JSON value, inferring plain scalar types.
    pub fn to_json(&self) -> Value {
        match &self.kind {
            NodeKind::Scalar(scalar) => match scalar.style {
                ScalarStyle::Plain => infer_plain_scalar(&scalar.value),
                ScalarStyle::Quoted | ScalarStyle::Block => Value::String(scalar.value.clone()),
            },
            NodeKind::Mapping(entries) => {
                let mut map = Map::new();
                for entry in entries {
                    map.insert(entry.key.clone(), entry.value.to_json());
                }
                Value::Object(map)
            }
            NodeKind::Sequence(items) => Value::Array(items.iter().map(Node::to_json).collect()),
        }
    }

    /// Build a node tree from a JSON value. Every node is placed at `line`,
    /// since a programmatic value has no source text.
    pub fn from_json(value: &Value, line: usize) -> Node {
        let info = SourceInfo::at_line(line);
        match value {
            Value::Null => Node::null(info),
            Value::Bool(b) => Node::scalar(b.to_string(), info),
            Value::Number(n) => Node::scalar(n.to_string(), info),
            Value::String(s) => Node::string(s.clone(), info),
            Value::Array(items) => Node::sequence(
                items.iter().map(|item| Node::from_json(item, line)).collect(),
                info,
            ),
            Value::Object(map) => Node::mapping(
                map.iter()
                    .map(|(key, value)| {
                        MappingEntry::new(
                            key.clone(),
                            SourceInfo::at_line(line),
                            Node::from_json(value, line),
                        )
                    })
                    .collect(),
                info,
            ),
        }
    }
}

fn infer_plain_scalar(value: &str) -> Value {
    match value {
        "" | "~" | "null" | "Null" | "NULL" => return Value::Null,
        "true" | "True" | "TRUE" => return Value::Bool(true),
        "false" | "False" | "FALSE" => return Value::Bool(false),
        _ => {}
    }

    if let Ok(i) = value.parse::<i64>() {
        return Value::Number(i.into());
    }

    // `inf` and `nan` parse as f64 but are plain strings here.
    if value.bytes().any(|b| b.is_ascii_digit())
        && let Ok(f) = value.parse::<f64>()
        && let Some(n) = Number::from_f64(f)
    {
        return Value::Number(n);
    }

    Value::String(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_scalar_inference() {
        assert_eq!(infer_plain_scalar("42"), json!(42));
        assert_eq!(infer_plain_scalar("-1.5"), json!(-1.5));
        assert_eq!(infer_plain_scalar("true"), json!(true));
        assert_eq!(infer_plain_scalar("~"), Value::Null);
        assert_eq!(infer_plain_scalar("inf"), json!("inf"));
        assert_eq!(infer_plain_scalar("yes"), json!("yes"));
        assert_eq!(infer_plain_scalar("localhost:8125"), json!("localhost:8125"));
    }

    #[test]
    fn test_quoted_scalars_stay_strings() {
        let node = Node::string("10", SourceInfo::default());
        assert_eq!(node.to_json(), json!("10"));
    }

    #[test]
    fn test_json_round_trip_keeps_structure() {
        let value = json!({
            "statsd": {"address": "localhost:8125", "flush_period": "100ms"},
            "tags": ["a", "b"],
            "enabled": true,
            "count": 3
        });
        let node = Node::from_json(&value, 4);
        assert!(node.is_mapping());
        assert!(node.lines().iter().all(|&line| line == 4));
        assert_eq!(node.to_json(), value);
    }
}
