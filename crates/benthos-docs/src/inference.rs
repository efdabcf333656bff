//! Resolution of a component node's concrete type.
//!
//! A component node is a mapping. Its type is either named by an explicit
//! `type` key or inferred from the one key that names a registered type of
//! the category. Deprecated aliases are canonicalized before the uniqueness
//! check, so `{statsd: .., http_server: ..}` is ambiguous while
//! `{json_api: .., http_server: ..}` is not.

use crate::{ComponentSpec, ComponentType, LintError, LintKind, Provider};
use benthos_yaml::Node;
use serde_json::{Map, Value};
use thiserror::Error;

/// Why a component's type could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InferenceError {
    #[error("unable to infer {category} type from candidates: [{}]", .candidates.join(", "))]
    NotFound {
        category: ComponentType,
        line: usize,
        candidates: Vec<String>,
    },

    #[error("{category} type '{name}' was not recognised")]
    UnknownType {
        category: ComponentType,
        name: String,
        line: usize,
    },

    #[error("unable to infer {category} type, multiple candidates: [{}]", .candidates.join(", "))]
    Ambiguous {
        category: ComponentType,
        line: usize,
        candidates: Vec<String>,
    },

    #[error("{message}")]
    FailedRead { line: usize, message: String },
}

impl InferenceError {
    pub fn line(&self) -> usize {
        match self {
            InferenceError::NotFound { line, .. }
            | InferenceError::UnknownType { line, .. }
            | InferenceError::Ambiguous { line, .. }
            | InferenceError::FailedRead { line, .. } => *line,
        }
    }

    pub fn lint_kind(&self) -> LintKind {
        match self {
            InferenceError::NotFound { .. } | InferenceError::UnknownType { .. } => {
                LintKind::ComponentNotFound
            }
            InferenceError::Ambiguous { .. } => LintKind::ComponentMissing,
            InferenceError::FailedRead { .. } => LintKind::FailedRead,
        }
    }
}

impl From<InferenceError> for LintError {
    fn from(err: InferenceError) -> Self {
        LintError::new(err.line(), err.lint_kind(), err.to_string())
    }
}

/// A resolved component type.
#[derive(Debug, Clone, PartialEq)]
pub struct Inference<'a> {
    /// Canonical type name.
    pub name: String,
    pub spec: &'a ComponentSpec,

    /// Deprecated alias the document used, with the line it appeared on.
    pub alias: Option<(String, usize)>,

    /// Whether the type came from a `type` key rather than key presence.
    pub explicit: bool,
}

/// Resolve the type of a component node.
///
/// # Errors
///
/// - [`InferenceError::FailedRead`] when the node is not a mapping or its
///   `type` is not a scalar.
/// - [`InferenceError::UnknownType`] when `type` names nothing registered.
/// - [`InferenceError::NotFound`] when no key names a registered type. A
///   node with no candidate keys at all takes the category's default type.
/// - [`InferenceError::Ambiguous`] when keys name more than one type.
pub fn get_inference_candidate<'a>(
    provider: &'a dyn Provider,
    ctype: ComponentType,
    node: &Node,
) -> Result<Inference<'a>, InferenceError> {
    let Some(entries) = node.as_mapping() else {
        return Err(InferenceError::FailedRead {
            line: node.line(),
            message: format!("invalid {ctype} config, expected object, got {}", node.kind_name()),
        });
    };

    if let Some(entry) = node.get_entry("type") {
        let Some(requested) = entry.value.as_str() else {
            return Err(InferenceError::FailedRead {
                line: entry.value.line(),
                message: format!(
                    "expected {ctype} type to be a string, got {}",
                    entry.value.kind_name()
                ),
            });
        };
        // An empty type falls through to key inference.
        if !requested.is_empty() {
            return resolve_name(provider, ctype, requested, entry.value.line(), true);
        }
    }

    let mut candidates = Vec::new();
    let mut matched: Vec<(&str, &str, usize)> = Vec::new();
    for entry in entries {
        if ctype.is_reserved_key(&entry.key) {
            continue;
        }
        candidates.push(entry.key.clone());
        if let Some(canonical) = provider.canonical_name(&entry.key, ctype)
            && !matched.iter().any(|(name, _, _)| *name == canonical)
        {
            matched.push((canonical, &entry.key, entry.line()));
        }
    }

    match matched.as_slice() {
        [] => match provider.default_type(ctype).filter(|_| candidates.is_empty()) {
            Some(default) => resolve_name(provider, ctype, default, node.line(), false),
            None => Err(InferenceError::NotFound {
                category: ctype,
                line: node.line(),
                candidates,
            }),
        },
        [(_, key, line)] => resolve_name(provider, ctype, key, *line, false),
        _ => Err(InferenceError::Ambiguous {
            category: ctype,
            line: node.line(),
            candidates: matched.iter().map(|(name, _, _)| name.to_string()).collect(),
        }),
    }
}

/// Resolve the type of a programmatically built component map.
///
/// Errors carry line 0 since there is no source document.
pub fn get_inference_candidate_from_map<'a>(
    provider: &'a dyn Provider,
    ctype: ComponentType,
    map: &Map<String, Value>,
) -> Result<Inference<'a>, InferenceError> {
    let node = Node::from_json(&Value::Object(map.clone()), 0);
    get_inference_candidate(provider, ctype, &node)
}

fn resolve_name<'a>(
    provider: &'a dyn Provider,
    ctype: ComponentType,
    requested: &str,
    line: usize,
    explicit: bool,
) -> Result<Inference<'a>, InferenceError> {
    let spec = provider
        .canonical_name(requested, ctype)
        .and_then(|canonical| provider.get_docs(canonical, ctype))
        .ok_or_else(|| InferenceError::UnknownType {
            category: ctype,
            name: requested.to_string(),
            line,
        })?;
    let alias = (spec.name != requested).then(|| (requested.to_string(), line));
    Ok(Inference {
        name: spec.name.clone(),
        spec,
        alias,
        explicit,
    })
}

/// Extract the plugin payload of a component node of a known type.
///
/// The payload is the value under the key naming the type (canonical or
/// alias), else under `plugin`. Missing or null payloads become an empty
/// mapping positioned at the node.
pub fn get_plugin_config(
    provider: &dyn Provider,
    ctype: ComponentType,
    type_name: &str,
    node: &Node,
) -> Node {
    let entries = node.as_mapping().unwrap_or_default();
    let payload = entries
        .iter()
        .find(|entry| {
            entry.key != "type" && provider.canonical_name(&entry.key, ctype) == Some(type_name)
        })
        .or_else(|| node.get_entry("plugin"))
        .map(|entry| &entry.value)
        .filter(|value| !value.is_null());

    match payload {
        Some(value) => value.clone(),
        None => Node::mapping(Vec::new(), node.source_info.clone()),
    }
}
