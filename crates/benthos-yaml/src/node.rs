//! YAML node tree with source location tracking.

use crate::SourceInfo;

/// A node of a parsed config document.
///
/// Nodes are built once by the parser and not mutated afterwards. Each node
/// carries the [`SourceInfo`] of the position it begins at.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// The value of this node.
    pub kind: NodeKind,

    /// Source location for this node.
    pub source_info: SourceInfo,
}

/// The three shapes a node can take.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// A leaf value, kept as the text that was written.
    Scalar(Scalar),

    /// Key/value pairs in document order. Keys are unique.
    Mapping(Vec<MappingEntry>),

    /// Items in document order.
    Sequence(Vec<Node>),
}

/// Scalar text plus the style it was written in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scalar {
    pub value: String,
    pub style: ScalarStyle,
}

/// How a scalar was written. Only plain scalars take part in type inference
/// (`true`, `10`, `null`); quoted and block scalars are always strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarStyle {
    Plain,
    Quoted,
    Block,
}

/// A key/value pair in a mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct MappingEntry {
    pub key: String,

    /// Source location of just the key
    pub key_info: SourceInfo,

    pub value: Node,
}

impl MappingEntry {
    pub fn new(key: impl Into<String>, key_info: SourceInfo, value: Node) -> Self {
        Self {
            key: key.into(),
            key_info,
            value,
        }
    }

    /// Line of the key, which is where the entry starts.
    pub fn line(&self) -> usize {
        self.key_info.line
    }
}

impl Node {
    /// Create a plain scalar node.
    pub fn scalar(value: impl Into<String>, source_info: SourceInfo) -> Self {
        Self::scalar_with_style(value, ScalarStyle::Plain, source_info)
    }

    /// Create a quoted scalar node, which is never type-inferred.
    pub fn string(value: impl Into<String>, source_info: SourceInfo) -> Self {
        Self::scalar_with_style(value, ScalarStyle::Quoted, source_info)
    }

    pub fn scalar_with_style(
        value: impl Into<String>,
        style: ScalarStyle,
        source_info: SourceInfo,
    ) -> Self {
        Self {
            kind: NodeKind::Scalar(Scalar {
                value: value.into(),
                style,
            }),
            source_info,
        }
    }

    /// A null scalar, used for empty documents and empty values.
    pub fn null(source_info: SourceInfo) -> Self {
        Self::scalar("", source_info)
    }

    pub fn mapping(entries: Vec<MappingEntry>, source_info: SourceInfo) -> Self {
        Self {
            kind: NodeKind::Mapping(entries),
            source_info,
        }
    }

    pub fn sequence(items: Vec<Node>, source_info: SourceInfo) -> Self {
        Self {
            kind: NodeKind::Sequence(items),
            source_info,
        }
    }

    /// The 1-based line this node begins on.
    pub fn line(&self) -> usize {
        self.source_info.line
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self.kind, NodeKind::Scalar(_))
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self.kind, NodeKind::Mapping(_))
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self.kind, NodeKind::Sequence(_))
    }

    /// Whether this is a plain `null`, `~` or empty scalar.
    pub fn is_null(&self) -> bool {
        match &self.kind {
            NodeKind::Scalar(Scalar {
                value,
                style: ScalarStyle::Plain,
            }) => matches!(value.as_str(), "" | "~" | "null" | "Null" | "NULL"),
            _ => false,
        }
    }

    /// Scalar text, if this is a scalar.
    pub fn as_str(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Scalar(scalar) => Some(&scalar.value),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&[MappingEntry]> {
        match &self.kind {
            NodeKind::Mapping(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Node]> {
        match &self.kind {
            NodeKind::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Get the mapping entry for a key.
    pub fn get_entry(&self, key: &str) -> Option<&MappingEntry> {
        self.as_mapping()?.iter().find(|entry| entry.key == key)
    }

    /// Get a mapping value by key.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.get_entry(key).map(|entry| &entry.value)
    }

    /// Keys of a mapping in document order; empty for other shapes.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.as_mapping()
            .unwrap_or_default()
            .iter()
            .map(|entry| entry.key.as_str())
    }

    /// Number of children (sequence length or mapping entry count).
    pub fn len(&self) -> usize {
        match &self.kind {
            NodeKind::Scalar(_) => 0,
            NodeKind::Mapping(entries) => entries.len(),
            NodeKind::Sequence(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Human readable name of the node shape, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            NodeKind::Scalar(_) => "scalar",
            NodeKind::Mapping(_) => "object",
            NodeKind::Sequence(_) => "array",
        }
    }

    /// Lines of this node and all descendants in depth-first document order.
    /// Mapping keys are visited before their values.
    pub fn lines(&self) -> Vec<usize> {
        let mut lines = Vec::new();
        self.collect_lines(&mut lines);
        lines
    }

    fn collect_lines(&self, lines: &mut Vec<usize>) {
        lines.push(self.line());
        match &self.kind {
            NodeKind::Scalar(_) => {}
            NodeKind::Mapping(entries) => {
                for entry in entries {
                    lines.push(entry.line());
                    entry.value.collect_lines(lines);
                }
            }
            NodeKind::Sequence(items) => {
                for item in items {
                    item.collect_lines(lines);
                }
            }
        }
    }

    /// Copy of this subtree with every position moved to `source_info`.
    pub(crate) fn restamped(&self, source_info: &SourceInfo) -> Node {
        let kind = match &self.kind {
            NodeKind::Scalar(scalar) => NodeKind::Scalar(scalar.clone()),
            NodeKind::Mapping(entries) => NodeKind::Mapping(
                entries
                    .iter()
                    .map(|entry| MappingEntry {
                        key: entry.key.clone(),
                        key_info: source_info.clone(),
                        value: entry.value.restamped(source_info),
                    })
                    .collect(),
            ),
            NodeKind::Sequence(items) => NodeKind::Sequence(
                items.iter().map(|item| item.restamped(source_info)).collect(),
            ),
        };
        Node {
            kind,
            source_info: source_info.clone(),
        }
    }
}
