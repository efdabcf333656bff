//! YAML parser that builds [`Node`] trees.

use crate::source_info::line_of_byte;
use crate::{Error, LineIndex, MappingEntry, Node, Result, ScalarStyle, SourceInfo};
use std::collections::HashMap;
use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser};
use yaml_rust2::scanner::{Marker, TScalarStyle};

/// Parse raw document bytes into a node tree.
///
/// Bytes that are not valid UTF-8 fail with [`Error::Encoding`] pointing at
/// the line of the first invalid sequence.
///
/// # Example
///
/// ```rust
/// use benthos_yaml::parse_bytes;
///
/// let node = parse_bytes(b"metrics:\n  none: {}").unwrap();
/// assert!(node.is_mapping());
/// ```
pub fn parse_bytes(raw: &[u8]) -> Result<Node> {
    let content = std::str::from_utf8(raw).map_err(|e| Error::Encoding {
        line: line_of_byte(raw, e.valid_up_to()),
    })?;
    parse(content)
}

/// Parse YAML from a string, producing a node tree.
///
/// Only the first document of a stream is parsed. An input without any
/// document (empty, or only comments) yields a null scalar on line 1.
///
/// # Errors
///
/// Returns an error if the YAML is invalid, a mapping repeats a key, or a
/// mapping key is not a scalar.
pub fn parse(content: &str) -> Result<Node> {
    parse_impl(content, None)
}

/// Parse YAML from a string with an associated filename.
///
/// The filename is included in the source info of every node.
pub fn parse_file(content: &str, filename: &str) -> Result<Node> {
    parse_impl(content, Some(filename))
}

fn parse_impl(content: &str, filename: Option<&str>) -> Result<Node> {
    let mut parser = Parser::new_from_str(content);
    let mut builder = NodeBuilder::new(content, filename);

    parser.load(&mut builder, false).map_err(|err| Error::Syntax {
        message: err.to_string(),
        line: builder.lines.line(err.marker().index()),
    })?;

    builder.result()
}

/// Builder that implements MarkedEventReceiver to construct a node tree.
struct NodeBuilder {
    lines: LineIndex,

    filename: Option<String>,

    /// Stack of collections being constructed
    stack: Vec<BuildNode>,

    /// Completed anchored nodes, by anchor id
    anchors: HashMap<usize, Node>,

    root: Option<Node>,

    /// First structural error; later events are ignored once set
    error: Option<Error>,
}

enum BuildNode {
    Sequence {
        start: SourceInfo,
        anchor_id: usize,
        items: Vec<Node>,
    },
    Mapping {
        start: SourceInfo,
        anchor_id: usize,
        entries: Vec<MappingEntry>,
        pending_key: Option<(String, SourceInfo)>,
    },
}

impl NodeBuilder {
    fn new(source: &str, filename: Option<&str>) -> Self {
        Self {
            lines: LineIndex::new(source),
            filename: filename.map(str::to_string),
            stack: Vec::new(),
            anchors: HashMap::new(),
            root: None,
            error: None,
        }
    }

    fn result(self) -> Result<Node> {
        let empty = self.source_info(0, 0);
        match (self.error, self.root) {
            (Some(err), _) => Err(err),
            (None, Some(root)) => Ok(root),
            (None, None) => Ok(Node::null(empty)),
        }
    }

    fn source_info(&self, index: usize, len: usize) -> SourceInfo {
        let (line, col) = self.lines.line_col(index);
        let info = SourceInfo::new(None, index, line, col, len);
        match &self.filename {
            Some(filename) => info.with_file(filename.clone()),
            None => info,
        }
    }

    fn fail(&mut self, err: Error) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    fn complete(&mut self, node: Node, anchor_id: usize) {
        if anchor_id > 0 {
            self.anchors.insert(anchor_id, node.clone());
        }

        let Some(parent) = self.stack.last_mut() else {
            if self.root.is_none() {
                self.root = Some(node);
            }
            return;
        };

        if let Err(err) = attach(parent, node) {
            self.fail(err);
        }
    }
}

/// Add a completed node to the collection being built.
fn attach(parent: &mut BuildNode, node: Node) -> Result<()> {
    match parent {
        BuildNode::Sequence { items, .. } => items.push(node),
        BuildNode::Mapping {
            entries,
            pending_key,
            ..
        } => match pending_key.take() {
            Some((key, key_info)) => {
                if let Some(first) = entries.iter().find(|entry| entry.key == key) {
                    return Err(Error::DuplicateKey {
                        first_line: first.line(),
                        line: key_info.line,
                        key,
                    });
                }
                entries.push(MappingEntry::new(key, key_info, node));
            }
            None => match node.as_str() {
                Some(key) => *pending_key = Some((key.to_string(), node.source_info)),
                None => {
                    return Err(Error::InvalidStructure {
                        message: format!("mapping keys must be scalars, got {}", node.kind_name()),
                        line: node.line(),
                    });
                }
            },
        },
    }
    Ok(())
}

impl MarkedEventReceiver for NodeBuilder {
    fn on_event(&mut self, ev: Event, marker: Marker) {
        if self.error.is_some() {
            return;
        }

        match ev {
            Event::Scalar(value, style, anchor_id, _tag) => {
                let info = self.source_info(marker.index(), value.chars().count());
                let node = Node::scalar_with_style(value, scalar_style(style), info);
                self.complete(node, anchor_id);
            }

            Event::SequenceStart(anchor_id, _tag) => {
                let start = self.source_info(marker.index(), 0);
                self.stack.push(BuildNode::Sequence {
                    start,
                    anchor_id,
                    items: Vec::new(),
                });
            }

            Event::SequenceEnd => {
                if let Some(BuildNode::Sequence {
                    mut start,
                    anchor_id,
                    items,
                }) = self.stack.pop()
                {
                    start.len = marker.index().saturating_sub(start.offset);
                    self.complete(Node::sequence(items, start), anchor_id);
                }
            }

            Event::MappingStart(anchor_id, _tag) => {
                let start = self.source_info(marker.index(), 0);
                self.stack.push(BuildNode::Mapping {
                    start,
                    anchor_id,
                    entries: Vec::new(),
                    pending_key: None,
                });
            }

            Event::MappingEnd => {
                if let Some(BuildNode::Mapping {
                    mut start,
                    anchor_id,
                    entries,
                    ..
                }) = self.stack.pop()
                {
                    start.len = marker.index().saturating_sub(start.offset);
                    self.complete(Node::mapping(entries, start), anchor_id);
                }
            }

            Event::Alias(anchor_id) => {
                let info = self.source_info(marker.index(), 0);
                let expanded = self.anchors.get(&anchor_id).map(|n| n.restamped(&info));
                match expanded {
                    Some(node) => self.complete(node, 0),
                    None => self.fail(Error::InvalidStructure {
                        message: "alias refers to an unknown anchor".into(),
                        line: info.line,
                    }),
                }
            }

            _ => {}
        }
    }
}

fn scalar_style(style: TScalarStyle) -> ScalarStyle {
    match style {
        TScalarStyle::Plain => ScalarStyle::Plain,
        TScalarStyle::SingleQuoted | TScalarStyle::DoubleQuoted => ScalarStyle::Quoted,
        _ => ScalarStyle::Block,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scalar() {
        let node = parse("hello").unwrap();
        assert!(node.is_scalar());
        assert_eq!(node.as_str(), Some("hello"));
    }

    #[test]
    fn test_parse_quoted_scalar_style() {
        let node = parse("a: \"10\"\nb: 10").unwrap();
        assert_eq!(node.get("a").unwrap().to_json(), serde_json::json!("10"));
        assert_eq!(node.get("b").unwrap().to_json(), serde_json::json!(10));
    }

    #[test]
    fn test_parse_nested_lines() {
        let node = parse("metrics:\n  statsd:\n    address: localhost:8125\n").unwrap();
        assert_eq!(node.line(), 1);

        let metrics = node.get("metrics").unwrap();
        assert_eq!(metrics.line(), 2);
        assert_eq!(node.get_entry("metrics").unwrap().line(), 1);

        let statsd = metrics.get("statsd").unwrap();
        assert_eq!(statsd.line(), 3);
        assert_eq!(statsd.get("address").unwrap().line(), 3);
        assert_eq!(statsd.get("address").unwrap().as_str(), Some("localhost:8125"));
    }

    #[test]
    fn test_parse_sequence() {
        let node = parse("tags:\n  - a\n  - b\n").unwrap();
        let tags = node.get("tags").unwrap();
        assert!(tags.is_sequence());
        let items = tags.as_sequence().unwrap();
        assert_eq!(items[0].line(), 2);
        assert_eq!(items[1].line(), 3);
    }

    #[test]
    fn test_flow_mapping_on_one_line() {
        let node = parse(r#"{"metrics": {"none": {}}}"#).unwrap();
        let none = node.get("metrics").unwrap().get("none").unwrap();
        assert!(none.is_mapping());
        assert!(none.is_empty());
        assert_eq!(none.line(), 1);
    }

    #[test]
    fn test_lines_are_non_decreasing() {
        let node = parse(
            "a: 1\nb:\n  c: [1, 2]\n  d:\n    - e: f\n      g: h\ni: j\n",
        )
        .unwrap();
        let lines = node.lines();
        assert!(lines.windows(2).all(|w| w[0] <= w[1]), "{lines:?}");
    }

    #[test]
    fn test_empty_document_is_null() {
        let node = parse("# only a comment\n").unwrap();
        assert!(node.is_null());
        assert_eq!(node.line(), 1);
    }

    #[test]
    fn test_duplicate_key_is_an_error() {
        let err = parse("a: 1\nb: 2\na: 3\n").unwrap_err();
        assert_eq!(
            err,
            Error::DuplicateKey {
                key: "a".into(),
                line: 3,
                first_line: 1,
            }
        );
    }

    #[test]
    fn test_syntax_error_has_line() {
        let err = parse("a: 1\nb: c: d\n").unwrap_err();
        assert!(matches!(err, Error::Syntax { .. }));
        assert_eq!(err.line(), 2, "{err}");
    }

    #[test]
    fn test_non_scalar_key_is_an_error() {
        let err = parse("? [a, b]\n: c\n").unwrap_err();
        assert!(matches!(err, Error::InvalidStructure { .. }));
    }

    #[test]
    fn test_alias_is_expanded_at_alias_position() {
        let node = parse("base: &b\n  x: 1\nother: *b\n").unwrap();
        let other = node.get("other").unwrap();
        assert_eq!(other.get("x").and_then(Node::as_str), Some("1"));
        assert_eq!(other.line(), 3);
    }

    #[test]
    fn test_invalid_utf8_is_an_encoding_error() {
        let err = parse_bytes(b"a: 1\nb: \xff\xfe\n").unwrap_err();
        assert_eq!(err, Error::Encoding { line: 2 });
    }

    #[test]
    fn test_parse_with_filename() {
        let node = parse_file("title: Test", "config.yaml").unwrap();
        assert_eq!(node.source_info.file, Some("config.yaml".into()));
        assert_eq!(
            node.get("title").unwrap().source_info.file,
            Some("config.yaml".into())
        );
    }
}
