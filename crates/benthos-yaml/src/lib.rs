//! # benthos-yaml
//!
//! YAML parsing with line tracking for Benthos configuration documents.
//!
//! This crate turns raw config text into a [`Node`] tree. Every node keeps the
//! [`SourceInfo`] of the position it starts at, so later stages (component
//! resolution, linting) can report problems against the line a user wrote.
//!
//! ## Design
//!
//! The tree is owned and immutable once built. Mappings keep their entries in
//! document order and reject duplicate keys at parse time. Anchored nodes are
//! copied into each alias site and re-stamped with the alias position, which
//! keeps line numbers non-decreasing in depth-first order.
//!
//! ## Example
//!
//! ```rust
//! use benthos_yaml::parse;
//!
//! let node = parse("metrics:\n  none: {}\n").unwrap();
//! let metrics = node.get("metrics").unwrap();
//! assert_eq!(metrics.line(), 2);
//! ```

mod error;
mod json;
mod node;
mod parser;
mod source_info;

pub use error::{Error, Result};
pub use node::{MappingEntry, Node, NodeKind, Scalar, ScalarStyle};
pub use parser::{parse, parse_bytes, parse_file};
pub use source_info::{LineIndex, SourceInfo};
