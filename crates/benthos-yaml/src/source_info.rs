//! Source location information for YAML nodes.

use serde::{Deserialize, Serialize};

/// Source location of a node in the original document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInfo {
    /// Optional filename or source identifier
    pub file: Option<String>,

    /// Character offset from start of source (0-based)
    pub offset: usize,

    /// Line number (1-based)
    pub line: usize,

    /// Column number (1-based, in characters)
    pub col: usize,

    /// Length in characters
    pub len: usize,
}

impl SourceInfo {
    /// Create a new SourceInfo with all fields specified.
    pub fn new(file: Option<String>, offset: usize, line: usize, col: usize, len: usize) -> Self {
        Self {
            file,
            offset,
            line,
            col,
            len,
        }
    }

    /// A position that only knows its line, used for synthesised nodes.
    pub fn at_line(line: usize) -> Self {
        Self {
            line,
            ..Self::default()
        }
    }

    /// Set the filename for this source location.
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Get the end offset (exclusive) of this location.
    pub fn end_offset(&self) -> usize {
        self.offset + self.len
    }
}

impl Default for SourceInfo {
    fn default() -> Self {
        Self {
            file: None,
            offset: 0,
            line: 1,
            col: 1,
            len: 0,
        }
    }
}

/// Maps character offsets of a source text to 1-based line/column pairs.
///
/// Scanner markers are converted through this index rather than trusting the
/// scanner's own line counter, so every position in a tree is derived the
/// same way.
#[derive(Debug, Clone)]
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut starts = vec![0];
        for (i, ch) in source.chars().enumerate() {
            if ch == '\n' {
                starts.push(i + 1);
            }
        }
        Self { starts }
    }

    /// Line and column (both 1-based) of a character offset.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let line = self.starts.partition_point(|&start| start <= offset).max(1);
        let col = offset - self.starts[line - 1] + 1;
        (line, col)
    }

    /// Line (1-based) of a character offset.
    pub fn line(&self, offset: usize) -> usize {
        self.line_col(offset).0
    }

    /// Number of lines in the source.
    pub fn line_count(&self) -> usize {
        self.starts.len()
    }
}

/// Line (1-based) of a byte offset within raw, possibly invalid, text.
pub(crate) fn line_of_byte(raw: &[u8], byte_offset: usize) -> usize {
    let end = byte_offset.min(raw.len());
    raw[..end].iter().filter(|&&b| b == b'\n').count() + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_info_creation() {
        let info = SourceInfo::new(Some("test.yaml".into()), 10, 2, 5, 8);
        assert_eq!(info.file, Some("test.yaml".into()));
        assert_eq!(info.line, 2);
        assert_eq!(info.col, 5);
        assert_eq!(info.end_offset(), 18);
    }

    #[test]
    fn test_at_line() {
        let info = SourceInfo::at_line(7);
        assert_eq!(info.line, 7);
        assert_eq!(info.col, 1);
        assert_eq!(info.file, None);
    }

    #[test]
    fn test_line_index() {
        let index = LineIndex::new("a: 1\nbb: 2\n\nc: 3");
        assert_eq!(index.line_col(0), (1, 1));
        assert_eq!(index.line_col(3), (1, 4));
        assert_eq!(index.line_col(5), (2, 1));
        assert_eq!(index.line_col(11), (3, 1));
        assert_eq!(index.line_col(12), (4, 1));
        assert_eq!(index.line_count(), 4);
    }

    #[test]
    fn test_line_index_counts_chars_not_bytes() {
        let index = LineIndex::new("é: x\nb: y");
        assert_eq!(index.line_col(5), (2, 1));
    }

    #[test]
    fn test_line_of_byte() {
        let raw = b"one\ntwo\n\xff";
        assert_eq!(line_of_byte(raw, 0), 1);
        assert_eq!(line_of_byte(raw, 8), 3);
        assert_eq!(line_of_byte(raw, 100), 3);
    }
}
