//! Lint records and the configuration that drives linting.

use crate::{Provider, Registry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Category of a lint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LintKind {
    Custom,
    FailedRead,
    MissingEnvVar,
    InvalidOption,
    InvalidType,
    BadLabel,
    DuplicateLabel,
    ExpectedObject,
    ExpectedArray,
    ExpectedScalar,
    Missing,
    Unknown,
    Deprecated,
    ComponentMissing,
    ComponentNotFound,
}

impl LintKind {
    pub const ALL: [LintKind; 15] = [
        LintKind::Custom,
        LintKind::FailedRead,
        LintKind::MissingEnvVar,
        LintKind::InvalidOption,
        LintKind::InvalidType,
        LintKind::BadLabel,
        LintKind::DuplicateLabel,
        LintKind::ExpectedObject,
        LintKind::ExpectedArray,
        LintKind::ExpectedScalar,
        LintKind::Missing,
        LintKind::Unknown,
        LintKind::Deprecated,
        LintKind::ComponentMissing,
        LintKind::ComponentNotFound,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LintKind::Custom => "custom",
            LintKind::FailedRead => "failed_read",
            LintKind::MissingEnvVar => "missing_env_var",
            LintKind::InvalidOption => "invalid_option",
            LintKind::InvalidType => "invalid_type",
            LintKind::BadLabel => "bad_label",
            LintKind::DuplicateLabel => "duplicate_label",
            LintKind::ExpectedObject => "expected_object",
            LintKind::ExpectedArray => "expected_array",
            LintKind::ExpectedScalar => "expected_scalar",
            LintKind::Missing => "missing",
            LintKind::Unknown => "unknown",
            LintKind::Deprecated => "deprecated",
            LintKind::ComponentMissing => "component_missing",
            LintKind::ComponentNotFound => "component_not_found",
        }
    }
}

impl fmt::Display for LintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LintKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LintKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown lint kind: {s}"))
    }
}

/// A non-fatal problem found in a config, attributed to a 1-based line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lint {
    pub line: usize,

    /// 1-based column, 0 when unknown.
    pub column: usize,

    #[serde(rename = "type")]
    pub kind: LintKind,

    #[serde(rename = "what")]
    pub message: String,
}

impl Lint {
    pub fn new(line: usize, kind: LintKind, message: impl Into<String>) -> Self {
        Self {
            line,
            column: 0,
            kind,
            message: message.into(),
        }
    }

    pub fn with_column(mut self, column: usize) -> Self {
        self.column = column;
        self
    }
}

impl fmt::Display for Lint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

/// A lint raised as a hard error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct LintError(pub Lint);

impl LintError {
    pub fn new(line: usize, kind: LintKind, message: impl Into<String>) -> Self {
        Self(Lint::new(line, kind, message))
    }

    pub fn lint(&self) -> &Lint {
        &self.0
    }

    pub fn into_lint(self) -> Lint {
        self.0
    }
}

impl From<Lint> for LintError {
    fn from(lint: Lint) -> Self {
        Self(lint)
    }
}

/// Options for a lint run.
#[derive(Clone)]
pub struct LintConfig {
    pub provider: Arc<dyn Provider>,

    /// Kinds dropped from the output.
    pub suppressed: BTreeSet<LintKind>,

    /// Skip `unknown` lints for fields the schema does not know.
    pub allow_unknown_fields: bool,
}

impl LintConfig {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self {
            provider,
            suppressed: BTreeSet::new(),
            allow_unknown_fields: false,
        }
    }

    pub fn suppress(mut self, kind: LintKind) -> Self {
        self.suppressed.insert(kind);
        self
    }

    pub fn allow_unknown_fields(mut self, allow: bool) -> Self {
        self.allow_unknown_fields = allow;
        self
    }

    pub fn is_enabled(&self, kind: LintKind) -> bool {
        !self.suppressed.contains(&kind)
    }

    /// Drop suppressed kinds from a list of lints.
    pub fn filter(&self, lints: Vec<Lint>) -> Vec<Lint> {
        lints.into_iter().filter(|l| self.is_enabled(l.kind)).collect()
    }
}

impl Default for LintConfig {
    fn default() -> Self {
        Self::new(Arc::new(Registry::builtin()))
    }
}

impl fmt::Debug for LintConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LintConfig")
            .field("suppressed", &self.suppressed)
            .field("allow_unknown_fields", &self.allow_unknown_fields)
            .finish_non_exhaustive()
    }
}

/// State for one lint run over a document.
#[derive(Debug, Clone)]
pub struct LintContext {
    pub conf: LintConfig,
}

impl LintContext {
    pub fn new(conf: LintConfig) -> Self {
        Self { conf }
    }

    pub fn provider(&self) -> &dyn Provider {
        self.conf.provider.as_ref()
    }
}

impl Default for LintContext {
    fn default() -> Self {
        Self::new(LintConfig::default())
    }
}
