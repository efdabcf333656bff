//! Reading config files: interpolation, parsing, decoding and linting.
//!
//! This module decides which failures stop a load. Missing variables and
//! invalid encodings become lints and the load carries on; an unreadable
//! file, an unparsable document or an undecodable root config are errors.

use crate::env::{lookup_env, replace_env_variables};
use crate::error::{LoadError, Result};
use crate::fs::FileSystem;
use crate::Config;
use benthos_docs::{Lint, LintConfig, LintContext, LintKind};
use std::io::Read;
use std::path::Path;
use std::time::SystemTime;

/// A first line starting with this disables linting of the document.
pub const LINT_DISABLE_SENTINEL: &[u8] = b"# BENTHOS LINT DISABLE";

/// A file's bytes after variable interpolation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvSwapped {
    pub bytes: Vec<u8>,
    pub lints: Vec<Lint>,
    pub modified: Option<SystemTime>,

    /// The raw file started with [`LINT_DISABLE_SENTINEL`].
    pub lint_disabled: bool,
}

/// A loaded root config and the lints found along the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded {
    pub config: Config,
    pub lints: Vec<Lint>,
    pub modified: Option<SystemTime>,
}

/// Read a file and interpolate its variable references.
///
/// Invalid UTF-8 yields a `failed_read` lint on line 1. Each missing
/// variable yields a `missing_env_var` lint on the line of its first
/// reference and is replaced by an empty string.
pub fn read_file_env_swap(
    fs: &dyn FileSystem,
    path: &Path,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<EnvSwapped> {
    tracing::debug!(path = %path.display(), "Reading config file");

    let (raw, modified) = {
        let mut file = fs.open(path).map_err(|e| LoadError::io(path, e))?;
        let modified = file.metadata().ok().and_then(|m| m.modified);
        let mut raw = Vec::new();
        file.read_to_end(&mut raw)
            .map_err(|e| LoadError::io(path, e))?;
        (raw, modified)
    };

    let mut lints = Vec::new();
    if std::str::from_utf8(&raw).is_err() {
        tracing::warn!(path = %path.display(), "Config contains invalid UTF-8");
        lints.push(Lint::new(
            1,
            LintKind::FailedRead,
            "detected invalid utf-8 encoding in config, this may result in interpolation functions not working as expected",
        ));
    }

    let bytes = match replace_env_variables(&raw, lookup) {
        Ok(bytes) => bytes,
        Err(missing) => {
            tracing::warn!(path = %path.display(), "{missing}");
            lints.extend(missing.missing.iter().map(|var| {
                Lint::new(
                    var.line,
                    LintKind::MissingEnvVar,
                    format!("required environment variable {} is not set", var.name),
                )
            }));
            missing.best_attempt
        }
    };

    Ok(EnvSwapped {
        lint_disabled: raw.starts_with(LINT_DISABLE_SENTINEL),
        bytes,
        lints,
        modified,
    })
}

/// Load a root config from a file, interpolating from the process
/// environment.
pub fn read_yaml_file_linted(
    fs: &dyn FileSystem,
    path: &Path,
    skip_env_var_check: bool,
    lint_conf: &LintConfig,
) -> Result<Loaded> {
    let base = Config::new(lint_conf.provider.as_ref());
    read_yaml_file_linted_into(fs, path, lookup_env, skip_env_var_check, lint_conf, base)
}

/// Load a file over an existing root config.
///
/// Lints come in discovery order: read lints first, then the schema lints
/// of the parsed document unless linting is disabled by the sentinel. Kinds
/// suppressed by `lint_conf` are dropped.
pub fn read_yaml_file_linted_into(
    fs: &dyn FileSystem,
    path: &Path,
    lookup: impl Fn(&str) -> Option<String>,
    skip_env_var_check: bool,
    lint_conf: &LintConfig,
    base: Config,
) -> Result<Loaded> {
    let swapped = read_file_env_swap(fs, path, lookup)?;

    let mut lints = swapped.lints;
    if skip_env_var_check {
        lints.retain(|l| l.kind != LintKind::MissingEnvVar);
    }

    let source = String::from_utf8_lossy(&swapped.bytes);
    let node = benthos_yaml::parse_file(&source, &path.display().to_string())?;
    let config = base.with_node(lint_conf.provider.as_ref(), &node)?;

    if swapped.lint_disabled {
        tracing::debug!(path = %path.display(), "Linting disabled by config");
    } else {
        let ctx = LintContext::new(lint_conf.clone());
        lints.extend(Config::spec().lint_node(&ctx, &node));
    }

    Ok(Loaded {
        config,
        lints: lint_conf.filter(lints),
        modified: swapped.modified,
    })
}

/// Lint raw config bytes without building a config.
pub fn lint_yaml_bytes(lint_conf: &LintConfig, raw: &[u8]) -> Result<Vec<Lint>> {
    if raw.starts_with(LINT_DISABLE_SENTINEL) {
        return Ok(Vec::new());
    }
    let node = benthos_yaml::parse_bytes(raw)?;
    let ctx = LintContext::new(lint_conf.clone());
    Ok(Config::spec().lint_node(&ctx, &node))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MemoryFileSystem;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_env_swap_reports_missing_vars_per_name() {
        let fs = MemoryFileSystem::new().with_file(
            "/c.yaml",
            "a: ${A}\nb:\n  c: ${B}\n  d: ${A}\n",
        );
        let swapped = read_file_env_swap(&fs, Path::new("/c.yaml"), no_env).unwrap();
        assert_eq!(swapped.bytes, b"a: \nb:\n  c: \n  d: \n");
        assert_eq!(
            swapped.lints,
            vec![
                Lint::new(1, LintKind::MissingEnvVar, "required environment variable A is not set"),
                Lint::new(3, LintKind::MissingEnvVar, "required environment variable B is not set"),
            ]
        );
        assert!(!swapped.lint_disabled);
    }

    #[test]
    fn test_env_swap_invalid_utf8_is_a_lint() {
        let fs = MemoryFileSystem::new().with_file("/c.yaml", b"a: \xff\n".to_vec());
        let swapped = read_file_env_swap(&fs, Path::new("/c.yaml"), no_env).unwrap();
        assert_eq!(swapped.lints.len(), 1);
        assert_eq!(swapped.lints[0].kind, LintKind::FailedRead);
        assert_eq!(swapped.lints[0].line, 1);
        assert_eq!(swapped.bytes, b"a: \xff\n");
    }

    #[test]
    fn test_env_swap_missing_file() {
        let err = read_file_env_swap(&MemoryFileSystem::new(), Path::new("/nope.yaml"), no_env)
            .unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
        assert_eq!(err.line(), None);
        insta::assert_snapshot!(err.to_string(), @"failed to read /nope.yaml: no such file");
    }

    #[test]
    fn test_lint_yaml_bytes() {
        let conf = LintConfig::default();
        let lints = lint_yaml_bytes(&conf, b"metrics:\n  none: {}\nnope: 1\n").unwrap();
        assert_eq!(lints.len(), 1);
        assert_eq!(lints[0].kind, LintKind::Unknown);
        assert_eq!(lints[0].line, 3);

        let err = lint_yaml_bytes(&conf, b"a: 1\nb: c: d\n").unwrap_err();
        assert!(matches!(err, LoadError::Parse(_)));
        assert_eq!(err.line(), Some(2));
    }

    #[test]
    fn test_lint_yaml_bytes_sentinel() {
        let conf = LintConfig::default();
        let raw = b"# BENTHOS LINT DISABLE\nmetrics:\n  nope: {}\nwhat: ever\n";
        assert_eq!(lint_yaml_bytes(&conf, raw).unwrap(), Vec::<Lint>::new());
    }
}
