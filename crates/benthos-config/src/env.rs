//! Environment variable interpolation over raw config bytes.
//!
//! References take the forms:
//! - `${NAME}` - the value of `NAME`
//! - `${NAME:-default}` - the value of `NAME`, or `default` when unset
//! - `${NAME:default}` - older spelling of the above
//!
//! Names are made of ASCII letters, digits, `_` and `.`. Interpolation runs
//! before the document is parsed, so it only ever replaces the byte ranges of
//! references and never looks at the surrounding structure. Values are
//! inserted verbatim. A default may itself hold references, which are
//! interpolated in turn.

use regex::bytes::{Captures, Regex};
use std::fmt;
use std::sync::LazyLock;

static ENV_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?-u)\$\{([0-9A-Za-z_.]+)(?::-?((?:\$\{[^{}]*\}|[^}])*))?\}")
        .expect("env reference pattern is valid")
});

/// A referenced variable that was not set and had no default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingEnvVar {
    pub name: String,

    /// 1-based line of the first reference to the variable.
    pub line: usize,
}

/// Interpolation left references unresolved.
///
/// Carries every missing name, once each in order of first reference, and
/// the output with those references replaced by empty strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingEnvVars {
    pub missing: Vec<MissingEnvVar>,
    pub best_attempt: Vec<u8>,
}

impl MissingEnvVars {
    pub fn names(&self) -> Vec<&str> {
        self.missing.iter().map(|m| m.name.as_str()).collect()
    }
}

impl fmt::Display for MissingEnvVars {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "required environment variables were not set: [{}]",
            self.names().join(", ")
        )
    }
}

impl std::error::Error for MissingEnvVars {}

/// Look a variable up in the process environment.
pub fn lookup_env(name: &str) -> Option<String> {
    std::env::var_os(name).map(|value| value.to_string_lossy().into_owned())
}

/// Replace every variable reference in `input`.
///
/// # Errors
///
/// Returns [`MissingEnvVars`] when any reference could not be resolved. The
/// error still carries a usable best attempt; callers decide whether that is
/// fatal.
///
/// # Example
///
/// ```rust
/// use benthos_config::env::replace_env_variables;
///
/// let out = replace_env_variables(b"addr: ${HOST:-localhost}:${PORT}", |name| {
///     (name == "PORT").then(|| "8125".to_string())
/// })
/// .unwrap();
/// assert_eq!(out, b"addr: localhost:8125");
/// ```
pub fn replace_env_variables(
    input: &[u8],
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Vec<u8>, MissingEnvVars> {
    let mut missing = Vec::new();
    let output = interpolate(input, 1, &lookup, &mut missing);
    if missing.is_empty() {
        Ok(output)
    } else {
        Err(MissingEnvVars {
            missing,
            best_attempt: output,
        })
    }
}

fn interpolate(
    input: &[u8],
    first_line: usize,
    lookup: &dyn Fn(&str) -> Option<String>,
    missing: &mut Vec<MissingEnvVar>,
) -> Vec<u8> {
    let mut output = Vec::with_capacity(input.len());
    let mut lines = LineCounter::new(input, first_line);
    let mut last = 0;

    for caps in ENV_REGEX.captures_iter(input) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        output.extend_from_slice(&input[last..whole.start()]);
        last = whole.end();

        let name = capture_str(&caps, 1);
        if let Some(value) = lookup(&name) {
            output.extend_from_slice(value.as_bytes());
            continue;
        }
        match caps.get(2) {
            Some(default) => {
                let line = lines.line_at(default.start());
                output.extend(interpolate(default.as_bytes(), line, lookup, missing));
            }
            None => {
                let line = lines.line_at(whole.start());
                if !missing.iter().any(|m| m.name == name) {
                    missing.push(MissingEnvVar { name, line });
                }
            }
        }
    }

    output.extend_from_slice(&input[last..]);
    output
}

fn capture_str(caps: &Captures<'_>, group: usize) -> String {
    caps.get(group)
        .map(|m| String::from_utf8_lossy(m.as_bytes()).into_owned())
        .unwrap_or_default()
}

/// Incremental line numbers for increasing offsets into one buffer.
struct LineCounter<'a> {
    input: &'a [u8],
    offset: usize,
    line: usize,
}

impl<'a> LineCounter<'a> {
    fn new(input: &'a [u8], first_line: usize) -> Self {
        Self {
            input,
            offset: 0,
            line: first_line,
        }
    }

    fn line_at(&mut self, offset: usize) -> usize {
        let end = offset.min(self.input.len());
        if end > self.offset {
            self.line += self.input[self.offset..end]
                .split(|b| *b == b'\n')
                .count()
                - 1;
            self.offset = end;
        }
        self.line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    fn swap(input: &str, vars: &[(&str, &str)]) -> Result<String, MissingEnvVars> {
        replace_env_variables(input.as_bytes(), env(vars))
            .map(|out| String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_simple_substitution() {
        assert_eq!(swap("a: ${FOO}", &[("FOO", "bar")]).unwrap(), "a: bar");
        assert_eq!(
            swap("a: ${FOO}-${BAR.baz}", &[("FOO", "1"), ("BAR.baz", "2")]).unwrap(),
            "a: 1-2"
        );
    }

    #[test]
    fn test_non_reference_bytes_are_untouched() {
        let input = "a: $FOO\nb: ${}\nc: ${not valid}\nd: {x: y}\ne: $${FOO\n";
        assert_eq!(swap(input, &[("FOO", "bar")]).unwrap(), input);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(swap("${FOO:-fallback}", &[]).unwrap(), "fallback");
        assert_eq!(swap("${FOO:fallback}", &[]).unwrap(), "fallback");
        assert_eq!(swap("${FOO:-}", &[]).unwrap(), "");
        assert_eq!(swap("${FOO:-a b:c}", &[]).unwrap(), "a b:c");
        assert_eq!(swap("${FOO:-x}", &[("FOO", "set")]).unwrap(), "set");
    }

    #[test]
    fn test_empty_value_is_found() {
        assert_eq!(swap("a: '${FOO:-x}'", &[("FOO", "")]).unwrap(), "a: ''");
    }

    #[test]
    fn test_nested_default_is_interpolated() {
        assert_eq!(swap("${A:-${B}}", &[("B", "inner")]).unwrap(), "inner");
        assert_eq!(swap("${A:-${B:-deep}}", &[]).unwrap(), "deep");

        let err = swap("x\n${A:-${B}}", &[]).unwrap_err();
        assert_eq!(
            err.missing,
            vec![MissingEnvVar {
                name: "B".into(),
                line: 2
            }]
        );
    }

    #[test]
    fn test_values_are_not_re_substituted() {
        assert_eq!(
            swap("${A}", &[("A", "${B}"), ("B", "nope")]).unwrap(),
            "${B}"
        );
        assert_eq!(swap("${A}", &[("A", "line1\nline2")]).unwrap(), "line1\nline2");
    }

    #[test]
    fn test_missing_variables() {
        let err = swap(
            "a: ${FOO}\nb: ${BAR}\nc: ${FOO}\nd: ${BAZ:-ok}\n",
            &[],
        )
        .unwrap_err();
        assert_eq!(err.names(), vec!["FOO", "BAR"]);
        assert_eq!(err.missing[0].line, 1);
        assert_eq!(err.missing[1].line, 2);
        assert_eq!(
            String::from_utf8(err.best_attempt.clone()).unwrap(),
            "a: \nb: \nc: \nd: ok\n"
        );
        insta::assert_snapshot!(
            err.to_string(),
            @"required environment variables were not set: [FOO, BAR]"
        );
    }

    #[test]
    fn test_invalid_utf8_is_passed_through() {
        let input = b"a: \xff${FOO}\xfe\n";
        let out = replace_env_variables(input, env(&[("FOO", "x")])).unwrap();
        assert_eq!(out, b"a: \xffx\xfe\n");
    }

    #[test]
    fn test_idempotent_when_resolved() {
        let vars = [("HOST", "localhost"), ("PORT", "8125")];
        let input = "metrics:\n  statsd:\n    address: ${HOST}:${PORT}\n    flush_period: ${FLUSH:-100ms}\n";
        let once = swap(input, &vars).unwrap();
        let twice = swap(&once, &vars).unwrap();
        assert_eq!(once, twice);
        assert!(!once.contains("${"));
    }
}
