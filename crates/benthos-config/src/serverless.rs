//! Config discovery and lifecycle for serverless deployments.
//!
//! A function reads its config from the `BENTHOS_CONFIG` variable when set,
//! otherwise from the first of [`DEFAULT_PATHS`] that exists. Serverless
//! configs default to no metrics, JSON logs and an output that answers each
//! invocation, rejecting messages that failed processing.

use crate::env::replace_env_variables;
use crate::error::Result;
use crate::fs::FileSystem;
use crate::reader::read_yaml_file_linted_into;
use crate::{Config, metrics};
use benthos_docs::LintConfig;
use serde_json::{Value, json};
use std::path::PathBuf;
use std::time::Duration;

/// Inline config document.
pub const CONFIG_ENV: &str = "BENTHOS_CONFIG";

/// Extra path tried before the defaults.
pub const CONFIG_PATH_ENV: &str = "BENTHOS_CONFIG_PATH";

pub const DEFAULT_PATHS: [&str; 5] = [
    "./benthos.yaml",
    "./config.yaml",
    "/benthos.yaml",
    "/etc/benthos/config.yaml",
    "/etc/benthos.yaml",
];

/// Time given to a handler to shut down.
pub const CLOSE_TIMEOUT: Duration = Duration::from_secs(30);

/// Paths to look for a config file at, in order.
pub fn config_paths(lookup: impl Fn(&str) -> Option<String>) -> Vec<PathBuf> {
    lookup(CONFIG_PATH_ENV)
        .filter(|path| !path.is_empty())
        .into_iter()
        .map(PathBuf::from)
        .chain(DEFAULT_PATHS.iter().map(PathBuf::from))
        .collect()
}

/// Output used unless the config sets its own.
pub fn default_output() -> Value {
    json!({
        "switch": {
            "retry_until_success": false,
            "cases": [
                {
                    "check": "errored()",
                    "output": {"reject": "processing failed due to: ${! error() }"}
                },
                {"output": {"sync_response": {}}}
            ]
        }
    })
}

/// Root config defaults for serverless deployments.
pub fn default_config(lint_conf: &LintConfig) -> Config {
    let provider = lint_conf.provider.as_ref();
    let mut config = Config::new(provider);
    config.metrics = metrics::Config::of_type(provider, "none");
    config.logger.format = "json".into();
    config.sections.insert("output".into(), default_output());
    config
}

/// Find and load the config of a serverless function.
///
/// Missing variables in an inline config are tolerated. Lints of a config
/// file are logged and otherwise ignored. With no inline config and no file
/// the defaults are returned.
pub fn load_config(
    fs: &dyn FileSystem,
    lookup: impl Fn(&str) -> Option<String>,
    lint_conf: &LintConfig,
) -> Result<Config> {
    let base = default_config(lint_conf);

    if let Some(inline) = lookup(CONFIG_ENV).filter(|conf| !conf.is_empty()) {
        tracing::debug!("Reading config from {CONFIG_ENV}");
        let bytes = match replace_env_variables(inline.as_bytes(), &lookup) {
            Ok(bytes) => bytes,
            Err(missing) => {
                tracing::warn!("{missing}");
                missing.best_attempt
            }
        };
        let node = benthos_yaml::parse(&String::from_utf8_lossy(&bytes))?;
        return Ok(base.with_node(lint_conf.provider.as_ref(), &node)?);
    }

    let Some(path) = config_paths(&lookup)
        .into_iter()
        .find(|path| fs.metadata(path).is_ok())
    else {
        tracing::debug!("No config file found, using defaults");
        return Ok(base);
    };

    let loaded = read_yaml_file_linted_into(fs, &path, &lookup, false, lint_conf, base)?;
    for lint in &loaded.lints {
        tracing::warn!(path = %path.display(), line = lint.line, kind = %lint.kind, "{}", lint.message);
    }
    Ok(loaded.config)
}

/// Handles invocations of a serverless function.
pub trait Handler {
    type Error: std::error::Error;

    fn handle(&mut self, event: Value) -> std::result::Result<Value, Self::Error>;

    /// Shut down within `timeout`.
    fn close(&mut self, timeout: Duration) -> std::result::Result<(), Self::Error>;
}

/// Handle each event in turn, then close the handler.
///
/// Per-event failures are returned alongside successes; only a failed close
/// fails the run.
pub fn run<H: Handler>(
    handler: &mut H,
    events: impl IntoIterator<Item = Value>,
) -> std::result::Result<Vec<std::result::Result<Value, H::Error>>, H::Error> {
    let responses: Vec<_> = events
        .into_iter()
        .map(|event| handler.handle(event))
        .collect();
    tracing::debug!(events = responses.len(), "Closing handler");
    handler.close(CLOSE_TIMEOUT)?;
    Ok(responses)
}
