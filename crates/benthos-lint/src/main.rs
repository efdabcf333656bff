//! benthos-lint - check Benthos config files
//!
//! Usage:
//!   benthos-lint lint <paths...> [--format text|json]
//!   benthos-lint echo [path]

use anyhow::{Context, Result};
use benthos_config::env::lookup_env;
use benthos_config::fs::OsFileSystem;
use benthos_config::{Config, read_yaml_file_linted, serverless};
use benthos_docs::{Lint, LintConfig, LintKind};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "benthos-lint")]
#[command(version, about = "Lint Benthos config files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lint config files and report every problem found
    Lint {
        /// Config files to lint
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Do not report environment variables that are not set
        #[arg(long)]
        skip_env_var_check: bool,

        /// Do not report fields that are not part of the schema
        #[arg(long)]
        allow_unknown: bool,

        /// Lint kind to ignore (e.g. deprecated), may be repeated
        #[arg(long, value_name = "KIND")]
        suppress: Vec<LintKind>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Print the resolved config as JSON
    Echo {
        /// Config file; serverless discovery is used when omitted
        path: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Lint {
            paths,
            skip_env_var_check,
            allow_unknown,
            suppress,
            format,
        } => {
            let conf = suppress
                .into_iter()
                .fold(LintConfig::default(), LintConfig::suppress)
                .allow_unknown_fields(allow_unknown);
            let failed = lint_paths(&paths, skip_env_var_check, &conf, format)?;
            if failed {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Echo { path } => {
            let config = echo_config(path.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&config.to_json())?);
            Ok(())
        }
    }
}

/// Lint each file in turn. Returns whether anything was reported.
fn lint_paths(
    paths: &[PathBuf],
    skip_env_var_check: bool,
    conf: &LintConfig,
    format: OutputFormat,
) -> Result<bool> {
    let mut reports = Vec::new();

    for path in paths {
        let lints = match read_yaml_file_linted(&OsFileSystem, path, skip_env_var_check, conf) {
            Ok(loaded) => loaded.lints,
            // A hard failure is reported like any other problem with the file.
            Err(err) => vec![Lint::new(
                err.line().unwrap_or(0),
                LintKind::FailedRead,
                err.to_string(),
            )],
        };
        tracing::debug!(path = %path.display(), lints = lints.len(), "Linted config");
        reports.extend(lints.into_iter().map(|lint| (path.as_path(), lint)));
    }

    match format {
        OutputFormat::Text => {
            for (path, lint) in &reports {
                println!("{}: {lint}", path.display());
            }
        }
        OutputFormat::Json => {
            let values = reports
                .iter()
                .map(|(path, lint)| report_json(path, lint))
                .collect::<Result<Vec<_>>>()?;
            println!("{}", serde_json::to_string_pretty(&values)?);
        }
    }

    Ok(!reports.is_empty())
}

fn report_json(path: &Path, lint: &Lint) -> Result<Value> {
    let mut value = serde_json::to_value(lint).context("Failed to serialize lint")?;
    if let Value::Object(map) = &mut value {
        map.insert("path".into(), json!(path.display().to_string()));
    }
    Ok(value)
}

fn echo_config(path: Option<&Path>) -> Result<Config> {
    let conf = LintConfig::default();
    let Some(path) = path else {
        return serverless::load_config(&OsFileSystem, lookup_env, &conf)
            .context("Failed to load serverless config");
    };

    let loaded = read_yaml_file_linted(&OsFileSystem, path, false, &conf)
        .with_context(|| format!("Failed to load config: {}", path.display()))?;
    for lint in &loaded.lints {
        tracing::warn!(path = %path.display(), "{lint}");
    }
    Ok(loaded.config)
}
