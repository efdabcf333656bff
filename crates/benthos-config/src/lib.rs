//! # benthos-config
//!
//! Loads Benthos config files.
//!
//! A load reads the file through a [`fs::FileSystem`], replaces `${VAR}`
//! references from the environment, parses the result with line tracking,
//! decodes the root [`Config`] and lints the document against its schema.
//! Recoverable problems come back as lints next to the config; only an
//! unreadable file, an unparsable document or an unresolvable component
//! stop the load with a [`LoadError`].
//!
//! ```rust
//! use benthos_config::fs::MemoryFileSystem;
//! use benthos_config::read_yaml_file_linted;
//! use benthos_docs::LintConfig;
//! use std::path::Path;
//!
//! let fs = MemoryFileSystem::new().with_file("/benthos.yaml", "metrics:\n  none: {}\n");
//! let loaded = read_yaml_file_linted(&fs, Path::new("/benthos.yaml"), false, &LintConfig::default())
//!     .unwrap();
//! assert_eq!(loaded.config.metrics.type_name, "none");
//! assert!(loaded.lints.is_empty());
//! ```

mod config;
pub mod env;
mod error;
pub mod fs;
pub mod logger;
pub mod metrics;
pub mod reader;
pub mod serverless;

pub use config::{Config, PIPELINE_SECTIONS};
pub use error::{LoadError, Result};
pub use reader::{
    EnvSwapped, LINT_DISABLE_SENTINEL, Loaded, lint_yaml_bytes, read_file_env_swap,
    read_yaml_file_linted, read_yaml_file_linted_into,
};
