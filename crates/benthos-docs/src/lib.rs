//! Component documentation, type inference and linting for Benthos configs.
//!
//! The crate is organised around a read-only schema registry:
//!
//! - [`ComponentSpec`] and [`FieldSpec`] describe what a component accepts.
//! - [`Provider`] looks specs up by category and name; [`Registry`] is the
//!   standard implementation and [`Registry::builtin`] carries the metrics
//!   components.
//! - [`inference`] decides which registered type a component node refers to,
//!   from an explicit `type` key or from the keys present.
//! - [`FieldSpec::lint_node`] walks a parsed document against a spec and
//!   returns [`Lint`]s without failing.

pub mod component;
pub mod field;
pub mod inference;
pub mod lint;
mod linter;
pub mod provider;

pub use component::{ComponentSpec, ComponentType, Status};
pub use field::{FieldKind, FieldSpec, FieldType};
pub use inference::{
    Inference, InferenceError, get_inference_candidate, get_inference_candidate_from_map,
    get_plugin_config,
};
pub use lint::{Lint, LintConfig, LintContext, LintError, LintKind};
pub use provider::{Provider, Registry};
