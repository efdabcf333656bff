//! Lookup of component specs.

use crate::{ComponentSpec, ComponentType, FieldSpec, Status};
use serde_json::json;
use std::collections::BTreeMap;

/// Read-only source of component documentation.
///
/// Implementations are shared across threads by [`crate::LintConfig`].
pub trait Provider: Send + Sync {
    /// Spec of the component registered under exactly this name.
    fn get_docs(&self, name: &str, ctype: ComponentType) -> Option<&ComponentSpec>;

    /// Canonical name for a deprecated alias, if `name` is one.
    fn resolve_alias(&self, name: &str, ctype: ComponentType) -> Option<&str>;

    /// Type used when a component node names none.
    fn default_type(&self, ctype: ComponentType) -> Option<&str>;

    /// Registered names of a category, aliases excluded.
    fn component_names(&self, ctype: ComponentType) -> Vec<&str>;

    /// Canonical name of a registered type or alias.
    fn canonical_name<'a>(&'a self, name: &'a str, ctype: ComponentType) -> Option<&'a str> {
        if let Some(spec) = self.get_docs(name, ctype) {
            return Some(spec.name.as_str());
        }
        let target = self.resolve_alias(name, ctype)?;
        self.get_docs(target, ctype).map(|spec| spec.name.as_str())
    }
}

/// In-memory provider, populated at construction.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    specs: BTreeMap<ComponentType, BTreeMap<String, ComponentSpec>>,
    aliases: BTreeMap<ComponentType, BTreeMap<String, String>>,
    defaults: BTreeMap<ComponentType, String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the standard metrics components.
    pub fn builtin() -> Self {
        let metrics = ComponentType::Metrics;
        Registry::new()
            .with_component(
                ComponentSpec::new("none", metrics).with_summary("Disable metrics entirely."),
            )
            .with_component(prometheus())
            .with_component(statsd())
            .with_component(
                ComponentSpec::plugin("json_api", metrics, Vec::new())
                    .with_summary("Serves metrics as JSON on the service-wide HTTP server."),
            )
            .with_component(influxdb())
            .with_component(
                ComponentSpec::plugin(
                    "logger",
                    metrics,
                    vec![
                        FieldSpec::string("push_interval", "How often to log metrics.").optional(),
                        FieldSpec::bool("flush_metrics", "Reset counters after each push.")
                            .with_default(json!(false)),
                    ],
                )
                .with_status(Status::Beta)
                .with_summary("Prints aggregated metrics through the logger."),
            )
            .with_component(aws_cloudwatch())
            .with_alias(metrics, "cloudwatch", "aws_cloudwatch")
            .with_alias(metrics, "http_server", "json_api")
            .with_alias(metrics, "stdout", "logger")
            .with_default(metrics, "prometheus")
    }

    /// Register a spec, replacing any spec of the same category and name.
    pub fn with_component(mut self, spec: ComponentSpec) -> Self {
        self.add(spec);
        self
    }

    pub fn with_alias(
        mut self,
        ctype: ComponentType,
        alias: impl Into<String>,
        canonical: impl Into<String>,
    ) -> Self {
        self.aliases
            .entry(ctype)
            .or_default()
            .insert(alias.into(), canonical.into());
        self
    }

    pub fn with_default(mut self, ctype: ComponentType, name: impl Into<String>) -> Self {
        self.defaults.insert(ctype, name.into());
        self
    }

    pub fn add(&mut self, spec: ComponentSpec) {
        self.specs
            .entry(spec.category)
            .or_default()
            .insert(spec.name.clone(), spec);
    }
}

impl Provider for Registry {
    fn get_docs(&self, name: &str, ctype: ComponentType) -> Option<&ComponentSpec> {
        self.specs.get(&ctype)?.get(name)
    }

    fn resolve_alias(&self, name: &str, ctype: ComponentType) -> Option<&str> {
        self.aliases.get(&ctype)?.get(name).map(String::as_str)
    }

    fn default_type(&self, ctype: ComponentType) -> Option<&str> {
        self.defaults.get(&ctype).map(String::as_str)
    }

    fn component_names(&self, ctype: ComponentType) -> Vec<&str> {
        self.specs
            .get(&ctype)
            .map(|specs| specs.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

fn prometheus() -> ComponentSpec {
    ComponentSpec::plugin(
        "prometheus",
        ComponentType::Metrics,
        vec![
            FieldSpec::bool("use_histogram_timing", "Record timings as histograms.")
                .with_default(json!(false)),
            FieldSpec::float("histogram_buckets", "Timing histogram buckets.")
                .array()
                .with_default(json!([])),
            FieldSpec::bool("add_process_metrics", "Export process metrics.")
                .with_default(json!(false)),
            FieldSpec::bool("add_go_metrics", "Export runtime metrics.").with_default(json!(false)),
            FieldSpec::string("push_url", "Push gateway to send metrics to.").optional(),
            FieldSpec::string("push_interval", "Push gateway interval.").optional(),
            FieldSpec::string("push_job_name", "Job label for pushed metrics.")
                .with_default(json!("benthos_push")),
            FieldSpec::object(
                "push_basic_auth",
                "Basic authentication for the push gateway.",
                vec![
                    FieldSpec::string("username", "").with_default(json!("")),
                    FieldSpec::string("password", "").with_default(json!("")),
                ],
            ),
            FieldSpec::string("file_output_path", "Write metrics to this file on shutdown.")
                .with_default(json!("")),
        ],
    )
    .with_summary("Host endpoints for a Prometheus scraper.")
}

fn statsd() -> ComponentSpec {
    ComponentSpec::plugin(
        "statsd",
        ComponentType::Metrics,
        vec![
            FieldSpec::string("address", "Address of the statsd server."),
            FieldSpec::string("flush_period", "Time between flushes.").with_default(json!("100ms")),
            FieldSpec::string("tag_format", "Metric tagging style.")
                .with_options(&["none", "datadog", "influxdb"])
                .with_default(json!("none")),
        ],
    )
    .with_summary("Pushes metrics over a statsd protocol.")
}

fn influxdb() -> ComponentSpec {
    ComponentSpec::plugin(
        "influxdb",
        ComponentType::Metrics,
        vec![
            FieldSpec::string("url", "InfluxDB server URL."),
            FieldSpec::string("db", "Database to write to."),
            FieldSpec::string("interval", "Time between pushes.").with_default(json!("1m")),
            FieldSpec::string("username", "").with_default(json!("")),
            FieldSpec::string("password", "").with_default(json!("")),
        ],
    )
    .with_status(Status::Beta)
    .with_summary("Send metrics to InfluxDB 1.x.")
}

fn aws_cloudwatch() -> ComponentSpec {
    ComponentSpec::plugin(
        "aws_cloudwatch",
        ComponentType::Metrics,
        vec![
            FieldSpec::string("namespace", "Namespace of the metrics.").with_default(json!("Benthos")),
            FieldSpec::string("flush_period", "Time between flushes.").with_default(json!("100ms")),
            FieldSpec::string("region", "AWS region.").with_default(json!("")),
        ],
    )
    .with_summary("Send metrics to AWS CloudWatch.")
}
