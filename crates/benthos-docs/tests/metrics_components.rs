//! Linting and inference over the built-in metrics components.

use benthos_docs::{
    ComponentType, FieldSpec, LintConfig, LintContext, LintKind, Provider, Registry,
    get_inference_candidate, get_plugin_config,
};
use benthos_yaml::parse;

fn metrics_field() -> FieldSpec {
    FieldSpec::object(
        "",
        "",
        vec![FieldSpec::component("metrics", "", ComponentType::Metrics).optional()],
    )
}

#[test]
fn every_builtin_component_lints_clean_with_its_defaults() {
    let registry = Registry::builtin();
    let ctx = LintContext::default();

    for name in registry.component_names(ComponentType::Metrics) {
        let spec = registry.get_docs(name, ComponentType::Metrics).unwrap();
        let payload = spec.config.default_value().map(|v| v.to_string());

        // Components with required fields have no complete default.
        let Some(payload) = payload else {
            assert!(spec.config.children.iter().any(|c| c.is_required()), "{name}");
            continue;
        };
        let source = format!("metrics:\n  {name}: {payload}\n");
        let node = parse(&source).unwrap();
        let lints = metrics_field().lint_node(&ctx, &node);
        assert!(lints.is_empty(), "{name}: {lints:?}");
    }
}

#[test]
fn inference_and_plugin_presence_agree() {
    let registry = Registry::builtin();
    let cases = [
        ("metrics:\n  none: {}\n", "none", false),
        ("metrics:\n  statsd:\n    address: x\n", "statsd", true),
        ("metrics:\n  type: prometheus\n", "prometheus", true),
        ("metrics:\n  http_server: {}\n", "json_api", true),
        ("metrics:\n  cloudwatch:\n    namespace: x\n", "aws_cloudwatch", true),
    ];

    for (source, expected, plugin) in cases {
        let doc = parse(source).unwrap();
        let node = doc.get("metrics").unwrap();
        let inference = get_inference_candidate(&registry, ComponentType::Metrics, node).unwrap();
        assert_eq!(inference.name, expected);
        assert_eq!(inference.spec.plugin, plugin);

        let payload = get_plugin_config(&registry, ComponentType::Metrics, expected, node);
        assert!(payload.is_mapping(), "{source}");
    }
}

#[test]
fn lint_config_applies_to_whole_walk() {
    let source = "metrics:\n  stdout:\n    flush_metrics: false\n    extra: 1\nunknown_root: 2\n";
    let node = parse(source).unwrap();

    let all = metrics_field().lint_node(&LintContext::default(), &node);
    let kinds: Vec<LintKind> = all.iter().map(|l| l.kind).collect();
    assert_eq!(
        kinds,
        vec![LintKind::Deprecated, LintKind::Unknown, LintKind::Unknown]
    );

    let conf = LintConfig::default()
        .suppress(LintKind::Deprecated)
        .allow_unknown_fields(true);
    assert!(metrics_field().lint_node(&LintContext::new(conf), &node).is_empty());
}
