//! Lint engine: walks a node tree against a field spec.

use crate::inference::get_inference_candidate;
use crate::{ComponentType, FieldKind, FieldSpec, FieldType, Lint, LintContext, LintKind, Status};
use benthos_yaml::{MappingEntry, Node};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9_]+$").expect("label pattern is valid"));

impl FieldSpec {
    /// Lint a node against this spec.
    ///
    /// Never fails: every problem found is returned as a [`Lint`], in the
    /// order the offending nodes appear in the document. Kinds suppressed by
    /// the context's config are left out.
    pub fn lint_node(&self, ctx: &LintContext, node: &Node) -> Vec<Lint> {
        let mut walker = LintWalker::new(ctx);
        walker.lint_field(self, node);
        walker.lints
    }
}

struct LintWalker<'a> {
    ctx: &'a LintContext,

    /// First line each component label was seen on
    labels: HashMap<String, usize>,

    lints: Vec<Lint>,
}

impl<'a> LintWalker<'a> {
    fn new(ctx: &'a LintContext) -> Self {
        Self {
            ctx,
            labels: HashMap::new(),
            lints: Vec::new(),
        }
    }

    fn add_lint(&mut self, node: &Node, kind: LintKind, message: String) {
        let info = &node.source_info;
        self.add_lint_at(info.line, info.col, kind, message);
    }

    fn add_lint_at(&mut self, line: usize, column: usize, kind: LintKind, message: String) {
        if self.ctx.conf.is_enabled(kind) {
            self.lints.push(Lint::new(line, kind, message).with_column(column));
        }
    }

    fn lint_field(&mut self, spec: &FieldSpec, node: &Node) {
        match spec.kind {
            FieldKind::Scalar => self.lint_value(spec, node),
            FieldKind::Array => match node.as_sequence() {
                Some(items) => items.iter().for_each(|item| self.lint_value(spec, item)),
                None if node.is_null() => {}
                None => self.add_lint(
                    node,
                    LintKind::ExpectedArray,
                    format!("expected array value, got {}", node.kind_name()),
                ),
            },
            FieldKind::Map => match node.as_mapping() {
                Some(entries) => entries.iter().for_each(|e| self.lint_value(spec, &e.value)),
                None if node.is_null() => {}
                None => self.add_lint(
                    node,
                    LintKind::ExpectedObject,
                    format!("expected object value, got {}", node.kind_name()),
                ),
            },
        }
    }

    fn lint_value(&mut self, spec: &FieldSpec, node: &Node) {
        match spec.field_type {
            FieldType::Object => self.lint_object(&spec.children, node),
            FieldType::Component(ctype) => self.lint_component(ctype, node),
            FieldType::Unknown => {}
            FieldType::String | FieldType::Int | FieldType::Float | FieldType::Bool => {
                self.lint_scalar(spec, node)
            }
        }
    }

    fn lint_object(&mut self, children: &[FieldSpec], node: &Node) {
        let Some(entries) = node.as_mapping() else {
            if !node.is_null() {
                self.add_lint(
                    node,
                    LintKind::ExpectedObject,
                    format!("expected object value, got {}", node.kind_name()),
                );
            }
            return;
        };

        for entry in entries {
            match children.iter().find(|c| c.name == entry.key) {
                Some(child) => {
                    if child.deprecated {
                        self.add_entry_lint(
                            entry,
                            LintKind::Deprecated,
                            format!("field {} is deprecated", entry.key),
                        );
                    }
                    self.lint_field(child, &entry.value);
                }
                None => self.lint_unknown_key(entry),
            }
        }

        for child in children.iter().filter(|c| c.is_required()) {
            if node.get(&child.name).is_none() {
                self.add_lint(
                    node,
                    LintKind::Missing,
                    format!("field {} is required", child.name),
                );
            }
        }
    }

    fn lint_unknown_key(&mut self, entry: &MappingEntry) {
        if !self.ctx.conf.allow_unknown_fields {
            self.add_entry_lint(
                entry,
                LintKind::Unknown,
                format!("field {} not recognised", entry.key),
            );
        }
    }

    fn add_entry_lint(&mut self, entry: &MappingEntry, kind: LintKind, message: String) {
        self.add_lint_at(entry.key_info.line, entry.key_info.col, kind, message);
    }

    fn lint_scalar(&mut self, spec: &FieldSpec, node: &Node) {
        if !node.is_scalar() {
            self.add_lint(
                node,
                LintKind::ExpectedScalar,
                format!(
                    "expected {} value, got {}",
                    spec.field_type.name(),
                    node.kind_name()
                ),
            );
            return;
        }
        if node.is_null() {
            return;
        }

        let value = node.to_json();
        let type_ok = match spec.field_type {
            FieldType::Int => value.as_i64().is_some() || value.as_u64().is_some(),
            FieldType::Float => value.is_number(),
            FieldType::Bool => value.is_boolean(),
            _ => true,
        };
        if !type_ok {
            self.add_lint(
                node,
                LintKind::InvalidType,
                format!("expected {} value, got {}", spec.field_type.name(), value),
            );
            return;
        }

        if !spec.options.is_empty()
            && let Some(text) = node.as_str()
            && !spec.options.iter().any(|o| o.eq_ignore_ascii_case(text))
        {
            self.add_lint(
                node,
                LintKind::InvalidOption,
                format!(
                    "value {text} is not a valid option for this field, expected one of: [{}]",
                    spec.options.join(", ")
                ),
            );
        }
    }

    fn lint_component(&mut self, ctype: ComponentType, node: &Node) {
        if node.is_null() {
            return;
        }

        let ctx = self.ctx;
        let provider = ctx.provider();
        let inference = match get_inference_candidate(provider, ctype, node) {
            Ok(inference) => inference,
            Err(err) => {
                self.add_lint_at(err.line(), 0, err.lint_kind(), err.to_string());
                return;
            }
        };

        if let Some((alias, line)) = &inference.alias {
            self.add_lint_at(
                *line,
                0,
                LintKind::Deprecated,
                format!(
                    "{ctype} type {alias} is deprecated, use {} instead",
                    inference.name
                ),
            );
        }
        if inference.spec.status == Status::Deprecated {
            self.add_lint(
                node,
                LintKind::Deprecated,
                format!("{ctype} type {} is deprecated", inference.name),
            );
        }

        let core_fields = ctype.core_fields();
        let mut payload_seen = false;
        for entry in node.as_mapping().unwrap_or_default() {
            if entry.key == "type" {
                continue;
            }
            if entry.key == "plugin" {
                payload_seen = true;
                self.lint_plugin(&inference.spec.config, entry);
                continue;
            }
            if let Some(core) = core_fields.iter().find(|f| f.name == entry.key) {
                self.lint_field(core, &entry.value);
                if entry.key == "label" {
                    self.lint_label(&entry.value);
                }
                continue;
            }
            match provider.canonical_name(&entry.key, ctype) {
                Some(name) if name == inference.name => {
                    let reported = inference
                        .alias
                        .as_ref()
                        .is_some_and(|(alias, _)| *alias == entry.key);
                    if entry.key != name && !reported {
                        self.add_entry_lint(
                            entry,
                            LintKind::Deprecated,
                            format!(
                                "{ctype} type {} is deprecated, use {name} instead",
                                entry.key
                            ),
                        );
                    }
                    payload_seen = true;
                    self.lint_plugin(&inference.spec.config, entry);
                }
                Some(_) => self.add_entry_lint(
                    entry,
                    LintKind::Unknown,
                    format!(
                        "field {} is invalid when the {ctype} type is {}",
                        entry.key, inference.name
                    ),
                ),
                None => self.lint_unknown_key(entry),
            }
        }

        // A plugin type named only by `type` still has to satisfy its schema.
        if inference.spec.plugin && !payload_seen {
            let empty = Node::mapping(Vec::new(), node.source_info.clone());
            self.lint_object(&inference.spec.config.children, &empty);
        }
    }

    fn lint_plugin(&mut self, config: &FieldSpec, entry: &MappingEntry) {
        self.lint_object(&config.children, &entry.value);
    }

    fn lint_label(&mut self, node: &Node) {
        let Some(label) = node.as_str().filter(|l| !l.is_empty()) else {
            return;
        };
        if !LABEL_RE.is_match(label) || label.starts_with('_') {
            self.add_lint(
                node,
                LintKind::BadLabel,
                format!(
                    "invalid label {label}: labels must match the regular expression {} and must not start with an underscore",
                    LABEL_RE.as_str()
                ),
            );
            return;
        }
        match self.labels.get(label) {
            Some(first) => {
                let message =
                    format!("label {label} collides with a previously defined label at line {first}");
                self.add_lint(node, LintKind::DuplicateLabel, message);
            }
            None => {
                self.labels.insert(label.to_string(), node.line());
            }
        }
    }
}
