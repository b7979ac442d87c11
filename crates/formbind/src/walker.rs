//! Field-binding walker.
//!
//! Rewrites a UI tree so that every form field carries the `name`, `value`
//! and `on_change` computed from the enclosing record scope. Structure and
//! ordering of the tree are preserved. Missing data never fails the walk: it
//! degrades to an absent value and a [`BindingWarning`].

use std::fmt;

use formbind_path::{get_value_by_path, join_dotted};
use serde_json::Value;
use tracing::warn;

use crate::event::{compose, ChangeHandler};
use crate::node::{UiElement, UiNode};
use crate::registry::FieldRegistry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingWarning {
    /// Neither the record nor the node provide a value.
    Unresolved { name: String },
    /// A form field without a declared name.
    Unnamed { tag: String },
    /// A template entry whose tag has no registered factory.
    UnknownTag { tag: String, name: String },
}

impl fmt::Display for BindingWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingWarning::Unresolved { name } => write!(f, "no value for field {name:?}"),
            BindingWarning::Unnamed { tag } => write!(f, "form field <{tag}> has no name"),
            BindingWarning::UnknownTag { tag, name } => {
                write!(f, "unknown field tag {tag:?} for {name:?}, skipped")
            }
        }
    }
}

/// What a subtree is bound against.
#[derive(Debug, Clone, Default)]
pub struct BindScope<'a> {
    pub record: Option<&'a Value>,
    pub handle_change: Option<ChangeHandler>,
    pub parent_name: String,
    pub wrap_class: Option<String>,
    pub storage_path: Option<String>,
}

impl<'a> BindScope<'a> {
    pub fn new(record: Option<&'a Value>) -> Self {
        Self {
            record,
            ..Default::default()
        }
    }

    pub fn with_handler(mut self, handler: ChangeHandler) -> Self {
        self.handle_change = Some(handler);
        self
    }

    pub fn with_wrap_class(mut self, class: impl Into<String>) -> Self {
        self.wrap_class = Some(class.into());
        self
    }

    pub fn with_storage_path(mut self, path: impl Into<String>) -> Self {
        self.storage_path = Some(path.into());
        self
    }

    /// Explicit grouping boundary: fields below are looked up in
    /// `record[name]` and named `parent.name.field`.
    pub fn nested(&self, name: &str) -> BindScope<'a> {
        BindScope {
            record: self.record.and_then(|r| get_value_by_path(r, name)),
            parent_name: join_dotted(&self.parent_name, name),
            ..self.clone()
        }
    }

    /// Repeated row: same names, looked up in `item`.
    pub fn row(&self, item: &'a Value) -> BindScope<'a> {
        BindScope {
            record: Some(item),
            ..self.clone()
        }
    }

    fn merged_wrap(&self, own: Option<&str>) -> Option<String> {
        merge_classes(self.wrap_class.as_deref(), own)
    }
}

pub struct Walker<'r> {
    registry: &'r FieldRegistry,
    warnings: Vec<BindingWarning>,
}

impl<'r> Walker<'r> {
    pub fn new(registry: &'r FieldRegistry) -> Self {
        Self {
            registry,
            warnings: Vec::new(),
        }
    }

    pub fn warnings(&self) -> &[BindingWarning] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<BindingWarning> {
        self.warnings
    }

    pub(crate) fn warn(&mut self, warning: BindingWarning) {
        warn!(%warning, "binding");
        self.warnings.push(warning);
    }

    /// Binds every node in `children`, in order.
    pub fn walk(&mut self, children: Vec<UiNode>, scope: &BindScope<'_>) -> Vec<UiNode> {
        children
            .into_iter()
            .map(|child| self.walk_node(child, scope))
            .collect()
    }

    /// Binds one copy of `template` per row of `rows`.
    pub fn walk_rows<'s>(
        &mut self,
        template: &[UiNode],
        rows: &'s [Value],
        scope: &BindScope<'s>,
    ) -> Vec<Vec<UiNode>> {
        rows.iter()
            .map(|row| self.walk(template.to_vec(), &scope.row(row)))
            .collect()
    }

    pub fn walk_node(&mut self, node: UiNode, scope: &BindScope<'_>) -> UiNode {
        let UiNode::Element(mut el) = node else {
            return node;
        };
        let declared_handler = el.props.on_change.is_some();
        let on_change = compose(el.props.on_change.clone(), scope.handle_change.clone());

        if self.registry.is_form_capable(&el.tag) {
            self.bind_field(&mut el, on_change, scope);
        } else if !el.children.is_empty() {
            let inner = BindScope {
                wrap_class: scope.merged_wrap(el.props.wrap_class.as_deref()),
                ..scope.clone()
            };
            let children = std::mem::take(&mut el.children);
            el.children = self.walk(children, &inner);
        } else if el.props.name.is_some() {
            self.bind_implicit(&mut el, on_change, scope);
        } else {
            if declared_handler {
                el.props.on_change = on_change;
            }
            el.props.class_name = scope.merged_wrap(el.props.class_name.as_deref());
        }
        UiNode::Element(el)
    }

    fn bind_field(
        &mut self,
        el: &mut UiElement,
        on_change: Option<ChangeHandler>,
        scope: &BindScope<'_>,
    ) {
        let name = el.props.name.clone();
        if name.is_none() {
            self.warn(BindingWarning::Unnamed {
                tag: el.tag.as_str().unwrap_or_default().to_string(),
            });
        }
        let value = resolve_value(scope.record, name.as_deref(), el);
        let effective = name.as_deref().map(|n| join_dotted(&scope.parent_name, n));
        if value.is_none() {
            if let Some(n) = &effective {
                self.warn(BindingWarning::Unresolved { name: n.clone() });
            }
        }
        el.props.name = effective;
        el.props.value = value;
        el.props.on_change = on_change;
        el.props.wrap_class = scope.merged_wrap(el.props.wrap_class.as_deref());
        if el.props.storage_path.is_none() {
            el.props.storage_path = scope.storage_path.clone();
        }
    }

    /// A leaf carrying a name without being a registered field.
    fn bind_implicit(
        &mut self,
        el: &mut UiElement,
        on_change: Option<ChangeHandler>,
        scope: &BindScope<'_>,
    ) {
        let name = el.props.name.clone().unwrap_or_default();
        let value = resolve_value(scope.record, Some(name.as_str()), el);
        let effective = join_dotted(&scope.parent_name, &name);
        if value.is_none() {
            self.warn(BindingWarning::Unresolved {
                name: effective.clone(),
            });
        }
        el.props.name = Some(effective);
        el.props.value = value;
        el.props.on_change = on_change;
        el.props.class_name = scope.merged_wrap(el.props.class_name.as_deref());
    }
}

/// Record entry, then declared value, then declared default.
///
/// A record that is neither an object nor an array is the whole value of the
/// field (array-of-primitive rows). `null` counts as absent.
fn resolve_value(record: Option<&Value>, name: Option<&str>, el: &UiElement) -> Option<Value> {
    let from_record = match record {
        None | Some(Value::Null) => None,
        Some(r @ (Value::Object(_) | Value::Array(_))) => name
            .and_then(|n| get_value_by_path(r, n))
            .filter(|v| !v.is_null()),
        Some(primitive) => Some(primitive),
    };
    from_record
        .or(el.props.value.as_ref())
        .or(el.props.default_value.as_ref())
        .cloned()
}

fn merge_classes(inherited: Option<&str>, own: Option<&str>) -> Option<String> {
    let merged: Vec<&str> = [inherited, own]
        .into_iter()
        .flatten()
        .flat_map(str::split_whitespace)
        .collect();
    if merged.is_empty() {
        None
    } else {
        Some(merged.join(" "))
    }
}

/// Binds `children` against `record`, discarding warnings.
pub fn walk(
    children: Vec<UiNode>,
    scope: &BindScope<'_>,
    registry: &FieldRegistry,
) -> Vec<UiNode> {
    Walker::new(registry).walk(children, scope)
}

/// `(name, value)` of every named element, in document order.
pub fn collect_bindings(nodes: &[UiNode]) -> Vec<(String, Option<Value>)> {
    nodes
        .iter()
        .flat_map(UiNode::descendants)
        .filter_map(UiNode::as_element)
        .filter_map(|el| {
            el.props
                .name
                .clone()
                .map(|name| (name, el.props.value.clone()))
        })
        .collect()
}
