use indexmap::IndexMap;
use serde_json::Value;

use super::{FieldDef, FieldProps, FieldRegistry};
use crate::node::UiNode;
use crate::walker::{BindScope, BindingWarning, Walker};

/// Output of [`render_template`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderedTemplate {
    pub nodes: Vec<UiNode>,
    pub defaults: IndexMap<String, Value>,
    pub warnings: Vec<BindingWarning>,
}

/// Builds bound field nodes from a list of field definitions.
///
/// Each definition is turned into a node by its registered adapter, then the
/// whole list is bound against `scope`. Definitions with an unknown tag are
/// skipped with a warning; the rest are still rendered.
pub fn render_template(
    defs: &[FieldDef],
    scope: &BindScope<'_>,
    registry: &FieldRegistry,
) -> RenderedTemplate {
    let mut walker = Walker::new(registry);
    let mut defaults = IndexMap::new();
    let mut nodes = Vec::with_capacity(defs.len());

    for def in defs {
        let Some(adapter) = registry.create(&def.tag, def) else {
            walker.warn(BindingWarning::UnknownTag {
                tag: def.tag.clone(),
                name: def.name.clone(),
            });
            continue;
        };
        defaults.extend(adapter.get_defaults(&def.name));
        nodes.push(adapter.render(&FieldProps {
            name: def.name.clone(),
            label: def.label.clone(),
            value: None,
            on_change: None,
            wrap_class: def.wrap_class.clone(),
        }));
    }

    let nodes = walker.walk(nodes, scope);
    RenderedTemplate {
        nodes,
        defaults,
        warnings: walker.into_warnings(),
    }
}
