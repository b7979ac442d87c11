use indexmap::IndexMap;
use serde_json::Value;

use super::{FieldAdapter, FieldDef, FieldKind, FieldProps};
use crate::node::{Tag, UiElement, UiNode};

/// Sub-fields of the composite image field and their defaults.
/// Keyed `name:sub`, never dotted, so they sit beside the main value on write.
const IMAGE_SUBFIELDS: [(&str, i64); 2] = [("width", 0), ("height", 0)];

/// Adapter for every [`FieldKind`].
#[derive(Debug, Clone)]
pub struct BuiltinField {
    kind: FieldKind,
    def: FieldDef,
}

impl BuiltinField {
    pub fn new(kind: FieldKind, def: FieldDef) -> Self {
        Self { kind, def }
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    fn input_type(&self) -> Option<&'static str> {
        match self.kind {
            FieldKind::String => Some("text"),
            FieldKind::Email => Some("email"),
            FieldKind::Password => Some("password"),
            FieldKind::Number => Some("number"),
            FieldKind::Checkbox => Some("checkbox"),
            FieldKind::Date => Some("date"),
            FieldKind::Upload => Some("file"),
            FieldKind::Textarea | FieldKind::Select | FieldKind::Image => None,
        }
    }

    fn own_default(&self) -> Value {
        if let Some(v) = &self.def.default {
            return v.clone();
        }
        match (self.kind, self.def.options.first()) {
            (FieldKind::Select, Some(first)) => Value::String(first.value.clone()),
            _ => self.kind.default_value(),
        }
    }
}

impl FieldAdapter for BuiltinField {
    fn get_defaults(&self, name: &str) -> IndexMap<String, Value> {
        let mut defaults = IndexMap::new();
        defaults.insert(name.to_string(), self.own_default());
        if self.kind == FieldKind::Image {
            defaults.insert(format!("{name}:alt"), Value::String(String::new()));
            for (sub, default) in IMAGE_SUBFIELDS {
                defaults.insert(format!("{name}:{sub}"), Value::from(default));
            }
        }
        defaults
    }

    fn render(&self, props: &FieldProps) -> UiNode {
        let mut el = UiElement::new(Tag::named(self.kind.tag())).name(&props.name);
        el.props.label = props.label.clone().or_else(|| self.def.label.clone());
        el.props.value = props.value.clone();
        el.props.default_value = Some(self.own_default());
        el.props.on_change = props.on_change.clone();
        el.props.wrap_class = props.wrap_class.clone().or_else(|| self.def.wrap_class.clone());
        if let Some(ty) = self.input_type() {
            el = el.attr("type", ty);
        }
        match self.kind {
            FieldKind::Select => {
                let options = self.def.options.iter().map(|opt| {
                    UiNode::from(
                        UiNode::element("option")
                            .attr("value", opt.value.clone())
                            .child(opt.label.as_deref().unwrap_or(&opt.value)),
                    )
                });
                el = el.children(options);
            }
            FieldKind::Image => {
                let subfields = std::iter::once("alt")
                    .chain(IMAGE_SUBFIELDS.iter().map(|(sub, _)| *sub))
                    .map(|sub| UiNode::text(format!("{}:{sub}", props.name)));
                el = el.children(subfields);
            }
            _ => {}
        }
        el.into()
    }
}
