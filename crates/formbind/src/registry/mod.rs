//! Field registry: which tags are form fields and how to build them.
//!
//! A tag is form-capable exactly when a factory is registered for it. The
//! walker asks [`FieldRegistry::is_form_capable`]; the template renderer asks
//! [`FieldRegistry::create`] for a [`FieldAdapter`].

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::event::ChangeHandler;
use crate::node::{Tag, UiNode};

mod builtin;
mod template;

pub use builtin::BuiltinField;
pub use template::{render_template, RenderedTemplate};

/// Built-in field kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    String,
    Email,
    Password,
    Number,
    Textarea,
    Checkbox,
    Select,
    Date,
    Upload,
    /// Composite: url plus `alt`, `width` and `height` sub-fields.
    Image,
}

impl FieldKind {
    pub const ALL: [FieldKind; 10] = [
        FieldKind::String,
        FieldKind::Email,
        FieldKind::Password,
        FieldKind::Number,
        FieldKind::Textarea,
        FieldKind::Checkbox,
        FieldKind::Select,
        FieldKind::Date,
        FieldKind::Upload,
        FieldKind::Image,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            FieldKind::String => "String",
            FieldKind::Email => "Email",
            FieldKind::Password => "Password",
            FieldKind::Number => "Number",
            FieldKind::Textarea => "Textarea",
            FieldKind::Checkbox => "Checkbox",
            FieldKind::Select => "Select",
            FieldKind::Date => "Date",
            FieldKind::Upload => "Upload",
            FieldKind::Image => "Image",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.tag() == tag)
    }

    /// Value a fresh record gets for a field of this kind.
    pub fn default_value(self) -> Value {
        match self {
            FieldKind::Number => Value::from(0),
            FieldKind::Checkbox => Value::Bool(false),
            FieldKind::Upload => Value::Null,
            _ => Value::String(String::new()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    #[serde(default)]
    pub label: Option<String>,
}

/// Declarative description of one field, as found in templates.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldDef {
    pub tag: String,
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub default: Option<Value>,
    #[serde(default)]
    pub options: Vec<SelectOption>,
    #[serde(default)]
    pub wrap_class: Option<String>,
}

impl FieldDef {
    pub fn new(tag: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            name: name.into(),
            ..Default::default()
        }
    }
}

/// What an adapter receives when asked to render.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldProps {
    pub name: String,
    pub label: Option<String>,
    pub value: Option<Value>,
    pub on_change: Option<ChangeHandler>,
    pub wrap_class: Option<String>,
}

pub trait FieldAdapter {
    /// Default values keyed by the (possibly derived) field names.
    fn get_defaults(&self, name: &str) -> IndexMap<String, Value>;

    /// Builds the field's node, pre-wired with the given props.
    fn render(&self, props: &FieldProps) -> UiNode;
}

pub type FieldFactory = Box<dyn Fn(&FieldDef) -> Box<dyn FieldAdapter>>;

#[derive(Default)]
pub struct FieldRegistry {
    factories: IndexMap<String, FieldFactory>,
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every [`FieldKind`] registered under its tag.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for kind in FieldKind::ALL {
            registry.register(kind.tag(), move |def| {
                Box::new(BuiltinField::new(kind, def.clone()))
            });
        }
        registry
    }

    /// Registers (or replaces) the factory for `tag`.
    pub fn register<F>(&mut self, tag: impl Into<String>, factory: F)
    where
        F: Fn(&FieldDef) -> Box<dyn FieldAdapter> + 'static,
    {
        self.factories.insert(tag.into(), Box::new(factory));
    }

    pub fn is_form_capable(&self, tag: &Tag) -> bool {
        tag.as_str().is_some_and(|t| self.factories.contains_key(t))
    }

    /// Builds the adapter for `tag`, or `None` when nothing is registered.
    pub fn create(&self, tag: &str, def: &FieldDef) -> Option<Box<dyn FieldAdapter>> {
        self.factories.get(tag).map(|factory| factory(def))
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}
