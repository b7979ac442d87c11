//! Headless UI tree.
//!
//! A [`UiNode`] is either a leaf (text, number, nothing) or an element: a
//! tag, its props and ordered children. Whether an element is a form field
//! is decided by the tag through the field registry, never by the node.

use serde_json::Value;

use crate::event::ChangeHandler;

// ── Types ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tag {
    /// Named component (e.g. `"div"`, `"String"`, `"Select"`)
    Named(String),
    /// Groups children without a wrapper
    Fragment,
}

impl Tag {
    pub fn named(name: impl Into<String>) -> Self {
        Tag::Named(name.into())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Tag::Named(s) => Some(s),
            Tag::Fragment => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiNode {
    Empty,
    Text(String),
    Number(f64),
    Element(UiElement),
}

/// Props understood by the binding walker. Anything else lives in `attrs`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Props {
    pub name: Option<String>,
    pub label: Option<String>,
    /// Declared or injected value.
    pub value: Option<Value>,
    pub default_value: Option<Value>,
    pub class_name: Option<String>,
    pub wrap_class: Option<String>,
    pub storage_path: Option<String>,
    pub on_change: Option<ChangeHandler>,
    pub attrs: Vec<(String, Value)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UiElement {
    pub tag: Tag,
    pub props: Props,
    pub children: Vec<UiNode>,
}

// ── Builders ───────────────────────────────────────────────────────────────

impl UiElement {
    pub fn new(tag: Tag) -> Self {
        Self {
            tag,
            props: Props::default(),
            children: Vec::new(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.props.name = Some(name.into());
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.props.label = Some(label.into());
        self
    }

    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.props.value = Some(value.into());
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.props.default_value = Some(value.into());
        self
    }

    pub fn class_name(mut self, class: impl Into<String>) -> Self {
        self.props.class_name = Some(class.into());
        self
    }

    pub fn wrap_class(mut self, class: impl Into<String>) -> Self {
        self.props.wrap_class = Some(class.into());
        self
    }

    pub fn storage_path(mut self, path: impl Into<String>) -> Self {
        self.props.storage_path = Some(path.into());
        self
    }

    pub fn on_change(mut self, handler: ChangeHandler) -> Self {
        self.props.on_change = Some(handler);
        self
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.attrs.push((key.into(), value.into()));
        self
    }

    pub fn child(mut self, child: impl Into<UiNode>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = UiNode>,
    {
        self.children.extend(children);
        self
    }

    pub fn get_attr(&self, key: &str) -> Option<&Value> {
        self.props
            .attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }
}

impl UiNode {
    pub fn element(tag: &str) -> UiElement {
        UiElement::new(Tag::named(tag))
    }

    pub fn fragment(children: Vec<UiNode>) -> UiNode {
        UiNode::Element(UiElement::new(Tag::Fragment).children(children))
    }

    pub fn text(s: impl Into<String>) -> UiNode {
        UiNode::Text(s.into())
    }

    pub fn as_element(&self) -> Option<&UiElement> {
        match self {
            UiNode::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Depth-first pre-order iterator over this node and its descendants.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }
}

impl From<UiElement> for UiNode {
    fn from(el: UiElement) -> Self {
        UiNode::Element(el)
    }
}

impl From<&str> for UiNode {
    fn from(s: &str) -> Self {
        UiNode::Text(s.to_owned())
    }
}

// ── Traversal ──────────────────────────────────────────────────────────────

pub struct Descendants<'a> {
    stack: Vec<&'a UiNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a UiNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        if let UiNode::Element(el) = node {
            // Reverse so the first child is popped first
            self.stack.extend(el.children.iter().rev());
        }
        Some(node)
    }
}

/// Finds the first element carrying `name` in a forest.
pub fn find_named<'a>(nodes: &'a [UiNode], name: &str) -> Option<&'a UiElement> {
    find_all_named(nodes, name).into_iter().next()
}

/// Collects every element carrying `name`, in document order.
pub fn find_all_named<'a>(nodes: &'a [UiNode], name: &str) -> Vec<&'a UiElement> {
    nodes
        .iter()
        .flat_map(UiNode::descendants)
        .filter_map(UiNode::as_element)
        .filter(|el| el.props.name.as_deref() == Some(name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builder_sets_props() {
        let el = UiNode::element("String")
            .name("title")
            .label("Title")
            .default_value("untitled")
            .attr("maxLength", 80);
        assert_eq!(el.props.name.as_deref(), Some("title"));
        assert_eq!(el.props.default_value, Some(json!("untitled")));
        assert_eq!(el.get_attr("maxLength"), Some(&json!(80)));
        assert_eq!(el.get_attr("missing"), None);
    }

    #[test]
    fn descendants_are_preorder() {
        let tree: UiNode = UiNode::element("div")
            .child("first")
            .child(UiNode::element("span").child("inner"))
            .child("last")
            .into();
        let texts: Vec<_> = tree
            .descendants()
            .filter_map(|n| match n {
                UiNode::Text(s) => Some(s.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(texts, vec!["first", "inner", "last"]);
        assert_eq!(tree.descendants().count(), 5);
    }

    #[test]
    fn find_named_in_forest() {
        let forest = vec![
            UiNode::text("x"),
            UiNode::element("div")
                .child(UiNode::element("String").name("a"))
                .into(),
            UiNode::element("String").name("a").into(),
        ];
        assert_eq!(find_all_named(&forest, "a").len(), 2);
        assert!(find_named(&forest, "b").is_none());
    }

    #[test]
    fn fragment_has_no_tag_name() {
        let UiNode::Element(el) = UiNode::fragment(vec![]) else {
            panic!("fragment must be an element");
        };
        assert_eq!(el.tag.as_str(), None);
    }
}
