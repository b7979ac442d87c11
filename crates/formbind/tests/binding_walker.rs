use std::cell::RefCell;
use std::rc::Rc;

use formbind::node::{find_all_named, find_named};
use formbind::registry::render_template;
use formbind::walker::collect_bindings;
use formbind::{
    BindScope, BindingWarning, ChangeEvent, ChangeHandler, FieldDef, FieldRegistry, UiNode, Walker,
};
use proptest::prelude::*;
use serde_json::{json, Value};

fn recorder(log: &Rc<RefCell<Vec<String>>>, tag: &'static str) -> ChangeHandler {
    let log = Rc::clone(log);
    ChangeHandler::new(move |ev: &ChangeEvent| log.borrow_mut().push(format!("{tag}:{}", ev.name)))
}

#[test]
fn test_value_precedence_record_then_value_then_default() {
    let registry = FieldRegistry::with_builtins();
    let record = json!({"a": "from-record", "n": null});
    let tree = vec![
        UiNode::element("String").name("a").value("declared").into(),
        UiNode::element("String").name("b").value("declared").default_value("dflt").into(),
        UiNode::element("String").name("c").default_value("dflt").into(),
        UiNode::element("String").name("n").default_value("dflt").into(),
        UiNode::element("String").name("missing").into(),
    ];
    let mut walker = Walker::new(&registry);
    let out = walker.walk(tree, &BindScope::new(Some(&record)));

    let values: Vec<_> = collect_bindings(&out);
    assert_eq!(
        values,
        vec![
            ("a".to_string(), Some(json!("from-record"))),
            ("b".to_string(), Some(json!("declared"))),
            ("c".to_string(), Some(json!("dflt"))),
            ("n".to_string(), Some(json!("dflt"))),
            ("missing".to_string(), None),
        ]
    );
    assert_eq!(
        walker.warnings(),
        &[BindingWarning::Unresolved {
            name: "missing".into()
        }]
    );
}

#[test]
fn test_binding_does_not_touch_the_input_record() {
    let registry = FieldRegistry::with_builtins();
    let record = json!({"title": "x"});
    let before = record.clone();
    let _ = formbind::walk(
        vec![UiNode::element("String").name("title").into()],
        &BindScope::new(Some(&record)),
        &registry,
    );
    assert_eq!(record, before);
}

#[test]
fn test_rows_are_bound_against_their_own_item() {
    let registry = FieldRegistry::with_builtins();
    let template: Vec<UiNode> = vec![
        UiNode::element("String").name("title").into(),
        UiNode::element("Number").name("qty").default_value(0).into(),
    ];
    let rows = vec![
        json!({"title": "first", "qty": 1}),
        json!({"title": "second"}),
    ];
    let mut walker = Walker::new(&registry);
    let bound = walker.walk_rows(&template, &rows, &BindScope::new(None));

    assert_eq!(bound.len(), 2);
    assert_eq!(
        find_named(&bound[0], "title").and_then(|el| el.props.value.clone()),
        Some(json!("first"))
    );
    assert_eq!(
        find_named(&bound[1], "title").and_then(|el| el.props.value.clone()),
        Some(json!("second"))
    );
    // no qty in row two: its own default, never row one's value
    assert_eq!(
        find_named(&bound[1], "qty").and_then(|el| el.props.value.clone()),
        Some(json!(0))
    );
}

#[test]
fn test_primitive_rows_bind_the_item_itself() {
    let registry = FieldRegistry::with_builtins();
    let template: Vec<UiNode> = vec![UiNode::element("String").name("tag").into()];
    let rows = vec![json!("red"), json!("blue")];
    let bound = Walker::new(&registry).walk_rows(&template, &rows, &BindScope::new(None));
    let values: Vec<Option<Value>> = bound
        .iter()
        .map(|row| find_named(row, "tag").and_then(|el| el.props.value.clone()))
        .collect();
    assert_eq!(values, vec![Some(json!("red")), Some(json!("blue"))]);
}

#[test]
fn test_nested_scope_prefixes_names() {
    let registry = FieldRegistry::with_builtins();
    let record = json!({"address": {"city": "Oslo"}});
    let scope = BindScope::new(Some(&record));
    let out = formbind::walk(
        vec![UiNode::element("String").name("city").into()],
        &scope.nested("address"),
        &registry,
    );
    let el = find_named(&out, "address.city").unwrap();
    assert_eq!(el.props.value, Some(json!("Oslo")));
}

#[test]
fn test_own_handler_runs_before_inherited() {
    let registry = FieldRegistry::with_builtins();
    let log = Rc::new(RefCell::new(Vec::new()));
    let tree = vec![UiNode::element("String")
        .name("title")
        .on_change(recorder(&log, "own"))
        .into()];
    let scope = BindScope::new(None).with_handler(recorder(&log, "scope"));
    let out = formbind::walk(tree, &scope, &registry);

    let handler = find_named(&out, "title")
        .and_then(|el| el.props.on_change.clone())
        .unwrap();
    handler.call(&ChangeEvent::new("title", "x"));
    assert_eq!(*log.borrow(), vec!["own:title", "scope:title"]);
}

#[test]
fn test_containers_are_descended_and_wrap_classes_merge() {
    let registry = FieldRegistry::with_builtins();
    let record = json!({"email": "a@x.com"});
    let tree = vec![UiNode::element("div")
        .wrap_class("row")
        .child(UiNode::element("section").child(UiNode::element("Email").name("email")))
        .child(UiNode::element("hr"))
        .into()];
    let scope = BindScope::new(Some(&record)).with_wrap_class("form-group");
    let out = formbind::walk(tree, &scope, &registry);

    let email = find_named(&out, "email").unwrap();
    assert_eq!(email.props.value, Some(json!("a@x.com")));
    assert_eq!(email.props.wrap_class.as_deref(), Some("form-group row"));

    let hr = out[0]
        .descendants()
        .filter_map(UiNode::as_element)
        .find(|el| el.tag.as_str() == Some("hr"))
        .unwrap();
    assert_eq!(hr.props.class_name.as_deref(), Some("form-group row"));
    assert!(hr.props.on_change.is_none());
}

#[test]
fn test_named_leaf_is_bound_implicitly() {
    let registry = FieldRegistry::with_builtins();
    let record = json!({"title": "Hello"});
    let log = Rc::new(RefCell::new(Vec::new()));
    let out = formbind::walk(
        vec![UiNode::element("span").name("title").into()],
        &BindScope::new(Some(&record)).with_handler(recorder(&log, "scope")),
        &registry,
    );
    let span = find_named(&out, "title").unwrap();
    assert_eq!(span.props.value, Some(json!("Hello")));
    span.props
        .on_change
        .as_ref()
        .unwrap()
        .call(&ChangeEvent::new("title", "x"));
    assert_eq!(*log.borrow(), vec!["scope:title"]);
}

#[test]
fn test_unknown_template_tag_is_skipped() {
    let registry = FieldRegistry::with_builtins();
    let record = json!({"title": "T", "body": "B"});
    let defs = vec![
        FieldDef::new("String", "title"),
        FieldDef::new("doesNotExist", "ghost"),
        FieldDef::new("Textarea", "body"),
    ];
    let rendered = render_template(&defs, &BindScope::new(Some(&record)), &registry);

    assert_eq!(rendered.nodes.len(), 2);
    assert!(find_all_named(&rendered.nodes, "ghost").is_empty());
    assert_eq!(
        find_named(&rendered.nodes, "body").and_then(|el| el.props.value.clone()),
        Some(json!("B"))
    );
    assert_eq!(
        rendered.warnings,
        vec![BindingWarning::UnknownTag {
            tag: "doesNotExist".into(),
            name: "ghost".into()
        }]
    );
}

#[test]
fn test_custom_field_registration_makes_tag_form_capable() {
    use formbind::registry::BuiltinField;
    use formbind::{FieldKind, Tag};

    let mut registry = FieldRegistry::new();
    assert!(!registry.is_form_capable(&Tag::named("Rating")));
    registry.register("Rating", |def| {
        Box::new(BuiltinField::new(FieldKind::Number, def.clone()))
    });
    assert!(registry.is_form_capable(&Tag::named("Rating")));
    assert!(!registry.is_form_capable(&Tag::Fragment));

    let record = json!({"stars": 4});
    let out = formbind::walk(
        vec![UiNode::element("Rating").name("stars").into()],
        &BindScope::new(Some(&record)),
        &registry,
    );
    assert_eq!(
        find_named(&out, "stars").and_then(|el| el.props.value.clone()),
        Some(json!(4))
    );
}

proptest! {
    #[test]
    fn prop_each_row_sees_only_its_own_value(titles in prop::collection::vec("[a-z]{0,8}", 0..12)) {
        let registry = FieldRegistry::with_builtins();
        let template: Vec<UiNode> = vec![UiNode::element("String").name("title").into()];
        let rows: Vec<Value> = titles.iter().map(|t| json!({"title": t})).collect();
        let bound = Walker::new(&registry).walk_rows(&template, &rows, &BindScope::new(None));
        prop_assert_eq!(bound.len(), titles.len());
        for (row, title) in bound.iter().zip(&titles) {
            let value = find_named(row, "title").and_then(|el| el.props.value.clone());
            prop_assert_eq!(value, Some(json!(title)));
        }
    }
}
