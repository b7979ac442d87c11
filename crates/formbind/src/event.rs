use std::fmt;
use std::rc::Rc;

use serde_json::Value;

/// A field edit: the bound name of the field and its new value.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    pub name: String,
    pub value: Value,
}

impl ChangeEvent {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A shareable change callback.
///
/// Handlers are infallible; composition with [`ChangeHandler::then`] always
/// runs both sides in order.
#[derive(Clone)]
pub struct ChangeHandler(Rc<dyn Fn(&ChangeEvent)>);

impl ChangeHandler {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&ChangeEvent) + 'static,
    {
        Self(Rc::new(f))
    }

    pub fn call(&self, event: &ChangeEvent) {
        (self.0)(event)
    }

    /// Returns a handler that runs `self` and then `next`.
    pub fn then(&self, next: &ChangeHandler) -> ChangeHandler {
        let first = Rc::clone(&self.0);
        let second = Rc::clone(&next.0);
        ChangeHandler::new(move |ev| {
            first(ev);
            second(ev);
        })
    }
}

impl PartialEq for ChangeHandler {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ChangeHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ChangeHandler")
    }
}

/// Combines a node's own handler with the one it inherits.
pub(crate) fn compose(
    own: Option<ChangeHandler>,
    inherited: Option<ChangeHandler>,
) -> Option<ChangeHandler> {
    match (own, inherited) {
        (Some(own), Some(inherited)) => Some(own.then(&inherited)),
        (own, inherited) => own.or(inherited),
    }
}
