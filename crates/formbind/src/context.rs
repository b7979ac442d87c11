//! Application context handed to every session.
//!
//! Holds what a form needs from its surroundings: the record store, the
//! field registry, configuration, the signed-in user and the current
//! navigation location. Cloning is cheap and clones share state.

use std::cell::RefCell;
use std::rc::Rc;

use formbind_path::trim_leading_slash;

use crate::config::FormConfig;
use crate::registry::FieldRegistry;
use crate::store::RecordStore;

struct ContextInner {
    store: Rc<dyn RecordStore>,
    registry: FieldRegistry,
    config: FormConfig,
    user: RefCell<Option<String>>,
    location: RefCell<Option<String>>,
}

#[derive(Clone)]
pub struct AppContext {
    inner: Rc<ContextInner>,
}

impl AppContext {
    /// Context with the built-in field registry.
    pub fn new(store: Rc<dyn RecordStore>, config: FormConfig) -> Self {
        Self::with_registry(store, config, FieldRegistry::with_builtins())
    }

    pub fn with_registry(
        store: Rc<dyn RecordStore>,
        config: FormConfig,
        registry: FieldRegistry,
    ) -> Self {
        Self {
            inner: Rc::new(ContextInner {
                store,
                registry,
                config,
                user: RefCell::new(None),
                location: RefCell::new(None),
            }),
        }
    }

    pub fn store(&self) -> &dyn RecordStore {
        self.inner.store.as_ref()
    }

    pub fn registry(&self) -> &FieldRegistry {
        &self.inner.registry
    }

    pub fn config(&self) -> &FormConfig {
        &self.inner.config
    }

    pub fn user(&self) -> Option<String> {
        self.inner.user.borrow().clone()
    }

    pub fn sign_in(&self, user: impl Into<String>) {
        *self.inner.user.borrow_mut() = Some(user.into());
    }

    pub fn sign_out(&self) {
        *self.inner.user.borrow_mut() = None;
    }

    /// Current location as a storage path (leading slash stripped).
    pub fn location(&self) -> Option<String> {
        self.inner.location.borrow().clone()
    }

    pub fn navigate(&self, location: &str) {
        *self.inner.location.borrow_mut() = Some(trim_leading_slash(location).to_string());
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("config", &self.inner.config)
            .field("user", &self.inner.user.borrow())
            .field("location", &self.inner.location.borrow())
            .finish_non_exhaustive()
    }
}
