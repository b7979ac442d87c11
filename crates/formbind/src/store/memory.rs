use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use formbind_path::{split_storage_path, trim_leading_slash};
use futures::future::{self, LocalBoxFuture};
use futures::FutureExt;
use serde_json::{Map, Value};
use tracing::debug;

use super::{Listener, RecordStore, StoreError, Subscription};

/// One operation seen by a [`MemoryStore`], path without leading slash.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreOp {
    Read(String),
    Set(String, Value),
    Remove(String),
}

struct Watch {
    path: Vec<String>,
    last: Option<Value>,
    listener: Rc<RefCell<Listener>>,
}

#[derive(Default)]
struct Inner {
    root: RefCell<Value>,
    watches: RefCell<BTreeMap<u64, Watch>>,
    next_watch_id: Cell<u64>,
    journal: RefCell<Vec<StoreOp>>,
    failure: RefCell<Option<(Vec<String>, StoreError)>>,
}

/// In-process record store.
///
/// Clones share the same data. Listeners fire synchronously after each
/// write whose effect on their path changed the value.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Rc<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(root: Value) -> Self {
        let store = Self::new();
        *store.inner.root.borrow_mut() = root;
        store
    }

    /// Current value at `path`, without touching the journal.
    pub fn get(&self, path: &str) -> Option<Value> {
        value_at(&self.inner.root.borrow(), &segments(path)).cloned()
    }

    pub fn snapshot(&self) -> Value {
        self.inner.root.borrow().clone()
    }

    pub fn journal(&self) -> Vec<StoreOp> {
        self.inner.journal.borrow().clone()
    }

    pub fn clear_journal(&self) {
        self.inner.journal.borrow_mut().clear();
    }

    /// Makes every following operation fail with `error` until cleared.
    pub fn fail_with(&self, error: Option<StoreError>) {
        *self.inner.failure.borrow_mut() = error.map(|err| (Vec::new(), err));
    }

    /// Makes operations at or below `prefix` fail with `error` until cleared
    /// with [`MemoryStore::fail_with`]`(None)`.
    pub fn fail_under(&self, prefix: &str, error: StoreError) {
        *self.inner.failure.borrow_mut() = Some((segments(prefix), error));
    }

    pub fn listener_count(&self) -> usize {
        self.inner.watches.borrow().len()
    }

    fn check(&self, path: &str) -> Result<(), StoreError> {
        match &*self.inner.failure.borrow() {
            Some((prefix, err)) if segments(path).starts_with(prefix) => Err(err.clone()),
            _ => Ok(()),
        }
    }

    fn record(&self, op: StoreOp) {
        debug!(?op, "memory store");
        self.inner.journal.borrow_mut().push(op);
    }

    fn write(&self, path: &str, value: Option<Value>) {
        {
            let mut root = self.inner.root.borrow_mut();
            let steps = segments(path);
            match value {
                Some(v) if !v.is_null() => put(&mut root, &steps, v),
                _ => delete(&mut root, &steps),
            }
        }
        self.notify();
    }

    /// Delivers the new value to every watch whose view changed.
    fn notify(&self) {
        let pending: Vec<_> = {
            let root = self.inner.root.borrow();
            let mut watches = self.inner.watches.borrow_mut();
            watches
                .values_mut()
                .filter_map(|watch| {
                    let now = value_at(&root, &watch.path).cloned();
                    if now == watch.last {
                        return None;
                    }
                    watch.last = now.clone();
                    Some((Rc::clone(&watch.listener), now))
                })
                .collect()
        };
        for (listener, value) in pending {
            (listener.borrow_mut())(value);
        }
    }
}

impl RecordStore for MemoryStore {
    fn read<'a>(&'a self, path: &'a str) -> LocalBoxFuture<'a, Result<Option<Value>, StoreError>> {
        let result = self.check(path).map(|()| {
            self.record(StoreOp::Read(trim_leading_slash(path).to_string()));
            self.get(path)
        });
        future::ready(result).boxed_local()
    }

    fn set<'a>(&'a self, path: &'a str, value: Value) -> LocalBoxFuture<'a, Result<(), StoreError>> {
        let result = self.check(path).map(|()| {
            self.record(StoreOp::Set(trim_leading_slash(path).to_string(), value.clone()));
            self.write(path, Some(value));
        });
        future::ready(result).boxed_local()
    }

    fn remove<'a>(&'a self, path: &'a str) -> LocalBoxFuture<'a, Result<(), StoreError>> {
        let result = self.check(path).map(|()| {
            self.record(StoreOp::Remove(trim_leading_slash(path).to_string()));
            self.write(path, None);
        });
        future::ready(result).boxed_local()
    }

    fn subscribe(&self, path: &str, listener: Listener) -> Subscription {
        let steps = segments(path);
        let current = value_at(&self.inner.root.borrow(), &steps).cloned();
        let listener = Rc::new(RefCell::new(listener));

        let id = self.inner.next_watch_id.get();
        self.inner.next_watch_id.set(id.saturating_add(1));
        self.inner.watches.borrow_mut().insert(
            id,
            Watch {
                path: steps,
                last: current.clone(),
                listener: Rc::clone(&listener),
            },
        );
        debug!(id, path, "memory store subscribe");
        (listener.borrow_mut())(current);

        let weak: Weak<Inner> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.watches.borrow_mut().remove(&id);
                debug!(id, "memory store unsubscribe");
            }
        })
    }
}

fn segments(path: &str) -> Vec<String> {
    split_storage_path(path)
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn value_at<'a>(root: &'a Value, path: &[String]) -> Option<&'a Value> {
    let mut cur = root;
    for step in path {
        cur = match cur {
            Value::Object(map) => map.get(step)?,
            Value::Array(arr) => arr.get(step.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    if cur.is_null() {
        None
    } else {
        Some(cur)
    }
}

fn put(root: &mut Value, path: &[String], value: Value) {
    let mut cur = root;
    for step in path {
        if !cur.is_object() {
            *cur = Value::Object(Map::new());
        }
        let Value::Object(map) = cur else {
            return;
        };
        cur = map.entry(step.clone()).or_insert(Value::Null);
    }
    *cur = value;
}

/// Removes the value at `path`, pruning parents left empty.
fn delete(root: &mut Value, path: &[String]) {
    let Some((leaf, parents)) = path.split_last() else {
        *root = Value::Null;
        return;
    };
    if let Some(Value::Object(map)) = value_at_mut(root, parents) {
        map.remove(leaf);
        if map.is_empty() && !parents.is_empty() {
            delete(root, parents);
        }
    }
}

fn value_at_mut<'a>(root: &'a mut Value, path: &[String]) -> Option<&'a mut Value> {
    let mut cur = root;
    for step in path {
        cur = match cur {
            Value::Object(map) => map.get_mut(step)?,
            _ => return None,
        };
    }
    Some(cur)
}
