//! Record store contract.
//!
//! The store is an external keyed document store addressed by slash paths.
//! Every operation is asynchronous; subscriptions deliver the latest value
//! at a path, first immediately and then on each change.

use futures::future::LocalBoxFuture;
use serde_json::Value;
use thiserror::Error;

mod memory;

pub use memory::{MemoryStore, StoreOp};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("permission denied at {0:?}")]
    PermissionDenied(String),
    #[error("invalid path {0:?}")]
    InvalidPath(String),
}

/// Receives the value at a subscribed path (`None` when nothing is stored).
pub type Listener = Box<dyn FnMut(Option<Value>)>;

pub trait RecordStore {
    fn read<'a>(&'a self, path: &'a str) -> LocalBoxFuture<'a, Result<Option<Value>, StoreError>>;

    fn set<'a>(&'a self, path: &'a str, value: Value) -> LocalBoxFuture<'a, Result<(), StoreError>>;

    fn remove<'a>(&'a self, path: &'a str) -> LocalBoxFuture<'a, Result<(), StoreError>>;

    fn subscribe(&self, path: &str, listener: Listener) -> Subscription;
}

/// Handle of an active subscription.
///
/// Unsubscribes exactly once: on [`Subscription::unsubscribe`] or on drop,
/// whichever comes first.
#[must_use = "dropping a subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new<F>(cancel: F) -> Self
    where
        F: FnOnce() + 'static,
    {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A subscription with nothing to tear down.
    pub fn empty() -> Self {
        Self { cancel: None }
    }

    pub fn is_active(&self) -> bool {
        self.cancel.is_some()
    }

    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}
