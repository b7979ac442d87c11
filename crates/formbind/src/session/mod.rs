//! Record session: one editable record and its save/delete lifecycle.
//!
//! A session gets its record either from the caller (static) or from a
//! storage path it subscribes to. Every value delivered by the subscription
//! replaces the local record, unsaved edits included. Edits arrive as
//! [`ChangeEvent`]s and are merged at the top level under their literal
//! (possibly dotted) names; dotted names are expanded into nested objects
//! only when the record is written to the store.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use chrono::{SecondsFormat, Utc};
use formbind_path::{
    expand_dotted_keys, get_value_by_path, join_storage_path, normalize_key, trim_leading_slash,
    validate_storage_path, PathError,
};
use indexmap::IndexMap;
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::context::AppContext;
use crate::event::{ChangeEvent, ChangeHandler};
use crate::node::UiNode;
use crate::registry::{render_template, FieldDef, RenderedTemplate};
use crate::store::{StoreError, Subscription};
use crate::walker::{walk, BindScope};

mod notice;

pub use notice::{NoticeKind, Notification};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no record source: pass a storage path or a record, or navigate first")]
    NoRecordSource,
    #[error("invalid storage path: {0}")]
    InvalidPath(#[from] PathError),
    #[error("there is no record to save")]
    NoRecord,
    #[error("another operation is still pending")]
    Busy,
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Insert,
    Update,
    Delete,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Insert => "insert",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }

    fn success_message(self) -> &'static str {
        match self {
            Action::Insert => "Record created",
            Action::Update => "Record saved",
            Action::Delete => "Record deleted",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionOptions {
    /// Where the record lives; falls back to the context location when
    /// neither this nor `data_object` is given.
    pub storage_path: Option<String>,
    /// Caller-owned record; when present the session does not subscribe.
    pub data_object: Option<Value>,
    /// Append an audit entry after each completed action.
    pub log: bool,
    /// Show a success notification after each completed action.
    pub show_notice: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            storage_path: None,
            data_object: None,
            log: false,
            show_notice: true,
        }
    }
}

impl SessionOptions {
    pub fn at(path: impl Into<String>) -> Self {
        Self {
            storage_path: Some(path.into()),
            ..Default::default()
        }
    }

    pub fn with_record(record: Value) -> Self {
        Self {
            data_object: Some(record),
            ..Default::default()
        }
    }

    pub fn log(mut self, log: bool) -> Self {
        self.log = log;
        self
    }

    pub fn show_notice(mut self, show: bool) -> Self {
        self.show_notice = show;
        self
    }
}

pub type RecordHook = Box<dyn FnMut(&Value)>;
pub type FinallyHook = Box<dyn FnMut(Action, &Value)>;

/// Host callbacks. Each receives the record the action applied to.
#[derive(Default)]
pub struct SessionHooks {
    load: Option<RecordHook>,
    insert: Option<RecordHook>,
    update: Option<RecordHook>,
    delete: Option<RecordHook>,
    finally: Option<FinallyHook>,
}

impl SessionHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_load(mut self, f: impl FnMut(&Value) + 'static) -> Self {
        self.load = Some(Box::new(f));
        self
    }

    pub fn on_insert(mut self, f: impl FnMut(&Value) + 'static) -> Self {
        self.insert = Some(Box::new(f));
        self
    }

    pub fn on_update(mut self, f: impl FnMut(&Value) + 'static) -> Self {
        self.update = Some(Box::new(f));
        self
    }

    pub fn on_delete(mut self, f: impl FnMut(&Value) + 'static) -> Self {
        self.delete = Some(Box::new(f));
        self
    }

    pub fn on_finally(mut self, f: impl FnMut(Action, &Value) + 'static) -> Self {
        self.finally = Some(Box::new(f));
        self
    }
}

#[derive(Debug, Default)]
struct State {
    record: Option<Value>,
    existed: bool,
    notice: Option<Notification>,
    pending: bool,
    closed: bool,
}

struct Shared {
    state: RefCell<State>,
    hooks: RefCell<SessionHooks>,
}

impl Shared {
    fn with_hooks(&self, f: impl FnOnce(&mut SessionHooks)) {
        match self.hooks.try_borrow_mut() {
            Ok(mut hooks) => f(&mut hooks),
            Err(_) => debug!("session hook re-entered, skipped"),
        }
    }

    /// Full replacement from the store.
    fn replace(&self, value: Option<Value>) {
        {
            let mut st = self.state.borrow_mut();
            if st.closed {
                return;
            }
            st.existed = value.is_some();
            st.record = value.clone();
        }
        if let Some(record) = value {
            self.with_hooks(|h| {
                if let Some(cb) = h.load.as_mut() {
                    cb(&record)
                }
            });
        }
    }

    fn apply_change(&self, event: &ChangeEvent) {
        let mut st = self.state.borrow_mut();
        if st.closed {
            return;
        }
        let record = st
            .record
            .get_or_insert_with(|| Value::Object(Map::new()));
        if !record.is_object() {
            *record = Value::Object(Map::new());
        }
        if let Value::Object(map) = record {
            map.insert(event.name.clone(), event.value.clone());
        }
    }
}

pub struct RecordSession {
    ctx: AppContext,
    path: Option<String>,
    log: bool,
    show_notice: bool,
    shared: Rc<Shared>,
    subscription: Option<Subscription>,
}

impl RecordSession {
    /// Opens a session.
    ///
    /// # Errors
    ///
    /// - [`SessionError::NoRecordSource`] when there is neither a record, a
    ///   storage path nor a context location;
    /// - [`SessionError::InvalidPath`] when the storage path is malformed.
    pub fn new(
        ctx: &AppContext,
        options: SessionOptions,
        hooks: SessionHooks,
    ) -> Result<Self, SessionError> {
        let path = match (&options.storage_path, &options.data_object) {
            (Some(path), _) => Some(trim_leading_slash(path).to_string()),
            (None, Some(_)) => None,
            (None, None) => Some(ctx.location().ok_or(SessionError::NoRecordSource)?),
        };
        if let Some(path) = &path {
            validate_storage_path(path)?;
        }

        let shared = Rc::new(Shared {
            state: RefCell::new(State {
                existed: options.data_object.is_some(),
                record: options.data_object.clone(),
                ..Default::default()
            }),
            hooks: RefCell::new(hooks),
        });

        let subscription = match (&path, &options.data_object) {
            (Some(path), None) => {
                let weak: Weak<Shared> = Rc::downgrade(&shared);
                Some(ctx.store().subscribe(
                    path,
                    Box::new(move |value: Option<Value>| {
                        if let Some(shared) = weak.upgrade() {
                            shared.replace(value);
                        }
                    }),
                ))
            }
            _ => None,
        };
        debug!(?path, subscribed = subscription.is_some(), "session opened");

        Ok(Self {
            ctx: ctx.clone(),
            path,
            log: options.log,
            show_notice: options.show_notice,
            shared,
            subscription,
        })
    }

    pub fn storage_path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn record(&self) -> Option<Value> {
        self.shared.state.borrow().record.clone()
    }

    /// `true` until the record is known to exist in its source.
    pub fn is_new(&self) -> bool {
        !self.shared.state.borrow().existed
    }

    pub fn is_pending(&self) -> bool {
        self.shared.state.borrow().pending
    }

    pub fn is_closed(&self) -> bool {
        self.shared.state.borrow().closed
    }

    /// The current notification, if it has not expired yet.
    pub fn notification(&self) -> Option<Notification> {
        self.shared
            .state
            .borrow()
            .notice
            .clone()
            .filter(Notification::is_visible)
    }

    /// Merges `{event.name: event.value}` into the record.
    pub fn handle_change(&self, event: &ChangeEvent) {
        self.shared.apply_change(event);
    }

    /// A handler routing events into [`RecordSession::handle_change`].
    ///
    /// Holds the session weakly; events after the session is gone are ignored.
    pub fn change_handler(&self) -> ChangeHandler {
        let weak = Rc::downgrade(&self.shared);
        ChangeHandler::new(move |event: &ChangeEvent| {
            if let Some(shared) = weak.upgrade() {
                shared.apply_change(event);
            }
        })
    }

    fn scope<'a>(&self, record: Option<&'a Value>) -> BindScope<'a> {
        let mut scope = BindScope::new(record).with_handler(self.change_handler());
        if let Some(class) = &self.ctx.config().wrap_class {
            scope = scope.with_wrap_class(class.clone());
        }
        if let Some(path) = &self.path {
            scope = scope.with_storage_path(path.clone());
        }
        scope
    }

    /// Binds a UI tree against the current record.
    pub fn bind(&self, children: Vec<UiNode>) -> Vec<UiNode> {
        let record = self.record();
        walk(children, &self.scope(record.as_ref()), self.ctx.registry())
    }

    /// Renders and binds a template against the current record.
    pub fn bind_template(&self, defs: &[FieldDef]) -> RenderedTemplate {
        let record = self.record();
        render_template(defs, &self.scope(record.as_ref()), self.ctx.registry())
    }

    /// Fills fields the record does not have yet with `defaults`.
    pub fn seed_defaults(&self, defaults: &IndexMap<String, Value>) {
        let mut st = self.shared.state.borrow_mut();
        let record = st
            .record
            .get_or_insert_with(|| Value::Object(Map::new()));
        let snapshot = record.clone();
        let Value::Object(map) = record else {
            return;
        };
        for (name, value) in defaults {
            if get_value_by_path(&snapshot, name).is_none() {
                map.insert(name.clone(), value.clone());
            }
        }
    }

    /// Writes the record: `insert` the first time, `update` afterwards.
    ///
    /// On a store failure a danger notification is shown, the error is
    /// returned and the completion step does not run.
    #[tracing::instrument(skip(self), fields(path = ?self.path))]
    pub async fn save(&self) -> Result<(), SessionError> {
        let _pending = self.begin()?;
        let outcome = self.run_save().await;
        self.complete(outcome)
    }

    /// Removes the record at the storage path.
    #[tracing::instrument(skip(self), fields(path = ?self.path))]
    pub async fn delete(&self) -> Result<(), SessionError> {
        let _pending = self.begin()?;
        let outcome = self.run_delete().await;
        self.complete(outcome)
    }

    /// Completion step shared by every action: audit log, `on_finally`,
    /// success notification.
    ///
    /// A failed audit log write is logged and does not stop the rest.
    pub async fn finish(&self, action: Action) -> Result<(), SessionError> {
        let record = self.record().unwrap_or(Value::Null);
        self.finish_with(action, &record).await
    }

    /// Stops listening to the store. Idempotent.
    pub fn close(&mut self) {
        self.shared.state.borrow_mut().closed = true;
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
            debug!(path = ?self.path, "session closed");
        }
    }

    fn begin(&self) -> Result<PendingGuard, SessionError> {
        let mut st = self.shared.state.borrow_mut();
        if st.pending {
            return Err(SessionError::Busy);
        }
        st.pending = true;
        st.notice = None;
        Ok(PendingGuard {
            shared: Rc::downgrade(&self.shared),
        })
    }

    fn complete(&self, outcome: Result<(), SessionError>) -> Result<(), SessionError> {
        let mut st = self.shared.state.borrow_mut();
        if let Err(err) = &outcome {
            warn!(%err, "session action failed");
            st.notice = Some(Notification::new(
                NoticeKind::Danger,
                err.to_string(),
                self.ctx.config().notice_timeout(),
            ));
        }
        outcome
    }

    async fn run_save(&self) -> Result<(), SessionError> {
        let (record, existed) = {
            let st = self.shared.state.borrow();
            (st.record.clone().ok_or(SessionError::NoRecord)?, st.existed)
        };
        let action = if existed {
            Action::Update
        } else {
            Action::Insert
        };
        self.shared.with_hooks(|h| {
            let hook = match action {
                Action::Insert => h.insert.as_mut(),
                _ => h.update.as_mut(),
            };
            if let Some(cb) = hook {
                cb(&record)
            }
        });
        if let Some(path) = &self.path {
            self.ctx.store().set(path, expand_dotted_keys(&record)).await?;
        }
        self.shared.state.borrow_mut().existed = true;
        self.finish_with(action, &record).await
    }

    async fn run_delete(&self) -> Result<(), SessionError> {
        let record = self.record().unwrap_or(Value::Null);
        self.shared.with_hooks(|h| {
            if let Some(cb) = h.delete.as_mut() {
                cb(&record)
            }
        });
        if let Some(path) = &self.path {
            self.ctx.store().remove(path).await?;
        }
        {
            let mut st = self.shared.state.borrow_mut();
            st.record = None;
            st.existed = false;
        }
        self.finish_with(Action::Delete, &record).await
    }

    async fn finish_with(&self, action: Action, record: &Value) -> Result<(), SessionError> {
        if self.log {
            let (path, entry) = self.log_entry(action, record);
            if let Err(err) = self.ctx.store().set(&path, entry).await {
                warn!(%err, %path, "audit log entry not written");
            }
        }
        self.shared.with_hooks(|h| {
            if let Some(cb) = h.finally.as_mut() {
                cb(action, record)
            }
        });
        if self.show_notice {
            self.shared.state.borrow_mut().notice = Some(Notification::new(
                NoticeKind::Success,
                action.success_message(),
                self.ctx.config().notice_timeout(),
            ));
        }
        debug!(action = action.as_str(), "session action complete");
        Ok(())
    }

    fn log_entry(&self, action: Action, record: &Value) -> (String, Value) {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        let base = join_storage_path(
            &self.ctx.config().log_root,
            self.path.as_deref().unwrap_or_default(),
        );
        let path = join_storage_path(&base, &normalize_key(&timestamp));
        let entry = json!({
            "user": self.ctx.user(),
            "timestamp": timestamp,
            "action": action.as_str(),
            "record": record,
        });
        (path, entry)
    }
}

/// Clears the pending flag when an action ends, including when its future is
/// dropped before completion.
struct PendingGuard {
    shared: Weak<Shared>,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.upgrade() {
            if let Ok(mut st) = shared.state.try_borrow_mut() {
                st.pending = false;
            }
        }
    }
}

impl Drop for RecordSession {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for RecordSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordSession")
            .field("path", &self.path)
            .field("state", &self.shared.state.borrow())
            .finish_non_exhaustive()
    }
}
