//! formbind: record-bound form trees.
//!
//! - [`node`]: headless UI tree the forms are described in;
//! - [`registry`]: which tags are form fields, their defaults and rendering;
//! - [`walker`]: binds `name`/`value`/`on_change` into the fields of a tree;
//! - [`store`]: the keyed record store contract and an in-memory store;
//! - [`session`]: one record's edit/save/delete lifecycle;
//! - [`grid`]: a collection of records, each opened as a session;
//! - [`context`] and [`config`]: what sessions receive from the application.
//!
//! ```
//! use std::rc::Rc;
//! use formbind::{AppContext, ChangeEvent, FormConfig, MemoryStore, RecordSession, SessionHooks, SessionOptions, UiNode};
//! use formbind::node::find_named;
//! use serde_json::json;
//!
//! let store = MemoryStore::with_data(json!({"users": {"alice": {"name": "Alice"}}}));
//! let ctx = AppContext::new(Rc::new(store.clone()), FormConfig::default());
//! let session = RecordSession::new(&ctx, SessionOptions::at("/users/alice"), SessionHooks::new()).unwrap();
//!
//! let form = session.bind(vec![UiNode::element("String").name("name").into()]);
//! let field = find_named(&form, "name").unwrap();
//! assert_eq!(field.props.value, Some(json!("Alice")));
//!
//! field.props.on_change.as_ref().unwrap().call(&ChangeEvent::new("name", "Alice B."));
//! futures::executor::block_on(session.save()).unwrap();
//! assert_eq!(store.get("users/alice"), Some(json!({"name": "Alice B."})));
//! ```

pub mod config;
pub mod context;
pub mod event;
pub mod form_cli;
pub mod grid;
pub mod node;
pub mod registry;
pub mod session;
pub mod store;
pub mod walker;

pub use config::{ConfigError, FormConfig};
pub use context::AppContext;
pub use event::{ChangeEvent, ChangeHandler};
pub use grid::{GridRow, GridSession};
pub use node::{Tag, UiElement, UiNode};
pub use registry::{FieldAdapter, FieldDef, FieldKind, FieldRegistry};
pub use session::{
    Action, NoticeKind, Notification, RecordSession, SessionError, SessionHooks, SessionOptions,
};
pub use store::{MemoryStore, RecordStore, StoreError, Subscription};
pub use walker::{walk, BindScope, BindingWarning, Walker};
