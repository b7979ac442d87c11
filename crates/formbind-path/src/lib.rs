//! Dotted field names and storage paths.
//!
//! Two path flavors meet in a bound form:
//!
//! - **dotted names** (`address.city`) name a field relative to a record and
//!   are built by joining ancestor prefixes while the field tree is walked;
//! - **storage paths** (`users/alice`) locate a record inside the keyed
//!   record store, always without a leading slash.
//!
//! # Example
//!
//! ```
//! use formbind_path::{get_value_by_path, join_dotted, normalize_key, trim_leading_slash};
//!
//! assert_eq!(join_dotted("", "city"), "city");
//! assert_eq!(join_dotted("address", "city"), "address.city");
//! assert_eq!(trim_leading_slash("/users/alice"), "users/alice");
//! assert_eq!(normalize_key("Alice@Example.com"), "aliceexample-com");
//!
//! let record = serde_json::json!({"address": {"city": "Oslo"}});
//! assert_eq!(
//!     get_value_by_path(&record, "address.city"),
//!     Some(&serde_json::json!("Oslo"))
//! );
//! ```

pub mod get;
pub mod util;
pub mod validate;

pub use get::{expand_dotted_keys, get_value_by_path, set_value_by_path};
pub use util::{
    join_dotted, join_storage_path, last_segment, normalize_key, split_dotted,
    split_storage_path, trim_leading_slash,
};
pub use validate::{validate_storage_path, PathError};
