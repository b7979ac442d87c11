//! Collection view: rows read from a storage path, each editable through its
//! own [`RecordSession`] at `collection/key`.

use formbind_path::{
    get_value_by_path, join_storage_path, normalize_key, trim_leading_slash, validate_storage_path,
};
use serde_json::Value;
use tracing::{debug, warn};

use crate::context::AppContext;
use crate::session::{RecordSession, SessionError, SessionHooks, SessionOptions};

/// Derives a row key from a record; `None` falls back to the entry key.
///
/// Derived keys pass through [`normalize_key`] before they address storage.
pub type PrimaryKey = Box<dyn Fn(&Value) -> Option<String>>;

#[derive(Debug, Clone, PartialEq)]
pub struct GridRow {
    pub key: String,
    pub record: Value,
}

pub struct GridSession {
    ctx: AppContext,
    collection: String,
    primary_key: PrimaryKey,
}

impl GridSession {
    pub fn new(
        ctx: &AppContext,
        collection: &str,
        primary_key: PrimaryKey,
    ) -> Result<Self, SessionError> {
        validate_storage_path(collection)?;
        Ok(Self {
            ctx: ctx.clone(),
            collection: trim_leading_slash(collection).to_string(),
            primary_key,
        })
    }

    /// Rows keyed by their position in the collection.
    pub fn keyed_by_entry(ctx: &AppContext, collection: &str) -> Result<Self, SessionError> {
        Self::new(ctx, collection, Box::new(|_: &Value| None))
    }

    /// Rows keyed by the value of a record field.
    pub fn keyed_by_field(
        ctx: &AppContext,
        collection: &str,
        field: &str,
    ) -> Result<Self, SessionError> {
        let field = field.to_string();
        Self::new(
            ctx,
            collection,
            Box::new(move |record: &Value| match get_value_by_path(record, &field)? {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            }),
        )
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Reads the collection. Objects yield one row per entry in key order,
    /// arrays one row per non-null element.
    pub async fn load(&self) -> Result<Vec<GridRow>, SessionError> {
        let value = self.ctx.store().read(&self.collection).await?;
        let entries: Vec<(String, Value)> = match value {
            Some(Value::Object(map)) => map.into_iter().collect(),
            Some(Value::Array(items)) => items
                .into_iter()
                .enumerate()
                .filter(|(_, v)| !v.is_null())
                .map(|(i, v)| (i.to_string(), v))
                .collect(),
            Some(other) => {
                warn!(collection = %self.collection, kind = ?other, "collection is not a list");
                Vec::new()
            }
            None => Vec::new(),
        };
        let rows: Vec<GridRow> = entries
            .into_iter()
            .map(|(entry, record)| GridRow {
                key: (self.primary_key)(&record)
                    .map(|key| normalize_key(&key))
                    .filter(|key| !key.is_empty())
                    .unwrap_or(entry),
                record,
            })
            .collect();
        debug!(collection = %self.collection, rows = rows.len(), "grid loaded");
        Ok(rows)
    }

    pub fn row_path(&self, row: &GridRow) -> String {
        join_storage_path(&self.collection, &row.key)
    }

    /// Display strings of `columns` for one row; missing cells are empty.
    pub fn summarize(row: &GridRow, columns: &[&str]) -> Vec<String> {
        columns
            .iter()
            .map(|col| match get_value_by_path(&row.record, col) {
                None | Some(Value::Null) => String::new(),
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
            })
            .collect()
    }

    /// Opens the record of `row` for editing.
    pub fn open(
        &self,
        row: &GridRow,
        options: SessionOptions,
        hooks: SessionHooks,
    ) -> Result<RecordSession, SessionError> {
        let options = SessionOptions {
            storage_path: Some(self.row_path(row)),
            data_object: None,
            ..options
        };
        RecordSession::new(&self.ctx, options, hooks)
    }

    /// Opens an insert-mode session for a new row under `key`.
    pub fn open_new(
        &self,
        key: &str,
        options: SessionOptions,
        hooks: SessionHooks,
    ) -> Result<RecordSession, SessionError> {
        let options = SessionOptions {
            storage_path: Some(join_storage_path(&self.collection, key)),
            data_object: None,
            ..options
        };
        RecordSession::new(&self.ctx, options, hooks)
    }
}

impl std::fmt::Debug for GridSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridSession")
            .field("collection", &self.collection)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn summarize_formats_cells() {
        let row = GridRow {
            key: "k".into(),
            record: json!({"name": "Ann", "age": 31, "tags": ["a"], "none": null}),
        };
        assert_eq!(
            GridSession::summarize(&row, &["name", "age", "tags", "none", "missing"]),
            vec!["Ann", "31", "[\"a\"]", "", ""]
        );
    }
}
