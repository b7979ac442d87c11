use serde_json::{Map, Value};

use crate::util::split_dotted;

/// Looks up a dotted name in a record.
///
/// A literal key equal to the full dotted name wins over nested traversal,
/// since edits are stored under their literal (possibly dotted) names.
/// Numeric segments index into arrays.
///
/// ```
/// use formbind_path::get_value_by_path;
/// use serde_json::json;
///
/// let record = json!({"a.b": 1, "a": {"b": 2}, "list": [{"x": 3}]});
/// assert_eq!(get_value_by_path(&record, "a.b"), Some(&json!(1)));
/// assert_eq!(get_value_by_path(&record, "list.0.x"), Some(&json!(3)));
/// assert_eq!(get_value_by_path(&record, "missing"), None);
/// ```
pub fn get_value_by_path<'a>(record: &'a Value, name: &str) -> Option<&'a Value> {
    if name.is_empty() {
        return Some(record);
    }
    if let Value::Object(map) = record {
        if let Some(v) = map.get(name) {
            return Some(v);
        }
    }
    let mut current = record;
    for step in split_dotted(name) {
        current = match current {
            Value::Object(map) => map.get(&step)?,
            Value::Array(arr) => arr.get(step.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Writes `value` at a dotted name, creating intermediate objects.
///
/// Non-object intermediates are replaced by objects. An empty name replaces
/// the whole record.
pub fn set_value_by_path(record: &mut Value, name: &str, value: Value) {
    let steps = split_dotted(name);
    let Some((leaf, parents)) = steps.split_last() else {
        *record = value;
        return;
    };
    let mut current = record;
    for step in parents {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        let Value::Object(map) = current else {
            return;
        };
        current = map
            .entry(step.clone())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    if !current.is_object() {
        *current = Value::Object(Map::new());
    }
    if let Value::Object(map) = current {
        map.insert(leaf.clone(), value);
    }
}

/// Expands literal dotted top-level keys into nested objects.
///
/// Plain keys are copied first so that a dotted key refining an existing
/// object merges into it instead of being overwritten by it.
///
/// ```
/// use formbind_path::expand_dotted_keys;
/// use serde_json::json;
///
/// let flat = json!({"name": "A", "address.city": "Oslo", "address": {"zip": "0150"}});
/// assert_eq!(
///     expand_dotted_keys(&flat),
///     json!({"name": "A", "address": {"zip": "0150", "city": "Oslo"}})
/// );
/// ```
pub fn expand_dotted_keys(record: &Value) -> Value {
    let Value::Object(map) = record else {
        return record.clone();
    };
    let mut out = Value::Object(Map::new());
    let (dotted, plain): (Vec<_>, Vec<_>) = map.iter().partition(|(k, _)| k.contains('.'));
    for (key, value) in plain {
        set_value_by_path(&mut out, key, value.clone());
    }
    for (key, value) in dotted {
        set_value_by_path(&mut out, key, value.clone());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lookup_through_primitive_fails() {
        let record = json!({"a": 1});
        assert_eq!(get_value_by_path(&record, "a.b"), None);
    }

    #[test]
    fn lookup_empty_name_is_root() {
        let record = json!("whole");
        assert_eq!(get_value_by_path(&record, ""), Some(&record));
    }

    #[test]
    fn set_creates_intermediates() {
        let mut record = json!({});
        set_value_by_path(&mut record, "a.b.c", json!(1));
        assert_eq!(record, json!({"a": {"b": {"c": 1}}}));
    }

    #[test]
    fn set_replaces_primitive_intermediate() {
        let mut record = json!({"a": 5});
        set_value_by_path(&mut record, "a.b", json!(true));
        assert_eq!(record, json!({"a": {"b": true}}));
    }

    #[test]
    fn expand_leaves_non_objects_alone() {
        assert_eq!(expand_dotted_keys(&json!([1, 2])), json!([1, 2]));
        assert_eq!(expand_dotted_keys(&json!("x")), json!("x"));
    }
}
