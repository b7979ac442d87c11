use formbind_path::{
    expand_dotted_keys, get_value_by_path, join_dotted, join_storage_path, normalize_key,
    set_value_by_path, split_dotted, trim_leading_slash,
};
use proptest::prelude::*;
use serde_json::json;

proptest! {
    #[test]
    fn normalize_key_is_idempotent(s in any::<String>()) {
        let once = normalize_key(&s);
        prop_assert_eq!(normalize_key(&once), once);
    }

    #[test]
    fn normalize_key_output_alphabet(s in any::<String>()) {
        let key = normalize_key(&s);
        prop_assert!(key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '|'));
    }

    #[test]
    fn split_inverts_join(prefix in "[a-z]{1,6}(\\.[a-z]{1,6}){0,3}", name in "[a-z]{1,6}") {
        let joined = join_dotted(&prefix, &name);
        let mut expected = split_dotted(&prefix);
        expected.push(name);
        prop_assert_eq!(split_dotted(&joined), expected);
    }

    #[test]
    fn set_then_get(name in "[a-z]{1,4}(\\.[a-z]{1,4}){0,3}", n in any::<i64>()) {
        let mut record = json!({});
        set_value_by_path(&mut record, &name, json!(n));
        prop_assert_eq!(get_value_by_path(&record, &name), Some(&json!(n)));
    }
}

#[test]
fn join_dotted_identity() {
    assert_eq!(join_dotted("", "x"), "x");
    assert_eq!(join_dotted("a", "b"), "a.b");
}

#[test]
fn trim_leading_slash_is_single() {
    assert_eq!(trim_leading_slash("/users/alice"), "users/alice");
    assert_eq!(trim_leading_slash("users/alice"), "users/alice");
}

#[test]
fn storage_path_seams() {
    assert_eq!(join_storage_path("log", "users/alice"), "log/users/alice");
    assert_eq!(join_storage_path("/log/", "/users/alice/"), "log/users/alice");
}

#[test]
fn literal_dotted_key_wins_over_nesting() {
    let record = json!({"address.city": "flat", "address": {"city": "nested"}});
    assert_eq!(get_value_by_path(&record, "address.city"), Some(&json!("flat")));
    let expanded = expand_dotted_keys(&record);
    assert_eq!(expanded, json!({"address": {"city": "flat"}}));
}

#[test]
fn expand_multiple_levels() {
    let flat = json!({"a.b.c": 1, "a.b.d": 2, "e": 3});
    assert_eq!(
        expand_dotted_keys(&flat),
        json!({"e": 3, "a": {"b": {"c": 1, "d": 2}}})
    );
}
