//! String transforms over field names and storage paths.
//!
//! Every function here is total: empty input yields empty output.

/// Characters replaced by `-` in [`normalize_key`].
const KEY_SEPARATORS: &[char] = &['/', '\'', '"', '.', '#', '$', '[', ']', '_'];

/// Removes exactly one leading `/`.
///
/// ```
/// use formbind_path::trim_leading_slash;
///
/// assert_eq!(trim_leading_slash("/a/b"), "a/b");
/// assert_eq!(trim_leading_slash("//a"), "/a");
/// assert_eq!(trim_leading_slash(""), "");
/// ```
pub fn trim_leading_slash(path: &str) -> &str {
    path.strip_prefix('/').unwrap_or(path)
}

/// Joins a parent prefix and a field name with a dot.
///
/// An empty prefix returns `name` unchanged.
pub fn join_dotted(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        return name.to_string();
    }
    let mut out = String::with_capacity(prefix.len() + name.len() + 1);
    out.push_str(prefix);
    out.push('.');
    out.push_str(name);
    out
}

/// Splits a dotted name into its segments.
///
/// ```
/// use formbind_path::split_dotted;
///
/// assert_eq!(split_dotted("a.b.c"), vec!["a", "b", "c"]);
/// assert!(split_dotted("").is_empty());
/// ```
pub fn split_dotted(name: &str) -> Vec<String> {
    if name.is_empty() {
        return Vec::new();
    }
    name.split('.').map(str::to_string).collect()
}

/// Returns the final segment of a dotted name.
pub fn last_segment(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

/// Splits a storage path into its non-empty segments.
pub fn split_storage_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Joins a storage path and a child key with a single `/`.
///
/// ```
/// use formbind_path::join_storage_path;
///
/// assert_eq!(join_storage_path("/users/", "alice"), "users/alice");
/// assert_eq!(join_storage_path("", "/alice"), "alice");
/// assert_eq!(join_storage_path("users", ""), "users");
/// ```
pub fn join_storage_path(base: &str, key: &str) -> String {
    let base = trim_leading_slash(base).trim_end_matches('/');
    let key = key.trim_matches('/');
    match (base.is_empty(), key.is_empty()) {
        (true, _) => key.to_string(),
        (false, true) => base.to_string(),
        (false, false) => format!("{base}/{key}"),
    }
}

/// Turns an arbitrary string (timestamp, e-mail, title) into a storage-safe key.
///
/// Lower-cases, maps separators and whitespace to `-`, then drops anything
/// outside `[a-z0-9-|]`. Idempotent.
///
/// ```
/// use formbind_path::normalize_key;
///
/// assert_eq!(normalize_key("Hello World"), "hello-world");
/// assert_eq!(normalize_key("a/b.c#d"), "a-b-c-d");
/// assert_eq!(normalize_key("x|y"), "x|y");
/// ```
pub fn normalize_key(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars().flat_map(char::to_lowercase) {
        if KEY_SEPARATORS.contains(&ch) || ch.is_whitespace() {
            out.push('-');
        } else if ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-' || ch == '|' {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trim_only_one_slash() {
        assert_eq!(trim_leading_slash("/"), "");
        assert_eq!(trim_leading_slash("a/"), "a/");
    }

    #[test]
    fn join_identity() {
        assert_eq!(join_dotted("", "x"), "x");
        assert_eq!(join_dotted("a", "b"), "a.b");
        assert_eq!(join_dotted("a.b", "c"), "a.b.c");
    }

    #[test]
    fn last_segment_of_plain_name() {
        assert_eq!(last_segment("name"), "name");
        assert_eq!(last_segment("a.b.name"), "name");
        assert_eq!(last_segment(""), "");
    }

    #[test]
    fn storage_segments_skip_empty() {
        assert_eq!(split_storage_path("/users//alice/"), vec!["users", "alice"]);
        assert!(split_storage_path("").is_empty());
    }

    #[test]
    fn normalize_timestamp() {
        assert_eq!(
            normalize_key("2026-10-19T10:00:00.123Z"),
            "2026-10-19t100000-123z"
        );
    }

    #[test]
    fn normalize_drops_non_ascii() {
        assert_eq!(normalize_key("Café_Menu"), "caf-menu");
        assert_eq!(normalize_key("[tag]"), "-tag-");
    }
}
