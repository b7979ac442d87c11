//! Validation of storage paths.

use thiserror::Error;

use crate::util::trim_leading_slash;

/// Maximum allowed storage path length in bytes.
const MAX_PATH_LENGTH: usize = 768;

/// Maximum allowed path depth.
const MAX_PATH_DEPTH: usize = 32;

/// Characters a storage key may not contain.
const FORBIDDEN: &[char] = &['.', '#', '$', '[', ']'];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("storage path is too long ({0} bytes)")]
    TooLong(usize),
    #[error("storage path is too deep ({0} levels)")]
    TooDeep(usize),
    #[error("empty segment in storage path {0:?}")]
    EmptySegment(String),
    #[error("invalid character {ch:?} in storage path segment {segment:?}")]
    InvalidCharacter { segment: String, ch: char },
}

/// Validate a storage path.
///
/// A single leading slash is tolerated and a single trailing slash too;
/// interior empty segments are not.
///
/// # Errors
///
/// Returns an error if:
/// - the path exceeds 768 bytes or 32 levels,
/// - a segment is empty (`a//b`),
/// - a segment contains `.`, `#`, `$`, `[`, `]` or a control character.
///
/// ```
/// use formbind_path::validate_storage_path;
///
/// validate_storage_path("").unwrap();
/// validate_storage_path("/users/alice").unwrap();
/// validate_storage_path("users/a.b").unwrap_err();
/// ```
pub fn validate_storage_path(path: &str) -> Result<(), PathError> {
    if path.len() > MAX_PATH_LENGTH {
        return Err(PathError::TooLong(path.len()));
    }
    let trimmed = trim_leading_slash(path);
    let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
    if trimmed.is_empty() {
        return Ok(());
    }
    let segments: Vec<&str> = trimmed.split('/').collect();
    if segments.len() > MAX_PATH_DEPTH {
        return Err(PathError::TooDeep(segments.len()));
    }
    for segment in segments {
        if segment.is_empty() {
            return Err(PathError::EmptySegment(path.to_string()));
        }
        if let Some(ch) = segment
            .chars()
            .find(|c| FORBIDDEN.contains(c) || c.is_control())
        {
            return Err(PathError::InvalidCharacter {
                segment: segment.to_string(),
                ch,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_forms_are_valid() {
        assert!(validate_storage_path("").is_ok());
        assert!(validate_storage_path("/").is_ok());
    }

    #[test]
    fn trailing_slash_tolerated() {
        assert!(validate_storage_path("users/").is_ok());
    }

    #[test]
    fn interior_empty_segment_rejected() {
        assert_eq!(
            validate_storage_path("a//b"),
            Err(PathError::EmptySegment("a//b".into()))
        );
    }

    #[test]
    fn forbidden_characters() {
        for bad in ["a#b", "a$", "[x]", "x.y"] {
            assert!(
                matches!(
                    validate_storage_path(bad),
                    Err(PathError::InvalidCharacter { .. })
                ),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn too_long() {
        let long = "a".repeat(MAX_PATH_LENGTH + 1);
        assert_eq!(
            validate_storage_path(&long),
            Err(PathError::TooLong(MAX_PATH_LENGTH + 1))
        );
    }

    #[test]
    fn too_deep() {
        let deep = vec!["a"; MAX_PATH_DEPTH + 1].join("/");
        assert_eq!(
            validate_storage_path(&deep),
            Err(PathError::TooDeep(MAX_PATH_DEPTH + 1))
        );
    }
}
