//! Slug validation for untrusted input

use lazy_static::lazy_static;
use regex::Regex;

use super::error::{ContentError, ContentResult};

lazy_static! {
    static ref SLUG_PATTERN: Regex = Regex::new(r"^[A-Za-z0-9_-]+$").unwrap();
}

/// Validate a slug that came from outside (a URL segment, a CLI argument)
/// before it is joined onto a filesystem path.
///
/// Returns the input unchanged on success. Empty strings, path separators,
/// dots and anything else outside `[A-Za-z0-9_-]` are rejected.
pub fn validate_slug(raw: &str) -> ContentResult<&str> {
    if SLUG_PATTERN.is_match(raw) {
        Ok(raw)
    } else {
        Err(ContentError::InvalidSlugFormat(raw.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_allowed_characters() {
        for slug in ["hello", "hello-world", "my_post_2", "A-Z_0-9", "x", "-", "_"] {
            assert_eq!(validate_slug(slug).unwrap(), slug);
        }
    }

    #[test]
    fn test_rejects_traversal_and_paths() {
        for slug in [
            "../../etc/passwd",
            "..",
            "/etc/passwd",
            "a/b",
            "a\\b",
            "post.md",
            "C:",
        ] {
            assert!(
                matches!(validate_slug(slug), Err(ContentError::InvalidSlugFormat(_))),
                "{slug:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_rejects_empty_and_whitespace() {
        assert!(validate_slug("").is_err());
        assert!(validate_slug(" ").is_err());
        assert!(validate_slug("hello world").is_err());
        assert!(validate_slug("trailing\n").is_err());
    }

    #[test]
    fn test_rejects_non_ascii() {
        assert!(validate_slug("café").is_err());
        assert!(validate_slug("博客").is_err());
        assert!(validate_slug("a%2e%2e").is_err());
    }
}
