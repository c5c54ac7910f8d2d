//! Strict path parsing.
//!
//! A path is valid iff it is non-empty, begins with `/`, contains no empty
//! segments (no `//`), every segment is 1..=`MAX_STRING_LEN` bytes, and
//! the total length is at most `MAX_PATH_LEN`. Any violation is a
//! [`FsError::PathError`]; over-long segments are a path defect, not a
//! `StringTooLong` one.

use atoll_types::limits::{MAX_PATH_LEN, MAX_STRING_LEN};

use crate::error::FsError;

/// Validate a path string against the syntactic rules.
///
/// The bare root `/` is syntactically valid here; operations that require
/// a terminal name reject it themselves.
///
/// # Examples
///
/// ```
/// use atoll_fs::path::validate;
///
/// assert!(validate("/a/b.txt").is_ok());
/// assert!(validate("/").is_ok());
/// assert!(validate("").is_err());
/// assert!(validate("no/slash").is_err());
/// assert!(validate("/a//b").is_err());
/// ```
pub fn validate(path: &str) -> Result<(), FsError> {
    if path.is_empty() || path.len() > MAX_PATH_LEN {
        return Err(FsError::PathError);
    }
    if !path.starts_with('/') {
        return Err(FsError::PathError);
    }
    if path.contains("//") {
        return Err(FsError::PathError);
    }
    for segment in segments(path) {
        if segment.len() > MAX_STRING_LEN {
            return Err(FsError::PathError);
        }
    }
    Ok(())
}

/// The non-empty `/`-separated segments of a path, in order.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Strip a single trailing separator, leaving the bare root untouched.
pub fn strip_trailing_slash(path: &str) -> &str {
    if path != "/" && path.ends_with('/') {
        &path[..path.len() - 1]
    } else {
        path
    }
}

/// Append a trailing separator if missing, so a walker descends fully.
pub fn ensure_trailing_slash(path: &str) -> String {
    if path == "/" {
        return path.to_string();
    }
    if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{path}/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_simple_paths() {
        assert!(validate("/file.txt").is_ok());
        assert!(validate("/a/b/c").is_ok());
        assert!(validate("/a/b/").is_ok());
        assert!(validate("/").is_ok());
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(validate(""), Err(FsError::PathError));
    }

    #[test]
    fn rejects_relative() {
        assert_eq!(validate("nos/lash"), Err(FsError::PathError));
        assert_eq!(validate("a"), Err(FsError::PathError));
    }

    #[test]
    fn rejects_empty_segment() {
        assert_eq!(validate("/a//b"), Err(FsError::PathError));
        assert_eq!(validate("//"), Err(FsError::PathError));
    }

    #[test]
    fn rejects_oversized_segment() {
        let path = format!("/{}", "a".repeat(400));
        assert_eq!(validate(&path), Err(FsError::PathError));
        let path = format!("/{}", "a".repeat(MAX_STRING_LEN + 1));
        assert_eq!(validate(&path), Err(FsError::PathError));
    }

    #[test]
    fn accepts_segment_at_limit() {
        let path = format!("/{}", "a".repeat(MAX_STRING_LEN));
        assert!(validate(&path).is_ok());
    }

    #[test]
    fn rejects_oversized_total_length() {
        // Nine full-length segments exceed MAX_PATH_LEN while keeping each
        // segment individually legal.
        let seg = "a".repeat(MAX_STRING_LEN);
        let path: String = (0..9).map(|_| format!("/{seg}")).collect();
        assert!(path.len() > MAX_PATH_LEN);
        assert_eq!(validate(&path), Err(FsError::PathError));
    }

    #[test]
    fn segment_iteration_order() {
        let segs: Vec<&str> = segments("/a/b/c").collect();
        assert_eq!(segs, vec!["a", "b", "c"]);
        assert_eq!(segments("/").count(), 0);
    }

    #[test]
    fn strip_trailing() {
        assert_eq!(strip_trailing_slash("/a/"), "/a");
        assert_eq!(strip_trailing_slash("/a"), "/a");
        assert_eq!(strip_trailing_slash("/"), "/");
    }

    #[test]
    fn ensure_trailing() {
        assert_eq!(ensure_trailing_slash("/a"), "/a/");
        assert_eq!(ensure_trailing_slash("/a/"), "/a/");
        assert_eq!(ensure_trailing_slash("/"), "/");
        assert_eq!(ensure_trailing_slash(""), "/");
    }
}
