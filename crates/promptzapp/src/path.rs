//! Category path helpers.
//!
//! Category names are full paths, `/`-delimited, e.g. `art/sketch/pencil`.
//! Ancestry is decided on segment boundaries: `art` is an ancestor of
//! `art/sketch` but not of `artwork`.

use crate::error::{PromptzError, Result};

pub const SEPARATOR: char = '/';

/// Splits a path into its non-empty segments. Leading, trailing and doubled
/// slashes produce no segments.
pub fn split_path(name: &str) -> Vec<&str> {
    name.split(SEPARATOR).filter(|s| !s.is_empty()).collect()
}

pub fn is_ancestor_or_self(ancestor: &str, path: &str) -> bool {
    path == ancestor || is_proper_ancestor(ancestor, path)
}

pub fn is_proper_ancestor(ancestor: &str, path: &str) -> bool {
    path.len() > ancestor.len()
        && path.starts_with(ancestor)
        && path[ancestor.len()..].starts_with(SEPARATOR)
}

/// Replaces a leading `old_prefix` (on a segment boundary) with `new_prefix`.
/// Paths outside `old_prefix` are returned unchanged.
pub fn rebase_path(old_prefix: &str, new_prefix: &str, path: &str) -> String {
    if path == old_prefix {
        new_prefix.to_string()
    } else if is_proper_ancestor(old_prefix, path) {
        format!("{}{}", new_prefix, &path[old_prefix.len()..])
    } else {
        path.to_string()
    }
}

pub fn parent_path(path: &str) -> Option<&str> {
    path.rfind(SEPARATOR).map(|idx| &path[..idx])
}

pub fn leaf_segment(path: &str) -> &str {
    path.rfind(SEPARATOR).map_or(path, |idx| &path[idx + 1..])
}

pub fn join_path(parent: Option<&str>, leaf: &str) -> String {
    match parent {
        Some(parent) if !parent.is_empty() => format!("{}{}{}", parent, SEPARATOR, leaf),
        _ => leaf.to_string(),
    }
}

/// Validates a full category path: non-empty, no empty segments, and no
/// segment with surrounding whitespace.
pub fn validate_path(path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(PromptzError::InvalidName(
            "category name cannot be empty".to_string(),
        ));
    }
    for segment in path.split(SEPARATOR) {
        if segment.is_empty() {
            return Err(PromptzError::InvalidName(format!(
                "'{}' contains an empty segment",
                path
            )));
        }
        if segment.trim() != segment {
            return Err(PromptzError::InvalidName(format!(
                "'{}' has a segment with surrounding whitespace",
                path
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_drops_empty_segments() {
        assert_eq!(split_path("a/b/c"), vec!["a", "b", "c"]);
        assert_eq!(split_path("/a//b/"), vec!["a", "b"]);
        assert!(split_path("").is_empty());
    }

    #[test]
    fn test_ancestry_respects_segment_boundaries() {
        assert!(is_ancestor_or_self("art", "art"));
        assert!(is_ancestor_or_self("art", "art/sketch"));
        assert!(!is_ancestor_or_self("art", "artwork"));
        assert!(!is_proper_ancestor("art", "art"));
        assert!(is_proper_ancestor("a/b", "a/b/c/d"));
    }

    #[test]
    fn test_rebase() {
        assert_eq!(rebase_path("a/b", "c", "a/b"), "c");
        assert_eq!(rebase_path("a/b", "c", "a/b/d"), "c/d");
        assert_eq!(rebase_path("a/b", "c", "a/bc"), "a/bc");
        assert_eq!(rebase_path("a/b", "c", "x/a/b"), "x/a/b");
    }

    #[test]
    fn test_parent_and_leaf() {
        assert_eq!(parent_path("a/b/c"), Some("a/b"));
        assert_eq!(parent_path("a"), None);
        assert_eq!(leaf_segment("a/b/c"), "c");
        assert_eq!(leaf_segment("a"), "a");
        assert_eq!(join_path(Some("a/b"), "x"), "a/b/x");
        assert_eq!(join_path(None, "x"), "x");
    }

    #[test]
    fn test_validate_path() {
        assert!(validate_path("art/sketch").is_ok());
        assert!(validate_path("").is_err());
        assert!(validate_path("art//sketch").is_err());
        assert!(validate_path("/art").is_err());
        assert!(validate_path("art/ sketch").is_err());
    }
}
