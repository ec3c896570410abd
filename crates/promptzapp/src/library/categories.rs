//! Category mutations: create, rename, delete, clear.
//!
//! Rename and delete cascade to descendants by path prefix. Both are computed
//! in full before the category list is touched, so they are all-or-nothing.

use super::Library;
use crate::error::{PromptzError, Result};
use crate::model::{Category, Prompt, DEFAULT_CATEGORY, FAVORITES_CATEGORY};
use crate::path::{
    is_ancestor_or_self, join_path, parent_path, rebase_path, validate_path, SEPARATOR,
};
use std::collections::HashSet;

/// Result of a successful rename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameOutcome {
    pub old_path: String,
    pub new_path: String,
    /// Every (old, new) category name pair that changed, in library order.
    pub renamed: Vec<(String, String)>,
}

impl RenameOutcome {
    pub fn is_noop(&self) -> bool {
        self.renamed.is_empty()
    }
}

pub(crate) fn check_not_reserved(path: &str) -> Result<()> {
    if path == FAVORITES_CATEGORY || path.starts_with(&format!("{}{}", FAVORITES_CATEGORY, SEPARATOR))
    {
        return Err(PromptzError::ReservedName(path.to_string()));
    }
    Ok(())
}

impl Library {
    /// Appends a new empty category. Creation order is output order.
    pub fn create_category(&mut self, path: &str) -> Result<()> {
        check_not_reserved(path)?;
        validate_path(path)?;
        if self.contains(path) {
            return Err(PromptzError::DuplicateCategory(path.to_string()));
        }
        self.categories.push(Category::new(path));
        Ok(())
    }

    /// Returns the index of `path`, creating the category when absent.
    pub(crate) fn ensure_category(&mut self, path: &str) -> Result<usize> {
        if let Some(idx) = self.position(path) {
            return Ok(idx);
        }
        self.create_category(path)?;
        Ok(self.categories.len() - 1)
    }

    /// Renames the last segment of `old_path` to `new_leaf`, rebasing every
    /// descendant along with it.
    pub fn rename_category(&mut self, old_path: &str, new_leaf: &str) -> Result<RenameOutcome> {
        if old_path == DEFAULT_CATEGORY {
            return Err(PromptzError::ProtectedCategory(old_path.to_string()));
        }
        if new_leaf.contains(SEPARATOR) {
            return Err(PromptzError::InvalidName(format!(
                "'{}' must not contain '{}'",
                new_leaf, SEPARATOR
            )));
        }
        let new_leaf = new_leaf.trim();
        if new_leaf.is_empty() {
            return Err(PromptzError::InvalidName(
                "category name cannot be empty".to_string(),
            ));
        }
        if !self
            .categories
            .iter()
            .any(|c| is_ancestor_or_self(old_path, &c.name))
        {
            return Err(PromptzError::NotFound(format!("category '{}'", old_path)));
        }

        let new_path = join_path(parent_path(old_path), new_leaf);
        check_not_reserved(&new_path)?;
        validate_path(&new_path)?;

        if new_path == old_path {
            return Ok(RenameOutcome {
                old_path: old_path.to_string(),
                new_path,
                renamed: Vec::new(),
            });
        }

        let untouched: HashSet<&str> = self
            .categories
            .iter()
            .map(|c| c.name.as_str())
            .filter(|name| !is_ancestor_or_self(old_path, name))
            .collect();
        if untouched.contains(new_path.as_str()) {
            return Err(PromptzError::DuplicateCategory(new_path));
        }

        let renamed: Vec<(String, String)> = self
            .categories
            .iter()
            .filter(|c| is_ancestor_or_self(old_path, &c.name))
            .map(|c| (c.name.clone(), rebase_path(old_path, &new_path, &c.name)))
            .collect();
        if let Some((_, clash)) = renamed
            .iter()
            .find(|(_, new)| untouched.contains(new.as_str()))
        {
            return Err(PromptzError::DuplicateCategory(clash.clone()));
        }

        for category in self
            .categories
            .iter_mut()
            .filter(|c| is_ancestor_or_self(old_path, &c.name))
        {
            category.name = rebase_path(old_path, &new_path, &category.name);
        }

        Ok(RenameOutcome {
            old_path: old_path.to_string(),
            new_path,
            renamed,
        })
    }

    /// Removes `path` and every descendant. Returns the removed names in
    /// library order; the caller must prune selection state with them.
    ///
    /// `path` need not be a category itself: deleting an implicit tree node
    /// removes everything beneath it.
    pub fn delete_category(&mut self, path: &str) -> Result<Vec<String>> {
        if path == DEFAULT_CATEGORY {
            return Err(PromptzError::ProtectedCategory(path.to_string()));
        }
        if path == FAVORITES_CATEGORY {
            return Err(PromptzError::ProtectedOperation(
                "the favorites view cannot be deleted".to_string(),
            ));
        }

        let removed: Vec<String> = self
            .categories
            .iter()
            .filter(|c| is_ancestor_or_self(path, &c.name))
            .map(|c| c.name.clone())
            .collect();
        if removed.is_empty() {
            return Err(PromptzError::NotFound(format!("category '{}'", path)));
        }

        self.categories
            .retain(|c| !is_ancestor_or_self(path, &c.name));
        Ok(removed)
    }

    /// Empties exactly `path`; descendants keep their prompts.
    pub fn clear_category(&mut self, path: &str) -> Result<Vec<Prompt>> {
        if path == DEFAULT_CATEGORY {
            return Err(PromptzError::ProtectedCategory(path.to_string()));
        }
        if path == FAVORITES_CATEGORY {
            return Err(PromptzError::ProtectedOperation(
                "the favorites view cannot be cleared".to_string(),
            ));
        }
        let category = self
            .category_mut(path)
            .ok_or_else(|| PromptzError::NotFound(format!("category '{}'", path)))?;
        Ok(std::mem::take(&mut category.prompts))
    }
}
