//! # Persistence Bridge
//!
//! The core never does I/O itself. Durable storage of the library document
//! and of per-widget selection state goes through [`PersistenceBridge`], which
//! a host implements over whatever it has: a remote service, local files, a
//! database.
//!
//! ## Whole-document and delta operations
//!
//! Most mutations persist by saving the whole [`LibraryDocument`]. A few have
//! dedicated delta operations so a remote can apply them authoritatively:
//!
//! | Local operation        | Bridge call                |
//! |------------------------|----------------------------|
//! | delete category        | `delete_category_remote`   |
//! | delete prompt(s)       | `batch_delete_prompts`     |
//! | move prompt(s)         | `batch_move_prompts`       |
//! | reorder prompt         | `reorder_remote`           |
//! | everything else        | `save_library`             |
//!
//! `batch_move_prompts` returns the remote's resulting category list, which
//! the caller adopts as authoritative.
//!
//! ## Implementations
//!
//! - [`mem_backend::MemBackend`]: in-memory, with simulated failures for tests.
//! - [`fs_backend::FsBackend`]: JSON files in a data directory.
//!
//! Both keep a single document and apply deltas to it with the helpers in
//! this module.
//!
//! ## Storage Layout (FsBackend)
//!
//! ```text
//! <data dir>/
//! ├── library.json     # LibraryDocument
//! ├── widget.json      # WidgetState (selection + selectedCategory)
//! └── promptz.toml     # Configuration (optional)
//! ```

use crate::error::{PromptzError, Result};
use crate::model::{Category, LibraryDocument, Prompt};
use crate::path::is_ancestor_or_self;
use crate::selection::WidgetState;
use std::collections::HashMap;

pub mod fs_backend;
pub mod mem_backend;

/// Abstract interface to durable storage.
///
/// Methods take `&self`; implementations use interior mutability where they
/// need it. Callers serialize access, so no locking is expected.
pub trait PersistenceBridge {
    /// Load the library. `Ok(None)` when nothing has been stored yet.
    fn load_library(&self) -> Result<Option<LibraryDocument>>;

    /// Replace the stored library.
    fn save_library(&self, document: &LibraryDocument) -> Result<()>;

    /// Delete a category and all its descendants.
    fn delete_category_remote(&self, path: &str) -> Result<()>;

    /// Delete prompts by id from one category.
    fn batch_delete_prompts(&self, category: &str, ids: &[String]) -> Result<()>;

    /// Move prompts between categories, returning the updated category list.
    fn batch_move_prompts(&self, source: &str, dest: &str, ids: &[String])
        -> Result<Vec<Category>>;

    /// Persist the order of one category's prompts.
    fn reorder_remote(&self, category: &str, ordered_ids: &[String]) -> Result<()>;

    fn load_widget_state(&self) -> Result<Option<WidgetState>>;

    fn save_widget_state(&self, state: &WidgetState) -> Result<()>;
}

fn missing_category(path: &str) -> PromptzError {
    PromptzError::Persistence(format!("stored library has no category '{}'", path))
}

pub(crate) fn apply_delete_category(document: &mut LibraryDocument, path: &str) {
    document
        .categories
        .retain(|c| !is_ancestor_or_self(path, &c.name));
}

pub(crate) fn apply_delete_prompts(
    document: &mut LibraryDocument,
    category: &str,
    ids: &[String],
) -> Result<()> {
    let category = document
        .categories
        .iter_mut()
        .find(|c| c.name == category)
        .ok_or_else(|| missing_category(category))?;
    category.prompts.retain(|p| !ids.contains(&p.id));
    Ok(())
}

pub(crate) fn apply_move_prompts(
    document: &mut LibraryDocument,
    source: &str,
    dest: &str,
    ids: &[String],
) -> Result<()> {
    let source_idx = document
        .categories
        .iter()
        .position(|c| c.name == source)
        .ok_or_else(|| missing_category(source))?;

    let (moved, kept): (Vec<Prompt>, Vec<Prompt>) =
        std::mem::take(&mut document.categories[source_idx].prompts)
            .into_iter()
            .partition(|p| ids.contains(&p.id));
    document.categories[source_idx].prompts = kept;

    match document.categories.iter_mut().find(|c| c.name == dest) {
        Some(category) => category.prompts.extend(moved),
        None => document.categories.push(Category {
            name: dest.to_string(),
            prompts: moved,
        }),
    }
    Ok(())
}

/// Reorders to match `ordered_ids`. Prompts not named keep their relative
/// order after the named ones.
pub(crate) fn apply_reorder(
    document: &mut LibraryDocument,
    category: &str,
    ordered_ids: &[String],
) -> Result<()> {
    let category = document
        .categories
        .iter_mut()
        .find(|c| c.name == category)
        .ok_or_else(|| missing_category(category))?;

    let rank: HashMap<&str, usize> = ordered_ids
        .iter()
        .enumerate()
        .map(|(i, id)| (id.as_str(), i))
        .collect();
    category
        .prompts
        .sort_by_key(|p| rank.get(p.id.as_str()).copied().unwrap_or(usize::MAX));
    Ok(())
}
