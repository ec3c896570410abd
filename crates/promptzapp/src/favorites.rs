//! # Favorites View
//!
//! A read-only projection of every prompt flagged `favorite`, in library order
//! (category order outer, prompt order inner), shown to the UI as the
//! synthetic `__favorites__` category.
//!
//! The view owns nothing. Edits made while looking at a favorite are routed to
//! the prompt's real source category; naming `__favorites__` as the category
//! of a mutation is rejected.

use crate::error::{PromptzError, Result};
use crate::library::{Library, PromptRef, PromptUpdate};
use crate::model::{Category, PromptPatch, FAVORITES_CATEGORY};

pub fn is_favorites_view(path: &str) -> bool {
    path == FAVORITES_CATEGORY
}

pub fn list_favorites(library: &Library) -> Vec<PromptRef<'_>> {
    library
        .iter_prompts()
        .filter(|r| r.prompt.favorite)
        .collect()
}

/// The favorites view materialized as a category, for UIs that render every
/// category the same way.
pub fn favorites_category(library: &Library) -> Category {
    Category {
        name: FAVORITES_CATEGORY.to_string(),
        prompts: list_favorites(library)
            .into_iter()
            .map(|r| r.prompt.clone())
            .collect(),
    }
}

fn reject_view(path: &str) -> Result<()> {
    if is_favorites_view(path) {
        return Err(PromptzError::ProtectedOperation(
            "the favorites view is read-only; use the prompt's source category".to_string(),
        ));
    }
    Ok(())
}

/// Sets the favorite flag on one prompt in its source category.
pub fn set_favorite(
    library: &mut Library,
    source: &str,
    id: &str,
    favorite: bool,
) -> Result<PromptUpdate> {
    reject_view(source)?;
    library.update_prompt(source, id, PromptPatch::favorite(favorite))
}

pub fn toggle_favorite(library: &mut Library, source: &str, id: &str) -> Result<PromptUpdate> {
    reject_view(source)?;
    let current = library
        .prompt(source, id)
        .ok_or_else(|| PromptzError::NotFound(format!("prompt '{}' in '{}'", id, source)))?
        .favorite;
    set_favorite(library, source, id, !current)
}

/// Stable partition of one category into `[favorites..., others...]`.
pub fn move_favorites_to_top(library: &mut Library, path: &str) -> Result<()> {
    reject_view(path)?;
    let category = library
        .category_mut(path)
        .ok_or_else(|| PromptzError::NotFound(format!("category '{}'", path)))?;
    let (favorites, others): (Vec<_>, Vec<_>) = std::mem::take(&mut category.prompts)
        .into_iter()
        .partition(|p| p.favorite);
    category.prompts = favorites;
    category.prompts.extend(others);
    Ok(())
}
