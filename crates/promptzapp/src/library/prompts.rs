//! Prompt mutations.
//!
//! Prompts live in exactly one category. Adds append, moves append to the
//! destination, and reorders use final-position semantics:
//!
//! ```text
//! [A, B, C, D]  reorder 2 -> 0  =>  [C, A, B, D]
//! [A, B, C, D]  reorder 0 -> 2  =>  [B, C, A, D]
//! ```
//!
//! For drag-and-drop, [`Library::drop_prompt_at`] takes a drop *slot* in the
//! list as it was before the drag (0 = before the first item, `len` = after
//! the last) and converts it: when the item moves down, the slot index is one
//! past its final position.

use super::Library;
use crate::error::{PromptzError, Result};
use crate::model::{Prompt, PromptDraft, PromptPatch, FAVORITES_CATEGORY};
use crate::path::validate_path;
use chrono::Utc;
use std::collections::HashSet;

/// A prompt before and after an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptUpdate {
    pub before: Prompt,
    pub after: Prompt,
}

impl PromptUpdate {
    pub fn text_changed(&self) -> bool {
        self.before.prompt != self.after.prompt
    }
}

fn validate_fields(alias: &str, prompt: &str) -> Result<()> {
    if alias.trim().is_empty() {
        return Err(PromptzError::Validation("alias cannot be empty".to_string()));
    }
    if prompt.trim().is_empty() {
        return Err(PromptzError::Validation(
            "prompt text cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn not_found(path: &str, id: &str) -> PromptzError {
    PromptzError::NotFound(format!("prompt '{}' in '{}'", id, path))
}

impl Library {
    /// Appends a prompt, creating the category on demand.
    pub fn add_prompt(&mut self, path: &str, draft: PromptDraft) -> Result<Prompt> {
        validate_fields(&draft.alias, &draft.prompt)?;
        let idx = self.ensure_category(path)?;
        let prompt = Prompt::from_draft(draft);
        self.categories[idx].prompts.push(prompt.clone());
        Ok(prompt)
    }

    /// Applies `patch` in place; the prompt keeps its position.
    pub fn update_prompt(
        &mut self,
        path: &str,
        id: &str,
        patch: PromptPatch,
    ) -> Result<PromptUpdate> {
        let category = self
            .category_mut(path)
            .ok_or_else(|| PromptzError::NotFound(format!("category '{}'", path)))?;
        let prompt = category
            .prompts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| not_found(path, id))?;

        validate_fields(
            patch.alias.as_deref().unwrap_or(&prompt.alias),
            patch.prompt.as_deref().unwrap_or(&prompt.prompt),
        )?;

        let before = prompt.clone();
        prompt.apply_patch(patch);
        Ok(PromptUpdate {
            before,
            after: prompt.clone(),
        })
    }

    pub fn delete_prompt(&mut self, path: &str, id: &str) -> Result<Prompt> {
        let mut removed = self.delete_prompts(path, &[id.to_string()])?;
        // delete_prompts returns exactly one entry per requested id
        Ok(removed.remove(0))
    }

    /// Removes every id from `path`. Fails without effect if any id is
    /// missing. Returned prompts follow their former list order.
    pub fn delete_prompts(&mut self, path: &str, ids: &[String]) -> Result<Vec<Prompt>> {
        let category = self
            .category_mut(path)
            .ok_or_else(|| PromptzError::NotFound(format!("category '{}'", path)))?;

        let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
        if let Some(missing) = wanted.iter().find(|id| category.position_of(id).is_none()) {
            return Err(not_found(path, missing));
        }

        let (removed, kept): (Vec<Prompt>, Vec<Prompt>) = std::mem::take(&mut category.prompts)
            .into_iter()
            .partition(|p| wanted.contains(p.id.as_str()));
        category.prompts = kept;
        Ok(removed)
    }

    pub fn move_prompt(&mut self, source: &str, dest: &str, id: &str) -> Result<Prompt> {
        let mut moved = self.move_prompts(source, dest, &[id.to_string()])?;
        Ok(moved.remove(0))
    }

    /// Moves prompts from `source` to the end of `dest`, keeping their
    /// relative order and every field. `dest` is created when missing.
    pub fn move_prompts(&mut self, source: &str, dest: &str, ids: &[String]) -> Result<Vec<Prompt>> {
        if source == FAVORITES_CATEGORY {
            return Err(PromptzError::ProtectedOperation(
                "move prompts from their source category, not the favorites view".to_string(),
            ));
        }
        if dest == source {
            return Err(PromptzError::InvalidTarget(format!(
                "'{}' is already the prompt's category",
                dest
            )));
        }
        if dest == FAVORITES_CATEGORY {
            return Err(PromptzError::InvalidTarget(
                "prompts cannot be moved into the favorites view".to_string(),
            ));
        }
        if let Err(e) = validate_path(dest) {
            return Err(PromptzError::InvalidTarget(e.to_string()));
        }
        {
            let category = self
                .category(source)
                .ok_or_else(|| PromptzError::NotFound(format!("category '{}'", source)))?;
            if let Some(missing) = ids.iter().find(|id| category.position_of(id).is_none()) {
                return Err(not_found(source, missing));
            }
        }
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let dest_idx = self.ensure_category(dest)?;
        let moved = self.delete_prompts(source, ids)?;
        self.categories[dest_idx]
            .prompts
            .extend(moved.iter().cloned());
        Ok(moved)
    }

    /// Moves the prompt at `from` so that it ends up at index `to`.
    pub fn reorder_prompt(&mut self, path: &str, from: usize, to: usize) -> Result<()> {
        let category = self
            .category_mut(path)
            .ok_or_else(|| PromptzError::NotFound(format!("category '{}'", path)))?;
        let len = category.prompts.len();
        if from >= len || to >= len {
            return Err(PromptzError::InvalidTarget(format!(
                "cannot reorder {} -> {} in a list of {}",
                from, to, len
            )));
        }
        if from == to {
            return Ok(());
        }
        let item = category.prompts.remove(from);
        category.prompts.insert(to, item);
        Ok(())
    }

    /// Drag-and-drop reorder: `slot` is a gap in the list as it was before
    /// the drag. Returns the index the prompt ended up at.
    pub fn drop_prompt_at(&mut self, path: &str, from: usize, slot: usize) -> Result<usize> {
        let len = self
            .category(path)
            .ok_or_else(|| PromptzError::NotFound(format!("category '{}'", path)))?
            .prompts
            .len();
        if slot > len {
            return Err(PromptzError::InvalidTarget(format!(
                "drop slot {} is past the end of a list of {}",
                slot, len
            )));
        }
        let to = if from < slot { slot - 1 } else { slot };
        self.reorder_prompt(path, from, to)?;
        Ok(to)
    }

    /// Bumps `usage_count` and `last_used` for every prompt whose text was
    /// emitted from the given category. Returns how many records changed.
    pub fn record_usage(&mut self, used: &[(String, String)]) -> usize {
        let now = Utc::now();
        let mut touched = 0;
        for (path, text) in used {
            if let Some(category) = self.category_mut(path) {
                for prompt in category.prompts.iter_mut().filter(|p| &p.prompt == text) {
                    prompt.record_use(now);
                    touched += 1;
                }
            }
        }
        touched
    }
}
