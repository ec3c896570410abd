//! # API Facade
//!
//! [`PromptzApi`] is the single entry point a UI talks to. It owns the
//! [`Library`], the widget's [`Selection`] and the category the widget is
//! showing, and it talks to a [`PersistenceBridge`].
//!
//! ## Role and Responsibilities
//!
//! The facade:
//! - **Dispatches** to library, selection and favorites operations
//! - **Keeps them in step**: calls the selection hooks after every structural
//!   edit (rename, delete, clear, prompt text change, removal, move)
//! - **Persists**: issues the matching bridge call after each mutation
//!
//! It holds no business logic of its own and never formats user messages.
//!
//! ## Persistence Policy
//!
//! Mutations are applied locally first. If the bridge then fails, the facade
//! restores the library, selection and selected category it had before the
//! call and returns [`PromptzError::Persistence`]. The local model therefore
//! never runs ahead of the last successful write.
//!
//! Two exceptions:
//! - Reorders are fire-and-forget. A failed `reorder_remote` is logged and the
//!   local order stands.
//! - When a structural edit also changes the selection, the library write
//!   decides success. A failing widget-state write afterwards is logged only.
//!
//! Local validation errors are raised before anything is touched, so they
//! never reach the bridge.
//!
//! ## Generic Over PersistenceBridge
//!
//! - Production: `PromptzApi<FsBackend>` (see [`crate::init`])
//! - Testing: `PromptzApi<MemBackend>`

use crate::config::PromptzConfig;
use crate::error::{PromptzError, Result};
use crate::favorites;
use crate::library::{Library, PromptRef, PromptUpdate, RenameOutcome};
use crate::model::{Prompt, PromptDraft, PromptPatch, Settings, DEFAULT_CATEGORY};
use crate::path::{is_ancestor_or_self, rebase_path};
use crate::selection::{self, Selection, SelectionMode, WidgetState};
use crate::store::PersistenceBridge;
use crate::tree::CategoryTreeNode;

struct Snapshot {
    library: Library,
    selection: Selection,
    selected_category: String,
}

fn into_persistence(err: PromptzError) -> PromptzError {
    match err {
        PromptzError::Persistence(_) => err,
        other => PromptzError::Persistence(other.to_string()),
    }
}

pub struct PromptzApi<B: PersistenceBridge> {
    library: Library,
    selection: Selection,
    selected_category: String,
    bridge: B,
}

impl<B: PersistenceBridge> PromptzApi<B> {
    pub fn new(bridge: B, library: Library, selection: Selection) -> Self {
        Self {
            library,
            selection,
            selected_category: DEFAULT_CATEGORY.to_string(),
            bridge,
        }
    }

    /// Loads the library and widget state from `bridge`. A bridge with no
    /// stored library starts from an empty one using the configured settings.
    pub fn load(bridge: B, config: &PromptzConfig) -> Result<Self> {
        let library = match bridge.load_library()? {
            Some(document) => Library::from_document(document),
            None => Library::with_settings(config.settings()),
        };
        let mut api = Self::new(bridge, library, Selection::new(config.selection_mode()));

        if let Some(state) = api.bridge.load_widget_state()? {
            api.selected_category = state.restore(&api.library, &mut api.selection);
        }
        tracing::debug!(
            "loaded {} categories, {} selected",
            api.library.categories().len(),
            api.selection.total()
        );
        Ok(api)
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    pub fn selected_category(&self) -> &str {
        &self.selected_category
    }

    pub fn tree(&self) -> Vec<CategoryTreeNode> {
        self.library.tree()
    }

    pub fn settings(&self) -> &Settings {
        self.library.settings()
    }

    // --- Persistence plumbing ---

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            library: self.library.clone(),
            selection: self.selection.clone(),
            selected_category: self.selected_category.clone(),
        }
    }

    fn rollback(&mut self, snapshot: Snapshot) {
        self.library = snapshot.library;
        self.selection = snapshot.selection;
        self.selected_category = snapshot.selected_category;
    }

    fn widget_state(&self) -> WidgetState {
        WidgetState::capture(&self.selection, &self.selected_category)
    }

    /// Runs the bridge write for a structural edit already applied locally.
    fn commit<F>(&mut self, snapshot: Snapshot, what: &str, write: F) -> Result<()>
    where
        F: FnOnce(&B, &Library) -> Result<()>,
    {
        if let Err(err) = write(&self.bridge, &self.library) {
            tracing::warn!("{} failed to persist, rolling back: {}", what, err);
            self.rollback(snapshot);
            return Err(into_persistence(err));
        }
        tracing::debug!("{} persisted", what);

        let widget_changed = snapshot.selection != self.selection
            || snapshot.selected_category != self.selected_category;
        if widget_changed {
            if let Err(err) = self.bridge.save_widget_state(&self.widget_state()) {
                tracing::warn!("widget state not saved after {}: {}", what, err);
            }
        }
        Ok(())
    }

    fn commit_library(&mut self, snapshot: Snapshot, what: &str) -> Result<()> {
        self.commit(snapshot, what, |bridge, library| {
            bridge.save_library(&library.to_document())
        })
    }

    /// Persists a selection-only change, rolling the selection back on failure.
    fn commit_selection(&mut self, snapshot: Snapshot, what: &str) -> Result<()> {
        if snapshot.selection == self.selection
            && snapshot.selected_category == self.selected_category
        {
            return Ok(());
        }
        if let Err(err) = self.bridge.save_widget_state(&self.widget_state()) {
            tracing::warn!("{} failed to persist, rolling back: {}", what, err);
            self.rollback(snapshot);
            return Err(into_persistence(err));
        }
        Ok(())
    }

    /// Replaces the local library with the stored one and drops selection
    /// keys for categories that no longer exist.
    pub fn reload(&mut self) -> Result<()> {
        let Some(document) = self.bridge.load_library().map_err(into_persistence)? else {
            return Ok(());
        };
        self.library = Library::from_document(document);
        let library = &self.library;
        self.selection.retain_categories(|key| library.contains(key));
        if !favorites::is_favorites_view(&self.selected_category)
            && !self.library.contains(&self.selected_category)
        {
            self.selected_category = DEFAULT_CATEGORY.to_string();
        }
        tracing::info!("reloaded library ({} categories)", self.library.categories().len());
        Ok(())
    }

    // --- Categories ---

    pub fn create_category(&mut self, path: &str) -> Result<()> {
        let snapshot = self.snapshot();
        self.library.create_category(path)?;
        self.commit_library(snapshot, "create category")
    }

    pub fn rename_category(&mut self, old_path: &str, new_leaf: &str) -> Result<RenameOutcome> {
        let snapshot = self.snapshot();
        let outcome = self.library.rename_category(old_path, new_leaf)?;
        if outcome.is_noop() {
            return Ok(outcome);
        }

        self.selection
            .on_category_renamed(&outcome.old_path, &outcome.new_path);
        if is_ancestor_or_self(&outcome.old_path, &self.selected_category) {
            self.selected_category =
                rebase_path(&outcome.old_path, &outcome.new_path, &self.selected_category);
        }

        self.commit_library(snapshot, "rename category")?;
        Ok(outcome)
    }

    /// Deletes a category and its descendants. Returns the removed names.
    pub fn delete_category(&mut self, path: &str) -> Result<Vec<String>> {
        let snapshot = self.snapshot();
        let removed = self.library.delete_category(path)?;
        self.selection.on_category_deleted(&removed);
        if removed.contains(&self.selected_category) {
            self.selected_category = DEFAULT_CATEGORY.to_string();
        }

        self.commit(snapshot, "delete category", |bridge, _| {
            bridge.delete_category_remote(path)
        })?;
        Ok(removed)
    }

    pub fn clear_category(&mut self, path: &str) -> Result<Vec<Prompt>> {
        let snapshot = self.snapshot();
        let removed = self.library.clear_category(path)?;
        self.selection.deselect_all(path);
        self.commit_library(snapshot, "clear category")?;
        Ok(removed)
    }

    // --- Prompts ---

    pub fn add_prompt(&mut self, path: &str, draft: PromptDraft) -> Result<Prompt> {
        let snapshot = self.snapshot();
        let prompt = self.library.add_prompt(path, draft)?;
        self.commit_library(snapshot, "add prompt")?;
        Ok(prompt)
    }

    pub fn update_prompt(&mut self, path: &str, id: &str, patch: PromptPatch) -> Result<PromptUpdate> {
        let snapshot = self.snapshot();
        let update = self.library.update_prompt(path, id, patch)?;
        if update.text_changed() {
            let old_still_present = self
                .library
                .category(path)
                .is_some_and(|c| c.contains_text(&update.before.prompt));
            self.selection.on_prompt_text_changed(
                path,
                &update.before.prompt,
                &update.after.prompt,
                old_still_present,
            );
        }
        self.commit_library(snapshot, "update prompt")?;
        Ok(update)
    }

    pub fn delete_prompt(&mut self, path: &str, id: &str) -> Result<Prompt> {
        self.delete_prompts(path, &[id.to_string()])?
            .pop()
            .ok_or_else(|| PromptzError::NotFound(format!("prompt '{}'", id)))
    }

    pub fn delete_prompts(&mut self, path: &str, ids: &[String]) -> Result<Vec<Prompt>> {
        let snapshot = self.snapshot();
        let removed = self.library.delete_prompts(path, ids)?;
        for prompt in &removed {
            let still_present = self
                .library
                .category(path)
                .is_some_and(|c| c.contains_text(&prompt.prompt));
            self.selection
                .on_prompt_removed(path, &prompt.prompt, still_present);
        }

        self.commit(snapshot, "delete prompts", |bridge, _| {
            bridge.batch_delete_prompts(path, ids)
        })?;
        Ok(removed)
    }

    pub fn move_prompt(&mut self, source: &str, dest: &str, id: &str) -> Result<Prompt> {
        self.move_prompts(source, dest, &[id.to_string()])?
            .pop()
            .ok_or_else(|| PromptzError::NotFound(format!("prompt '{}'", id)))
    }

    /// Moves prompts and adopts the category list the bridge returns.
    pub fn move_prompts(&mut self, source: &str, dest: &str, ids: &[String]) -> Result<Vec<Prompt>> {
        let snapshot = self.snapshot();
        let moved = self.library.move_prompts(source, dest, ids)?;
        if moved.is_empty() {
            return Ok(moved);
        }
        for prompt in &moved {
            let still_in_source = self
                .library
                .category(source)
                .is_some_and(|c| c.contains_text(&prompt.prompt));
            self.selection
                .on_prompt_moved(source, dest, &prompt.prompt, still_in_source);
        }

        let remote = match self.bridge.batch_move_prompts(source, dest, ids) {
            Ok(categories) => categories,
            Err(err) => {
                tracing::warn!("move prompts failed to persist, rolling back: {}", err);
                self.rollback(snapshot);
                return Err(into_persistence(err));
            }
        };
        self.library.replace_categories(remote);
        self.commit(snapshot, "move prompts", |_, _| Ok(()))?;
        Ok(moved)
    }

    /// Local order is authoritative; the remote write is best effort.
    pub fn reorder_prompt(&mut self, path: &str, from: usize, to: usize) -> Result<()> {
        self.library.reorder_prompt(path, from, to)?;
        self.push_order(path);
        Ok(())
    }

    /// Drag-and-drop variant of [`Self::reorder_prompt`]; see
    /// [`Library::drop_prompt_at`].
    pub fn drop_prompt_at(&mut self, path: &str, from: usize, slot: usize) -> Result<usize> {
        let index = self.library.drop_prompt_at(path, from, slot)?;
        self.push_order(path);
        Ok(index)
    }

    fn push_order(&self, path: &str) {
        let ordered: Vec<String> = self
            .library
            .category(path)
            .map(|c| c.prompts.iter().map(|p| p.id.clone()).collect())
            .unwrap_or_default();
        if let Err(err) = self.bridge.reorder_remote(path, &ordered) {
            tracing::warn!("reorder of '{}' not persisted: {}", path, err);
        }
    }

    pub fn search(&self, query: &str, tag: Option<&str>) -> Vec<PromptRef<'_>> {
        self.library.search(query, tag)
    }

    pub fn set_settings(&mut self, settings: Settings) -> Result<()> {
        let snapshot = self.snapshot();
        self.library.set_settings(settings);
        self.commit_library(snapshot, "update settings")
    }

    // --- Favorites ---

    pub fn list_favorites(&self) -> Vec<PromptRef<'_>> {
        favorites::list_favorites(&self.library)
    }

    pub fn toggle_favorite(&mut self, source: &str, id: &str) -> Result<PromptUpdate> {
        let snapshot = self.snapshot();
        let update = favorites::toggle_favorite(&mut self.library, source, id)?;
        self.commit_library(snapshot, "toggle favorite")?;
        Ok(update)
    }

    pub fn move_favorites_to_top(&mut self, path: &str) -> Result<()> {
        let snapshot = self.snapshot();
        favorites::move_favorites_to_top(&mut self.library, path)?;
        self.commit_library(snapshot, "move favorites to top")
    }

    // --- Selection ---

    /// Changes the mode for this instance; existing selections are kept.
    pub fn set_selection_mode(&mut self, mode: SelectionMode) {
        self.selection.set_mode(mode);
    }

    /// Switches the category the widget shows. `__favorites__` is accepted.
    pub fn select_category(&mut self, path: &str) -> Result<()> {
        if !favorites::is_favorites_view(path) && !self.library.contains(path) {
            return Err(PromptzError::NotFound(format!("category '{}'", path)));
        }
        let snapshot = self.snapshot();
        self.selected_category = path.to_string();
        self.commit_selection(snapshot, "select category")
    }

    pub fn toggle(&mut self, category: &str, value: &str) -> Result<bool> {
        if favorites::is_favorites_view(category) {
            return Err(PromptzError::ProtectedOperation(
                "select favorites through their source category".to_string(),
            ));
        }
        let snapshot = self.snapshot();
        let selected = self.selection.toggle(category, value);
        self.commit_selection(snapshot, "toggle")?;
        Ok(selected)
    }

    /// Toggles a prompt by id in its source category. This is how the
    /// favorites view selects.
    pub fn toggle_prompt(&mut self, id: &str) -> Result<bool> {
        let found = self
            .library
            .find_prompt(id)
            .ok_or_else(|| PromptzError::NotFound(format!("prompt '{}'", id)))?;
        let (category, value) = (found.category.to_string(), found.prompt.prompt.clone());
        self.toggle(&category, &value)
    }

    pub fn select_all(&mut self, category: &str) -> Result<()> {
        let values: Vec<String> = self
            .library
            .category(category)
            .ok_or_else(|| PromptzError::NotFound(format!("category '{}'", category)))?
            .prompts
            .iter()
            .map(|p| p.prompt.clone())
            .collect();
        let snapshot = self.snapshot();
        self.selection.select_all(category, values);
        self.commit_selection(snapshot, "select all")
    }

    pub fn deselect_all(&mut self, category: &str) -> Result<()> {
        let snapshot = self.snapshot();
        self.selection.deselect_all(category);
        self.commit_selection(snapshot, "deselect all")
    }

    pub fn clear_selection_subtree(&mut self, category: &str) -> Result<usize> {
        let snapshot = self.snapshot();
        let cleared = self.selection.clear_subtree(category);
        self.commit_selection(snapshot, "clear subtree")?;
        Ok(cleared)
    }

    pub fn clear_selection(&mut self) -> Result<()> {
        let snapshot = self.snapshot();
        self.selection.clear_all();
        self.commit_selection(snapshot, "clear selection")
    }

    pub fn count_in_subtree(&self, category: &str) -> usize {
        self.selection.count_in_subtree(category)
    }

    // --- Output ---

    /// Renders the selection with the library's separator.
    pub fn render_output(&self) -> String {
        self.render_output_with(&self.library.settings().separator)
    }

    pub fn render_output_with(&self, separator: &str) -> String {
        selection::render_output(&self.library, &self.selection, separator)
    }

    /// Renders the output and records a use of every prompt in it.
    pub fn render_and_record(&mut self) -> Result<String> {
        let output = self.render_output();
        let pairs = selection::selected_pairs(&self.library, &self.selection);
        if pairs.is_empty() {
            return Ok(output);
        }
        let snapshot = self.snapshot();
        self.library.record_usage(&pairs);
        self.commit_library(snapshot, "record usage")?;
        Ok(output)
    }
}
