//! # Selection Engine
//!
//! [`Selection`] tracks which prompts are selected, per category, keyed by
//! prompt *text* rather than id. It is an explicit state object: each widget
//! (or test) owns its own instance.
//!
//! ## Modes
//!
//! - [`SelectionMode::Multi`]: each category's set is independent and unbounded.
//! - [`SelectionMode::Single`]: at most one (category, text) pair is selected
//!   across the whole state. Toggling clears everything first; toggling the
//!   sole selected pair is a pure deselect.
//!
//! Switching modes never touches existing selections. A state carried over
//! from multi mode collapses on the next single-mode toggle.
//!
//! ## Invariant
//!
//! A category key is present only while its set is non-empty. Every method
//! that can empty a set prunes the key before returning.
//!
//! ## Keeping in step with the library
//!
//! The `on_*` hooks must be called after the matching library mutation:
//! rename and delete of categories, prompt text changes, removals and moves.
//! [`crate::api::PromptzApi`] does this for every operation it exposes.

use crate::error::{PromptzError, Result};
use crate::path::{is_ancestor_or_self, rebase_path};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

pub mod output;

pub use output::{render_output, selected_pairs, WidgetState};

/// Serialized selection: category path → selected prompt texts. Empty
/// categories are omitted. List order carries no meaning.
pub type SelectionBlob = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    Single,
    #[default]
    Multi,
}

impl FromStr for SelectionMode {
    type Err = PromptzError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(SelectionMode::Single),
            "multi" | "multiple" => Ok(SelectionMode::Multi),
            other => Err(PromptzError::Validation(format!(
                "unknown selection mode '{}' (expected 'single' or 'multi')",
                other
            ))),
        }
    }
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionMode::Single => write!(f, "single"),
            SelectionMode::Multi => write!(f, "multi"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    mode: SelectionMode,
    state: BTreeMap<String, BTreeSet<String>>,
}

impl Selection {
    pub fn new(mode: SelectionMode) -> Self {
        Self {
            mode,
            state: BTreeMap::new(),
        }
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: SelectionMode) {
        self.mode = mode;
    }

    pub fn state(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.state
    }

    pub fn selected_in(&self, category: &str) -> Option<&BTreeSet<String>> {
        self.state.get(category)
    }

    pub fn is_selected(&self, category: &str, value: &str) -> bool {
        self.state
            .get(category)
            .is_some_and(|set| set.contains(value))
    }

    /// Total number of selected (category, value) pairs.
    pub fn total(&self) -> usize {
        self.state.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    /// Flips one pair according to the current mode. Returns whether the pair
    /// is selected afterwards.
    pub fn toggle(&mut self, category: &str, value: &str) -> bool {
        match self.mode {
            SelectionMode::Multi => {
                let set = self.state.entry(category.to_string()).or_default();
                let selected = if set.remove(value) {
                    false
                } else {
                    set.insert(value.to_string());
                    true
                };
                self.prune(category);
                selected
            }
            SelectionMode::Single => {
                let was_sole = self.total() == 1 && self.is_selected(category, value);
                self.state.clear();
                if was_sole {
                    false
                } else {
                    self.insert(category, value);
                    true
                }
            }
        }
    }

    /// Selects every value in `values` for `category`. In single mode only the
    /// first value is kept, replacing whatever was selected anywhere.
    pub fn select_all<I, T>(&mut self, category: &str, values: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        match self.mode {
            SelectionMode::Multi => {
                let set = self.state.entry(category.to_string()).or_default();
                set.extend(values.into_iter().map(Into::into));
                self.prune(category);
            }
            SelectionMode::Single => {
                if let Some(first) = values.into_iter().next() {
                    self.state.clear();
                    self.insert(category, &first.into());
                }
            }
        }
    }

    pub fn deselect_all(&mut self, category: &str) {
        self.state.remove(category);
    }

    pub fn clear_category(&mut self, category: &str) {
        self.deselect_all(category);
    }

    /// Clears `category` and every descendant. Returns how many pairs were
    /// dropped.
    pub fn clear_subtree(&mut self, category: &str) -> usize {
        let before = self.total();
        self.state
            .retain(|key, _| !is_ancestor_or_self(category, key));
        before - self.total()
    }

    pub fn clear_all(&mut self) {
        self.state.clear();
    }

    /// Selected pairs in `category` and all of its descendants.
    pub fn count_in_subtree(&self, category: &str) -> usize {
        self.state
            .iter()
            .filter(|(key, _)| is_ancestor_or_self(category, key))
            .map(|(_, set)| set.len())
            .sum()
    }

    /// Rebases every key at or under `old_path`.
    pub fn on_category_renamed(&mut self, old_path: &str, new_path: &str) {
        let moved: Vec<String> = self
            .state
            .keys()
            .filter(|key| is_ancestor_or_self(old_path, key))
            .cloned()
            .collect();
        for key in moved {
            if let Some(set) = self.state.remove(&key) {
                self.state
                    .entry(rebase_path(old_path, new_path, &key))
                    .or_default()
                    .extend(set);
            }
        }
    }

    pub fn on_category_deleted<S: AsRef<str>>(&mut self, removed_paths: &[S]) {
        for path in removed_paths {
            self.state.remove(path.as_ref());
        }
    }

    /// Follows a prompt whose text changed. `old_still_present` is whether
    /// another prompt in the category still carries the old text.
    pub fn on_prompt_text_changed(
        &mut self,
        category: &str,
        old_value: &str,
        new_value: &str,
        old_still_present: bool,
    ) {
        if !self.is_selected(category, old_value) {
            return;
        }
        self.follow(category, old_value, category, new_value, old_still_present);
    }

    /// Drops `value` from `category` unless another prompt there still has it.
    pub fn on_prompt_removed(&mut self, category: &str, value: &str, still_present: bool) {
        if !still_present {
            self.remove(category, value);
        }
    }

    /// Carries a selected value along with a moved prompt.
    pub fn on_prompt_moved(
        &mut self,
        source: &str,
        dest: &str,
        value: &str,
        still_in_source: bool,
    ) {
        if !self.is_selected(source, value) {
            return;
        }
        self.follow(source, value, dest, value, still_in_source);
    }

    /// Moves a selected pair to where its prompt went. In single mode the new
    /// pair replaces the whole state, even when a twin keeps the old one valid.
    fn follow(&mut self, from: &str, old_value: &str, to: &str, new_value: &str, keep_old: bool) {
        match self.mode {
            SelectionMode::Multi => {
                if !keep_old {
                    self.remove(from, old_value);
                }
                self.insert(to, new_value);
            }
            SelectionMode::Single => {
                self.state.clear();
                self.insert(to, new_value);
            }
        }
    }

    /// Drops keys for categories that no longer exist.
    pub fn retain_categories<F>(&mut self, mut exists: F)
    where
        F: FnMut(&str) -> bool,
    {
        self.state.retain(|key, _| exists(key));
    }

    pub fn serialize(&self) -> SelectionBlob {
        self.state
            .iter()
            .filter(|(_, set)| !set.is_empty())
            .map(|(key, set)| (key.clone(), set.iter().cloned().collect()))
            .collect()
    }

    /// Replaces the state with `blob`. The mode is left as is; in single mode
    /// a blob holding several pairs collapses to its first one in key order.
    pub fn deserialize(&mut self, blob: SelectionBlob) {
        self.state = blob
            .into_iter()
            .map(|(key, values)| (key, values.into_iter().collect::<BTreeSet<_>>()))
            .filter(|(_, set)| !set.is_empty())
            .collect();
        if self.mode == SelectionMode::Single {
            self.collapse_to_first();
        }
    }

    fn collapse_to_first(&mut self) {
        let first = self
            .state
            .iter()
            .next()
            .and_then(|(key, set)| set.iter().next().map(|value| (key.clone(), value.clone())));
        self.state.clear();
        if let Some((key, value)) = first {
            self.insert(&key, &value);
        }
    }

    fn insert(&mut self, category: &str, value: &str) {
        self.state
            .entry(category.to_string())
            .or_default()
            .insert(value.to_string());
    }

    fn remove(&mut self, category: &str, value: &str) {
        if let Some(set) = self.state.get_mut(category) {
            set.remove(value);
        }
        self.prune(category);
    }

    fn prune(&mut self, category: &str) {
        if self.state.get(category).is_some_and(BTreeSet::is_empty) {
            self.state.remove(category);
        }
    }
}
