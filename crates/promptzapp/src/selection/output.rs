//! Output rendering and persisted widget state.
//!
//! Rendering order is fixed by the library, never by the selection:
//! categories in library order, and inside each category the prompts in list
//! order, keeping only those whose text is selected. The same library and
//! selection always render to the same bytes.

use super::{Selection, SelectionBlob};
use crate::library::Library;
use crate::model::{DEFAULT_CATEGORY, FAVORITES_CATEGORY};
use serde::{Deserialize, Serialize};

/// (category, prompt text) pairs that make up the output, in output order.
pub fn selected_pairs(library: &Library, selection: &Selection) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for category in library.categories() {
        let Some(selected) = selection.selected_in(&category.name) else {
            continue;
        };
        pairs.extend(
            category
                .prompts
                .iter()
                .filter(|p| selected.contains(&p.prompt))
                .map(|p| (category.name.clone(), p.prompt.clone())),
        );
    }
    pairs
}

pub fn render_output(library: &Library, selection: &Selection, separator: &str) -> String {
    selected_pairs(library, selection)
        .into_iter()
        .map(|(_, text)| text)
        .collect::<Vec<_>>()
        .join(separator)
}

fn default_selected_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

/// Per-widget state persisted next to the library: the selection and the
/// category the widget was showing. Restored together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetState {
    #[serde(default)]
    pub selections: SelectionBlob,
    #[serde(default = "default_selected_category")]
    pub selected_category: String,
}

impl Default for WidgetState {
    fn default() -> Self {
        Self {
            selections: SelectionBlob::new(),
            selected_category: default_selected_category(),
        }
    }
}

impl WidgetState {
    pub fn capture(selection: &Selection, selected_category: &str) -> Self {
        Self {
            selections: selection.serialize(),
            selected_category: selected_category.to_string(),
        }
    }

    /// Loads the selection into `selection`, dropping keys for categories the
    /// library no longer has, and returns the category to show. A vanished
    /// category falls back to `default`. A single-mode selection keeps one
    /// surviving pair.
    pub fn restore(self, library: &Library, selection: &mut Selection) -> String {
        let mut selections = self.selections;
        selections.retain(|key, _| library.contains(key));
        selection.deserialize(selections);

        if self.selected_category == FAVORITES_CATEGORY
            || library.contains(&self.selected_category)
        {
            self.selected_category
        } else {
            default_selected_category()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::fixtures::LibraryFixture;
    use crate::selection::SelectionMode;

    #[test]
    fn test_output_follows_prompt_order_not_selection_order() {
        let library = LibraryFixture::new()
            .with_category("art/sketch")
            .with_category("art/paint")
            .with_prompts("art/sketch", &["x", "y"])
            .build();
        let mut selection = Selection::new(SelectionMode::Multi);
        selection.toggle("art/sketch", "y");
        selection.toggle("art/sketch", "x");

        assert_eq!(render_output(&library, &selection, ", "), "x, y");
    }

    #[test]
    fn test_output_follows_category_order() {
        let library = LibraryFixture::new()
            .with_prompts("zeta", &["z1", "z2"])
            .with_prompts("alpha", &["a1"])
            .with_prompts("default", &["d1"])
            .build();
        let mut selection = Selection::default();
        selection.select_all("alpha", ["a1"]);
        selection.select_all("zeta", ["z2", "z1"]);
        selection.select_all("default", ["d1"]);

        // default was created first, then zeta, then alpha
        assert_eq!(
            render_output(&library, &selection, " | "),
            "d1 | z1 | z2 | a1"
        );
    }

    #[test]
    fn test_output_is_stable_and_skips_stale_keys() {
        let library = LibraryFixture::new().with_prompts("a", &["x"]).build();
        let mut selection = Selection::default();
        selection.toggle("a", "x");
        selection.toggle("a", "gone");
        selection.toggle("missing", "x");

        let first = render_output(&library, &selection, ",");
        let second = render_output(&library, &selection, ",");
        assert_eq!(first, "x");
        assert_eq!(first, second);
    }

    #[test]
    fn test_selected_pairs_carry_category() {
        let library = LibraryFixture::new()
            .with_prompts("a", &["same"])
            .with_prompts("b", &["same"])
            .build();
        let mut selection = Selection::default();
        selection.toggle("b", "same");
        assert_eq!(
            selected_pairs(&library, &selection),
            vec![("b".to_string(), "same".to_string())]
        );
    }

    #[test]
    fn test_widget_state_json_layout() {
        let mut selection = Selection::default();
        selection.toggle("art", "x");
        let state = WidgetState::capture(&selection, "art");

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "selections": { "art": ["x"] },
                "selectedCategory": "art"
            })
        );
    }

    #[test]
    fn test_widget_state_restore_prunes_and_falls_back() {
        let library = LibraryFixture::new().with_prompts("kept", &["x"]).build();
        let mut blob = SelectionBlob::new();
        blob.insert("kept".into(), vec!["x".into()]);
        blob.insert("gone".into(), vec!["y".into()]);
        let state = WidgetState {
            selections: blob,
            selected_category: "gone".into(),
        };

        let mut selection = Selection::default();
        let shown = state.restore(&library, &mut selection);

        assert_eq!(shown, "default");
        assert!(selection.is_selected("kept", "x"));
        assert!(selection.selected_in("gone").is_none());
    }

    #[test]
    fn test_single_mode_restore_keeps_one_surviving_pair() {
        let library = LibraryFixture::new().with_prompts("b", &["y", "z"]).build();
        let mut blob = SelectionBlob::new();
        blob.insert("a".into(), vec!["gone".into()]);
        blob.insert("b".into(), vec!["y".into(), "z".into()]);
        let state = WidgetState {
            selections: blob,
            selected_category: "b".into(),
        };

        let mut selection = Selection::new(SelectionMode::Single);
        state.restore(&library, &mut selection);

        assert_eq!(selection.total(), 1);
        assert!(selection.is_selected("b", "y"));
    }

    #[test]
    fn test_widget_state_restore_keeps_favorites_view() {
        let library = LibraryFixture::new().build();
        let state = WidgetState {
            selections: SelectionBlob::new(),
            selected_category: FAVORITES_CATEGORY.into(),
        };
        let mut selection = Selection::default();
        assert_eq!(state.restore(&library, &mut selection), FAVORITES_CATEGORY);
    }

    #[test]
    fn test_widget_state_missing_fields_default() {
        let state: WidgetState = serde_json::from_str("{}").unwrap();
        assert_eq!(state, WidgetState::default());
    }
}
