//! # Library Store
//!
//! [`Library`] owns the canonical in-memory document: an ordered list of
//! categories, each holding an ordered list of prompts, plus global
//! [`Settings`]. Both orders are significant: they define the order of the
//! rendered output (see [`crate::selection`]).
//!
//! ## Mutations
//!
//! - [`categories`]: create, rename (with cascade), delete (with cascade), clear
//! - [`prompts`]: add, update, delete, move, reorder, batch variants, usage
//!
//! Every mutation validates fully before touching the document, so a rejected
//! call leaves the library exactly as it was. Operations that affect selection
//! keys (rename, delete, prompt text changes) return enough information for the
//! caller to keep [`crate::selection::Selection`] in step; the
//! [`crate::api::PromptzApi`] facade does that wiring.
//!
//! ## Invariants
//!
//! - Category names are unique.
//! - `default` always exists.
//! - `__favorites__` (and anything under it) never exists as a real category.
//! - Prompt ids are unique across the whole library.
//!
//! Adopted documents (loaded, or returned by the bridge) are normalized to
//! these on the way in: duplicate categories merge into the first occurrence,
//! reserved categories are dropped, and duplicate prompt ids get fresh ones.
//! Path segment rules apply to names created through the library; stored
//! names are kept as they are.

use crate::model::{new_prompt_id, Category, LibraryDocument, Prompt, Settings, DEFAULT_CATEGORY};
use crate::path::is_ancestor_or_self;
use crate::tree::{build_tree, CategoryTreeNode};
use categories::check_not_reserved;
use std::collections::{BTreeSet, HashSet};

pub mod categories;
pub mod prompts;

pub use categories::RenameOutcome;
pub use prompts::PromptUpdate;

/// A prompt together with the category it lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptRef<'a> {
    pub category: &'a str,
    pub prompt: &'a Prompt,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Library {
    categories: Vec<Category>,
    settings: Settings,
}

impl Default for Library {
    fn default() -> Self {
        Self::new()
    }
}

impl Library {
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self {
            categories: vec![Category::new(DEFAULT_CATEGORY)],
            settings,
        }
    }

    /// Adopts a loaded document, normalizing it and inserting `default` at
    /// the front when the document lacks it.
    pub fn from_document(document: LibraryDocument) -> Self {
        let mut library = Self::with_settings(document.settings);
        library.adopt(document.categories);
        library
    }

    pub fn to_document(&self) -> LibraryDocument {
        LibraryDocument {
            categories: self.categories.clone(),
            settings: self.settings.clone(),
        }
    }

    fn ensure_default(&mut self) {
        if !self.contains(DEFAULT_CATEGORY) {
            self.categories.insert(0, Category::new(DEFAULT_CATEGORY));
        }
    }

    fn adopt(&mut self, categories: Vec<Category>) {
        let mut adopted: Vec<Category> = Vec::with_capacity(categories.len());
        let mut seen_ids = HashSet::new();
        for mut category in categories {
            if check_not_reserved(&category.name).is_err() {
                tracing::warn!("dropping reserved category '{}' from document", category.name);
                continue;
            }
            for prompt in &mut category.prompts {
                if !seen_ids.insert(prompt.id.clone()) {
                    prompt.id = new_prompt_id();
                    seen_ids.insert(prompt.id.clone());
                }
            }
            match adopted.iter_mut().find(|c| c.name == category.name) {
                Some(existing) => {
                    tracing::warn!("merging duplicate category '{}'", category.name);
                    existing.prompts.append(&mut category.prompts);
                }
                None => adopted.push(category),
            }
        }
        self.categories = adopted;
        self.ensure_default();
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category_names(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.position(path).is_some()
    }

    pub fn position(&self, path: &str) -> Option<usize> {
        self.categories.iter().position(|c| c.name == path)
    }

    pub fn category(&self, path: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == path)
    }

    pub(crate) fn category_mut(&mut self, path: &str) -> Option<&mut Category> {
        self.categories.iter_mut().find(|c| c.name == path)
    }

    pub fn prompt(&self, path: &str, id: &str) -> Option<&Prompt> {
        self.category(path)?.prompts.iter().find(|p| p.id == id)
    }

    /// Locates a prompt by id anywhere in the library.
    pub fn find_prompt(&self, id: &str) -> Option<PromptRef<'_>> {
        self.iter_prompts().find(|r| r.prompt.id == id)
    }

    /// All prompts in library order: category order outer, prompt order inner.
    pub fn iter_prompts(&self) -> impl Iterator<Item = PromptRef<'_>> {
        self.categories.iter().flat_map(|c| {
            c.prompts.iter().map(move |p| PromptRef {
                category: c.name.as_str(),
                prompt: p,
            })
        })
    }

    pub fn tree(&self) -> Vec<CategoryTreeNode> {
        build_tree(&self.categories)
    }

    /// Number of prompts in `path` and all of its descendants.
    pub fn prompt_count_in_subtree(&self, path: &str) -> usize {
        self.categories
            .iter()
            .filter(|c| is_ancestor_or_self(path, &c.name))
            .map(|c| c.prompts.len())
            .sum()
    }

    /// Sorted set of every tag in use.
    pub fn all_tags(&self) -> BTreeSet<&str> {
        self.iter_prompts()
            .flat_map(|r| r.prompt.tags.iter().map(String::as_str))
            .collect()
    }

    /// Prompts matching `query` (case-insensitive, over alias, text,
    /// description and tags), optionally restricted to those carrying `tag`.
    /// An empty query matches everything.
    pub fn search(&self, query: &str, tag: Option<&str>) -> Vec<PromptRef<'_>> {
        let needle = query.trim().to_lowercase();
        self.iter_prompts()
            .filter(|r| tag.map_or(true, |t| r.prompt.tags.contains(t)))
            .filter(|r| needle.is_empty() || r.prompt.matches_lowercase(&needle))
            .collect()
    }

    /// Replaces the category list wholesale, e.g. with an authoritative copy
    /// returned by the persistence bridge.
    pub(crate) fn replace_categories(&mut self, categories: Vec<Category>) {
        self.adopt(categories);
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use crate::model::PromptDraft;

    /// Builder for libraries used in tests.
    pub struct LibraryFixture {
        pub library: Library,
    }

    impl Default for LibraryFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl LibraryFixture {
        pub fn new() -> Self {
            Self {
                library: Library::new(),
            }
        }

        pub fn with_category(mut self, path: &str) -> Self {
            self.library.create_category(path).unwrap();
            self
        }

        /// Adds one prompt per text, using the text as alias too.
        pub fn with_prompts(mut self, path: &str, texts: &[&str]) -> Self {
            for text in texts {
                self.library
                    .add_prompt(path, PromptDraft::new(*text, *text))
                    .unwrap();
            }
            self
        }

        pub fn with_favorite(mut self, path: &str, text: &str) -> Self {
            self.library
                .add_prompt(path, PromptDraft::new(text, text).favorite(true))
                .unwrap();
            self
        }

        pub fn build(self) -> Library {
            self.library
        }
    }

    /// Ids of the prompts in `path`, in list order.
    pub fn ids(library: &Library, path: &str) -> Vec<String> {
        library
            .category(path)
            .map(|c| c.prompts.iter().map(|p| p.id.clone()).collect())
            .unwrap_or_default()
    }

    /// Texts of the prompts in `path`, in list order.
    pub fn texts<'a>(library: &'a Library, path: &str) -> Vec<&'a str> {
        library
            .category(path)
            .map(|c| c.prompts.iter().map(|p| p.prompt.as_str()).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::LibraryFixture;
    use super::*;
    use crate::model::PromptDraft;

    #[test]
    fn test_new_library_has_default() {
        let library = Library::new();
        assert_eq!(library.category_names(), vec!["default"]);
    }

    #[test]
    fn test_from_document_inserts_missing_default_first() {
        let doc = LibraryDocument {
            categories: vec![Category::new("art")],
            settings: Settings::default(),
        };
        let library = Library::from_document(doc);
        assert_eq!(library.category_names(), vec!["default", "art"]);
    }

    #[test]
    fn test_from_document_keeps_existing_default_position() {
        let doc = LibraryDocument {
            categories: vec![Category::new("art"), Category::new("default")],
            settings: Settings::default(),
        };
        let library = Library::from_document(doc);
        assert_eq!(library.category_names(), vec!["art", "default"]);
    }

    #[test]
    fn test_from_document_normalizes_stored_categories() {
        let shared = Prompt::from_draft(PromptDraft::new("s", "shared"));
        let mut twin = Prompt::from_draft(PromptDraft::new("t", "twin"));
        twin.id = shared.id.clone();

        let mut art = Category::new("art");
        art.prompts.push(shared.clone());
        let mut art_again = Category::new("art");
        art_again.prompts.push(twin);
        let mut view = Category::new("__favorites__");
        view.prompts.push(shared.clone());

        let library = Library::from_document(LibraryDocument {
            categories: vec![art, view, Category::new("__favorites__/x"), art_again],
            settings: Settings::default(),
        });

        assert_eq!(library.category_names(), vec!["default", "art"]);
        let merged = &library.category("art").unwrap().prompts;
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].id, shared.id);
        assert_ne!(merged[1].id, shared.id);
        assert_eq!(merged[1].prompt, "twin");
    }

    #[test]
    fn test_replace_categories_normalizes_too() {
        let mut library = Library::new();
        library.replace_categories(vec![Category::new("a"), Category::new("a")]);
        assert_eq!(library.category_names(), vec!["default", "a"]);
    }

    #[test]
    fn test_prompt_count_in_subtree() {
        let library = LibraryFixture::new()
            .with_prompts("art", &["a"])
            .with_prompts("art/sketch", &["b", "c"])
            .with_prompts("artwork", &["d"])
            .build();
        assert_eq!(library.prompt_count_in_subtree("art"), 3);
        assert_eq!(library.prompt_count_in_subtree("art/sketch"), 2);
        assert_eq!(library.prompt_count_in_subtree("missing"), 0);
    }

    #[test]
    fn test_search_by_text_and_tag() {
        let mut library = Library::new();
        library
            .add_prompt(
                "art",
                PromptDraft::new("Sketch", "pencil lines").with_tags(["bw"]),
            )
            .unwrap();
        library
            .add_prompt("art", PromptDraft::new("Paint", "oil on canvas"))
            .unwrap();

        let hits = library.search("PENCIL", None);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].category, "art");
        assert_eq!(hits[0].prompt.alias, "Sketch");

        assert_eq!(library.search("", Some("bw")).len(), 1);
        assert_eq!(library.search("", None).len(), 2);
        assert!(library.search("oil", Some("bw")).is_empty());
    }

    #[test]
    fn test_all_tags_sorted_and_unique() {
        let mut library = Library::new();
        library
            .add_prompt("default", PromptDraft::new("a", "a").with_tags(["z", "m"]))
            .unwrap();
        library
            .add_prompt("default", PromptDraft::new("b", "b").with_tags(["m", "a"]))
            .unwrap();
        let tags: Vec<&str> = library.all_tags().into_iter().collect();
        assert_eq!(tags, vec!["a", "m", "z"]);
    }

    #[test]
    fn test_find_prompt_reports_source_category() {
        let library = LibraryFixture::new().with_prompts("x/y", &["t"]).build();
        let id = library.category("x/y").unwrap().prompts[0].id.clone();
        let found = library.find_prompt(&id).unwrap();
        assert_eq!(found.category, "x/y");
    }
}
