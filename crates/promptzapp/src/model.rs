//! # Domain Model: Prompts, Categories and the Library Document
//!
//! This module defines the records that make up a prompt library:
//! [`Prompt`], [`Category`], [`Settings`] and the [`LibraryDocument`] that
//! bundles them for persistence.
//!
//! ## Shape
//!
//! ```text
//! LibraryDocument
//! ├── settings        language, separator, theme_color
//! └── categories      ordered; order is significant for output
//!     └── prompts     ordered; order is significant for output
//! ```
//!
//! Each [`Category`] carries a full `/`-delimited path as its name, so the
//! hierarchy is implied by names rather than stored as nesting. See
//! [`crate::tree`] for the derived tree.
//!
//! ## Selection Key
//!
//! A prompt's `prompt` text doubles as its selection key. Two prompts with the
//! same text are indistinguishable to [`crate::selection`]; that is what
//! makes the rendered output purely a function of text and order.
//!
//! ## Optional Fields
//!
//! `image` and `last_used` are explicit `Option`s. Older documents stored a
//! missing image as `""` and sometimes omitted `id` or `created_at`; the
//! custom deserializer normalizes those on load.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// The category that always exists and can never be deleted or cleared.
pub const DEFAULT_CATEGORY: &str = "default";

/// Reserved name of the synthetic favorites category.
pub const FAVORITES_CATEGORY: &str = "__favorites__";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prompt {
    pub id: String,
    pub alias: String,
    /// Full prompt text. Also the selection key.
    pub prompt: String,
    pub description: String,
    pub image: Option<String>,
    pub tags: BTreeSet<String>,
    pub favorite: bool,
    pub created_at: DateTime<Utc>,
    pub usage_count: u64,
    pub last_used: Option<DateTime<Utc>>,
}

impl<'de> Deserialize<'de> for Prompt {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let helper = PromptHelper::deserialize(deserializer)?;

        Ok(Prompt {
            id: helper
                .id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(new_prompt_id),
            alias: helper.alias,
            prompt: helper.prompt,
            description: helper.description,
            image: helper.image.filter(|image| !image.is_empty()),
            tags: helper.tags,
            favorite: helper.favorite,
            created_at: helper.created_at.unwrap_or_else(Utc::now),
            usage_count: helper.usage_count,
            last_used: helper.last_used,
        })
    }
}

#[derive(Deserialize)]
struct PromptHelper {
    #[serde(default)]
    id: Option<String>,
    alias: String,
    prompt: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    tags: BTreeSet<String>,
    #[serde(default)]
    favorite: bool,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    usage_count: u64,
    #[serde(default)]
    last_used: Option<DateTime<Utc>>,
}

pub fn new_prompt_id() -> String {
    Uuid::new_v4().to_string()
}

impl Prompt {
    /// Builds a fresh record from a draft. Validation happens in the library
    /// before this is called.
    pub fn from_draft(draft: PromptDraft) -> Self {
        Self {
            id: new_prompt_id(),
            alias: draft.alias.trim().to_string(),
            prompt: draft.prompt,
            description: draft.description,
            image: draft.image.filter(|image| !image.is_empty()),
            tags: draft.tags,
            favorite: draft.favorite,
            created_at: Utc::now(),
            usage_count: 0,
            last_used: None,
        }
    }

    pub fn apply_patch(&mut self, patch: PromptPatch) {
        if let Some(alias) = patch.alias {
            self.alias = alias.trim().to_string();
        }
        if let Some(prompt) = patch.prompt {
            self.prompt = prompt;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(image) = patch.image {
            self.image = image.filter(|image| !image.is_empty());
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        if let Some(favorite) = patch.favorite {
            self.favorite = favorite;
        }
    }

    pub fn record_use(&mut self, at: DateTime<Utc>) {
        self.usage_count += 1;
        self.last_used = Some(at);
    }

    /// Case-insensitive substring match over alias, text, description and tags.
    /// `needle` must already be lowercased.
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        self.alias.to_lowercase().contains(needle)
            || self.prompt.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
            || self.tags.iter().any(|t| t.to_lowercase().contains(needle))
    }
}

/// Input for creating a prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptDraft {
    pub alias: String,
    pub prompt: String,
    pub description: String,
    pub image: Option<String>,
    pub tags: BTreeSet<String>,
    pub favorite: bool,
}

impl PromptDraft {
    pub fn new(alias: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn favorite(mut self, favorite: bool) -> Self {
        self.favorite = favorite;
        self
    }
}

/// Partial update for an existing prompt. `None` leaves a field untouched;
/// `image: Some(None)` clears the image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptPatch {
    pub alias: Option<String>,
    pub prompt: Option<String>,
    pub description: Option<String>,
    pub image: Option<Option<String>>,
    pub tags: Option<BTreeSet<String>>,
    pub favorite: Option<bool>,
}

impl PromptPatch {
    pub fn favorite(favorite: bool) -> Self {
        Self {
            favorite: Some(favorite),
            ..Default::default()
        }
    }

    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: Some(prompt.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    #[serde(default)]
    pub prompts: Vec<Prompt>,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prompts: Vec::new(),
        }
    }

    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.prompts.iter().position(|p| p.id == id)
    }

    pub fn contains_text(&self, text: &str) -> bool {
        self.prompts.iter().any(|p| p.prompt == text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_separator")]
    pub separator: String,
    #[serde(default = "default_theme_color")]
    pub theme_color: String,
}

pub(crate) fn default_language() -> String {
    "en".to_string()
}

pub(crate) fn default_separator() -> String {
    ", ".to_string()
}

pub(crate) fn default_theme_color() -> String {
    "#4a90d9".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            language: default_language(),
            separator: default_separator(),
            theme_color: default_theme_color(),
        }
    }
}

/// The whole library as exchanged with the persistence bridge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryDocument {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub settings: Settings,
}
