//! # Configuration
//!
//! Promptz configuration is managed by [`clapfig`], which handles layered
//! loading from TOML files, environment variables, and programmatic overrides.
//!
//! ## Storage Hierarchy
//!
//! Configuration is resolved in priority order:
//! 1. **Environment variables**: `PROMPTZ__SEPARATOR`, `PROMPTZ__SELECTION_MODE`, etc.
//! 2. **Data dir config**: `<data dir>/promptz.toml`.
//! 3. **Compiled Defaults**: Built-in fallbacks via `#[config(default = ...)]`.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `separator` | `", "` | Joins selected prompts in the rendered output |
//! | `selection_mode` | `multi` | `single` or `multi` |
//! | `language` | `en` | UI language tag |
//! | `theme_color` | `#4a90d9` | UI accent color |
//!
//! `separator`, `language` and `theme_color` seed the [`Settings`] of a library
//! created from scratch. A library loaded from storage keeps its own.

use crate::model::Settings;
use crate::selection::SelectionMode;
use confique::Config;
use serde::{Deserialize, Serialize};

/// Configuration for promptz, stored in `promptz.toml`.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PromptzConfig {
    /// Separator placed between selected prompts in the output
    #[config(default = ", ")]
    pub separator: String,

    /// "single" or "multi"
    #[config(default = "multi")]
    pub selection_mode: String,

    #[config(default = "en")]
    pub language: String,

    #[config(default = "#4a90d9")]
    pub theme_color: String,
}

impl Default for PromptzConfig {
    fn default() -> Self {
        let settings = Settings::default();
        Self {
            separator: settings.separator,
            selection_mode: SelectionMode::Multi.to_string(),
            language: settings.language,
            theme_color: settings.theme_color,
        }
    }
}

impl PromptzConfig {
    /// Parsed selection mode. Unknown values fall back to multi.
    pub fn selection_mode(&self) -> SelectionMode {
        match self.selection_mode.parse() {
            Ok(mode) => mode,
            Err(err) => {
                tracing::warn!("{}; using multi", err);
                SelectionMode::Multi
            }
        }
    }

    /// Library settings for a document created from scratch.
    pub fn settings(&self) -> Settings {
        Settings {
            language: self.language.clone(),
            separator: self.separator.clone(),
            theme_color: self.theme_color.clone(),
        }
    }
}
