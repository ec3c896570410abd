use super::{
    apply_delete_category, apply_delete_prompts, apply_move_prompts, apply_reorder,
    PersistenceBridge,
};
use crate::error::{PromptzError, Result};
use crate::model::{Category, LibraryDocument};
use crate::selection::WidgetState;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const LIBRARY_FILE: &str = "library.json";
pub const WIDGET_FILE: &str = "widget.json";

/// Persistence bridge over JSON files in one data directory.
///
/// Every write goes to a temporary file first and is renamed into place, so a
/// crash never leaves a half-written document behind.
pub struct FsBackend {
    root: PathBuf,
}

impl FsBackend {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn library_path(&self) -> PathBuf {
        self.root.join(LIBRARY_FILE)
    }

    pub fn widget_path(&self) -> PathBuf {
        self.root.join(WIDGET_FILE)
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(PromptzError::Io)?;
        }
        Ok(())
    }

    fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path).map_err(PromptzError::Io)?;
        let value = serde_json::from_str(&content).map_err(PromptzError::Serialization)?;
        Ok(Some(value))
    }

    fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        self.ensure_dir()?;
        let content = serde_json::to_string_pretty(value).map_err(PromptzError::Serialization)?;

        // Atomic Write
        let tmp_path = self.root.join(format!(".promptz-{}.tmp", Uuid::new_v4()));
        fs::write(&tmp_path, content).map_err(PromptzError::Io)?;
        fs::rename(&tmp_path, path).map_err(PromptzError::Io)?;

        tracing::debug!("wrote {}", path.display());
        Ok(())
    }

    fn update_library<T>(
        &self,
        f: impl FnOnce(&mut LibraryDocument) -> Result<T>,
    ) -> Result<T> {
        let mut document = self
            .read_json::<LibraryDocument>(&self.library_path())?
            .unwrap_or_default();
        let value = f(&mut document)?;
        self.write_json(&self.library_path(), &document)?;
        Ok(value)
    }
}

impl PersistenceBridge for FsBackend {
    fn load_library(&self) -> Result<Option<LibraryDocument>> {
        self.read_json(&self.library_path())
    }

    fn save_library(&self, document: &LibraryDocument) -> Result<()> {
        self.write_json(&self.library_path(), document)
    }

    fn delete_category_remote(&self, path: &str) -> Result<()> {
        self.update_library(|document| {
            apply_delete_category(document, path);
            Ok(())
        })
    }

    fn batch_delete_prompts(&self, category: &str, ids: &[String]) -> Result<()> {
        self.update_library(|document| apply_delete_prompts(document, category, ids))
    }

    fn batch_move_prompts(
        &self,
        source: &str,
        dest: &str,
        ids: &[String],
    ) -> Result<Vec<Category>> {
        self.update_library(|document| {
            apply_move_prompts(document, source, dest, ids)?;
            Ok(document.categories.clone())
        })
    }

    fn reorder_remote(&self, category: &str, ordered_ids: &[String]) -> Result<()> {
        self.update_library(|document| apply_reorder(document, category, ordered_ids))
    }

    fn load_widget_state(&self) -> Result<Option<WidgetState>> {
        self.read_json(&self.widget_path())
    }

    fn save_widget_state(&self, state: &WidgetState) -> Result<()> {
        self.write_json(&self.widget_path(), state)
    }
}
