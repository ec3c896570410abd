use super::{
    apply_delete_category, apply_delete_prompts, apply_move_prompts, apply_reorder,
    PersistenceBridge,
};
use crate::error::{PromptzError, Result};
use crate::model::{Category, LibraryDocument};
use crate::selection::WidgetState;
use std::cell::{Cell, RefCell};

/// In-memory persistence bridge.
///
/// Uses `RefCell` for interior mutability since the core is single-threaded.
/// Counts calls and can simulate failures, which makes it the bridge of
/// choice for tests.
#[derive(Default)]
pub struct MemBackend {
    document: RefCell<Option<LibraryDocument>>,
    widget: RefCell<Option<WidgetState>>,
    simulate_write_error: Cell<bool>,
    writes: Cell<usize>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(document: LibraryDocument) -> Self {
        let backend = Self::new();
        *backend.document.borrow_mut() = Some(document);
        backend
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.set(simulate);
    }

    /// Number of successful write calls of any kind.
    pub fn writes(&self) -> usize {
        self.writes.get()
    }

    /// Snapshot of the stored document.
    pub fn stored(&self) -> Option<LibraryDocument> {
        self.document.borrow().clone()
    }

    pub fn stored_widget(&self) -> Option<WidgetState> {
        self.widget.borrow().clone()
    }

    fn check_writable(&self) -> Result<()> {
        if self.simulate_write_error.get() {
            return Err(PromptzError::Persistence(
                "Simulated write error".to_string(),
            ));
        }
        Ok(())
    }

    fn with_stored<T>(&self, f: impl FnOnce(&mut LibraryDocument) -> Result<T>) -> Result<T> {
        self.check_writable()?;
        let mut stored = self.document.borrow_mut();
        let document = stored.get_or_insert_with(LibraryDocument::default);
        let value = f(document)?;
        self.writes.set(self.writes.get() + 1);
        Ok(value)
    }
}

impl PersistenceBridge for MemBackend {
    fn load_library(&self) -> Result<Option<LibraryDocument>> {
        Ok(self.document.borrow().clone())
    }

    fn save_library(&self, document: &LibraryDocument) -> Result<()> {
        self.with_stored(|stored| {
            *stored = document.clone();
            Ok(())
        })
    }

    fn delete_category_remote(&self, path: &str) -> Result<()> {
        self.with_stored(|stored| {
            apply_delete_category(stored, path);
            Ok(())
        })
    }

    fn batch_delete_prompts(&self, category: &str, ids: &[String]) -> Result<()> {
        self.with_stored(|stored| apply_delete_prompts(stored, category, ids))
    }

    fn batch_move_prompts(
        &self,
        source: &str,
        dest: &str,
        ids: &[String],
    ) -> Result<Vec<Category>> {
        self.with_stored(|stored| {
            apply_move_prompts(stored, source, dest, ids)?;
            Ok(stored.categories.clone())
        })
    }

    fn reorder_remote(&self, category: &str, ordered_ids: &[String]) -> Result<()> {
        self.with_stored(|stored| apply_reorder(stored, category, ordered_ids))
    }

    fn load_widget_state(&self) -> Result<Option<WidgetState>> {
        Ok(self.widget.borrow().clone())
    }

    fn save_widget_state(&self, state: &WidgetState) -> Result<()> {
        self.check_writable()?;
        *self.widget.borrow_mut() = Some(state.clone());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::library::Library;

    #[test]
    fn test_empty_backend_loads_nothing() {
        let backend = MemBackend::new();
        assert!(backend.load_library().unwrap().is_none());
        assert!(backend.load_widget_state().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let backend = MemBackend::new();
        let doc = Library::new().to_document();
        backend.save_library(&doc).unwrap();
        assert_eq!(backend.load_library().unwrap(), Some(doc));
        assert_eq!(backend.writes(), 1);
    }

    #[test]
    fn test_simulated_failure_leaves_store_untouched() {
        let backend = MemBackend::with_document(Library::new().to_document());
        backend.set_simulate_write_error(true);

        let err = backend.delete_category_remote("default").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Persistence);
        assert_eq!(backend.writes(), 0);
        assert_eq!(backend.stored().unwrap().categories.len(), 1);
    }
}
